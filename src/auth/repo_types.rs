use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[sqlx(rename = "password")]
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub age: Option<i64>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub language: Option<String>,
}

/// Fields a user may register with beyond the required triple.
#[derive(Debug, Default, Clone)]
pub struct NewProfile {
    pub age: Option<i64>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub language: Option<String>,
}

/// Partial update applied field-by-field; `None` means "leave alone".
#[derive(Debug, Default, Clone)]
pub struct UserPatch {
    pub username: Option<String>,
    pub age: Option<i64>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub language: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.age.is_none()
            && self.location.is_none()
            && self.phone.is_none()
            && self.language.is_none()
    }
}
