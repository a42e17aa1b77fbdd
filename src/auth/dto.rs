use serde::{Deserialize, Serialize};

use crate::auth::repo_types::{User, UserPatch};

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub age: Option<i64>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub language: Option<String>,
}

/// Login is form-encoded; `username` carries email-or-username.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Public projection of a user; the hash never leaves the store layer.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub email: String,
    pub age: Option<i64>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub language: Option<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            age: user.age,
            location: user.location,
            phone: user.phone,
            language: user.language,
        }
    }
}

/// Any subset of the mutable profile fields.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub age: Option<i64>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub language: Option<String>,
}

impl From<UpdateProfileRequest> for UserPatch {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            username: req.username,
            age: req.age,
            location: req.location,
            phone: req.phone,
            language: req.language,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
