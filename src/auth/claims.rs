use serde::{Deserialize, Serialize};

/// What a token is good for. A reset token must never double as an
/// access token, so the purpose travels inside the signed payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Access,
    Reset,
}

/// JWT payload. `sub` carries the user's email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub purpose: TokenPurpose,
}
