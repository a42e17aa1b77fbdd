use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::claims::TokenPurpose;
use crate::auth::error::AuthError;
use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::User;
use crate::state::AppState;

/// Verifies the bearer token and resolves its subject to a live user row.
/// A valid token whose subject no longer exists is still unauthenticated.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::Unauthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or(AuthError::Unauthenticated)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            AuthError::Unauthenticated
        })?;

        if claims.purpose != TokenPurpose::Access {
            warn!("non-access token presented as bearer credential");
            return Err(AuthError::Unauthenticated);
        }

        User::find_by_email(&state.db, &claims.sub)
            .await?
            .map(CurrentUser)
            .ok_or(AuthError::UserNotFound)
    }
}
