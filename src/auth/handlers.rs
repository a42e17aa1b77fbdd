use axum::{
    extract::{FromRef, Query, State},
    routing::{get, post},
    Form, Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::auth::dto::{
    ForgotPasswordQuery, LoginForm, MessageResponse, ProfileResponse, RegisterRequest,
    ResetPasswordRequest, TokenResponse, UpdateProfileRequest,
};
use crate::auth::error::AuthError;
use crate::auth::extractors::CurrentUser;
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo_types::{NewProfile, User, UserPatch};
use crate::mailer::reset_email_body;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    // Burned on the unknown-identifier branch of login so both failure
    // paths cost one argon2 verification.
    static ref DUMMY_HASH: String =
        hash_password("throwaway-password").expect("argon2 with default params");
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Emails are stored trimmed and lowercased, so every lookup key has to be
/// normalized the same way. Usernames keep their case.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn normalize_identifier(identifier: &str) -> String {
    let identifier = identifier.trim();
    if identifier.contains('@') {
        normalize_email(identifier)
    } else {
        identifier.to_string()
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    payload.email = normalize_email(&payload.email);

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(AuthError::Validation("Password too short".into()));
    }

    let hash = hash_password(&payload.password)?;
    let profile = NewProfile {
        age: payload.age,
        location: payload.location,
        phone: payload.phone,
        language: payload.language,
    };
    let id = User::create(&state.db, &payload.username, &hash, &payload.email, &profile).await?;

    info!(user_id = id, email = %payload.email, "user registered");
    Ok(Json(MessageResponse::new("User registered successfully")))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AuthError> {
    let identifier = normalize_identifier(&form.username);
    let user = User::find_by_identifier(&state.db, &identifier).await?;

    let user = match user {
        Some(u) => u,
        None => {
            // Keep the miss path as slow as the hit path.
            let _ = verify_password(&form.password, &DUMMY_HASH);
            warn!("login failed");
            return Err(AuthError::InvalidCredentials);
        }
    };

    if !verify_password(&form.password, &user.password_hash) {
        warn!("login failed");
        return Err(AuthError::InvalidCredentials);
    }

    let access_token = JwtKeys::from_ref(&state).sign_access(&user.email)?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

#[instrument(skip_all)]
pub async fn get_profile(CurrentUser(user): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse::from(user))
}

#[instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let patch = UserPatch::from(payload);
    if patch.is_empty() {
        return Ok(Json(MessageResponse::new("Nothing to update")));
    }

    User::update_fields(&state.db, &user.email, &patch).await?;

    info!(user_id = user.id, "profile updated");
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}

#[instrument(skip(state))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Query(query): Query<ForgotPasswordQuery>,
) -> Result<Json<MessageResponse>, AuthError> {
    let email = normalize_email(&query.email);
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or(AuthError::EmailNotFound)?;

    let reset_token = JwtKeys::from_ref(&state).sign_reset(&user.email)?;
    let body = reset_email_body(&state.config.frontend_url, &reset_token);

    // Fire-and-forget: the 200 never waits on SMTP, and a dispatch
    // failure is logged, not surfaced.
    let mailer = state.mailer.clone();
    let to = user.email.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&to, "Password Reset Request", &body).await {
            error!(error = %e, to = %to, "failed to send reset email");
        }
    });

    info!(email = %user.email, "password reset requested");
    Ok(Json(MessageResponse::new("Password reset email sent")))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let claims = JwtKeys::from_ref(&state)
        .verify_reset(&payload.token)
        .map_err(|e| {
            warn!(error = %e, "reset token rejected");
            AuthError::InvalidResetToken
        })?;

    let new_hash = hash_password(&payload.new_password)?;
    User::replace_password(&state.db, &claims.sub, &new_hash).await?;

    info!(email = %claims.sub, "password reset");
    Ok(Json(MessageResponse::new("Password reset successful")))
}
