//! Authentication and profile API handlers

use crate::api::extract::Json;
use crate::api::handlers::AppState;
use crate::auth::middleware::AuthMember;
use crate::auth::models::{
    AuthResponse, LoginRequest, MemberResponse, RegisterRequest, UpdateProfileRequest,
};
use crate::auth::password::{hash_password, verify_password};
use crate::core::error::{ChatError, Result};
use axum::{extract::State, http::StatusCode, response::IntoResponse};

/// Minimum password length accepted at registration
const MIN_PASSWORD_CHARS: usize = 4;

/// Pull a required field out of a request, rejecting absent or empty values
fn required(value: Option<String>, field: &'static str) -> Result<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ChatError::field_validation(
            field,
            "This field is required.",
        )),
    }
}

/// Handler for POST /api/auth/register - member registration
///
/// Creates the member and lazily issues their token in one go; re-posting
/// the same username fails with a field-level validation error.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let username = required(req.username, "username")?;
    let password = required(req.password, "password")?;

    tracing::info!(username = %username, "Member registration attempt");

    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ChatError::field_validation(
            "password",
            format!(
                "Ensure this field has at least {} characters.",
                MIN_PASSWORD_CHARS
            ),
        ));
    }

    let password_hash = hash_password(&password)?;
    let member = state.member_repo.create(&username, &password_hash).await?;
    let token = state.token_repo.issue_or_get(&member.id).await?;

    tracing::info!(
        member_id = %member.id,
        username = %member.username,
        "Member registered successfully"
    );

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: token.key,
            member: MemberResponse::from_member(&member),
        }),
    ))
}

/// Handler for POST /api/auth/login - member login
///
/// Unknown username and wrong password produce the same generic error so
/// the endpoint cannot be used to enumerate usernames.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let username = required(req.username, "username")?;
    let password = required(req.password, "password")?;

    tracing::info!(username = %username, "Login attempt");

    let member = state
        .member_repo
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ChatError::validation("Invalid username or password."))?;

    if !verify_password(&password, &member.password_hash) {
        tracing::warn!(username = %username, "Invalid password");
        return Err(ChatError::validation("Invalid username or password."));
    }

    let token = state.token_repo.issue_or_get(&member.id).await?;

    tracing::info!(member_id = %member.id, username = %member.username, "Login successful");

    Ok(Json(AuthResponse {
        token: token.key,
        member: MemberResponse::from_member(&member),
    }))
}

/// Handler for GET /api/auth/me - the currently authenticated member
pub async fn get_me(auth: AuthMember) -> Json<MemberResponse> {
    Json(MemberResponse::from_member(&auth.member))
}

/// Handler for GET /api/profile - the caller's own profile
pub async fn get_profile(auth: AuthMember) -> Json<MemberResponse> {
    Json(MemberResponse::from_member(&auth.member))
}

/// Handler for PUT/PATCH /api/profile - update the caller's username
///
/// Only the username field is mutable. The uniqueness check excludes the
/// caller's own row, so re-submitting the current username succeeds.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthMember,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<MemberResponse>> {
    let username = required(req.username, "username")?;

    let updated = state
        .member_repo
        .update_username(&auth.member.id, &username)
        .await?;

    tracing::info!(
        member_id = %updated.id,
        username = %updated.username,
        "Profile updated"
    );

    Ok(Json(MemberResponse::from_member(&updated)))
}
