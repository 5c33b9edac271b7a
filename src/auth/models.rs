//! Authentication request/response models

use crate::db::models::Member;
use serde::{Deserialize, Serialize};

/// Register request
///
/// Fields are optional at the wire level so an absent field produces a
/// field-level validation error rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Profile update request; only the username is mutable
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
}

/// Member info (without credential material)
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResponse {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

impl MemberResponse {
    pub fn from_member(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            username: member.username.clone(),
            created_at: member.created_at.clone(),
        }
    }
}

/// Response for successful registration and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub member: MemberResponse,
}
