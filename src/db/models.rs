//! Database row models

use serde::{Deserialize, Serialize};

/// A registered member identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub created_at: String,
}

/// Opaque bearer token, one per member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberToken {
    pub key: String,
    pub member_id: String,
    pub created_at: String,
}

/// An immutable entry in the shared chat feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub member_id: String,
    pub content: String,
    pub created_at: String,
}
