//! Shared application state and message feed handlers

use crate::api::extract::Json;
use crate::auth::middleware::AuthMember;
use crate::core::error::{ChatError, Result};
use crate::db::models::ChatMessage;
use crate::db::repository::{MemberRepository, MessageRepository, TokenRepository};
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub member_repo: Arc<MemberRepository>,
    pub token_repo: Arc<TokenRepository>,
    pub message_repo: Arc<MessageRepository>,
}

/// Message creation request
///
/// Only the content is client-supplied; any author field a client sends is
/// ignored and the authenticated member is used instead.
#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub content: Option<String>,
}

/// A chat message as returned by the feed endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub member: String,
    pub member_username: String,
    pub content: String,
    pub created_at: String,
}

impl MessageResponse {
    fn from_message(message: &ChatMessage, member_username: &str) -> Self {
        Self {
            id: message.id.clone(),
            member: message.member_id.clone(),
            member_username: member_username.to_string(),
            content: message.content.clone(),
            created_at: message.created_at.clone(),
        }
    }
}

/// Handler for GET /api/chat/messages - the shared feed, oldest first
pub async fn list_messages(
    State(state): State<AppState>,
    _auth: AuthMember,
) -> Result<Json<Vec<MessageResponse>>> {
    let messages = state.message_repo.list_in_creation_order().await?;

    Ok(Json(
        messages
            .iter()
            .map(|(message, username)| MessageResponse::from_message(message, username))
            .collect(),
    ))
}

/// Handler for POST /api/chat/messages - append to the shared feed
///
/// The author is always the authenticated member.
pub async fn create_message(
    State(state): State<AppState>,
    auth: AuthMember,
    Json(req): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse> {
    let content = match req.content {
        None => {
            return Err(ChatError::field_validation(
                "content",
                "This field is required.",
            ))
        }
        Some(content) if content.is_empty() => {
            return Err(ChatError::field_validation(
                "content",
                "This field may not be blank.",
            ))
        }
        Some(content) => content,
    };

    let message = state
        .message_repo
        .create_for_member(&auth.member.id, &content)
        .await?;

    tracing::info!(
        member_id = %auth.member.id,
        message_id = %message.id,
        "Message posted"
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::from_message(&message, &auth.member.username)),
    ))
}

/// Health check endpoint handler
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}
