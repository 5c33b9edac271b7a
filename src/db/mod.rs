//! Database module
//!
//! This module provides database management functionality including:
//! - Database connection pool management
//! - Repository implementations for members, tokens, and messages
//! - Database migrations

pub mod manager;
pub mod migrations;
pub mod models;
pub mod repository;

pub use manager::DatabaseManager;
pub use models::{ChatMessage, Member, MemberToken};
pub use repository::{MemberRepository, MessageRepository, TokenRepository};
