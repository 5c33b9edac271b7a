//! Authentication module
//!
//! This module provides authentication functionality including:
//! - Member registration and login
//! - Opaque token issuance and resolution
//! - Password hashing and verification
//! - Bearer-credential middleware and the AuthMember extractor

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod token;

pub use handlers::{get_me, get_profile, login, register, update_profile};
pub use middleware::{authenticate, AuthMember};
pub use password::{hash_password, verify_password};
pub use token::generate_key;
