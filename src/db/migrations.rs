//! Database migrations
//!
//! Versioned schema migrations tracked in a `schema_migrations` table.
//! Each migration runs at most once, inside its own transaction.

use crate::core::error::{ChatError, Result};
use rusqlite::Connection;
use tracing::info;

/// Migration version tracking table
const MIGRATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Initial schema migration (version 1)
///
/// Uniqueness of usernames and token keys is enforced here as a backstop;
/// the repositories additionally check inside the writing transaction so
/// violations surface as validation errors rather than constraint failures.
const MIGRATION_V1: &str = r#"
-- Members table (identity + hashed credential)
CREATE TABLE IF NOT EXISTS members (
    id TEXT PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Tokens table: one live token per member, key is the bearer credential
CREATE TABLE IF NOT EXISTS tokens (
    key TEXT PRIMARY KEY,
    member_id TEXT UNIQUE NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (member_id) REFERENCES members(id) ON DELETE CASCADE
);

-- Shared chat message feed
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    member_id TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (member_id) REFERENCES members(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at);
"#;

/// All migrations in version order
const MIGRATIONS: &[(i64, &str)] = &[(1, MIGRATION_V1)];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(MIGRATION_TABLE)
        .map_err(ChatError::DatabaseError)?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(ChatError::DatabaseError)?;

    for (version, sql) in MIGRATIONS {
        if *version <= current_version {
            continue;
        }

        info!(version = version, "Applying database migration");

        conn.execute_batch(&format!(
            "BEGIN;\n{}\nINSERT INTO schema_migrations (version) VALUES ({});\nCOMMIT;",
            sql, version
        ))
        .map_err(ChatError::DatabaseError)?;
    }

    Ok(())
}
