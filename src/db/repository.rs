//! Repository pattern implementation for data access
//!
//! Every check-then-write sequence (username uniqueness, token
//! get-or-create) runs inside a single transaction so concurrent requests
//! cannot race the check against the write.

use crate::core::error::{ChatError, Result};
use crate::db::manager::DatabaseManager;
use crate::db::models::{ChatMessage, Member, MemberToken};
use rusqlite::{params, OptionalExtension, Row};
use std::sync::Arc;

fn map_member(row: &Row) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

const MEMBER_COLUMNS: &str = "id, username, password_hash, created_at";

/// Repository for Member entities
pub struct MemberRepository {
    db: Arc<DatabaseManager>,
}

impl MemberRepository {
    /// Create a new MemberRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Create a member, enforcing username uniqueness in the same transaction
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<Member> {
        let member = Member {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let inserted = member.clone();
        self.db
            .transaction(move |tx| {
                let taken: Option<String> = tx
                    .query_row(
                        "SELECT id FROM members WHERE username = ?",
                        [&inserted.username],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(ChatError::DatabaseError)?;

                if taken.is_some() {
                    return Err(ChatError::field_validation(
                        "username",
                        "A member with this username already exists.",
                    ));
                }

                tx.execute(
                    "INSERT INTO members (id, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        inserted.id,
                        inserted.username,
                        inserted.password_hash,
                        inserted.created_at
                    ],
                )
                .map_err(ChatError::DatabaseError)?;

                Ok(())
            })
            .await?;

        Ok(member)
    }

    /// Find a member by id
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Member>> {
        let id = id.to_string();
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS),
                    [&id],
                    map_member,
                )
                .optional()
                .map_err(ChatError::DatabaseError)
            })
            .await
    }

    /// Find a member by username (exact, case-sensitive)
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Member>> {
        let username = username.to_string();
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!("SELECT {} FROM members WHERE username = ?", MEMBER_COLUMNS),
                    [&username],
                    map_member,
                )
                .optional()
                .map_err(ChatError::DatabaseError)
            })
            .await
    }

    /// Update a member's username
    ///
    /// The collision check excludes the member's own row, so updating to
    /// the current username is a no-op rather than a duplicate error.
    pub async fn update_username(&self, member_id: &str, username: &str) -> Result<Member> {
        let member_id = member_id.to_string();
        let username = username.to_string();

        self.db
            .transaction(move |tx| {
                let taken: Option<String> = tx
                    .query_row(
                        "SELECT id FROM members WHERE username = ?1 AND id != ?2",
                        params![username, member_id],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(ChatError::DatabaseError)?;

                if taken.is_some() {
                    return Err(ChatError::field_validation(
                        "username",
                        "A member with this username already exists.",
                    ));
                }

                tx.execute(
                    "UPDATE members SET username = ?1 WHERE id = ?2",
                    params![username, member_id],
                )
                .map_err(ChatError::DatabaseError)?;

                tx.query_row(
                    &format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS),
                    [&member_id],
                    map_member,
                )
                .optional()
                .map_err(ChatError::DatabaseError)?
                .ok_or_else(|| ChatError::NotFound(format!("member {}", member_id)))
            })
            .await
    }

    /// Count total members
    pub async fn count(&self) -> Result<i64> {
        self.db
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))
                    .map_err(ChatError::DatabaseError)
            })
            .await
    }
}

/// Repository for member tokens: the token store
pub struct TokenRepository {
    db: Arc<DatabaseManager>,
}

impl TokenRepository {
    /// Create a new TokenRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Return the member's existing token, or mint and persist a new one
    ///
    /// Idempotent: a second call for the same member returns the same key.
    /// Runs as one transaction so two concurrent logins cannot mint two
    /// tokens for the same member.
    pub async fn issue_or_get(&self, member_id: &str) -> Result<MemberToken> {
        let member_id = member_id.to_string();

        self.db
            .transaction(move |tx| {
                let existing = tx
                    .query_row(
                        "SELECT key, member_id, created_at FROM tokens WHERE member_id = ?",
                        [&member_id],
                        |row| {
                            Ok(MemberToken {
                                key: row.get(0)?,
                                member_id: row.get(1)?,
                                created_at: row.get(2)?,
                            })
                        },
                    )
                    .optional()
                    .map_err(ChatError::DatabaseError)?;

                if let Some(token) = existing {
                    return Ok(token);
                }

                // Re-roll on key collision; with 20 random bytes this loop
                // effectively never repeats
                let key = loop {
                    let candidate = crate::auth::token::generate_key();
                    let collision: Option<String> = tx
                        .query_row(
                            "SELECT key FROM tokens WHERE key = ?",
                            [&candidate],
                            |row| row.get(0),
                        )
                        .optional()
                        .map_err(ChatError::DatabaseError)?;
                    if collision.is_none() {
                        break candidate;
                    }
                };

                let token = MemberToken {
                    key,
                    member_id: member_id.clone(),
                    created_at: chrono::Utc::now().to_rfc3339(),
                };

                tx.execute(
                    "INSERT INTO tokens (key, member_id, created_at) VALUES (?1, ?2, ?3)",
                    params![token.key, token.member_id, token.created_at],
                )
                .map_err(ChatError::DatabaseError)?;

                Ok(token)
            })
            .await
    }

    /// Resolve a token key to its owning member
    ///
    /// Exact-match lookup; `None` means the key is unknown and the caller
    /// must treat it as an authentication failure.
    pub async fn resolve(&self, key: &str) -> Result<Option<(Member, MemberToken)>> {
        let key = key.to_string();
        self.db
            .execute(move |conn| {
                conn.query_row(
                    "SELECT m.id, m.username, m.password_hash, m.created_at, \
                     t.key, t.member_id, t.created_at \
                     FROM tokens t JOIN members m ON m.id = t.member_id \
                     WHERE t.key = ?",
                    [&key],
                    |row| {
                        Ok((
                            Member {
                                id: row.get(0)?,
                                username: row.get(1)?,
                                password_hash: row.get(2)?,
                                created_at: row.get(3)?,
                            },
                            MemberToken {
                                key: row.get(4)?,
                                member_id: row.get(5)?,
                                created_at: row.get(6)?,
                            },
                        ))
                    },
                )
                .optional()
                .map_err(ChatError::DatabaseError)
            })
            .await
    }
}

/// Repository for the shared chat message feed
pub struct MessageRepository {
    db: Arc<DatabaseManager>,
}

impl MessageRepository {
    /// Create a new MessageRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Append a message authored by the given member
    pub async fn create_for_member(&self, member_id: &str, content: &str) -> Result<ChatMessage> {
        let message = ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            member_id: member_id.to_string(),
            content: content.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let inserted = message.clone();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO messages (id, member_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        inserted.id,
                        inserted.member_id,
                        inserted.content,
                        inserted.created_at
                    ],
                )
                .map_err(ChatError::DatabaseError)?;
                Ok(())
            })
            .await?;

        Ok(message)
    }

    /// List all messages with their author's username, oldest first
    ///
    /// rowid breaks ties between messages created in the same instant.
    pub async fn list_in_creation_order(&self) -> Result<Vec<(ChatMessage, String)>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT msg.id, msg.member_id, msg.content, msg.created_at, m.username \
                         FROM messages msg JOIN members m ON m.id = msg.member_id \
                         ORDER BY msg.created_at ASC, msg.rowid ASC",
                    )
                    .map_err(ChatError::DatabaseError)?;

                let messages = stmt
                    .query_map([], |row| {
                        Ok((
                            ChatMessage {
                                id: row.get(0)?,
                                member_id: row.get(1)?,
                                content: row.get(2)?,
                                created_at: row.get(3)?,
                            },
                            row.get::<_, String>(4)?,
                        ))
                    })
                    .map_err(ChatError::DatabaseError)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(ChatError::DatabaseError)?;

                Ok(messages)
            })
            .await
    }
}
