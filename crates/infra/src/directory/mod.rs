//! User directory: account storage and the role source for authorization.
//!
//! Every directory is a [`RoleResolver`]. Role changes (`set_role`) are single
//! atomic row updates; role reads always hit the store, never a cache.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use quillpost_auth::{OwnedResource, Role, RoleResolver};
use quillpost_core::{DomainError, DomainResult, UserId};

pub use in_memory::InMemoryUserDirectory;
pub use postgres::PostgresUserDirectory;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 32;

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub registered_on: NaiveDate,
}

/// An account is owned by itself (self-service account changes).
impl OwnedResource for UserRecord {
    fn owner_id(&self) -> UserId {
        self.id
    }
}

/// Registration input. New accounts always start at [`Role::lowest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("user storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait UserDirectory: RoleResolver {
    async fn register(&self, user: NewUser) -> Result<UserRecord, DirectoryError>;

    async fn get(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DirectoryError>;

    /// Replace the user's role in one atomic write; returns the updated record.
    async fn set_role(&self, id: UserId, role: Role) -> Result<UserRecord, DirectoryError>;

    async fn rename(&self, id: UserId, username: &str) -> Result<UserRecord, DirectoryError>;

    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), DirectoryError>;

    async fn delete(&self, id: UserId) -> Result<(), DirectoryError>;
}

/// Trim and validate a username: 3..=32 characters of `[A-Za-z0-9_.-]`.
pub fn normalize_username(raw: &str) -> DomainResult<String> {
    let username = raw.trim();
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(DomainError::validation(format!(
            "username must be {USERNAME_MIN_LEN} to {USERNAME_MAX_LEN} characters long"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(DomainError::validation(
            "username may only contain letters, digits, '_', '-' and '.'",
        ));
    }
    Ok(username.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed() {
        assert_eq!(normalize_username("  alice  ").unwrap(), "alice");
    }

    #[test]
    fn username_length_is_bounded() {
        assert!(normalize_username("ab").is_err());
        assert!(normalize_username(&"a".repeat(33)).is_err());
        assert!(normalize_username(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn username_rejects_spaces_and_symbols() {
        assert!(normalize_username("bob smith").is_err());
        assert!(normalize_username("bob@home").is_err());
        assert!(normalize_username("bob.smith-2_x").is_ok());
    }
}
