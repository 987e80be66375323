use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use quillpost_core::UserId;

use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleResolverError {
    /// The backing store could not answer.
    #[error("role lookup failed: {0}")]
    Storage(String),

    /// A stored level that maps to no defined role.
    #[error("stored role level {0} is not a known role")]
    UnknownLevel(i32),
}

/// Read-only lookup of a user's current role.
///
/// `Ok(None)` means the id matches no stored user (e.g. the account was
/// deleted after its token was issued). Implementations must answer from the
/// most recently committed state: no caching across calls, so a completed
/// promote/demote is visible to every check that starts after it.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn role_of(&self, user_id: UserId) -> Result<Option<Role>, RoleResolverError>;
}

#[async_trait]
impl<R> RoleResolver for Arc<R>
where
    R: RoleResolver + ?Sized,
{
    async fn role_of(&self, user_id: UserId) -> Result<Option<Role>, RoleResolverError> {
        (**self).role_of(user_id).await
    }
}

#[async_trait]
impl<'a, R> RoleResolver for &'a R
where
    R: RoleResolver + ?Sized,
{
    async fn role_of(&self, user_id: UserId) -> Result<Option<Role>, RoleResolverError> {
        (**self).role_of(user_id).await
    }
}
