//! Audit trail of user actions and authentication events.
//!
//! Records are append-only. Listings come back newest first.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quillpost_core::UserId;

/// Something a user did to content or to another account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserEventKind {
    Creating,
    Updating,
    Deleting,
    Promoting,
    Demoting,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventKind {
    Login,
    Logout,
    Signup,
    ChangedPassword,
    ChangedUserName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEventRecord {
    pub id: Uuid,
    pub user_id: UserId,
    /// Id of the article, comment or account acted upon.
    pub subject_id: Uuid,
    pub kind: UserEventKind,
    pub succeeded: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEventRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub kind: AuthEventKind,
    pub succeeded: bool,
    pub occurred_at: DateTime<Utc>,
}

pub trait ActivityLog: Send + Sync {
    fn record_user_event(
        &self,
        user_id: UserId,
        subject_id: Uuid,
        kind: UserEventKind,
        succeeded: bool,
    ) -> UserEventRecord;

    fn record_auth_event(&self, user_id: UserId, kind: AuthEventKind, succeeded: bool)
    -> AuthEventRecord;

    /// At most `limit` records, newest first.
    fn user_events(&self, limit: usize) -> Vec<UserEventRecord>;

    /// At most `limit` records, newest first.
    fn auth_events(&self, limit: usize) -> Vec<AuthEventRecord>;
}

/// In-memory activity log for tests/dev.
///
/// Keeps at most `capacity` records of each kind; the oldest are dropped first.
#[derive(Debug)]
pub struct InMemoryActivityLog {
    capacity: usize,
    user_events: RwLock<VecDeque<UserEventRecord>>,
    auth_events: RwLock<VecDeque<AuthEventRecord>>,
}

impl InMemoryActivityLog {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            user_events: RwLock::new(VecDeque::new()),
            auth_events: RwLock::new(VecDeque::new()),
        }
    }
}

impl Default for InMemoryActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

fn push_bounded<T>(log: &RwLock<VecDeque<T>>, capacity: usize, record: T) {
    let mut log = log.write().unwrap_or_else(PoisonError::into_inner);
    if log.len() == capacity {
        log.pop_front();
    }
    log.push_back(record);
}

fn newest<T: Clone>(log: &RwLock<VecDeque<T>>, limit: usize) -> Vec<T> {
    let log = log.read().unwrap_or_else(PoisonError::into_inner);
    log.iter().rev().take(limit).cloned().collect()
}

impl ActivityLog for InMemoryActivityLog {
    fn record_user_event(
        &self,
        user_id: UserId,
        subject_id: Uuid,
        kind: UserEventKind,
        succeeded: bool,
    ) -> UserEventRecord {
        let record = UserEventRecord {
            id: Uuid::now_v7(),
            user_id,
            subject_id,
            kind,
            succeeded,
            occurred_at: Utc::now(),
        };

        tracing::info!(
            user_id = %user_id,
            subject_id = %subject_id,
            kind = ?kind,
            succeeded,
            "user event"
        );
        push_bounded(&self.user_events, self.capacity, record.clone());
        record
    }

    fn record_auth_event(
        &self,
        user_id: UserId,
        kind: AuthEventKind,
        succeeded: bool,
    ) -> AuthEventRecord {
        let record = AuthEventRecord {
            id: Uuid::now_v7(),
            user_id,
            kind,
            succeeded,
            occurred_at: Utc::now(),
        };

        tracing::info!(user_id = %user_id, kind = ?kind, succeeded, "auth event");
        push_bounded(&self.auth_events, self.capacity, record.clone());
        record
    }

    fn user_events(&self, limit: usize) -> Vec<UserEventRecord> {
        newest(&self.user_events, limit)
    }

    fn auth_events(&self, limit: usize) -> Vec<AuthEventRecord> {
        newest(&self.auth_events, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_events_are_listed_newest_first() {
        let log = InMemoryActivityLog::new();
        let user = UserId::new();
        let first = log.record_user_event(user, Uuid::now_v7(), UserEventKind::Creating, true);
        let second = log.record_user_event(user, Uuid::now_v7(), UserEventKind::Deleting, false);

        let events = log.user_events(10);
        assert_eq!(events, vec![second, first]);
    }

    #[test]
    fn limit_caps_listing() {
        let log = InMemoryActivityLog::new();
        let user = UserId::new();
        for _ in 0..5 {
            log.record_auth_event(user, AuthEventKind::Login, true);
        }
        assert_eq!(log.auth_events(3).len(), 3);
        assert_eq!(log.auth_events(0).len(), 0);
    }

    #[test]
    fn capacity_drops_oldest() {
        let log = InMemoryActivityLog::with_capacity(2);
        let user = UserId::new();
        log.record_auth_event(user, AuthEventKind::Signup, true);
        let b = log.record_auth_event(user, AuthEventKind::Login, true);
        let c = log.record_auth_event(user, AuthEventKind::Logout, true);

        assert_eq!(log.auth_events(10), vec![c, b]);
    }

    #[test]
    fn logs_are_independent() {
        let log = InMemoryActivityLog::new();
        log.record_auth_event(UserId::new(), AuthEventKind::ChangedPassword, true);
        assert!(log.user_events(10).is_empty());
        assert_eq!(log.auth_events(10).len(), 1);
    }

    #[test]
    fn kinds_serialize_snake_case() {
        let json = serde_json::to_string(&AuthEventKind::ChangedUserName).unwrap();
        assert_eq!(json, "\"changed_user_name\"");
    }
}
