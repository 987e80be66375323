use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use quillpost_auth::{Role, RoleResolver, RoleResolverError};
use quillpost_core::UserId;

use super::{normalize_username, DirectoryError, NewUser, UserDirectory, UserRecord};

/// In-memory user directory for tests/dev.
///
/// Each write happens under one write-lock acquisition, so a role change is
/// visible to every read that starts after it returns.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed record, replacing any record with the same id.
    ///
    /// Bypasses username validation; meant for fixtures and bootstrapping.
    pub fn insert(&self, record: UserRecord) -> Result<(), DirectoryError> {
        let mut users = self.write()?;
        users.insert(record.id, record);
        Ok(())
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<UserId, UserRecord>>, DirectoryError> {
        self.users
            .read()
            .map_err(|_| DirectoryError::Storage("lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<UserId, UserRecord>>, DirectoryError> {
        self.users
            .write()
            .map_err(|_| DirectoryError::Storage("lock poisoned".to_string()))
    }
}

#[async_trait]
impl RoleResolver for InMemoryUserDirectory {
    async fn role_of(&self, user_id: UserId) -> Result<Option<Role>, RoleResolverError> {
        let users = self
            .read()
            .map_err(|e| RoleResolverError::Storage(e.to_string()))?;
        Ok(users.get(&user_id).map(|u| u.role))
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn register(&self, user: NewUser) -> Result<UserRecord, DirectoryError> {
        let username = normalize_username(&user.username)?;

        let mut users = self.write()?;
        if users.values().any(|u| u.username == username) {
            return Err(DirectoryError::UsernameTaken(username));
        }

        let record = UserRecord {
            id: UserId::new(),
            username,
            password_hash: user.password_hash,
            role: Role::lowest(),
            registered_on: Utc::now().date_naive(),
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let username = username.trim();
        Ok(self
            .read()?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<UserRecord, DirectoryError> {
        let mut users = self.write()?;
        let record = users.get_mut(&id).ok_or(DirectoryError::NotFound)?;
        record.role = role;
        Ok(record.clone())
    }

    async fn rename(&self, id: UserId, username: &str) -> Result<UserRecord, DirectoryError> {
        let username = normalize_username(username)?;

        let mut users = self.write()?;
        if users.values().any(|u| u.username == username && u.id != id) {
            return Err(DirectoryError::UsernameTaken(username));
        }
        let record = users.get_mut(&id).ok_or(DirectoryError::NotFound)?;
        record.username = username;
        Ok(record.clone())
    }

    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), DirectoryError> {
        let mut users = self.write()?;
        let record = users.get_mut(&id).ok_or(DirectoryError::NotFound)?;
        record.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), DirectoryError> {
        self.write()?
            .remove(&id)
            .map(|_| ())
            .ok_or(DirectoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use quillpost_auth::{Authorizer, Decision, RoleRequirement};

    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            password_hash: "$argon2id$fixture".to_string(),
        }
    }

    #[tokio::test]
    async fn registered_users_start_as_user() {
        let dir = InMemoryUserDirectory::new();
        let alice = dir.register(new_user("alice")).await.unwrap();

        assert_eq!(alice.role, Role::User);
        assert_eq!(dir.role_of(alice.id).await, Ok(Some(Role::User)));
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let dir = InMemoryUserDirectory::new();
        dir.register(new_user("alice")).await.unwrap();

        let err = dir.register(new_user(" alice ")).await.unwrap_err();
        assert_eq!(err, DirectoryError::UsernameTaken("alice".to_string()));
    }

    #[tokio::test]
    async fn rename_rejects_taken_name_but_allows_own() {
        let dir = InMemoryUserDirectory::new();
        let alice = dir.register(new_user("alice")).await.unwrap();
        dir.register(new_user("bob")).await.unwrap();

        assert!(matches!(
            dir.rename(alice.id, "bob").await,
            Err(DirectoryError::UsernameTaken(_))
        ));
        assert_eq!(dir.rename(alice.id, "alice").await.unwrap().username, "alice");
        assert_eq!(dir.rename(alice.id, "alicia").await.unwrap().username, "alicia");
        assert!(dir.find_by_username("alicia").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_user_has_no_role() {
        let dir = InMemoryUserDirectory::new();
        assert_eq!(dir.role_of(UserId::new()).await, Ok(None));
        assert_eq!(
            dir.set_role(UserId::new(), Role::Admin).await,
            Err(DirectoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn deleted_user_is_denied() {
        let dir = Arc::new(InMemoryUserDirectory::new());
        let alice = dir.register(new_user("alice")).await.unwrap();
        let authz = Authorizer::new(dir.clone());

        assert_eq!(
            authz.authorize(alice.id.into(), RoleRequirement::USER, None).await,
            Decision::Allow
        );

        dir.delete(alice.id).await.unwrap();
        assert_eq!(
            authz.authorize(alice.id.into(), RoleRequirement::USER, None).await,
            Decision::Deny
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn promotion_is_visible_to_checks_started_after_it() {
        let dir = Arc::new(InMemoryUserDirectory::new());
        let carol = dir.register(new_user("carol")).await.unwrap();
        let authz = Arc::new(Authorizer::new(dir.clone()));

        dir.set_role(carol.id, Role::Admin).await.unwrap();

        let checks: Vec<_> = (0..32)
            .map(|_| {
                let authz = authz.clone();
                tokio::spawn(async move {
                    authz
                        .authorize(carol.id.into(), RoleRequirement::ADMIN, None)
                        .await
                })
            })
            .collect();

        for check in checks {
            assert_eq!(check.await.unwrap(), Decision::Allow);
        }

        dir.set_role(carol.id, Role::User).await.unwrap();
        assert_eq!(
            authz.authorize(carol.id.into(), RoleRequirement::ADMIN, None).await,
            Decision::Deny
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_checks_only_observe_committed_roles() {
        let dir = Arc::new(InMemoryUserDirectory::new());
        let dave = dir.register(new_user("dave")).await.unwrap();

        let writer = {
            let dir = dir.clone();
            tokio::spawn(async move {
                for i in 0..200 {
                    let role = if i % 2 == 0 { Role::Admin } else { Role::User };
                    dir.set_role(dave.id, role).await.unwrap();
                }
            })
        };

        let reader = {
            let dir = dir.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let role = dir.role_of(dave.id).await.unwrap();
                    assert!(matches!(role, Some(Role::User) | Some(Role::Admin)));
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
        assert_eq!(dir.role_of(dave.id).await, Ok(Some(Role::User)));
    }

    #[tokio::test]
    async fn poisoned_lock_fails_every_read_the_same_way() {
        let dir = Arc::new(InMemoryUserDirectory::new());
        let alice = dir.register(new_user("alice")).await.unwrap();

        let poisoner = dir.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.users.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert_eq!(
            dir.role_of(alice.id).await,
            Err(RoleResolverError::Storage(
                DirectoryError::Storage("lock poisoned".to_string()).to_string()
            ))
        );
        assert_eq!(
            dir.get(alice.id).await,
            Err(DirectoryError::Storage("lock poisoned".to_string()))
        );
    }
}
