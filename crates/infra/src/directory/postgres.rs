//! Postgres-backed user directory.
//!
//! ## Schema
//!
//! `roles(id, name, permissions)` is seeded from the [`RoleCatalog`]; the role
//! id is the role level. `users.role_id` references it.
//!
//! ## Consistency
//!
//! Role lookups are a single `SELECT role_id` and role changes a single-row
//! `UPDATE`. Postgres' default read-committed isolation is enough: a check
//! that starts after a promote/demote commits sees the new role.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | DirectoryError |
//! |------------|----------------------|----------------|
//! | Database (unique violation) | `23505` | `UsernameTaken` |
//! | Database (other) | Any other | `Storage` |
//! | Other | N/A | `Storage` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use quillpost_auth::{Role, RoleCatalog, RoleResolver, RoleResolverError};
use quillpost_core::UserId;

use super::{normalize_username, DirectoryError, NewUser, UserDirectory, UserRecord};

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        id          SMALLINT PRIMARY KEY,
        name        TEXT NOT NULL UNIQUE,
        permissions TEXT[] NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        username      TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role_id       SMALLINT NOT NULL REFERENCES roles (id),
        registered_on DATE NOT NULL
    )
    "#,
];

const USER_COLUMNS: &str = "id, username, password_hash, role_id, registered_on";

#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: Arc<PgPool>,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, DirectoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `roles` and `users` tables if they do not exist.
    pub async fn migrate(&self) -> Result<(), DirectoryError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }

    /// Upsert one row per catalog role. Idempotent.
    #[instrument(skip_all, err)]
    pub async fn seed_roles(&self, catalog: &RoleCatalog) -> Result<(), DirectoryError> {
        for definition in catalog.definitions() {
            let permissions: Vec<String> = definition
                .permissions
                .iter()
                .map(|p| p.name().to_string())
                .collect();

            sqlx::query(
                r#"
                INSERT INTO roles (id, name, permissions)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name, permissions = EXCLUDED.permissions
                "#,
            )
            .bind(i16::from(definition.id))
            .bind(definition.name)
            .bind(&permissions)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("seed_roles", e))?;
        }

        tracing::info!(roles = catalog.definitions().count(), "role catalog seeded");
        Ok(())
    }

    async fn fetch_one_user(
        &self,
        operation: &str,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<Option<UserRecord>, DirectoryError> {
        let row = query
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        row.as_ref().map(row_to_record).transpose()
    }
}

#[async_trait]
impl RoleResolver for PostgresUserDirectory {
    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn role_of(&self, user_id: UserId) -> Result<Option<Role>, RoleResolverError> {
        let level: Option<i16> = sqlx::query_scalar::<_, i16>("SELECT role_id FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| RoleResolverError::Storage(e.to_string()))?;

        level.map(role_from_level_resolver).transpose()
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    #[instrument(skip(self, user), fields(username = %user.username), err)]
    async fn register(&self, user: NewUser) -> Result<UserRecord, DirectoryError> {
        let username = normalize_username(&user.username)?;
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );

        let row = sqlx::query(&sql)
            .bind(Uuid::from(UserId::new()))
            .bind(&username)
            .bind(&user.password_hash)
            .bind(i16::from(Role::lowest().level()))
            .bind(Utc::now().date_naive())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| match map_sqlx_error("register", e) {
                DirectoryError::UsernameTaken(_) => DirectoryError::UsernameTaken(username.clone()),
                other => other,
            })?;

        row_to_record(&row)
    }

    async fn get(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        self.fetch_one_user("get", sqlx::query(&sql).bind(id.as_uuid()))
            .await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        self.fetch_one_user("find_by_username", sqlx::query(&sql).bind(username.trim()))
            .await
    }

    #[instrument(skip_all, fields(user_id = %id, role = %role), err)]
    async fn set_role(&self, id: UserId, role: Role) -> Result<UserRecord, DirectoryError> {
        let sql = format!("UPDATE users SET role_id = $2 WHERE id = $1 RETURNING {USER_COLUMNS}");
        self.fetch_one_user(
            "set_role",
            sqlx::query(&sql)
                .bind(id.as_uuid())
                .bind(i16::from(role.level())),
        )
        .await?
        .ok_or(DirectoryError::NotFound)
    }

    async fn rename(&self, id: UserId, username: &str) -> Result<UserRecord, DirectoryError> {
        let username = normalize_username(username)?;
        let sql = format!("UPDATE users SET username = $2 WHERE id = $1 RETURNING {USER_COLUMNS}");

        let result = self
            .fetch_one_user("rename", sqlx::query(&sql).bind(id.as_uuid()).bind(&username))
            .await;

        match result {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(DirectoryError::NotFound),
            Err(DirectoryError::UsernameTaken(_)) => Err(DirectoryError::UsernameTaken(username)),
            Err(e) => Err(e),
        }
    }

    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), DirectoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(password_hash)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_password_hash", e))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), DirectoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }
}

fn row_to_record(row: &PgRow) -> Result<UserRecord, DirectoryError> {
    let storage = |e: sqlx::Error| DirectoryError::Storage(format!("decode user row: {e}"));

    let id: Uuid = row.try_get("id").map_err(storage)?;
    let level: i16 = row.try_get("role_id").map_err(storage)?;
    let registered_on: NaiveDate = row.try_get("registered_on").map_err(storage)?;

    Ok(UserRecord {
        id: UserId::from_uuid(id),
        username: row.try_get("username").map_err(storage)?,
        password_hash: row.try_get("password_hash").map_err(storage)?,
        role: role_from_level(level)
            .ok_or_else(|| DirectoryError::Storage(format!("unknown role level {level}")))?,
        registered_on,
    })
}

fn role_from_level(level: i16) -> Option<Role> {
    u8::try_from(level).ok().and_then(Role::from_level)
}

fn role_from_level_resolver(level: i16) -> Result<Role, RoleResolverError> {
    role_from_level(level).ok_or(RoleResolverError::UnknownLevel(i32::from(level)))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DirectoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => DirectoryError::UsernameTaken(msg),
                _ => DirectoryError::Storage(msg),
            }
        }
        other => DirectoryError::Storage(format!("{operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_levels_map_back_to_roles() {
        assert_eq!(role_from_level(5), Some(Role::User));
        assert_eq!(role_from_level(7), Some(Role::Admin));
        assert_eq!(role_from_level(8), Some(Role::SuperAdmin));
    }

    #[test]
    fn unknown_levels_are_reported() {
        assert_eq!(role_from_level(6), None);
        assert_eq!(role_from_level(-1), None);
        assert_eq!(
            role_from_level_resolver(300),
            Err(RoleResolverError::UnknownLevel(300))
        );
    }
}
