//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

pub const BIND_ADDR_ENV: &str = "QUILLPOST_BIND_ADDR";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const BOOTSTRAP_SUPERADMIN_ENV: &str = "QUILLPOST_BOOTSTRAP_SUPERADMIN";
pub const TOKEN_TTL_HOURS_ENV: &str = "JWT_EXPIRES_HOURS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 12;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("QUILLPOST_BIND_ADDR is not a socket address: {0}")]
    InvalidBindAddr(String),

    #[error("QUILLPOST_BOOTSTRAP_SUPERADMIN must look like `username:password`")]
    InvalidBootstrap,

    #[error("JWT_EXPIRES_HOURS must be a positive number of hours: {0}")]
    InvalidTokenTtl(String),
}

/// Credentials of the account granted `SuperAdmin` at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Lifetime of tokens issued by `POST /auth/login`.
    pub token_ttl_hours: i64,
    /// Postgres connection string; the in-memory directory is used when unset.
    pub database_url: Option<String>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = non_empty(lookup(BIND_ADDR_ENV)).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(raw_addr.clone()))?;

        let jwt_secret = non_empty(lookup(JWT_SECRET_ENV)).unwrap_or_else(|| {
            tracing::warn!("{JWT_SECRET_ENV} not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let token_ttl_hours = match non_empty(lookup(TOKEN_TTL_HOURS_ENV)) {
            None => DEFAULT_TOKEN_TTL_HOURS,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or(ConfigError::InvalidTokenTtl(raw))?,
        };

        let bootstrap_admin = non_empty(lookup(BOOTSTRAP_SUPERADMIN_ENV))
            .map(|raw| parse_bootstrap(&raw))
            .transpose()?;

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl_hours,
            database_url: non_empty(lookup(DATABASE_URL_ENV)),
            bootstrap_admin,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_bootstrap(raw: &str) -> Result<BootstrapAdmin, ConfigError> {
    let (username, password) = raw.split_once(':').ok_or(ConfigError::InvalidBootstrap)?;
    if username.trim().is_empty() || password.is_empty() {
        return Err(ConfigError::InvalidBootstrap);
    }
    Ok(BootstrapAdmin {
        username: username.trim().to_string(),
        password: password.to_string(),
    })
}
