//! Service wiring: user directory, content store, activity log and the
//! authorization engine, shared by every handler.

use std::sync::Arc;

use anyhow::Context;

use quillpost_auth::{catalog, Authorizer, Role};
use quillpost_infra::{
    ActivityLog, ContentStore, InMemoryActivityLog, InMemoryContentStore, InMemoryUserDirectory,
    NewUser, PostgresUserDirectory, UserDirectory,
};
use quillpost_infra::password::hash_password;

use crate::config::{ApiConfig, BootstrapAdmin};

pub type SharedDirectory = Arc<dyn UserDirectory>;

#[derive(Clone)]
pub struct AppServices {
    pub directory: SharedDirectory,
    /// Resolves roles through `directory` on every check.
    pub authorizer: Authorizer<SharedDirectory>,
    pub content: Arc<dyn ContentStore>,
    pub activity: Arc<dyn ActivityLog>,
}

impl AppServices {
    pub fn new(
        directory: SharedDirectory,
        content: Arc<dyn ContentStore>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            authorizer: Authorizer::new(directory.clone()),
            directory,
            content,
            activity,
        }
    }

    /// Everything in memory (dev and tests).
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(InMemoryContentStore::new()),
            Arc::new(InMemoryActivityLog::new()),
        )
    }
}

/// Build services from configuration.
///
/// With `DATABASE_URL` set, users live in Postgres (schema migrated and roles
/// seeded on startup); content and activity stay in memory.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let catalog = catalog::init();

    let directory: SharedDirectory = match &config.database_url {
        Some(url) => {
            let directory = PostgresUserDirectory::connect(url)
                .await
                .context("failed to connect to postgres")?;
            directory.migrate().await.context("failed to migrate schema")?;
            directory
                .seed_roles(catalog)
                .await
                .context("failed to seed roles")?;
            tracing::info!("using postgres user directory");
            Arc::new(directory)
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory user directory");
            Arc::new(InMemoryUserDirectory::new())
        }
    };

    let services = AppServices::new(
        directory,
        Arc::new(InMemoryContentStore::new()),
        Arc::new(InMemoryActivityLog::new()),
    );

    if let Some(admin) = &config.bootstrap_admin {
        bootstrap_superadmin(&services, admin).await?;
    }

    Ok(services)
}

/// Make sure `admin` exists and holds `SuperAdmin`.
///
/// An existing account keeps its password.
pub async fn bootstrap_superadmin(
    services: &AppServices,
    admin: &BootstrapAdmin,
) -> anyhow::Result<()> {
    let existing = services
        .directory
        .find_by_username(&admin.username)
        .await
        .context("failed to look up bootstrap account")?;

    let record = match existing {
        Some(record) => record,
        None => {
            let password_hash =
                hash_password(&admin.password).context("failed to hash bootstrap password")?;
            services
                .directory
                .register(NewUser {
                    username: admin.username.clone(),
                    password_hash,
                })
                .await
                .context("failed to register bootstrap account")?
        }
    };

    if record.role != Role::SuperAdmin {
        services
            .directory
            .set_role(record.id, Role::SuperAdmin)
            .await
            .context("failed to grant SuperAdmin to bootstrap account")?;
    }

    tracing::info!(user_id = %record.id, username = %record.username, "bootstrap super admin ready");
    Ok(())
}
