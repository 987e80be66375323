//! Role catalog: the static role → permission table.
//!
//! The table is derived from [`permissions_of`], never hand-maintained. Storage
//! layers seed their role rows from [`RoleCatalog::build`]; runtime code reads
//! the process-wide copy through [`global`].

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::{permissions_of, Permission, Role};

/// One role with its granted permissions (for seeding, audit and display).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDefinition {
    /// Stored role id; equal to the role level.
    pub id: u8,
    pub role: Role,
    pub name: &'static str,
    pub permissions: Vec<Permission>,
    pub description: &'static str,
}

/// Every role with its permissions, ordered by level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleCatalog {
    roles: BTreeMap<Role, RoleDefinition>,
}

impl RoleCatalog {
    /// Compute the catalog. Pure; two calls yield equal catalogs.
    pub fn build() -> Self {
        let roles = Role::ALL
            .into_iter()
            .map(|role| {
                let definition = RoleDefinition {
                    id: role.level(),
                    role,
                    name: role.name(),
                    permissions: permissions_of(role).into_iter().collect(),
                    description: role_description(role),
                };
                (role, definition)
            })
            .collect();

        Self { roles }
    }

    pub fn get(&self, role: Role) -> &RoleDefinition {
        // Built from Role::ALL, so every role is present.
        &self.roles[&role]
    }

    /// Definitions, lowest level first.
    pub fn definitions(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.roles.values()
    }
}

fn role_description(role: Role) -> &'static str {
    match role {
        Role::User => "Registered author: manages own articles, comments and likes",
        Role::Admin => "Moderator: edits or removes any content, reads user activity",
        Role::SuperAdmin => "Administrator: promotes and demotes users, reads auth activity",
    }
}

static CATALOG: OnceLock<RoleCatalog> = OnceLock::new();

/// Build and cache the process-wide catalog.
///
/// Call once at startup; later calls return the cached value.
pub fn init() -> &'static RoleCatalog {
    CATALOG.get_or_init(RoleCatalog::build)
}

/// The process-wide catalog, built on first use if [`init`] was skipped.
pub fn global() -> &'static RoleCatalog {
    init()
}
