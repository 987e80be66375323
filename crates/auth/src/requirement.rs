use serde::{Deserialize, Serialize};

use crate::Role;

/// Minimum role an operation demands.
///
/// Built per check (often from one of the constants below) and never mutated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleRequirement {
    role: Role,
}

impl RoleRequirement {
    /// Create or edit own content, change own account.
    pub const USER: Self = Self::new(Role::User);
    /// View user activity logs, inspect the role catalog.
    pub const ADMIN: Self = Self::new(Role::Admin);
    /// Promote/demote users, view authentication logs.
    pub const SUPER_ADMIN: Self = Self::new(Role::SuperAdmin);

    pub const fn new(role: Role) -> Self {
        Self { role }
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub const fn level(&self) -> u8 {
        self.role.level()
    }
}

impl From<Role> for RoleRequirement {
    fn from(role: Role) -> Self {
        Self::new(role)
    }
}

impl core::fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.role, self.level())
    }
}
