use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Capability granted through a role.
///
/// Each permission carries a fixed rank; a role holds exactly the permissions
/// ranked strictly below its level (see [`permissions_of`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    Read = 1,
    Create = 2,
    Update = 3,
    Delete = 4,
    DeleteAll = 5,
    UpdateAll = 6,
    AdminEndpoints = 7,
}

impl Permission {
    /// Every permission, lowest rank first.
    pub const ALL: [Permission; 7] = [
        Permission::Read,
        Permission::Create,
        Permission::Update,
        Permission::Delete,
        Permission::DeleteAll,
        Permission::UpdateAll,
        Permission::AdminEndpoints,
    ];

    pub const fn rank(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Permission::Read => "Read",
            Permission::Create => "Create",
            Permission::Update => "Update",
            Permission::Delete => "Delete",
            Permission::DeleteAll => "DeleteAll",
            Permission::UpdateAll => "UpdateAll",
            Permission::AdminEndpoints => "AdminEndpoints",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Permissions held by `role`: every permission whose rank is strictly below
/// the role's level.
///
/// The comparison is strict on purpose. A role's level is the first rank it
/// does *not* hold.
pub fn permissions_of(role: Role) -> BTreeSet<Permission> {
    Permission::ALL
        .into_iter()
        .filter(|p| p.rank() < role.level())
        .collect()
}

impl Role {
    pub fn permissions(self) -> BTreeSet<Permission> {
        permissions_of(self)
    }

    pub fn grants(self, permission: Permission) -> bool {
        permission.rank() < self.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Permission::*;

    #[test]
    fn user_holds_content_permissions_only() {
        let expected: BTreeSet<_> = [Read, Create, Update, Delete].into_iter().collect();
        assert_eq!(permissions_of(Role::User), expected);
    }

    #[test]
    fn admin_adds_moderation_permissions() {
        let expected: BTreeSet<_> = [Read, Create, Update, Delete, DeleteAll, UpdateAll]
            .into_iter()
            .collect();
        assert_eq!(permissions_of(Role::Admin), expected);
    }

    #[test]
    fn super_admin_holds_everything() {
        let all: BTreeSet<_> = Permission::ALL.into_iter().collect();
        assert_eq!(permissions_of(Role::SuperAdmin), all);
    }

    #[test]
    fn rank_equal_to_level_is_excluded() {
        // DeleteAll is ranked 5, the User level.
        assert_eq!(DeleteAll.rank(), Role::User.level());
        assert!(!Role::User.grants(DeleteAll));
        assert!(!permissions_of(Role::User).contains(&DeleteAll));

        // AdminEndpoints is ranked 7, the Admin level.
        assert!(!Role::Admin.grants(AdminEndpoints));
    }

    #[test]
    fn permission_sets_nest_along_the_hierarchy() {
        for pair in Role::ALL.windows(2) {
            assert!(permissions_of(pair[0]).is_subset(&permissions_of(pair[1])));
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_role() -> impl Strategy<Value = Role> {
            prop::sample::select(Role::ALL.to_vec())
        }

        fn any_permission() -> impl Strategy<Value = Permission> {
            prop::sample::select(Permission::ALL.to_vec())
        }

        proptest! {
            /// Property: the set is a pure function of the role.
            #[test]
            fn permissions_of_is_deterministic(role in any_role()) {
                prop_assert_eq!(permissions_of(role), permissions_of(role));
                prop_assert_eq!(role.permissions(), permissions_of(role));
            }

            /// Property: membership and `grants` agree with the rank rule.
            #[test]
            fn grants_matches_rank_rule(role in any_role(), permission in any_permission()) {
                let in_set = permissions_of(role).contains(&permission);
                prop_assert_eq!(in_set, role.grants(permission));
                prop_assert_eq!(in_set, permission.rank() < role.level());
            }
        }
    }
}
