use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a registered user.
///
/// The discriminant is the role *level*. Levels order the roles and double as
/// the exclusive upper bound of the permission ranks a role holds: a role at
/// level N owns every [`Permission`](crate::Permission) ranked below N.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User = 5,
    Admin = 7,
    SuperAdmin = 8,
}

impl Role {
    /// Every role, lowest level first.
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::SuperAdmin];

    pub const fn level(self) -> u8 {
        self as u8
    }

    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.level() == level)
    }

    /// The role every new account starts with.
    pub const fn lowest() -> Self {
        Role::User
    }

    pub const fn name(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
            Role::SuperAdmin => "SuperAdmin",
        }
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.level().cmp(&other.level())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_match_published_values() {
        assert_eq!(Role::User.level(), 5);
        assert_eq!(Role::Admin.level(), 7);
        assert_eq!(Role::SuperAdmin.level(), 8);
    }

    #[test]
    fn levels_are_strictly_ordered_and_distinct() {
        for pair in Role::ALL.windows(2) {
            assert!(pair[0].level() < pair[1].level());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn from_level_only_accepts_defined_levels() {
        for role in Role::ALL {
            assert_eq!(Role::from_level(role.level()), Some(role));
        }
        assert_eq!(Role::from_level(0), None);
        assert_eq!(Role::from_level(6), None);
        assert_eq!(Role::from_level(9), None);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("superadmin".parse::<Role>(), Ok(Role::SuperAdmin));
        assert_eq!(" Admin ".parse::<Role>(), Ok(Role::Admin));
        assert!("moderator".parse::<Role>().is_err());
    }

    #[test]
    fn serializes_by_name() {
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"SuperAdmin\"");
    }
}
