use serde::{Deserialize, Serialize};

use quillpost_core::UserId;

/// Acting identity of a request.
///
/// Resolution (token decoding, cookies, ...) happens outside this crate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum Principal {
    Authenticated(UserId),
    Anonymous,
}

impl Principal {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Principal::Authenticated(id) => Some(*id),
            Principal::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated(_))
    }
}

impl From<UserId> for Principal {
    fn from(value: UserId) -> Self {
        Principal::Authenticated(value)
    }
}

impl From<Option<UserId>> for Principal {
    fn from(value: Option<UserId>) -> Self {
        value.map_or(Principal::Anonymous, Principal::Authenticated)
    }
}
