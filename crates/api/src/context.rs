use quillpost_auth::Principal;
use quillpost_core::UserId;

/// Principal context for a request.
///
/// Always present on routed requests; anonymous when no token was sent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn anonymous() -> Self {
        Self::new(Principal::Anonymous)
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.principal.user_id()
    }
}
