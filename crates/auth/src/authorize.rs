//! Ownership-aware authorization engine.
//!
//! One decision table serves both call shapes: role-only checks (no resource)
//! and resource-scoped checks. Against the required level the principal's role
//! is either:
//!
//! - **above**: allowed on any resource, ownership is not consulted;
//! - **equal**: allowed without a resource, otherwise only on resources it owns;
//! - **below**: denied, the resource is irrelevant.
//!
//! Callers only ever see [`Decision`]. The [`AuthorizationReport`] keeps the
//! reason for operator logs; exposing it would tell a client whether an
//! account exists or who owns a resource.

use std::cmp::Ordering;

use serde::Serialize;

use quillpost_core::UserId;

use crate::{OwnedResource, Principal, Role, RoleRequirement, RoleResolver};

/// Outcome of an authorization check as seen by callers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Why a check was allowed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    /// Role strictly above the requirement; ownership bypassed.
    OutranksRequirement,
    /// Role equal to the requirement and no resource involved.
    RoleOnly,
    /// Role equal to the requirement and the principal owns the resource.
    Owner,
}

/// Why a check was denied (operator-facing only).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// No authenticated principal; no lookup was attempted.
    Unauthenticated,
    /// The principal id matches no stored user.
    UnknownPrincipal,
    /// The role store failed to answer.
    LookupFailed,
    /// Role below the requirement.
    InsufficientRole,
    /// Role equal to the requirement but the resource belongs to someone else.
    NotOwner,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Allowed(Grant),
    Denied(DenialKind),
}

impl Verdict {
    pub fn decision(&self) -> Decision {
        match self {
            Verdict::Allowed(_) => Decision::Allow,
            Verdict::Denied(_) => Decision::Deny,
        }
    }

    pub fn denial(&self) -> Option<DenialKind> {
        match self {
            Verdict::Allowed(_) => None,
            Verdict::Denied(kind) => Some(*kind),
        }
    }
}

/// Apply the decision table to an already resolved role.
///
/// Pure: no IO, no panics.
pub fn evaluate(
    user_id: UserId,
    role: Role,
    requirement: RoleRequirement,
    resource: Option<&dyn OwnedResource>,
) -> Verdict {
    evaluate_owner(user_id, role, requirement, resource.map(|r| r.owner_id()))
}

fn evaluate_owner(
    user_id: UserId,
    role: Role,
    requirement: RoleRequirement,
    owner: Option<UserId>,
) -> Verdict {
    match role.level().cmp(&requirement.level()) {
        Ordering::Greater => Verdict::Allowed(Grant::OutranksRequirement),
        Ordering::Less => Verdict::Denied(DenialKind::InsufficientRole),
        Ordering::Equal => match owner {
            None => Verdict::Allowed(Grant::RoleOnly),
            Some(owner) if owner == user_id => Verdict::Allowed(Grant::Owner),
            Some(_) => Verdict::Denied(DenialKind::NotOwner),
        },
    }
}

/// Full record of one authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationReport {
    pub principal: Principal,
    pub requirement: RoleRequirement,
    /// Role found for the principal, if a lookup happened and succeeded.
    pub resolved_role: Option<Role>,
    pub resource_owner: Option<UserId>,
    pub verdict: Verdict,
}

impl AuthorizationReport {
    pub fn decision(&self) -> Decision {
        self.verdict.decision()
    }

    /// Human-readable reason, for logs and debugging.
    pub fn reason(&self) -> String {
        let required = self.requirement;
        match (self.verdict, self.resolved_role) {
            (Verdict::Allowed(Grant::OutranksRequirement), Some(role)) => {
                format!("role {role} outranks required {required}")
            }
            (Verdict::Allowed(Grant::RoleOnly), _) => {
                format!("role meets required {required}, no resource involved")
            }
            (Verdict::Allowed(Grant::Owner), _) => {
                format!("role meets required {required} and principal owns the resource")
            }
            (Verdict::Denied(DenialKind::Unauthenticated), _) => {
                format!("anonymous principal, {required} required")
            }
            (Verdict::Denied(DenialKind::UnknownPrincipal), _) => {
                "principal does not match any stored user".to_string()
            }
            (Verdict::Denied(DenialKind::LookupFailed), _) => "role lookup failed".to_string(),
            (Verdict::Denied(DenialKind::InsufficientRole), Some(role)) => {
                format!("role {role} is below required {required}")
            }
            (Verdict::Denied(DenialKind::NotOwner), _) => {
                format!("role equals required {required} but the resource has another owner")
            }
            (verdict, role) => format!("{verdict:?} (role {role:?}, required {required})"),
        }
    }
}

/// Authorization engine bound to a role source.
///
/// Holds no mutable state: every check is an independent read of the
/// resolver, so checks can run concurrently without coordination.
#[derive(Debug, Clone)]
pub struct Authorizer<R> {
    resolver: R,
}

impl<R> Authorizer<R>
where
    R: RoleResolver,
{
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Decide whether `principal` may perform an operation requiring
    /// `requirement`, optionally against an owned `resource`.
    ///
    /// Every failure mode collapses to [`Decision::Deny`].
    pub async fn authorize(
        &self,
        principal: Principal,
        requirement: RoleRequirement,
        resource: Option<&(dyn OwnedResource + Sync)>,
    ) -> Decision {
        self.check(principal, requirement, resource).await.decision()
    }

    /// Same as [`authorize`](Self::authorize), returning the full report.
    pub async fn check(
        &self,
        principal: Principal,
        requirement: RoleRequirement,
        resource: Option<&(dyn OwnedResource + Sync)>,
    ) -> AuthorizationReport {
        let resource_owner = resource.map(|r| r.owner_id());
        let report = self.run(principal, requirement, resource_owner).await;
        log_report(&report);
        report
    }

    async fn run(
        &self,
        principal: Principal,
        requirement: RoleRequirement,
        resource_owner: Option<UserId>,
    ) -> AuthorizationReport {
        let mut report = AuthorizationReport {
            principal,
            requirement,
            resolved_role: None,
            resource_owner,
            verdict: Verdict::Denied(DenialKind::Unauthenticated),
        };

        let Some(user_id) = principal.user_id() else {
            return report;
        };

        match self.resolver.role_of(user_id).await {
            Ok(Some(role)) => {
                report.resolved_role = Some(role);
                report.verdict = evaluate_owner(user_id, role, requirement, resource_owner);
            }
            Ok(None) => {
                report.verdict = Verdict::Denied(DenialKind::UnknownPrincipal);
            }
            Err(err) => {
                tracing::warn!(%user_id, error = %err, "role lookup failed during authorization");
                report.verdict = Verdict::Denied(DenialKind::LookupFailed);
            }
        }

        report
    }
}

fn log_report(report: &AuthorizationReport) {
    let user_id = report.principal.user_id().map(|id| id.to_string());
    let required = report.requirement.role();
    match report.verdict {
        Verdict::Allowed(grant) => tracing::debug!(
            user_id = user_id.as_deref().unwrap_or("anonymous"),
            %required,
            ?grant,
            "authorization granted"
        ),
        Verdict::Denied(denial) => tracing::info!(
            user_id = user_id.as_deref().unwrap_or("anonymous"),
            %required,
            ?denial,
            reason = %report.reason(),
            "authorization denied"
        ),
    }
}
