use axum::response::Response;
use uuid::Uuid;

use quillpost_core::UserId;
use quillpost_infra::{AuthEventKind, UserEventKind};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Acting user of a request that already passed a guard of level `User` or above.
pub fn acting_user(principal: &PrincipalContext) -> Result<UserId, Response> {
    principal.user_id().ok_or_else(errors::forbidden)
}

pub fn record_user_event<T, E>(
    services: &AppServices,
    user_id: UserId,
    subject_id: Uuid,
    kind: UserEventKind,
    outcome: &Result<T, E>,
) {
    services
        .activity
        .record_user_event(user_id, subject_id, kind, outcome.is_ok());
}

pub fn record_auth_event<T, E>(
    services: &AppServices,
    user_id: UserId,
    kind: AuthEventKind,
    outcome: &Result<T, E>,
) {
    services
        .activity
        .record_auth_event(user_id, kind, outcome.is_ok());
}
