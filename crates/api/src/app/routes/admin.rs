use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use quillpost_auth::{catalog, Role, RoleRequirement};
use quillpost_core::UserId;
use quillpost_infra::{UserEventKind, UserRecord};

use crate::app::routes::common::{acting_user, record_user_event};
use crate::app::routes::HandlerResult;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;
use crate::guard;

pub fn router() -> Router {
    Router::new()
        .route("/events", get(user_events))
        .route("/auth-events", get(auth_events))
        .route("/roles", get(roles))
        .route("/promote/:id", put(promote))
        .route("/demote/:id", put(demote))
}

pub async fn user_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::EventsQuery>,
) -> HandlerResult {
    guard::require(&services, &principal, RoleRequirement::ADMIN, None).await?;
    Ok(Json(services.activity.user_events(query.limit())).into_response())
}

pub async fn auth_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::EventsQuery>,
) -> HandlerResult {
    guard::require(&services, &principal, RoleRequirement::SUPER_ADMIN, None).await?;
    Ok(Json(services.activity.auth_events(query.limit())).into_response())
}

/// The role catalog with each role's permissions.
pub async fn roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> HandlerResult {
    guard::require(&services, &principal, RoleRequirement::ADMIN, None).await?;
    let definitions: Vec<_> = catalog::global().definitions().collect();
    Ok(Json(definitions).into_response())
}

/// `User` → `Admin`.
pub async fn promote(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> HandlerResult {
    change_role(&services, &principal, &id, RoleChange::Promote).await
}

/// `Admin` → `User`.
pub async fn demote(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> HandlerResult {
    change_role(&services, &principal, &id, RoleChange::Demote).await
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum RoleChange {
    Promote,
    Demote,
}

impl RoleChange {
    fn current(self) -> Role {
        match self {
            RoleChange::Promote => Role::User,
            RoleChange::Demote => Role::Admin,
        }
    }

    fn target(self) -> Role {
        match self {
            RoleChange::Promote => Role::Admin,
            RoleChange::Demote => Role::User,
        }
    }

    fn event(self) -> UserEventKind {
        match self {
            RoleChange::Promote => UserEventKind::Promoting,
            RoleChange::Demote => UserEventKind::Demoting,
        }
    }
}

async fn change_role(
    services: &AppServices,
    principal: &PrincipalContext,
    raw_id: &str,
    change: RoleChange,
) -> HandlerResult {
    guard::require(services, principal, RoleRequirement::SUPER_ADMIN, None).await?;
    let acting = acting_user(principal)?;

    let target: UserId = errors::parse_id(raw_id, "user")?;
    let user = services
        .directory
        .get(target)
        .await
        .map_err(errors::directory_error_to_response)?
        .ok_or_else(errors::not_found)?;

    // Only the User <-> Admin step is managed here; SuperAdmin is never
    // granted or revoked over HTTP.
    if user.role != change.current() {
        let refused: Result<UserRecord, ()> = Err(());
        record_user_event(services, acting, *target.as_uuid(), change.event(), &refused);
        return Err(errors::json_error(
            StatusCode::CONFLICT,
            "role_conflict",
            format!("user has role {}, expected {}", user.role, change.current()),
        ));
    }

    let updated = services.directory.set_role(target, change.target()).await;
    record_user_event(services, acting, *target.as_uuid(), change.event(), &updated);

    let user = updated.map_err(errors::directory_error_to_response)?;
    tracing::info!(user_id = %user.id, role = %user.role, by = %acting, "role changed");
    Ok(Json(user).into_response())
}
