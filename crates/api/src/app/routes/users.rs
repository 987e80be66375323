use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use quillpost_auth::RoleRequirement;
use quillpost_core::UserId;
use quillpost_infra::password::{hash_password, verify_password};
use quillpost_infra::AuthEventKind;

use crate::app::routes::common::{acting_user, record_auth_event};
use crate::app::routes::HandlerResult;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;
use crate::guard;

pub fn router() -> Router {
    Router::new()
        .route("/me/username", put(change_username))
        .route("/me/password", put(change_password))
        .route("/:id", get(get_user))
        .route("/:id/articles", get(list_articles))
        .route("/:id/comments", get(list_comments))
}

async fn existing_user(services: &AppServices, raw_id: &str) -> Result<UserId, axum::response::Response> {
    let id: UserId = errors::parse_id(raw_id, "user")?;
    services
        .directory
        .get(id)
        .await
        .map_err(errors::directory_error_to_response)?
        .map(|user| user.id)
        .ok_or_else(errors::not_found)
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> HandlerResult {
    let id: UserId = errors::parse_id(&id, "user")?;
    let user = services
        .directory
        .get(id)
        .await
        .map_err(errors::directory_error_to_response)?
        .ok_or_else(errors::not_found)?;
    Ok(Json(user).into_response())
}

pub async fn list_articles(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> HandlerResult {
    let id = existing_user(&services, &id).await?;
    Ok(Json(services.content.articles_by_owner(id)).into_response())
}

pub async fn list_comments(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> HandlerResult {
    let id = existing_user(&services, &id).await?;
    Ok(Json(services.content.comments_by_owner(id)).into_response())
}

/// Load the caller's own account and run it through the guard.
async fn own_account(
    services: &AppServices,
    principal: &PrincipalContext,
) -> Result<quillpost_infra::UserRecord, axum::response::Response> {
    let account = match principal.user_id() {
        Some(id) => services
            .directory
            .get(id)
            .await
            .map_err(errors::directory_error_to_response)?,
        None => None,
    };
    guard::require_existing(services, principal, RoleRequirement::USER, account).await
}

pub async fn change_username(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::RenameRequest>,
) -> HandlerResult {
    let account = own_account(&services, &principal).await?;
    let user_id = acting_user(&principal)?;

    let renamed = services.directory.rename(account.id, &body.username).await;
    record_auth_event(&services, user_id, AuthEventKind::ChangedUserName, &renamed);

    let account = renamed.map_err(errors::directory_error_to_response)?;
    Ok(Json(account).into_response())
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::ChangePasswordRequest>,
) -> HandlerResult {
    let account = own_account(&services, &principal).await?;
    let user_id = acting_user(&principal)?;

    let matches = verify_password(&body.current_password, &account.password_hash)
        .map_err(errors::password_error_to_response)?;
    if !matches {
        record_auth_event::<(), ()>(&services, user_id, AuthEventKind::ChangedPassword, &Err(()));
        return Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_password",
            "current password does not match",
        ));
    }

    let password_hash =
        hash_password(&body.new_password).map_err(errors::password_error_to_response)?;
    let changed = services
        .directory
        .set_password_hash(account.id, &password_hash)
        .await;
    record_auth_event(&services, user_id, AuthEventKind::ChangedPassword, &changed);

    changed.map_err(errors::directory_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
