use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use quillpost_auth::RoleRequirement;
use quillpost_core::{ArticleId, CommentId};
use quillpost_infra::{LikeTarget, UserEventKind};

use crate::app::routes::common::{acting_user, record_user_event};
use crate::app::routes::HandlerResult;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;
use crate::guard;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_comment))
        .route(
            "/:id",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
        .route("/:id/likes", put(toggle_like))
}

pub async fn get_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> HandlerResult {
    let id: CommentId = errors::parse_id(&id, "comment")?;
    let comment = services.content.comment(id).ok_or_else(errors::not_found)?;

    Ok(Json(dto::CommentView {
        likes: services.content.like_count(LikeTarget::Comment(id)),
        comment,
    })
    .into_response())
}

pub async fn create_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateCommentRequest>,
) -> HandlerResult {
    guard::require(&services, &principal, RoleRequirement::USER, None).await?;
    let user_id = acting_user(&principal)?;
    let article_id: ArticleId = errors::parse_id(&body.article_id, "article")?;

    let created = services
        .content
        .create_comment(user_id, article_id, &body.content);
    let subject = created
        .as_ref()
        .map(|c| *c.id.as_uuid())
        .unwrap_or_default();
    record_user_event(&services, user_id, subject, UserEventKind::Creating, &created);

    let comment = created.map_err(errors::domain_error_to_response)?;
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

pub async fn update_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateCommentRequest>,
) -> HandlerResult {
    let id: CommentId = errors::parse_id(&id, "comment")?;
    let existing = services.content.comment(id);
    guard::require_existing(&services, &principal, RoleRequirement::USER, existing).await?;
    let user_id = acting_user(&principal)?;

    let updated = services.content.update_comment(id, &body.content);
    record_user_event(&services, user_id, *id.as_uuid(), UserEventKind::Updating, &updated);

    let comment = updated.map_err(errors::domain_error_to_response)?;
    Ok(Json(comment).into_response())
}

pub async fn delete_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> HandlerResult {
    let id: CommentId = errors::parse_id(&id, "comment")?;
    let existing = services.content.comment(id);
    guard::require_existing(&services, &principal, RoleRequirement::USER, existing).await?;
    let user_id = acting_user(&principal)?;

    let deleted = services.content.delete_comment(id);
    record_user_event(&services, user_id, *id.as_uuid(), UserEventKind::Deleting, &deleted);

    deleted.map_err(errors::domain_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn toggle_like(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> HandlerResult {
    let id: CommentId = errors::parse_id(&id, "comment")?;
    guard::require(&services, &principal, RoleRequirement::USER, None).await?;
    let user_id = acting_user(&principal)?;

    let target = LikeTarget::Comment(id);
    let state = services
        .content
        .toggle_like(user_id, target)
        .map_err(errors::domain_error_to_response)?;

    Ok(Json(dto::LikeResponse {
        state,
        likes: services.content.like_count(target),
    })
    .into_response())
}
