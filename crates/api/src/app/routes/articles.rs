use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use quillpost_auth::RoleRequirement;
use quillpost_core::ArticleId;
use quillpost_infra::{LikeTarget, UserEventKind};

use crate::app::routes::common::{acting_user, record_user_event};
use crate::app::routes::HandlerResult;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;
use crate::guard;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_article))
        .route(
            "/:id",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/:id/likes", put(toggle_like))
}

pub async fn get_article(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> HandlerResult {
    let id: ArticleId = errors::parse_id(&id, "article")?;
    let article = services.content.article(id).ok_or_else(errors::not_found)?;

    let view = dto::ArticleView {
        likes: services.content.like_count(LikeTarget::Article(id)),
        comments: services.content.comments_for_article(id),
        article,
    };
    Ok(Json(view).into_response())
}

pub async fn create_article(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::ArticleRequest>,
) -> HandlerResult {
    guard::require(&services, &principal, RoleRequirement::USER, None).await?;
    let user_id = acting_user(&principal)?;

    let created = services
        .content
        .create_article(user_id, &body.title, &body.content);
    let subject = created
        .as_ref()
        .map(|a| *a.id.as_uuid())
        .unwrap_or_default();
    record_user_event(&services, user_id, subject, UserEventKind::Creating, &created);

    let article = created.map_err(errors::domain_error_to_response)?;
    Ok((StatusCode::CREATED, Json(article)).into_response())
}

pub async fn update_article(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ArticleRequest>,
) -> HandlerResult {
    let id: ArticleId = errors::parse_id(&id, "article")?;
    let existing = services.content.article(id);
    guard::require_existing(&services, &principal, RoleRequirement::USER, existing).await?;
    let user_id = acting_user(&principal)?;

    let updated = services.content.update_article(id, &body.title, &body.content);
    record_user_event(&services, user_id, *id.as_uuid(), UserEventKind::Updating, &updated);

    let article = updated.map_err(errors::domain_error_to_response)?;
    Ok(Json(article).into_response())
}

pub async fn delete_article(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> HandlerResult {
    let id: ArticleId = errors::parse_id(&id, "article")?;
    let existing = services.content.article(id);
    guard::require_existing(&services, &principal, RoleRequirement::USER, existing).await?;
    let user_id = acting_user(&principal)?;

    let deleted = services.content.delete_article(id);
    record_user_event(&services, user_id, *id.as_uuid(), UserEventKind::Deleting, &deleted);

    deleted.map_err(errors::domain_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Like the article, or take the like back.
pub async fn toggle_like(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> HandlerResult {
    let id: ArticleId = errors::parse_id(&id, "article")?;
    guard::require(&services, &principal, RoleRequirement::USER, None).await?;
    let user_id = acting_user(&principal)?;

    let target = LikeTarget::Article(id);
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
