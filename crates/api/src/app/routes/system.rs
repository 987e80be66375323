use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use quillpost_auth::RoleResolver;

use crate::app::errors;
use crate::app::routes::HandlerResult;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// The request principal and its current role (`null` when anonymous or unknown).
pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> HandlerResult {
    let role = match principal.user_id() {
        Some(user_id) => services
            .authorizer
            .resolver()
            .role_of(user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "role lookup failed");
                errors::internal_error()
            })?,
        None => None,
    };

    Ok(Json(serde_json::json!({
        "principal": principal.principal(),
        "role": role,
    }))
    .into_response())
}
