use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use quillpost_infra::password::{hash_password, verify_password};
use quillpost_infra::{AuthEventKind, NewUser};

use crate::app::routes::HandlerResult;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::tokens::TokenIssuer;

pub fn router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

/// Open registration; every new account starts as `User`.
pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SignupRequest>,
) -> HandlerResult {
    let password_hash = hash_password(&body.password).map_err(errors::password_error_to_response)?;

    let user = services
        .directory
        .register(NewUser {
            username: body.username,
            password_hash,
        })
        .await
        .map_err(errors::directory_error_to_response)?;

    services
        .activity
        .record_auth_event(user.id, AuthEventKind::Signup, true);

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// Exchange username and password for a bearer token.
///
/// Unknown usernames and wrong passwords get the same 400.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tokens): Extension<TokenIssuer>,
    Json(body): Json<dto::LoginRequest>,
) -> HandlerResult {
    let user = services
        .directory
        .find_by_username(&body.username)
        .await
        .map_err(errors::directory_error_to_response)?
        .ok_or_else(invalid_credentials)?;

    let matches = verify_password(&body.password, &user.password_hash).unwrap_or_else(|e| {
        tracing::warn!(user_id = %user.id, error = %e, "stored password hash is unusable");
        false
    });

    if !matches {
        services
            .activity
            .record_auth_event(user.id, AuthEventKind::Login, false);
        return Err(invalid_credentials());
    }

    let issued = tokens.issue(user.id).map_err(|e| {
        tracing::error!(error = %e, "failed to sign access token");
        errors::internal_error()
    })?;

    services
        .activity
        .record_auth_event(user.id, AuthEventKind::Login, true);

    Ok(Json(issued).into_response())
}

fn invalid_credentials() -> axum::response::Response {
    errors::json_error(
        StatusCode::BAD_REQUEST,
        "invalid_credentials",
        "invalid username or password",
    )
}
