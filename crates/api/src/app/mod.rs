//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage and authorization wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::config::{ApiConfig, DEFAULT_TOKEN_TTL_HOURS};
use crate::middleware;
use crate::tokens::TokenIssuer;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(build_router(services, &config.jwt_secret, config.token_ttl_hours))
}

/// Build the router around already wired services, with the default token lifetime.
pub fn build_app_with(services: services::AppServices, jwt_secret: &str) -> Router {
    build_router(services, jwt_secret, DEFAULT_TOKEN_TTL_HOURS)
}

fn build_router(services: services::AppServices, jwt_secret: &str, token_ttl_hours: i64) -> Router {
    let auth_state = middleware::AuthState::hs256(jwt_secret.as_bytes());
    let tokens = TokenIssuer::hs256(jwt_secret.as_bytes(), token_ttl_hours);

    // Every routed request carries a principal (anonymous without a token);
    // each handler declares its own requirement through the guard.
    let routed = routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(Extension(tokens))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::principal_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routed)
        .layer(ServiceBuilder::new())
}
