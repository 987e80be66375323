use axum::{routing::get, Router};

pub mod admin;
pub mod articles;
pub mod auth;
pub mod comments;
pub mod common;
pub mod system;
pub mod users;

/// Handlers return the success response or an already rendered error.
pub type HandlerResult = Result<axum::response::Response, axum::response::Response>;

/// Router for every endpoint behind the principal middleware.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/auth", auth::router())
        .nest("/articles", articles::router())
        .nest("/comments", comments::router())
        .nest("/users", users::router())
        .nest("/admin", admin::router())
}
