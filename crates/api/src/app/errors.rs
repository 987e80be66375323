use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use quillpost_core::DomainError;
use quillpost_infra::directory::DirectoryError;
use quillpost_infra::password::PasswordError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => not_found(),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn directory_error_to_response(err: DirectoryError) -> axum::response::Response {
    match err {
        DirectoryError::UsernameTaken(name) => json_error(
            StatusCode::CONFLICT,
            "username_taken",
            format!("username {name} is already taken"),
        ),
        DirectoryError::NotFound => not_found(),
        DirectoryError::Invalid(e) => domain_error_to_response(e),
        DirectoryError::Storage(msg) => {
            tracing::error!(error = %msg, "user directory failure");
            internal_error()
        }
    }
}

pub fn password_error_to_response(err: PasswordError) -> axum::response::Response {
    match err {
        PasswordError::Empty => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", "password must not be empty")
        }
        other => {
            tracing::error!(error = %other, "password hashing failure");
            internal_error()
        }
    }
}

pub fn forbidden() -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden")
}

pub fn not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "not found")
}

pub fn internal_error() -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path id, mapping failures to a 400.
pub fn parse_id<T>(raw: &str, what: &'static str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr,
{
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}
