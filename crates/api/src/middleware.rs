use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use quillpost_auth::{validate_claims, JwtClaims, Principal};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

/// HS256 token verification shared by every request.
#[derive(Clone)]
pub struct AuthState {
    key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl AuthState {
    pub fn hs256(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: Arc::new(DecodingKey::from_secret(secret)),
            validation: Arc::new(validation),
        }
    }

    /// Verify signature and time window, returning the token subject.
    pub fn principal_from_token(&self, token: &str) -> Result<Principal, TokenRejected> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenRejected(e.to_string()))?;

        validate_claims(&data.claims, Utc::now().timestamp())
            .map_err(|e| TokenRejected(e.to_string()))?;

        Ok(Principal::Authenticated(data.claims.sub))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRejected(pub String);

/// Attach a [`PrincipalContext`] to every request.
///
/// No `Authorization` header means an anonymous principal; a header that is
/// not a valid bearer token is rejected with 401.
pub async fn principal_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let principal = match extract_bearer(req.headers())? {
        None => Principal::Anonymous,
        Some(token) => state.principal_from_token(token).map_err(|e| {
            tracing::debug!(reason = %e.0, "rejected bearer token");
            unauthorized()
        })?,
    };

    req.extensions_mut().insert(PrincipalContext::new(principal));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, Response> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| unauthorized())?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(unauthorized)?
        .trim();

    if token.is_empty() {
        return Err(unauthorized());
    }

    Ok(Some(token))
}

fn unauthorized() -> Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid bearer token")
}
