use serde::{Deserialize, Serialize};
use thiserror::Error;

use quillpost_core::UserId;

/// Access-token claims (transport-agnostic).
///
/// Deliberately carries no role: the role is looked up on every check so a
/// demotion takes effect immediately instead of at token expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Expiration (Unix seconds).
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate token claims against `now` (Unix seconds).
///
/// Signature verification and decoding happen in the transport layer.
pub fn validate_claims(claims: &JwtClaims, now: i64) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(iat: i64, exp: i64) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            iat,
            exp,
        }
    }

    #[test]
    fn accepts_token_inside_window() {
        assert_eq!(validate_claims(&claims(100, 200), 150), Ok(()));
        assert_eq!(validate_claims(&claims(100, 200), 100), Ok(()));
    }

    #[test]
    fn rejects_expired_token() {
        assert_eq!(
            validate_claims(&claims(100, 200), 200),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn rejects_token_from_the_future() {
        assert_eq!(
            validate_claims(&claims(100, 200), 99),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_window() {
        assert_eq!(
            validate_claims(&claims(200, 200), 200),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
