//! HS256 access-token issuance for `POST /auth/login`.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;

use quillpost_auth::JwtClaims;
use quillpost_core::UserId;

#[derive(Clone)]
pub struct TokenIssuer {
    key: Arc<EncodingKey>,
    ttl: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub token_type: &'static str,
    /// Unix seconds.
    pub expires_at: i64,
}

impl TokenIssuer {
    pub fn hs256(secret: &[u8], ttl_hours: i64) -> Self {
        Self {
            key: Arc::new(EncodingKey::from_secret(secret)),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user_id: UserId) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    /// Sign a token for `user_id` valid from `now` (Unix seconds).
    pub fn issue_at(
        &self,
        user_id: UserId,
        now: i64,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let claims = JwtClaims {
            sub: user_id,
            iat: now,
            exp: now + self.ttl.num_seconds(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)?;

        Ok(IssuedToken {
            token,
            token_type: "Bearer",
            expires_at: claims.exp,
        })
    }
}
