use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::JwtConfig, error::AppError, state::AppState, users::repo_types::User};

/// Session token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,          // user id
    pub uuid: Uuid,       // user external id
    pub username: String,
    pub iat: i64,         // issued at (unix timestamp)
    pub exp: i64,         // expires at (unix timestamp)
}

/// HS256 signing and verification with the single server secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    configured: bool,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        let JwtConfig { secret, ttl_hours } = cfg;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(*ttl_hours),
            configured: !secret.trim().is_empty(),
        }
    }

    pub fn issue(&self, user: &User) -> Result<(String, Claims), AppError> {
        self.issue_at(user, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(
        &self,
        user: &User,
        now: OffsetDateTime,
    ) -> Result<(String, Claims), AppError> {
        if !self.configured {
            return Err(AppError::Config("JWT secret is not configured".into()));
        }
        let claims = Claims {
            id: user.id(),
            uuid: user.uuid(),
            username: user.username.clone(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(e.into()))?;
        debug!(user_id = claims.id, exp = claims.exp, "jwt signed");
        Ok((token, claims))
    }

    /// Any structural, signature or expiry failure is `Unauthorized`.
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        if !self.configured {
            return Err(AppError::Config("JWT secret is not configured".into()));
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "jwt rejected");
            AppError::Unauthorized
        })?;
        debug!(user_id = data.claims.id, "jwt verified");
        Ok(data.claims)
    }
}
