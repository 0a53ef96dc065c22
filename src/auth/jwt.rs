use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::auth::claims::Claims;
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Holds JWT signing and verification keys with config data.
///
/// Pure encode/decode over the shared secret and the clock; never
/// touches the database.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            access_ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    /// Issue a token for the subject, expiring at now + configured TTL.
    pub fn sign(&self, user_id: i64) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.access_ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Decode and validate a token. Any failure mode collapses into
    /// `InvalidToken`: bad signature, malformed payload, elapsed
    /// expiration, or a missing subject field.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
                debug!(error = %e, "jwt rejected");
                ApiError::InvalidToken
            })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRef;
    use serde::Serialize;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let token = keys.sign(42).expect("sign");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn verify_rejects_garbage() {
        let keys = make_keys();
        let err = keys.verify("not.a.token").unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[tokio::test]
    async fn verify_rejects_wrong_secret() {
        let keys = make_keys();
        let other = JwtKeys {
            encoding: EncodingKey::from_secret(b"another-secret"),
            decoding: DecodingKey::from_secret(b"another-secret"),
            issuer: keys.issuer.clone(),
            audience: keys.audience.clone(),
            access_ttl: keys.access_ttl,
        };
        let token = other.sign(7).expect("sign");
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let keys = make_keys();
        // Two hours in the past, well beyond the default leeway.
        let past = OffsetDateTime::now_utc() - TimeDuration::hours(2);
        let claims = Claims {
            sub: 42,
            iat: (past - TimeDuration::hours(1)).unix_timestamp() as usize,
            exp: past.unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[tokio::test]
    async fn verify_rejects_missing_subject() {
        #[derive(Serialize)]
        struct NoSubject {
            iat: usize,
            exp: usize,
            iss: String,
            aud: String,
        }

        let keys = make_keys();
        let now = OffsetDateTime::now_utc();
        let payload = NoSubject {
            iat: now.unix_timestamp() as usize,
            exp: (now + TimeDuration::minutes(5)).unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &payload, &keys.encoding).expect("encode");
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }
}
