use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

/// The resolved principal for a request: token verified, user row
/// loaded, liveness confirmed. Every protected handler takes this as a
/// parameter; it is the only place authentication is decided.
pub struct CurrentUser(pub User);

/// Liveness/absence decision, separated from the I/O so it can be
/// exercised directly.
pub fn check_principal(user: Option<User>) -> Result<User, ApiError> {
    let user = user.ok_or(ApiError::UnknownSubject)?;
    if !user.is_active {
        return Err(ApiError::InactiveAccount);
    }
    Ok(user)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::InvalidToken)?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(ApiError::InvalidToken)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!("invalid or expired token");
            e
        })?;

        let user = User::find_by_id(&state.db, claims.sub).await?;
        check_principal(user).map(CurrentUser)
    }
}
