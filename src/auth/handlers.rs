use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            ActiveUpdateRequest, ListQuery, LoginRequest, PublicUser, RegisterRequest,
            RoleUpdateRequest, TokenResponse,
        },
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        policy::{require_admin, require_admin_or_superuser},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/users", get(list_users))
        .route("/auth/users/:id/role", patch(update_user_role))
        .route("/auth/users/:id/active", patch(set_user_active))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Login decision over an already-fetched row. Unknown identifier and
/// wrong password collapse into the same error; the active flag is
/// only consulted once the password has verified.
fn verify_login(user: Option<User>, password: &str) -> Result<User, ApiError> {
    let Some(user) = user else {
        warn!("login unknown identifier");
        return Err(ApiError::InvalidCredentials);
    };
    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }
    if !user.is_active {
        warn!(user_id = %user.id, "login on disabled account");
        return Err(ApiError::AccountDisabled);
    }
    Ok(user)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    payload.email = payload.email.trim().to_string();
    payload.username = payload.username.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if payload.username.is_empty() {
        return Err(ApiError::BadRequest("Username must not be empty".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    // Both uniqueness checks run before the insert so each conflict
    // reports its own error.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }
    if User::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username already taken");
        return Err(ApiError::DuplicateUsername);
    }

    let hash = hash_password(&payload.password)?;

    // Role and active flag come from the schema defaults; a
    // caller-supplied role is never read.
    let user = User::create(&state.db, &payload.email, &payload.username, &hash).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = User::find_by_identifier(&state.db, &payload.identifier).await?;
    let user = verify_login(user, &payload.password)?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(access_token)))
}

#[instrument(skip(current))]
pub async fn me(CurrentUser(current): CurrentUser) -> Json<PublicUser> {
    Json(current.into())
}

#[instrument(skip(state, current, payload))]
pub async fn update_user_role(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<i64>,
    Json(payload): Json<RoleUpdateRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    require_admin(&current)?;

    let updated = User::update_role(&state.db, user_id, payload.role)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with id {user_id}")))?;

    info!(admin_id = %current.id, user_id = %updated.id, role = ?updated.role, "user role updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state, current, payload))]
pub async fn set_user_active(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<i64>,
    Json(payload): Json<ActiveUpdateRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    require_admin(&current)?;

    let updated = User::set_active(&state.db, user_id, payload.is_active)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with id {user_id}")))?;

    info!(admin_id = %current.id, user_id = %updated.id, is_active = updated.is_active, "user active flag updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state, current))]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    require_admin_or_superuser(&current)?;

    let users = User::list(&state.db, q.limit, q.offset).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::UserRole;
    use time::OffsetDateTime;

    fn make_user(password: &str, is_active: bool) -> User {
        User {
            id: 1,
            email: "alice@x.com".into(),
            username: "alice".into(),
            password_hash: hash_password(password).expect("hash"),
            role: UserRole::Normal,
            is_active,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn login_accepts_correct_password() {
        let user = make_user("pw123secret", true);
        let resolved = verify_login(Some(user), "pw123secret").expect("login");
        assert_eq!(resolved.username, "alice");
    }

    #[test]
    fn unknown_identifier_and_wrong_password_are_indistinguishable() {
        let missing = verify_login(None, "whatever").unwrap_err();
        let wrong = verify_login(Some(make_user("pw123secret", true)), "wrongpw").unwrap_err();
        assert!(matches!(missing, ApiError::InvalidCredentials));
        assert!(matches!(wrong, ApiError::InvalidCredentials));
        assert_eq!(missing.to_string(), wrong.to_string());
    }

    #[test]
    fn disabled_account_reported_only_after_password_verifies() {
        let correct = verify_login(Some(make_user("pw123secret", false)), "pw123secret");
        assert!(matches!(correct, Err(ApiError::AccountDisabled)));

        // Wrong password on a disabled account must not reveal the
        // account state.
        let wrong = verify_login(Some(make_user("pw123secret", false)), "wrongpw");
        assert!(matches!(wrong, Err(ApiError::InvalidCredentials)));
    }

    #[test]
    fn email_validation_accepts_plausible_addresses() {
        assert!(is_valid_email("alice@x.com"));
        assert!(is_valid_email("a.b+c@example.co.uk"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@x.com"));
    }
}
