use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo::{User, UserRole};

/// Request body for user registration. There is deliberately no role
/// field here; new accounts are always NORMAL.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Request body for login. The identifier matches either the email or
/// the username.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

/// Public part of the user returned to clients.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: UserRole,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Admin request to change a user's role.
#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: UserRole,
}

/// Admin request to flip a user's active flag.
#[derive(Debug, Deserialize)]
pub struct ActiveUpdateRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_carries_bearer_marker() {
        let resp = TokenResponse::bearer("abc".into());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"token_type\":\"bearer\""));
        assert!(json.contains("\"access_token\":\"abc\""));
    }

    #[test]
    fn register_request_has_no_role_field() {
        // A caller-supplied role is simply not part of the schema.
        let parsed: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@x.com","username":"a","password":"pw","role":"ADMIN"}"#,
        )
        .unwrap();
        assert_eq!(parsed.email, "a@x.com");
        assert_eq!(parsed.username, "a");
    }

    #[test]
    fn public_user_exposes_role_and_active_flag() {
        let user = User {
            id: 5,
            email: "b@x.com".into(),
            username: "b".into(),
            password_hash: "$argon2id$secret".into(),
            role: UserRole::Superuser,
            is_active: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("\"role\":\"SUPERUSER\""));
        assert!(json.contains("\"is_active\":false"));
        assert!(!json.contains("password"));
    }
}
