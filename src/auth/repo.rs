use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Closed set of role tags. Policy decisions treat the tag as data;
/// there is no behavior attached to the variants themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Superuser,
    Normal,
}

impl UserRole {
    /// ADMIN and SUPERUSER bypass ownership checks entirely.
    pub fn is_elevated(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Superuser)
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, role, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, role, is_active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, role, is_active, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Single combined lookup for login: the identifier may be either
    /// the email or the username, matched exactly.
    pub async fn find_by_identifier(db: &PgPool, identifier: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, role, is_active, created_at
            FROM users
            WHERE email = $1 OR username = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. Role and active flag take their database
    /// defaults (NORMAL, true); request callers never supply them.
    pub async fn create(
        db: &PgPool,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, username, password_hash, role, is_active, created_at
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Insert a user with an explicit role; used only by the startup
    /// admin bootstrap, never reachable from a request.
    pub async fn create_with_role(
        db: &PgPool,
        email: &str,
        username: &str,
        password_hash: &str,
        role: UserRole,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, username, password_hash, role, is_active, created_at
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Returns the updated user, or None when no such user exists.
    pub async fn update_role(db: &PgPool, id: i64, role: UserRole) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET role = $2
            WHERE id = $1
            RETURNING id, email, username, password_hash, role, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(role)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn set_active(db: &PgPool, id: i64, is_active: bool) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET is_active = $2
            WHERE id = $1
            RETURNING id, email, username, password_hash, role, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, role, is_active, created_at
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tags_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(
            serde_json::to_string(&UserRole::Superuser).unwrap(),
            "\"SUPERUSER\""
        );
        assert_eq!(
            serde_json::to_string(&UserRole::Normal).unwrap(),
            "\"NORMAL\""
        );
    }

    #[test]
    fn role_tags_deserialize_uppercase_only() {
        let role: UserRole = serde_json::from_str("\"SUPERUSER\"").unwrap();
        assert_eq!(role, UserRole::Superuser);
        assert!(serde_json::from_str::<UserRole>("\"superuser\"").is_err());
    }

    #[test]
    fn elevation_is_admin_or_superuser() {
        assert!(UserRole::Admin.is_elevated());
        assert!(UserRole::Superuser.is_elevated());
        assert!(!UserRole::Normal.is_elevated());
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            id: 1,
            email: "alice@x.com".into(),
            username: "alice".into(),
            password_hash: "$argon2id$secret".into(),
            role: UserRole::Normal,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
    }
}
