use crate::auth::repo::{User, UserRole};
use crate::error::ApiError;

/// Deny unless the user's role is in the allowed set.
pub fn require_role(
    user: &User,
    allowed: &[UserRole],
    denial: &'static str,
) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(denial))
    }
}

pub fn require_admin(user: &User) -> Result<(), ApiError> {
    require_role(user, &[UserRole::Admin], "Admin privileges required")
}

pub fn require_admin_or_superuser(user: &User) -> Result<(), ApiError> {
    require_role(
        user,
        &[UserRole::Admin, UserRole::Superuser],
        "Admin or superuser privileges required",
    )
}

/// Row-level check: elevated roles may act on any resource; NORMAL
/// users only on rows they own. Callers confirm existence first, so a
/// missing resource reports NotFound before any authorization
/// decision.
pub fn ensure_owner_or_elevated(user: &User, owner_id: i64) -> Result<(), ApiError> {
    if user.role.is_elevated() || owner_id == user.id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Not authorized to access this analysis",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn make_user(id: i64, role: UserRole) -> User {
        User {
            id,
            email: format!("user{id}@x.com"),
            username: format!("user{id}"),
            password_hash: "$argon2id$irrelevant".into(),
            role,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn admin_check_rejects_everyone_else() {
        assert!(require_admin(&make_user(1, UserRole::Admin)).is_ok());
        assert!(matches!(
            require_admin(&make_user(2, UserRole::Superuser)),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            require_admin(&make_user(3, UserRole::Normal)),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn combined_check_accepts_both_elevated_roles() {
        assert!(require_admin_or_superuser(&make_user(1, UserRole::Admin)).is_ok());
        assert!(require_admin_or_superuser(&make_user(2, UserRole::Superuser)).is_ok());
        assert!(matches!(
            require_admin_or_superuser(&make_user(3, UserRole::Normal)),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn owner_passes_regardless_of_role() {
        let owner = make_user(7, UserRole::Normal);
        assert!(ensure_owner_or_elevated(&owner, 7).is_ok());
    }

    #[test]
    fn elevated_roles_pass_regardless_of_ownership() {
        assert!(ensure_owner_or_elevated(&make_user(1, UserRole::Admin), 99).is_ok());
        assert!(ensure_owner_or_elevated(&make_user(2, UserRole::Superuser), 99).is_ok());
    }

    #[test]
    fn other_normal_user_is_forbidden() {
        let err = ensure_owner_or_elevated(&make_user(3, UserRole::Normal), 99).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
