use tracing::info;

use crate::auth::password::hash_password;
use crate::auth::repo::{User, UserRole};
use crate::state::AppState;

/// Create the configured ADMIN account when no user with that
/// username exists yet. Role elevation is never self-service, so this
/// is the only path that writes an elevated role outside the admin
/// endpoint.
pub async fn ensure_admin(state: &AppState) -> anyhow::Result<()> {
    let Some(admin) = state.config.admin.as_ref() else {
        return Ok(());
    };

    if User::find_by_username(&state.db, &admin.username)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let hash = hash_password(&admin.password)?;
    let user = User::create_with_role(
        &state.db,
        &admin.email,
        &admin.username,
        &hash,
        UserRole::Admin,
    )
    .await?;

    info!(user_id = %user.id, username = %user.username, "bootstrap admin created");
    Ok(())
}
