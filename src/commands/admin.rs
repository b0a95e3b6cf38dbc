//! Admin command - role management outside the HTTP surface.
//!
//! The first administrator has to come from somewhere: promote a
//! registered account with `admin promote <username>`.

use crate::cli::args::{AdminAction, AdminArgs};
use crate::config::Config;
use crate::domain::{User, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{Database, Persistence, UnitOfWork, UserRepository};

/// Execute the admin command
pub async fn execute(args: AdminArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let uow = Persistence::new(db.get_connection());

    let (username, role) = match args.action {
        AdminAction::Promote { username } => (username, UserRole::Admin),
        AdminAction::Demote { username } => (username, UserRole::User),
    };

    let user = set_role(uow.users().as_ref(), &username, role).await?;
    println!("{} is now {}", user.username, user.role);

    Ok(())
}

/// Change the role of the account named `username`.
pub async fn set_role(
    users: &dyn UserRepository,
    username: &str,
    role: UserRole,
) -> AppResult<User> {
    let mut user = users
        .find_by_username(&username.trim().to_lowercase())
        .await?
        .ok_or_not_found()?;

    if user.role == role {
        tracing::info!(user_id = %user.id, role = %role, "Role unchanged");
        return Ok(user);
    }

    user.update_role(role);
    let user = users.save(&user).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "Role updated");
    Ok(user)
}
