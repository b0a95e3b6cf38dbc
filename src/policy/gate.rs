//! Role gate for privileged operations.

use uuid::Uuid;

use crate::domain::UserRole;
use crate::errors::{AppError, AppResult};

pub const ADMIN_REQUIRED: &str = "Unauthorized: Admin access required";
pub const AUTHENTICATION_REQUIRED: &str = "Unauthorized: Authentication required";

/// The caller's verified identity, or a guest when both fields are empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Option<Uuid>,
    pub role: Option<UserRole>,
}

impl AuthContext {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn user(user_id: Uuid, role: UserRole) -> Self {
        Self {
            user_id: Some(user_id),
            role: Some(role),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.role.is_none()
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    Denied { reason: &'static str },
}

impl Authorization {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Authorization::Allowed)
    }
}

/// Decide whether `context` satisfies `required`. ADMIN satisfies USER.
pub fn authorize(context: &AuthContext, required: UserRole) -> Authorization {
    match (context.role, required) {
        (Some(role), required) if role.can_access(&required) => Authorization::Allowed,
        (_, UserRole::Admin) => Authorization::Denied {
            reason: ADMIN_REQUIRED,
        },
        (_, UserRole::User) => Authorization::Denied {
            reason: AUTHENTICATION_REQUIRED,
        },
    }
}

/// Gate check as a `Result`, for use with `?` ahead of any store access.
pub fn require(context: &AuthContext, required: UserRole) -> AppResult<()> {
    match authorize(context, required) {
        Authorization::Allowed => Ok(()),
        Authorization::Denied { reason } => {
            tracing::warn!(
                user_id = ?context.user_id,
                role = ?context.role,
                required = %required,
                "Access denied"
            );
            Err(AppError::unauthorized(reason))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_both_levels() {
        let ctx = AuthContext::user(Uuid::new_v4(), UserRole::Admin);
        assert!(authorize(&ctx, UserRole::Admin).is_allowed());
        assert!(authorize(&ctx, UserRole::User).is_allowed());
    }

    #[test]
    fn user_is_denied_admin_operations() {
        let ctx = AuthContext::user(Uuid::new_v4(), UserRole::User);
        assert_eq!(
            authorize(&ctx, UserRole::Admin),
            Authorization::Denied {
                reason: ADMIN_REQUIRED
            }
        );
        assert!(authorize(&ctx, UserRole::User).is_allowed());
    }

    #[test]
    fn guest_is_denied_everything() {
        let ctx = AuthContext::guest();
        assert!(ctx.is_guest());
        assert_eq!(
            authorize(&ctx, UserRole::User),
            Authorization::Denied {
                reason: AUTHENTICATION_REQUIRED
            }
        );
        assert_eq!(
            authorize(&ctx, UserRole::Admin),
            Authorization::Denied {
                reason: ADMIN_REQUIRED
            }
        );
    }

    #[test]
    fn require_maps_denial_to_unauthorized() {
        let err = require(&AuthContext::guest(), UserRole::Admin).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref r) if r == ADMIN_REQUIRED));
    }
}
