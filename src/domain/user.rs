//! User domain entity and its lifecycle transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::trading::{TradingBound, TradingProfile};
use crate::config::{ROLE_ADMIN, ROLE_USER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Check if this role satisfies a required role
    pub fn can_access(&self, required: &UserRole) -> bool {
        match self {
            UserRole::Admin => true,
            UserRole::User => matches!(required, UserRole::User),
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => f.write_str(ROLE_ADMIN),
            UserRole::User => f.write_str(ROLE_USER),
        }
    }
}

/// Where a user stands in the onboarding lifecycle.
///
/// Rejected and deleted users have no state: their record is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleState {
    Pending,
    Approved,
}

/// Contact and wallet details captured at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub firstname: String,
    pub lastname: String,
    pub phone: String,
    pub country: String,
    pub metamask: String,
    pub autotrade: String,
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile: Profile,
    pub role: UserRole,
    pub approved: bool,
    pub whitelisted: Option<bool>,
    pub trading: TradingProfile,
    pub email_verified: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a pending user with cleared trading parameters.
    pub fn register(registration: &Registration, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: registration.username.clone(),
            email: registration.email.clone(),
            password_hash,
            profile: registration.profile.clone(),
            role: UserRole::User,
            approved: false,
            whitelisted: Some(false),
            trading: TradingProfile::cleared(),
            email_verified: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> LifecycleState {
        if self.approved {
            LifecycleState::Approved
        } else {
            LifecycleState::Pending
        }
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Login is gated on a verified email.
    pub fn is_verified(&self) -> bool {
        self.email_verified.is_some()
    }

    /// Pending → Approved with the admin-supplied parameters.
    pub fn approve(&mut self, params: ApprovalParameters) {
        self.approved = true;
        self.whitelisted = Some(params.whitelisted);
        self.trading = params.trading;
        self.updated_at = Utc::now();
    }

    /// Overwrite every editable field. Un-approving a user clears its
    /// trading parameters so a pending record never carries them.
    pub fn apply_edit(&mut self, edit: ApprovedUserEdit) {
        self.profile = edit.profile;
        self.email = edit.email;
        self.approved = edit.approved;
        if edit.approved {
            self.whitelisted = Some(edit.whitelisted);
            self.trading = edit.trading;
        } else {
            self.whitelisted = Some(false);
            self.trading = TradingProfile::cleared();
        }
        self.updated_at = Utc::now();
    }

    /// Whether the pending-user invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.approved || self.trading.is_cleared()
    }

    pub fn mark_verified(&mut self, at: DateTime<Utc>) {
        self.email_verified = Some(at);
        self.updated_at = at;
    }

    pub fn update_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// Transition inputs (produced by the input validator)
// =============================================================================

/// Normalized self-service registration.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile: Profile,
}

/// Normalized login attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Normalized admin approval form.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalParameters {
    pub whitelisted: bool,
    pub trading: TradingProfile,
}

/// Normalized admin edit of an approved user; every field is written.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovedUserEdit {
    pub profile: Profile,
    pub email: String,
    pub approved: bool,
    pub whitelisted: bool,
    pub trading: TradingProfile,
}

// =============================================================================
// Outward representation
// =============================================================================

/// User response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Alice")]
    pub firstname: String,
    #[schema(example = "Doe")]
    pub lastname: String,
    #[schema(example = "+447911123456")]
    pub phone: String,
    #[schema(example = "GB")]
    pub country: String,
    /// Wallet address
    pub metamask: String,
    /// Auto-trade account name
    pub autotrade: String,
    pub role: UserRole,
    pub approved: bool,
    pub whitelisted: bool,
    #[schema(example = "tier-1")]
    pub group_id: String,
    pub allowed_trading_amount_from: f64,
    /// A number, or "Unlimited"
    #[schema(value_type = String, example = "Unlimited")]
    pub allowed_trading_amount_to: TradingBound,
    pub admin_fee: f64,
    pub user_profit: f64,
    pub introducer_fee: f64,
    pub email_verified: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            firstname: user.profile.firstname,
            lastname: user.profile.lastname,
            phone: user.profile.phone,
            country: user.profile.country,
            metamask: user.profile.metamask,
            autotrade: user.profile.autotrade,
            role: user.role,
            approved: user.approved,
            whitelisted: user.whitelisted.unwrap_or(false),
            group_id: user.trading.group_id,
            allowed_trading_amount_from: user.trading.allowed_trading_amount_from,
            allowed_trading_amount_to: user.trading.allowed_trading_amount_to,
            admin_fee: user.trading.admin_fee,
            user_profit: user.trading.user_profit,
            introducer_fee: user.trading.introducer_fee,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}
