//! Raw input schemas and their normalized outputs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use super::normalize::{loose_bound, loose_number, lowercased, trimmed, verbatim};
use super::phone::is_valid_phone;
use super::InputSchema;
use crate::domain::{
    ApprovalParameters, ApprovedUserEdit, Credentials, Profile, Registration, TradingBound,
    TradingProfile,
};

/// Anything shaped like an email address.
static EMAIL_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

fn message(code: &'static str, text: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(text));
    error
}

fn not_email_like(username: &str) -> Result<(), ValidationError> {
    if EMAIL_LIKE.is_match(username) {
        Err(ValidationError::new("email_like"))
    } else {
        Ok(())
    }
}

fn non_negative_bound(bound: &TradingBound) -> Result<(), ValidationError> {
    match bound {
        TradingBound::Amount(amount) if *amount < 0.0 => Err(ValidationError::new("range")),
        _ => Ok(()),
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Self-service registration form
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "lowercased")]
    #[validate(length(min = 3, message = "Username is required"))]
    #[schema(example = "alice")]
    pub username: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Firstname is required"))]
    pub firstname: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Lastname is required"))]
    pub lastname: String,
    /// International format; checked against the country's calling code
    #[serde(default, deserialize_with = "trimmed")]
    #[schema(example = "+447911123456")]
    pub phone: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Country is required"))]
    #[schema(example = "GB")]
    pub country: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Metamask address required"))]
    pub metamask: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "AutoTrade name required"))]
    pub autotrade: String,
    #[serde(default, deserialize_with = "lowercased")]
    #[validate(email(message = "Valid email is required"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[serde(default, deserialize_with = "verbatim")]
    #[validate(length(min = 6, message = "Minimum 6 characters required"))]
    pub password: String,
    #[serde(default, deserialize_with = "verbatim")]
    #[validate(
        length(min = 6, message = "Confirm your password"),
        must_match(other = "password", message = "Passwords do not match")
    )]
    pub confirm_password: String,
}

impl InputSchema for RegisterRequest {
    type Output = Registration;

    fn extra_checks(&self, errors: &mut ValidationErrors) {
        if !is_valid_phone(&self.phone, &self.country) {
            errors.add("phone", message("phone", "Phone not valid"));
        }
    }

    fn into_output(self) -> Registration {
        Registration {
            username: self.username,
            email: self.email,
            password: self.password,
            profile: Profile {
                firstname: self.firstname,
                lastname: self.lastname,
                phone: self.phone,
                country: self.country,
                metamask: self.metamask,
                autotrade: self.autotrade,
            },
        }
    }
}

// =============================================================================
// Login
// =============================================================================

/// Login form; usernames only, never email addresses
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "lowercased")]
    #[validate(
        length(min = 1, message = "Username is required"),
        custom(
            function = "not_email_like",
            message = "Invalid username (please do not use an email address)"
        )
    )]
    #[schema(example = "alice")]
    pub username: String,
    #[serde(default, deserialize_with = "verbatim")]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl InputSchema for LoginRequest {
    type Output = Credentials;

    fn into_output(self) -> Credentials {
        Credentials {
            username: self.username,
            password: self.password,
        }
    }
}

// =============================================================================
// Admin approval
// =============================================================================

/// Admin approval popup
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveUserRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Group is required"))]
    #[schema(example = "tier-1")]
    pub group_id: String,
    pub whitelisted: bool,
    #[serde(default, deserialize_with = "loose_number")]
    #[validate(range(min = 0.0, message = "Minimum must be 0 or more"))]
    pub allowed_trading_amount_from: f64,
    /// A number, or "Unlimited"
    #[serde(default, deserialize_with = "loose_bound")]
    #[validate(custom(function = "non_negative_bound", message = "Maximum must be 0 or more"))]
    #[schema(value_type = String, example = "Unlimited")]
    pub allowed_trading_amount_to: TradingBound,
    #[serde(default, deserialize_with = "loose_number")]
    #[validate(range(min = 0.0, message = "Admin fee must be 0 or more"))]
    pub admin_fee: f64,
    #[serde(default, deserialize_with = "loose_number")]
    #[validate(range(min = 0.0, message = "User profit must be 0 or more"))]
    pub user_profit: f64,
    #[serde(default, deserialize_with = "loose_number")]
    #[validate(range(min = 0.0, message = "Introducer fee must be 0 or more"))]
    pub introducer_fee: f64,
}

impl InputSchema for ApproveUserRequest {
    type Output = ApprovalParameters;

    fn into_output(self) -> ApprovalParameters {
        ApprovalParameters {
            whitelisted: self.whitelisted,
            trading: TradingProfile {
                group_id: self.group_id,
                allowed_trading_amount_from: self.allowed_trading_amount_from,
                allowed_trading_amount_to: self.allowed_trading_amount_to,
                admin_fee: self.admin_fee,
                user_profit: self.user_profit,
                introducer_fee: self.introducer_fee,
            },
        }
    }
}

// =============================================================================
// Admin edit of an approved user
// =============================================================================

/// Full edit form for an approved user
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditApprovedUserRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Firstname is required"))]
    pub firstname: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Lastname is required"))]
    pub lastname: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Metamask address required"))]
    pub metamask: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Autotrade info required"))]
    pub autotrade: String,
    #[serde(default, deserialize_with = "lowercased")]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    pub approved: bool,
    pub whitelisted: bool,
    #[serde(default, deserialize_with = "trimmed")]
    pub group_id: String,
    #[serde(default, deserialize_with = "loose_number")]
    #[validate(range(min = 0.0, message = "Minimum must be 0 or more"))]
    pub allowed_trading_amount_from: f64,
    /// A number, or "Unlimited"
    #[serde(default, deserialize_with = "loose_bound")]
    #[validate(custom(function = "non_negative_bound", message = "Maximum must be 0 or more"))]
    #[schema(value_type = String, example = "5000")]
    pub allowed_trading_amount_to: TradingBound,
    #[serde(default, deserialize_with = "loose_number")]
    #[validate(range(min = 0.0, message = "Admin fee must be 0 or more"))]
    pub admin_fee: f64,
    #[serde(default, deserialize_with = "loose_number")]
    #[validate(range(min = 0.0, message = "User profit must be 0 or more"))]
    pub user_profit: f64,
    #[serde(default, deserialize_with = "loose_number")]
    #[validate(range(min = 0.0, message = "Introducer fee must be 0 or more"))]
    pub introducer_fee: f64,
}

impl InputSchema for EditApprovedUserRequest {
    type Output = ApprovedUserEdit;

    fn into_output(self) -> ApprovedUserEdit {
        ApprovedUserEdit {
            profile: Profile {
                firstname: self.firstname,
                lastname: self.lastname,
                phone: self.phone,
                country: self.country,
                metamask: self.metamask,
                autotrade: self.autotrade,
            },
            email: self.email,
            approved: self.approved,
            whitelisted: self.whitelisted,
            trading: TradingProfile {
                group_id: self.group_id,
                allowed_trading_amount_from: self.allowed_trading_amount_from,
                allowed_trading_amount_to: self.allowed_trading_amount_to,
                admin_fee: self.admin_fee,
                user_profit: self.user_profit,
                introducer_fee: self.introducer_fee,
            },
        }
    }
}
