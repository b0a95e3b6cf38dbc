//! Input validation - raw JSON in, normalized transition inputs out.
//!
//! Each form has a schema struct that deserializes leniently (see
//! [`normalize`]), validates with `validator` and then converts into the
//! domain input it feeds. Field messages are joined in field-name order so
//! the same bad form always produces the same error text.

pub mod normalize;
pub mod phone;
pub mod schemas;

pub use schemas::{ApproveUserRequest, EditApprovedUserRequest, LoginRequest, RegisterRequest};

use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::errors::{AppError, AppResult};

/// Message used when the payload does not have the expected shape at all.
pub const INVALID_FIELDS: &str = "Invalid fields!";

/// A validated form schema.
pub trait InputSchema: DeserializeOwned + Validate {
    type Output;

    /// Cross-field checks the derive cannot express.
    fn extra_checks(&self, _errors: &mut ValidationErrors) {}

    fn into_output(self) -> Self::Output;
}

/// Parse, validate and normalize a raw payload.
pub fn validate<S: InputSchema>(raw: Value) -> AppResult<S::Output> {
    let input: S = serde_json::from_value(raw).map_err(|e| {
        tracing::debug!(error = %e, "Malformed input payload");
        AppError::validation(INVALID_FIELDS)
    })?;

    let mut errors = match input.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    input.extra_checks(&mut errors);

    if errors.field_errors().is_empty() {
        Ok(input.into_output())
    } else {
        Err(AppError::validation(format_validation_errors(&errors)))
    }
}

/// Format validation errors into a user-friendly string
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    let messages: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();

    if messages.is_empty() {
        INVALID_FIELDS.to_string()
    } else {
        messages.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradingBound;
    use serde_json::json;

    fn message_of(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn registration_form() -> Value {
        json!({
            "username": "  Alice ",
            "firstname": "Alice",
            "lastname": "Doe",
            "phone": "+44 7911 123456",
            "country": "GB",
            "metamask": "0xabc",
            "autotrade": "alice-auto",
            "email": "Alice@Example.com",
            "password": " secret1",
            "confirmPassword": " secret1"
        })
    }

    #[test]
    fn registration_is_normalized() {
        let registration = validate::<RegisterRequest>(registration_form()).unwrap();

        assert_eq!(registration.username, "alice");
        assert_eq!(registration.email, "alice@example.com");
        // Passwords are never trimmed.
        assert_eq!(registration.password, " secret1");
        assert_eq!(registration.profile.country, "GB");
    }

    #[test]
    fn registration_reports_every_bad_field_in_order() {
        let mut form = registration_form();
        form["username"] = json!("al");
        form["confirmPassword"] = json!("other1");
        form["phone"] = json!("12345");

        let msg = message_of(validate::<RegisterRequest>(form).unwrap_err());
        assert_eq!(
            msg,
            "Passwords do not match, Phone not valid, Username is required"
        );
    }

    #[test]
    fn login_rejects_email_usernames() {
        let err = validate::<LoginRequest>(json!({
            "username": "alice@example.com",
            "password": "secret1"
        }))
        .unwrap_err();

        assert_eq!(
            message_of(err),
            "Invalid username (please do not use an email address)"
        );
    }

    #[test]
    fn login_requires_password() {
        let err = validate::<LoginRequest>(json!({ "username": "alice" })).unwrap_err();
        assert_eq!(message_of(err), "Password is required");
    }

    #[test]
    fn approval_coerces_numbers_and_unlimited() {
        let params = validate::<ApproveUserRequest>(json!({
            "groupId": "tier-1",
            "whitelisted": true,
            "allowedTradingAmountFrom": "",
            "allowedTradingAmountTo": "UNLIMITED",
            "adminFee": "2.5",
            "userProfit": null,
            "introducerFee": "abc"
        }))
        .unwrap();

        assert!(params.whitelisted);
        assert_eq!(params.trading.allowed_trading_amount_from, 0.0);
        assert_eq!(params.trading.allowed_trading_amount_to, TradingBound::Unlimited);
        assert_eq!(params.trading.admin_fee, 2.5);
        assert_eq!(params.trading.user_profit, 0.0);
        assert_eq!(params.trading.introducer_fee, 0.0);
    }

    #[test]
    fn approval_rejects_negatives_and_missing_group() {
        let err = validate::<ApproveUserRequest>(json!({
            "groupId": " ",
            "whitelisted": false,
            "allowedTradingAmountTo": "-1",
            "adminFee": -3
        }))
        .unwrap_err();

        assert_eq!(
            message_of(err),
            "Admin fee must be 0 or more, Maximum must be 0 or more, Group is required"
        );
    }

    #[test]
    fn missing_required_boolean_is_invalid_fields() {
        let err = validate::<ApproveUserRequest>(json!({ "groupId": "tier-1" })).unwrap_err();
        assert_eq!(message_of(err), INVALID_FIELDS);
    }

    #[test]
    fn non_object_payload_is_invalid_fields() {
        let err = validate::<LoginRequest>(json!("alice")).unwrap_err();
        assert_eq!(message_of(err), INVALID_FIELDS);
    }

    #[test]
    fn edit_keeps_every_field() {
        let edit = validate::<EditApprovedUserRequest>(json!({
            "firstname": "Alice",
            "lastname": "Doe",
            "phone": "+447911123456",
            "country": "GB",
            "metamask": "0xabc",
            "autotrade": "alice-auto",
            "email": "NEW@example.com",
            "approved": true,
            "whitelisted": false,
            "groupId": "tier-2",
            "allowedTradingAmountFrom": 10,
            "allowedTradingAmountTo": "5000",
            "adminFee": 1,
            "userProfit": 60,
            "introducerFee": 0
        }))
        .unwrap();

        assert_eq!(edit.email, "new@example.com");
        assert!(edit.approved);
        assert_eq!(edit.trading.group_id, "tier-2");
        assert_eq!(edit.trading.allowed_trading_amount_to, TradingBound::Amount(5000.0));
    }
}
