//! Raw JSON form extractor.
//!
//! Forms are validated by the service that consumes them, after its role
//! check, so the extractor only guarantees a JSON body. Anything else is
//! answered with the same message as a structurally invalid form.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::validation::INVALID_FIELDS;

/// Unvalidated JSON request body.
pub struct JsonInput(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonInput
where
    S: Send + Sync,
    Json<Value>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e.body_text(), "Rejected request body");
            AppError::validation(INVALID_FIELDS)
        })?;

        Ok(JsonInput(value))
    }
}
