use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

/// Successful action outcome: `{"success": "<message>"}`
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ActionResponse {
    #[schema(example = "User approved successfully!")]
    pub success: String,
}

impl ActionResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: message.into(),
        }
    }
}

impl IntoResponse for ActionResponse {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Created response helper for POST endpoints that create a record
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_response_uses_success_key() {
        let json = serde_json::to_value(ActionResponse::new("User deleted successfully!")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": "User deleted successfully!" }));
    }

    #[test]
    fn created_sets_status() {
        let response = Created(ActionResponse::new("ok")).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
