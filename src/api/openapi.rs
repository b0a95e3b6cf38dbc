//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{admin_handler, auth_handler, user_handler};
use crate::domain::{UserResponse, UserRole};
use crate::services::TokenResponse;
use crate::types::ActionResponse;
use crate::validation::{ApproveUserRequest, EditApprovedUserRequest, LoginRequest, RegisterRequest};

/// OpenAPI documentation for the onboarding service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Trading Onboard",
        version = "0.1.0",
        description = "Registration, admin review and approval of trading-platform users"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::verify_email,
        // Signed-in user
        user_handler::get_current_user,
        // Admin endpoints
        admin_handler::approve_user,
        admin_handler::delete_user,
        admin_handler::edit_user,
        admin_handler::list_pending,
        admin_handler::list_approved,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            // Forms
            RegisterRequest,
            LoginRequest,
            ApproveUserRequest,
            EditApprovedUserRequest,
            auth_handler::VerifyEmailRequest,
            // Responses
            ActionResponse,
            TokenResponse,
            auth_handler::LoginResponse,
            admin_handler::EditUserResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and email verification"),
        (name = "Users", description = "Signed-in user"),
        (name = "Admin", description = "Review, approval and management of users")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_admin_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/api/admin/users/{id}/approve"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/auth/login"));
    }
}
