//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use super::middleware::SessionState;
use crate::infra::{Cache, Database};
use crate::policy::RouteAccessPolicy;
use crate::services::{AuthService, ServiceContainer, Services, UserLifecycle, ViewCache};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Identity provider
    pub auth_service: Arc<dyn AuthService>,
    /// Admin lifecycle operations
    pub lifecycle: Arc<dyn UserLifecycle>,
    /// Cached admin views
    pub views: ViewCache,
    /// Redis cache (rate limits)
    pub cache: Arc<Cache>,
    /// Database connection
    pub database: Arc<Database>,
    /// Page route table
    pub policy: Arc<RouteAccessPolicy>,
}

impl AppState {
    /// Create application state from a wired service container.
    pub fn new(
        services: &Services,
        database: Arc<Database>,
        cache: Arc<Cache>,
        views: ViewCache,
        policy: RouteAccessPolicy,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            lifecycle: services.lifecycle(),
            views,
            cache,
            database,
            policy: Arc::new(policy),
        }
    }

    /// State for the session and route guard middleware.
    pub fn session(&self) -> SessionState {
        SessionState {
            auth: self.auth_service.clone(),
            policy: self.policy.clone(),
        }
    }
}
