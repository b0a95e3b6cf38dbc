//! Service Container - Centralized service access.
//!
//! Handlers reach every service through this container, so tests can
//! build one from fakes without a database.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, InvalidationSink, LifecycleManager, Mailer, UserLifecycle,
};
use crate::config::Config;
use crate::infra::Persistence;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user lifecycle service
    fn lifecycle(&self) -> Arc<dyn UserLifecycle>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    lifecycle_service: Arc<dyn UserLifecycle>,
}

impl Services {
    /// Create a service container from already-built services
    pub fn new(auth_service: Arc<dyn AuthService>, lifecycle_service: Arc<dyn UserLifecycle>) -> Self {
        Self {
            auth_service,
            lifecycle_service,
        }
    }

    /// Wire the production services over a database connection
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        mailer: Arc<dyn Mailer>,
        sink: Arc<dyn InvalidationSink>,
        config: Config,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let auth_service = Arc::new(Authenticator::new(uow.clone(), mailer, config));
        let lifecycle_service = Arc::new(LifecycleManager::new(uow, sink));

        Self {
            auth_service,
            lifecycle_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn lifecycle(&self) -> Arc<dyn UserLifecycle> {
        self.lifecycle_service.clone()
    }
}
