//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion, and reach storage through the Unit of Work.

mod auth_service;
pub mod container;
pub mod invalidation;
pub mod lifecycle;
pub mod mailer;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{
    AuthService, Authenticator, Claims, LoginOutcome, TokenResponse, EMAIL_VERIFIED, LOGGED_IN,
    REGISTERED, VERIFICATION_RESENT,
};
pub use invalidation::{
    Invalidated, InvalidationBus, InvalidationSink, ViewCache, ViewGenerations, ViewInvalidation,
};
pub use lifecycle::{LifecycleManager, UserLifecycle};
pub use mailer::{JobMailer, Mailer};
