//! Trading Onboard - registration, admin review and approval of
//! trading-platform users.
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: command-line entry points
//! - **config**: environment configuration and constants
//! - **domain**: users, trading parameters and lifecycle transitions
//! - **validation**: raw form input to normalized transition inputs
//! - **policy**: role gate and page route access decisions
//! - **services**: identity provider, lifecycle manager, view invalidation
//! - **infra**: database, migrations, repositories and Redis
//! - **jobs**: queued verification emails
//! - **api**: HTTP handlers, middleware and routes
//! - **errors**: centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! trading-onboard serve
//! trading-onboard migrate up
//! trading-onboard admin promote alice
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod policy;
pub mod services;
pub mod types;
pub mod validation;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
pub use policy::AuthContext;
