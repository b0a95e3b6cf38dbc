//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories (PostgreSQL)
//! - Cache and rate-limit counters (Redis)
//! - Unit of Work grouping the repositories

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{TokenRepository, TokenStore, UserRepository, UserStore};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(test)]
pub use repositories::{MockTokenRepository, MockUserRepository};
