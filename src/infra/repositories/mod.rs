//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

pub(crate) mod entities;
mod token_repository;
mod user_repository;

pub use token_repository::{TokenRepository, TokenStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
