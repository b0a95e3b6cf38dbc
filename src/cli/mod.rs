//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `jobs` - Email queue worker and maintenance
//! - `admin` - Role management for existing accounts

pub mod args;

pub use args::{Cli, Commands};
