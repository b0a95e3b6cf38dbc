//! Custom request extractors.

mod auth_context;
mod json_input;

pub use json_input::JsonInput;
