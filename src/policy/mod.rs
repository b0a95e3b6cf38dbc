//! Access policy - the role gate for actions and the route table for pages.

pub mod gate;
pub mod routes;

pub use gate::{
    authorize, require, AuthContext, Authorization, ADMIN_REQUIRED, AUTHENTICATION_REQUIRED,
};
pub use routes::{RouteAccessPolicy, RouteDecision};
