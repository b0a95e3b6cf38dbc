//! Page navigation policy.
//!
//! Paths fall into four classes: public, auth-only (login/register pages,
//! pointless once signed in), admin-only, and protected (everything else).

use crate::config::{
    ADMIN_ROUTES, API_AUTH_PREFIX, ASSET_PREFIXES, AUTH_ROUTES, DEFAULT_LOGIN_REDIRECT,
    LOGIN_ROUTE, PUBLIC_ROUTES,
};
use crate::domain::UserRole;

/// What to do with a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    PassThrough,
    Redirect(String),
}

/// Route membership table.
#[derive(Debug, Clone)]
pub struct RouteAccessPolicy {
    pub public_routes: Vec<String>,
    pub auth_routes: Vec<String>,
    pub admin_routes: Vec<String>,
    pub api_auth_prefix: String,
    pub asset_prefixes: Vec<String>,
    pub default_login_redirect: String,
    pub login_route: String,
}

impl Default for RouteAccessPolicy {
    fn default() -> Self {
        let owned = |routes: &[&str]| routes.iter().map(|r| r.to_string()).collect();
        Self {
            public_routes: owned(PUBLIC_ROUTES),
            auth_routes: owned(AUTH_ROUTES),
            admin_routes: owned(ADMIN_ROUTES),
            api_auth_prefix: API_AUTH_PREFIX.to_string(),
            asset_prefixes: owned(ASSET_PREFIXES),
            default_login_redirect: DEFAULT_LOGIN_REDIRECT.to_string(),
            login_route: LOGIN_ROUTE.to_string(),
        }
    }
}

impl RouteAccessPolicy {
    fn is_asset(&self, path: &str) -> bool {
        path.contains('.') || self.asset_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// `path` is the identity provider prefix or lies below it.
    fn is_api_auth(&self, path: &str) -> bool {
        match path.strip_prefix(self.api_auth_prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    fn contains(routes: &[String], path: &str) -> bool {
        routes.iter().any(|r| r == path)
    }

    /// Evaluate the decision table for `path`. `session` is the signed-in
    /// role, or `None` for a guest.
    pub fn decide(&self, path: &str, session: Option<UserRole>) -> RouteDecision {
        if self.is_asset(path) || self.is_api_auth(path) {
            return RouteDecision::PassThrough;
        }

        if Self::contains(&self.auth_routes, path) {
            return match session {
                Some(_) => RouteDecision::Redirect(self.default_login_redirect.clone()),
                None => RouteDecision::PassThrough,
            };
        }

        if Self::contains(&self.admin_routes, path) && session != Some(UserRole::Admin) {
            return RouteDecision::Redirect(self.default_login_redirect.clone());
        }

        if session.is_none() && !Self::contains(&self.public_routes, path) {
            return RouteDecision::Redirect(self.login_route.clone());
        }

        RouteDecision::PassThrough
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect(to: &str) -> RouteDecision {
        RouteDecision::Redirect(to.to_string())
    }

    #[test]
    fn api_auth_prefix_matches_whole_segments() {
        let policy = RouteAccessPolicy::default();

        assert_eq!(policy.decide("/api/auth", None), RouteDecision::PassThrough);
        assert_eq!(policy.decide("/api/auth/login", None), RouteDecision::PassThrough);
        assert_eq!(policy.decide("/api/authx", None), redirect("/auth/login"));
        assert_eq!(policy.decide("/api/authority/users", None), redirect("/auth/login"));
    }

    #[test]
    fn admin_pages_require_admin_role() {
        let policy = RouteAccessPolicy::default();

        assert_eq!(
            policy.decide("/admin/waitinglist", Some(UserRole::User)),
            redirect("/settings")
        );
        assert_eq!(
            policy.decide("/admin/waitinglist", Some(UserRole::Admin)),
            RouteDecision::PassThrough
        );
        // Guests are sent to the default destination, which then bounces them to login.
        assert_eq!(policy.decide("/admin/approveduser", None), redirect("/settings"));
    }

    #[test]
    fn auth_pages_bounce_signed_in_users() {
        let policy = RouteAccessPolicy::default();

        assert_eq!(
            policy.decide("/auth/login", Some(UserRole::User)),
            redirect("/settings")
        );
        assert_eq!(policy.decide("/auth/register", None), RouteDecision::PassThrough);
    }

    #[test]
    fn protected_pages_require_a_session() {
        let policy = RouteAccessPolicy::default();

        assert_eq!(policy.decide("/settings", None), redirect("/auth/login"));
        assert_eq!(
            policy.decide("/settings", Some(UserRole::User)),
            RouteDecision::PassThrough
        );
        assert_eq!(policy.decide("/", None), RouteDecision::PassThrough);
        assert_eq!(
            policy.decide("/auth/new-verification", None),
            RouteDecision::PassThrough
        );
    }

    #[test]
    fn assets_and_auth_api_always_pass() {
        let policy = RouteAccessPolicy::default();

        assert_eq!(policy.decide("/_next/chunk", None), RouteDecision::PassThrough);
        assert_eq!(policy.decide("/favicon.ico", None), RouteDecision::PassThrough);
        assert_eq!(policy.decide("/static/logo", None), RouteDecision::PassThrough);
        assert_eq!(policy.decide("/api/auth/login", None), RouteDecision::PassThrough);
        assert_eq!(policy.decide("/api/me", None), redirect("/auth/login"));
    }
}
