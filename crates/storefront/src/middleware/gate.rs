//! Access gate for protected route prefixes.
//!
//! The decision itself is a pure function of the request path and the
//! visitor's role, so the policy can be tested without a running server.
//! `enforce_access` applies it as axum middleware.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use mercadito_core::Role;

use crate::models::{CurrentUser, session_keys};

/// Prefixes that require the admin role.
const ADMIN_PREFIXES: &[&str] = &["/admin", "/logs"];

/// Prefixes that require any signed-in user.
const AUTH_PREFIXES: &[&str] = &["/dashboard", "/profile"];

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No signed-in user on a protected path.
    NoSession,
    /// Signed in, but the path needs the admin role.
    InsufficientPermissions,
}

/// Outcome of the gate policy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Decide whether a visitor with the given role may see the given path.
///
/// Unprotected paths are always allowed, whatever the role.
#[must_use]
pub fn check(path: &str, role: Option<Role>) -> Decision {
    if matches_prefix(path, ADMIN_PREFIXES) {
        return match role {
            None => Decision::Deny(DenyReason::NoSession),
            Some(Role::Admin) => Decision::Allow,
            Some(Role::User) => Decision::Deny(DenyReason::InsufficientPermissions),
        };
    }

    if matches_prefix(path, AUTH_PREFIXES) {
        return match role {
            None => Decision::Deny(DenyReason::NoSession),
            Some(_) => Decision::Allow,
        };
    }

    Decision::Allow
}

/// Prefix match on path segment boundaries, so `/logsome` is not `/logs`.
fn matches_prefix(path: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Apply the gate policy as middleware.
///
/// Denied visitors are redirected: to the login page when there is no
/// session, or to the denied page when the role is insufficient.
pub async fn enforce_access(session: Session, request: Request, next: Next) -> Response {
    let role = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .map(|user| user.role);

    match check(request.uri().path(), role) {
        Decision::Allow => next.run(request).await,
        Decision::Deny(DenyReason::NoSession) => Redirect::to("/auth/login").into_response(),
        Decision::Deny(DenyReason::InsufficientPermissions) => {
            Redirect::to("/denied?type=insufficient_permissions").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_paths_require_admin() {
        assert_eq!(check("/admin", Some(Role::Admin)), Decision::Allow);
        assert_eq!(check("/admin/logs", Some(Role::Admin)), Decision::Allow);
        assert_eq!(check("/logs", Some(Role::Admin)), Decision::Allow);
        assert_eq!(
            check("/admin", Some(Role::User)),
            Decision::Deny(DenyReason::InsufficientPermissions)
        );
        assert_eq!(
            check("/logs", Some(Role::User)),
            Decision::Deny(DenyReason::InsufficientPermissions)
        );
    }

    #[test]
    fn test_admin_paths_without_session() {
        assert_eq!(check("/admin", None), Decision::Deny(DenyReason::NoSession));
        assert_eq!(check("/logs", None), Decision::Deny(DenyReason::NoSession));
    }

    #[test]
    fn test_auth_paths_allow_any_signed_in_role() {
        assert_eq!(check("/dashboard", Some(Role::User)), Decision::Allow);
        assert_eq!(check("/dashboard", Some(Role::Admin)), Decision::Allow);
        assert_eq!(check("/profile", Some(Role::User)), Decision::Allow);
        assert_eq!(
            check("/dashboard", None),
            Decision::Deny(DenyReason::NoSession)
        );
        assert_eq!(
            check("/profile", None),
            Decision::Deny(DenyReason::NoSession)
        );
    }

    #[test]
    fn test_public_paths_always_allowed() {
        assert_eq!(check("/", None), Decision::Allow);
        assert_eq!(check("/products", None), Decision::Allow);
        assert_eq!(check("/cart", Some(Role::User)), Decision::Allow);
        assert_eq!(check("/orders", None), Decision::Allow);
    }

    #[test]
    fn test_prefix_matches_segment_boundaries_only() {
        assert_eq!(check("/logsome", None), Decision::Allow);
        assert_eq!(check("/administrator", None), Decision::Allow);
        assert_eq!(check("/logs/", None), Decision::Deny(DenyReason::NoSession));
    }
}
