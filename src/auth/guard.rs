//! Role-based access gating for protected views.
//!
//! A `RouteGuard` pairs a view with the set of roles allowed to see it. The
//! guard itself never navigates; it returns an `Access` decision and the
//! top-level router interprets denials as navigation intents. The decision
//! is a pure function of the session and the required-role set, so it is
//! recomputed on every session change rather than cached.

use super::session::Session;
use super::token::Role;

/// Where the router should send the user after a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    /// No usable session: show the login view.
    RequireLogin,
    /// Authenticated but the role does not qualify: show the unauthorized
    /// view, not login.
    RequireRole,
}

/// Outcome of evaluating a guard against the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Session still initializing: render a neutral waiting state, never
    /// protected or login content.
    Loading,
    Granted,
    DeniedUnauthenticated,
    DeniedWrongRole,
}

impl Access {
    pub fn nav_intent(&self) -> Option<NavIntent> {
        match self {
            Access::DeniedUnauthenticated => Some(NavIntent::RequireLogin),
            Access::DeniedWrongRole => Some(NavIntent::RequireRole),
            Access::Loading | Access::Granted => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    /// Roles allowed through; empty means any authenticated identity.
    required: Vec<Role>,
}

impl RouteGuard {
    pub fn any_authenticated() -> Self {
        Self { required: Vec::new() }
    }

    pub fn require(roles: &[Role]) -> Self {
        Self {
            required: roles.to_vec(),
        }
    }

    pub fn evaluate(&self, session: &Session) -> Access {
        if session.is_initializing() {
            return Access::Loading;
        }
        let identity = match session.identity() {
            Some(identity) => identity,
            None => return Access::DeniedUnauthenticated,
        };
        if !self.required.is_empty() && !self.required.contains(&identity.role) {
            return Access::DeniedWrongRole;
        }
        Access::Granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::CredentialStore;
    use crate::auth::token::test_tokens::make_token;
    use chrono::Utc;

    fn temp_store(name: &str) -> CredentialStore {
        let dir = std::env::temp_dir()
            .join("staydesk-test")
            .join(format!("guard-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        CredentialStore::new(dir)
    }

    fn logged_in_session(name: &str, role: &str) -> Session {
        let mut session = Session::new(temp_store(name));
        session.initialize();
        let token = make_token("user", "1", role, Utc::now().timestamp() + 3600);
        session.login(token).unwrap();
        session
    }

    #[test]
    fn initializing_session_yields_loading() {
        let session = Session::new(temp_store("loading"));
        let guard = RouteGuard::require(&[Role::Admin]);
        assert_eq!(guard.evaluate(&session), Access::Loading);
        assert_eq!(guard.evaluate(&session).nav_intent(), None);
    }

    #[test]
    fn matching_role_is_granted() {
        let session = logged_in_session("admin-ok", "admin");
        let guard = RouteGuard::require(&[Role::Admin]);
        assert_eq!(guard.evaluate(&session), Access::Granted);
    }

    #[test]
    fn wrong_role_redirects_to_unauthorized_not_login() {
        let session = logged_in_session("customer-denied", "customer");
        let guard = RouteGuard::require(&[Role::Admin]);

        let access = guard.evaluate(&session);
        assert_eq!(access, Access::DeniedWrongRole);
        assert_eq!(access.nav_intent(), Some(NavIntent::RequireRole));
    }

    #[test]
    fn unauthenticated_redirects_to_login() {
        let mut session = Session::new(temp_store("unauth"));
        session.initialize();

        let guard = RouteGuard::require(&[Role::Admin]);
        let access = guard.evaluate(&session);
        assert_eq!(access, Access::DeniedUnauthenticated);
        assert_eq!(access.nav_intent(), Some(NavIntent::RequireLogin));
    }

    #[test]
    fn empty_role_set_admits_any_authenticated_identity() {
        let guard = RouteGuard::any_authenticated();

        let session = logged_in_session("any-customer", "customer");
        assert_eq!(guard.evaluate(&session), Access::Granted);

        let mut anon = Session::new(temp_store("any-anon"));
        anon.initialize();
        assert_eq!(guard.evaluate(&anon), Access::DeniedUnauthenticated);
    }

    #[test]
    fn decision_follows_session_changes() {
        let mut session = logged_in_session("changes", "back-desk");
        let guard = RouteGuard::require(&[Role::FrontDesk, Role::BackDesk, Role::Admin]);
        assert_eq!(guard.evaluate(&session), Access::Granted);

        session.logout();
        assert_eq!(guard.evaluate(&session), Access::DeniedUnauthenticated);
    }
}
