//! Session lifecycle management.
//!
//! `Session` owns the authenticated/unauthenticated state transition. It is
//! constructed once at startup, initialized from the credential store before
//! any consumer reads it, and handed by reference to the route guard and the
//! rest of the application. There is no ambient global session.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::store::CredentialStore;
use super::token::{self, Identity, TokenError};

pub struct Session {
    store: CredentialStore,
    token: Option<String>,
    identity: Option<Identity>,
    expires_at: Option<DateTime<Utc>>,
    initializing: bool,
}

impl Session {
    /// Create a session in the initializing state. Consumers must not make
    /// access decisions until `initialize` has run.
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            token: None,
            identity: None,
            expires_at: None,
            initializing: true,
        }
    }

    /// One-time startup check of the persisted token. Runs before the UI
    /// loop starts and always leaves the session out of the initializing
    /// state, whatever the outcome.
    pub fn initialize(&mut self) {
        match self.store.load() {
            Ok(Some(stored)) => match self.adopt_token(stored) {
                Ok(identity) => {
                    info!(user = %identity.username, "Session restored from stored token");
                }
                Err(e) => {
                    debug!(reason = %e, "Stored token rejected, clearing");
                    self.discard();
                }
            },
            Ok(None) => {
                debug!("No stored token");
            }
            Err(e) => {
                warn!(error = %e, "Failed to read token store");
            }
        }
        self.initializing = false;
    }

    /// Accept a freshly issued token. On success the token is persisted and
    /// the new identity published. On failure the store is cleared and the
    /// session stays unauthenticated; the error tells the caller why.
    pub fn login(&mut self, token: String) -> Result<Identity, TokenError> {
        match self.adopt_token(token) {
            Ok(identity) => {
                if let Some(ref token) = self.token {
                    if let Err(e) = self.store.save(token) {
                        warn!(error = %e, "Failed to persist token");
                    }
                }
                info!(user = %identity.username, role = %identity.role, "Login accepted");
                Ok(identity)
            }
            Err(e) => {
                warn!(reason = %e, "Issued token failed validation");
                self.discard();
                Err(e)
            }
        }
    }

    /// End the session. This is the single forced-termination path and is
    /// idempotent: calling it while already logged out changes nothing.
    pub fn logout(&mut self) {
        if self.identity.is_some() || self.token.is_some() {
            info!("Session terminated");
        }
        self.discard();
    }

    /// True while the token is present and its expiry was in the future at
    /// the last check. Expiry is also detected lazily here, so a session
    /// that outlives its token reads as unauthenticated without waiting for
    /// a server rejection.
    pub fn is_authenticated(&self) -> bool {
        match (self.identity.as_ref(), self.expires_at) {
            (Some(_), Some(expiry)) => expiry > Utc::now(),
            _ => false,
        }
    }

    /// Detect in-memory expiry and tear the session down if the token's
    /// time bound has passed. Returns true if the session was cleared.
    pub fn expire_if_due(&mut self) -> bool {
        if self.identity.is_some() && !self.is_authenticated() {
            info!("Token expired, ending session");
            self.discard();
            true
        } else {
            false
        }
    }

    pub fn is_initializing(&self) -> bool {
        self.initializing
    }

    pub fn identity(&self) -> Option<&Identity> {
        if self.is_authenticated() {
            self.identity.as_ref()
        } else {
            None
        }
    }

    /// The raw bearer token for outgoing requests, present only while
    /// authenticated.
    pub fn token(&self) -> Option<&str> {
        if self.is_authenticated() {
            self.token.as_deref()
        } else {
            None
        }
    }

    /// Validate and install a token. Identity and expiry are derived
    /// together so they can never disagree with the stored token.
    fn adopt_token(&mut self, token: String) -> Result<Identity, TokenError> {
        let identity = token::validate(&token, Utc::now())?;
        let claims = token::decode_claims(&token)?;

        self.expires_at = claims.expires_at();
        self.identity = Some(identity.clone());
        self.token = Some(token);
        Ok(identity)
    }

    /// Drop all session state and the stored token.
    fn discard(&mut self) {
        self.token = None;
        self.identity = None;
        self.expires_at = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear token store");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::test_tokens::make_token;
    use crate::auth::token::Role;

    fn temp_store(name: &str) -> CredentialStore {
        let dir = std::env::temp_dir()
            .join("staydesk-test")
            .join(format!("session-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        CredentialStore::new(dir)
    }

    fn future_token(sub: &str, role: &str) -> String {
        make_token(
            sub,
            "64f0a1b2c3d4e5f6a7b8c9d0",
            role,
            Utc::now().timestamp() + 3600,
        )
    }

    #[test]
    fn starts_initializing_and_settles_after_initialize() {
        let mut session = Session::new(temp_store("init"));
        assert!(session.is_initializing());
        assert!(!session.is_authenticated());

        session.initialize();
        assert!(!session.is_initializing());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn initialize_restores_valid_stored_token() {
        let store = temp_store("restore");
        let token = future_token("admin1", "admin");
        store.save(&token).unwrap();

        let mut session = Session::new(store);
        session.initialize();

        assert!(session.is_authenticated());
        let identity = session.identity().unwrap();
        assert_eq!(identity.username, "admin1");
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(session.token(), Some(token.as_str()));
    }

    #[test]
    fn initialize_clears_expired_stored_token() {
        let dir = std::env::temp_dir()
            .join("staydesk-test")
            .join(format!("session-expired-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let store = CredentialStore::new(dir.clone());
        let token = make_token("admin1", "1", "admin", Utc::now().timestamp() - 60);
        store.save(&token).unwrap();

        let mut session = Session::new(store);
        session.initialize();

        assert!(!session.is_initializing());
        assert!(!session.is_authenticated());
        assert_eq!(session.identity(), None);

        // The dead token was removed from disk, not left behind
        let reopened = CredentialStore::new(dir);
        assert_eq!(reopened.load().unwrap(), None);
    }

    #[test]
    fn initialize_clears_malformed_stored_token() {
        let store = temp_store("malformed");
        store.save("garbage").unwrap();

        let mut session = Session::new(store);
        session.initialize();

        assert!(!session.is_authenticated());
    }

    #[test]
    fn login_publishes_identity_and_persists() {
        let mut session = Session::new(temp_store("login"));
        session.initialize();

        let token = future_token("frontdesk1", "front-desk");
        let identity = session.login(token.clone()).unwrap();
        assert_eq!(identity.role, Role::FrontDesk);

        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some(token.as_str()));
    }

    #[test]
    fn login_rejects_expired_token_distinctly() {
        let mut session = Session::new(temp_store("login-expired"));
        session.initialize();

        let dead = make_token("x", "1", "customer", Utc::now().timestamp() - 10);
        assert_eq!(session.login(dead), Err(TokenError::Expired));
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn new_login_overwrites_previous_identity() {
        let mut session = Session::new(temp_store("overwrite"));
        session.initialize();

        session.login(future_token("first", "customer")).unwrap();
        session.login(future_token("second", "admin")).unwrap();

        let identity = session.identity().unwrap();
        assert_eq!(identity.username, "second");
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn logout_is_idempotent() {
        let mut session = Session::new(temp_store("logout"));
        session.initialize();
        session.login(future_token("admin1", "admin")).unwrap();

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.identity(), None);

        // Second logout is a no-op, not an error
        session.logout();
        assert!(!session.is_authenticated());
    }
}
