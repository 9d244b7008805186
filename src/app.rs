//! Application state management for staydesk.
//!
//! The `App` struct owns the session, the API client, UI state, and the
//! fetched resource data. It is also the top-level router: every tick it
//! re-evaluates the current tab's route guard against the session and
//! interprets denials as navigation (show login, show unauthorized). No
//! other layer navigates.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{Access, CredentialStore, NavIntent, Role, RouteGuard, Session};
use crate::config::Config;
use crate::models::{HotelBooking, HotelRoom, RoomStatus, UserAccount, UserUpdate};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs. Each tab names the roles allowed to view it; the
/// same rules are enforced server-side, so this gating is a navigation
/// convenience, not the security boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Rooms,
    Bookings,
    Users,
    Profile,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Rooms => "Rooms",
            Tab::Bookings => "Bookings",
            Tab::Users => "Users",
            Tab::Profile => "Profile",
        }
    }

    /// Roles allowed to open this tab.
    pub fn guard(&self) -> RouteGuard {
        match self {
            Tab::Rooms | Tab::Profile => RouteGuard::any_authenticated(),
            Tab::Bookings => RouteGuard::require(&[Role::Admin, Role::FrontDesk, Role::BackDesk]),
            Tab::Users => RouteGuard::require(&[Role::Admin]),
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Rooms => Tab::Bookings,
            Tab::Bookings => Tab::Users,
            Tab::Users => Tab::Profile,
            Tab::Profile => Tab::Rooms,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Rooms => Tab::Profile,
            Tab::Bookings => Tab::Rooms,
            Tab::Users => Tab::Bookings,
            Tab::Profile => Tab::Users,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    LoggingIn,
    Unauthorized,
    ChangingPassword,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Check whether another character fits the username field
pub fn can_add_username_char(current: &str) -> bool {
    current.len() < MAX_USERNAME_LENGTH
}

/// Check whether another character fits a password field
pub fn can_add_password_char(current: &str) -> bool {
    current.len() < MAX_PASSWORD_LENGTH
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from background fetch tasks back to the main loop.
enum RefreshResult {
    Rooms(Vec<HotelRoom>),
    Bookings(Vec<HotelBooking>),
    Users(Vec<UserAccount>),
    Profile(UserAccount),
    RoomUpdated(HotelRoom),
    RefreshComplete,
    Failed(ApiError),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    pub status_message: Option<String>,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Password change form state
    pub new_password: String,
    pub password_error: Option<String>,

    // Selection indices
    pub rooms_selection: usize,
    pub bookings_selection: usize,
    pub users_selection: usize,

    // Fetched data
    pub rooms: Vec<HotelRoom>,
    pub bookings: Vec<HotelBooking>,
    pub users: Vec<UserAccount>,
    pub profile: Option<UserAccount>,

    // Background task channel
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,
}

impl App {
    /// Create the application: load config, restore and settle the session
    /// from the store, and wire the API client. The session is fully
    /// initialized here, before the first frame, so no consumer ever acts
    /// on an initializing session.
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let store = CredentialStore::new(config.data_dir()?);
        let mut session = Session::new(store);
        session.initialize();

        let mut api = ApiClient::new(config.api_base_url.clone())?;
        if let Some(token) = session.token() {
            api.set_token(token.to_string());
            debug!("Token set on API client");
        }

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_username = std::env::var("STAYDESK_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_password = std::env::var("STAYDESK_PASSWORD").unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,

            state: AppState::Normal,
            current_tab: Tab::Rooms,
            status_message: None,

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,

            new_password: String::new(),
            password_error: None,

            rooms_selection: 0,
            bookings_selection: 0,
            users_selection: 0,

            rooms: Vec::new(),
            bookings: Vec::new(),
            users: Vec::new(),
            profile: None,

            refresh_rx: rx,
            refresh_tx: tx,
        })
    }

    // =========================================================================
    // Routing
    // =========================================================================

    /// Re-evaluate access for the current tab and interpret the guard's
    /// decision. Runs every tick so session changes (login, logout, lazy
    /// expiry) take effect immediately rather than being cached.
    pub fn resolve_route(&mut self) {
        if self.session.expire_if_due() {
            self.api.clear_token();
            self.status_message = Some("Session expired. Please log in again.".to_string());
        }

        if !matches!(self.state, AppState::Normal | AppState::Unauthorized) {
            return;
        }

        let access = self.current_tab.guard().evaluate(&self.session);
        match access.nav_intent() {
            Some(NavIntent::RequireLogin) => self.start_login(),
            Some(NavIntent::RequireRole) => self.state = AppState::Unauthorized,
            None => {
                // Granted (or still loading): leave the unauthorized view if
                // access has been regained
                if access == Access::Granted && matches!(self.state, AppState::Unauthorized) {
                    self.state = AppState::Normal;
                }
            }
        }
    }

    /// Switch tabs. Access is resolved on the next tick.
    pub fn select_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        if matches!(self.state, AppState::Unauthorized) {
            self.state = AppState::Normal;
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Show the login overlay
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form.
    ///
    /// Issuance failures surface on the form and leave any existing session
    /// untouched; only a successfully issued and validated token changes
    /// session state.
    pub async fn attempt_login(&mut self) -> Result<()> {
        let username = self.login_username.clone();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }

        self.login_error = None;

        let token = match self.api.login(&username, &password).await {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "Token issuance failed");
                let user_message = match &e {
                    ApiError::InvalidCredentials(_) => "Invalid username or password".to_string(),
                    ApiError::MalformedIssuance => {
                        "Server returned a malformed login response".to_string()
                    }
                    ApiError::NetworkError(_) => {
                        "Unable to connect to server. Check your connection.".to_string()
                    }
                    other => format!("Login failed: {}", other),
                };
                self.login_error = Some(user_message);
                return Err(e.into());
            }
        };

        match self.session.login(token) {
            Ok(identity) => {
                self.api.set_token(
                    self.session
                        .token()
                        .unwrap_or_default()
                        .to_string(),
                );

                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                self.status_message = Some(format!("Signed in as {}", identity.username));
                self.refresh_all_background(identity.role);
                Ok(())
            }
            Err(e) => {
                warn!(reason = %e, "Issued token rejected");
                self.login_error = Some("Server issued an unusable token".to_string());
                Err(e.into())
            }
        }
    }

    /// User-initiated logout: clear everything and go to the login view.
    pub fn logout(&mut self) {
        self.session.logout();
        self.api.clear_token();
        self.clear_protected_data();
        self.start_login();
    }

    /// Forced termination after the server rejected the token mid-session.
    /// Converges to the same state as logout; the request is never retried
    /// with the old token because the token is gone.
    fn force_logout(&mut self) {
        info!("Server rejected token, forcing logout");
        self.session.logout();
        self.api.clear_token();
        self.clear_protected_data();
        self.status_message = Some("Session expired. Please log in again.".to_string());
        self.start_login();
    }

    fn clear_protected_data(&mut self) {
        self.rooms.clear();
        self.bookings.clear();
        self.users.clear();
        self.profile = None;
        self.rooms_selection = 0;
        self.bookings_selection = 0;
        self.users_selection = 0;
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task fetching every resource the current role may
    /// see. Results come back through the channel and are applied in
    /// `check_background_tasks`.
    pub fn refresh_all_background(&mut self, role: Role) {
        let token = match self.session.token() {
            Some(t) => t.to_string(),
            None => {
                warn!("No token available for refresh");
                return;
            }
        };

        let api = self.api.with_token(token);
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            Self::execute_background_refresh(tx, api, role).await;
        });

        self.status_message = Some("Refreshing data...".to_string());
    }

    /// Refresh using the current session's role, if authenticated.
    pub fn refresh_current(&mut self) {
        if let Some(role) = self.session.identity().map(|i| i.role) {
            self.refresh_all_background(role);
        }
    }

    async fn execute_background_refresh(
        tx: mpsc::Sender<RefreshResult>,
        api: ApiClient,
        role: Role,
    ) {
        info!("Background refresh started");

        let staff = matches!(role, Role::Admin | Role::FrontDesk | Role::BackDesk);

        let rooms = api.fetch_rooms().await;
        Self::send_fetch_result(&tx, "Rooms", rooms, RefreshResult::Rooms).await;

        let profile = api.fetch_me().await;
        Self::send_fetch_result(&tx, "Profile", profile, RefreshResult::Profile).await;

        if staff {
            let bookings = api.fetch_bookings().await;
            Self::send_fetch_result(&tx, "Bookings", bookings, RefreshResult::Bookings).await;
        }

        if matches!(role, Role::Admin) {
            let users = api.fetch_users().await;
            Self::send_fetch_result(&tx, "Users", users, RefreshResult::Users).await;
        }

        info!("Background refresh complete");
        Self::send_result(&tx, RefreshResult::RefreshComplete).await;
    }

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    async fn send_fetch_result<T, F>(
        tx: &mpsc::Sender<RefreshResult>,
        name: &str,
        result: Result<T, ApiError>,
        wrapper: F,
    ) where
        F: FnOnce(T) -> RefreshResult,
    {
        match result {
            Ok(data) => {
                debug!("{} fetched successfully", name);
                Self::send_result(tx, wrapper(data)).await;
            }
            Err(e) => {
                error!(error = %e, "{} fetch failed", name);
                Self::send_result(tx, RefreshResult::Failed(e)).await;
            }
        }
    }

    /// Drain and apply completed background task results.
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.refresh_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_refresh_result(result);
        }
    }

    /// Apply a single background result. A stale success arriving after
    /// logout is dropped: responses may outlive the session but must never
    /// resurrect a cleared one.
    fn process_refresh_result(&mut self, result: RefreshResult) {
        if let RefreshResult::Failed(e) = &result {
            if e.forces_logout() {
                self.force_logout();
                return;
            }
        }

        if !self.session.is_authenticated() {
            debug!("Dropping background result for ended session");
            return;
        }

        match result {
            RefreshResult::Rooms(data) => {
                self.rooms = data;
                self.rooms_selection = self.rooms_selection.min(self.rooms.len().saturating_sub(1));
            }
            RefreshResult::Bookings(data) => {
                self.bookings = data;
                self.bookings_selection = self
                    .bookings_selection
                    .min(self.bookings.len().saturating_sub(1));
            }
            RefreshResult::Users(data) => {
                self.users = data;
                self.users_selection = self.users_selection.min(self.users.len().saturating_sub(1));
            }
            RefreshResult::Profile(data) => {
                self.profile = Some(data);
            }
            RefreshResult::RoomUpdated(room) => {
                if let Some(existing) = self.rooms.iter_mut().find(|r| r.id == room.id) {
                    *existing = room;
                }
                self.status_message = Some("Room updated".to_string());
            }
            RefreshResult::RefreshComplete => {
                if let Some(ref msg) = self.status_message {
                    if msg == "Refreshing data..." {
                        self.status_message = None;
                    }
                }
            }
            RefreshResult::Failed(e) => {
                // Non-auth failures pass through as a status message; the
                // session is untouched (a network blip must not log the
                // user out).
                self.status_message = Some(format!("Error: {}", e));
            }
        }
    }

    // =========================================================================
    // Resource actions
    // =========================================================================

    /// Cycle the selected room's status (available -> maintenance ->
    /// available). Admin only; other roles never see the keybinding, and
    /// the server rejects them regardless.
    pub fn toggle_room_maintenance(&mut self) {
        let Some(room) = self.rooms.get(self.rooms_selection) else {
            return;
        };
        let mut updated = room.clone();
        updated.status = match updated.status {
            RoomStatus::Maintenance => RoomStatus::Available,
            _ => RoomStatus::Maintenance,
        };

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match api.update_room(&updated).await {
                Ok(room) => Self::send_result(&tx, RefreshResult::RoomUpdated(room)).await,
                Err(e) => Self::send_result(&tx, RefreshResult::Failed(e)).await,
            }
        });
    }

    /// Start the change-password overlay from the Profile tab.
    pub fn start_password_change(&mut self) {
        self.state = AppState::ChangingPassword;
        self.new_password.clear();
        self.password_error = None;
    }

    /// Submit the new password for the current profile.
    pub async fn submit_password_change(&mut self) -> Result<()> {
        if self.new_password.is_empty() {
            self.password_error = Some("Password must not be empty".to_string());
            return Ok(());
        }

        let user_id = match self.profile.as_ref().and_then(|p| p.id.clone()) {
            Some(id) => id,
            None => {
                self.password_error = Some("Profile not loaded yet".to_string());
                return Ok(());
            }
        };

        let update = UserUpdate {
            password: Some(self.new_password.clone()),
            ..Default::default()
        };

        match self.api.update_user(&user_id, &update).await {
            Ok(_) => {
                self.new_password.clear();
                self.state = AppState::Normal;
                self.status_message = Some("Password changed".to_string());
                Ok(())
            }
            Err(e) if e.forces_logout() => {
                self.new_password.clear();
                self.force_logout();
                Ok(())
            }
            Err(e) => {
                self.password_error = Some(format!("Change failed: {}", e));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::test_tokens::make_token;
    use chrono::Utc;

    fn temp_store(name: &str) -> CredentialStore {
        let dir = std::env::temp_dir()
            .join("staydesk-test")
            .join(format!("app-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        CredentialStore::new(dir)
    }

    fn session_with_role(name: &str, role: &str) -> Session {
        let mut session = Session::new(temp_store(name));
        session.initialize();
        let token = make_token("user", "1", role, Utc::now().timestamp() + 3600);
        session.login(token).unwrap();
        session
    }

    fn app_with_session(session: Session) -> App {
        let token = session.token().map(str::to_string);
        let mut api = ApiClient::new("http://localhost:8000".to_string()).unwrap();
        if let Some(token) = token {
            api.set_token(token);
        }
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        App {
            config: Config::default(),
            session,
            api,
            state: AppState::Normal,
            current_tab: Tab::Rooms,
            status_message: None,
            login_username: String::new(),
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_error: None,
            new_password: String::new(),
            password_error: None,
            rooms_selection: 0,
            bookings_selection: 0,
            users_selection: 0,
            rooms: Vec::new(),
            bookings: Vec::new(),
            users: Vec::new(),
            profile: None,
            refresh_rx: rx,
            refresh_tx: tx,
        }
    }

    fn sample_room() -> HotelRoom {
        serde_json::from_str(
            r#"{"id":"r1","room_number":"101","type":"Deluxe",
                "price":100.0,"status":"available","image_url":null}"#,
        )
        .unwrap()
    }

    #[test]
    fn tab_cycling_wraps() {
        assert_eq!(Tab::Rooms.next(), Tab::Bookings);
        assert_eq!(Tab::Profile.next(), Tab::Rooms);
        assert_eq!(Tab::Rooms.prev(), Tab::Profile);

        let mut tab = Tab::Rooms;
        for _ in 0..4 {
            tab = tab.next();
        }
        assert_eq!(tab, Tab::Rooms);
    }

    #[test]
    fn users_tab_admits_only_admins() {
        let admin = session_with_role("users-admin", "admin");
        assert_eq!(Tab::Users.guard().evaluate(&admin), Access::Granted);

        let desk = session_with_role("users-desk", "front-desk");
        assert_eq!(Tab::Users.guard().evaluate(&desk), Access::DeniedWrongRole);
    }

    #[test]
    fn bookings_tab_admits_staff_but_not_customers() {
        for (name, role) in [
            ("bk-admin", "admin"),
            ("bk-front", "front-desk"),
            ("bk-back", "back-desk"),
        ] {
            let session = session_with_role(name, role);
            assert_eq!(Tab::Bookings.guard().evaluate(&session), Access::Granted);
        }

        let customer = session_with_role("bk-customer", "customer");
        assert_eq!(
            Tab::Bookings.guard().evaluate(&customer),
            Access::DeniedWrongRole
        );
    }

    #[test]
    fn rooms_and_profile_admit_any_authenticated_role() {
        let customer = session_with_role("any-customer", "customer");
        assert_eq!(Tab::Rooms.guard().evaluate(&customer), Access::Granted);
        assert_eq!(Tab::Profile.guard().evaluate(&customer), Access::Granted);
    }

    #[test]
    fn resource_401_forces_logout_and_clears_everything() {
        let dir = std::env::temp_dir()
            .join("staydesk-test")
            .join(format!("app-force-logout-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let mut session = Session::new(CredentialStore::new(dir.clone()));
        session.initialize();
        let token = make_token("admin1", "1", "admin", Utc::now().timestamp() + 3600);
        session.login(token).unwrap();

        let mut app = app_with_session(session);
        app.rooms = vec![sample_room()];

        app.process_refresh_result(RefreshResult::Failed(ApiError::Unauthorized));

        assert!(!app.is_authenticated());
        assert!(matches!(app.state, AppState::LoggingIn));
        assert!(app.rooms.is_empty());

        // The rejected token is gone from disk, so nothing can retry with it
        let reopened = CredentialStore::new(dir);
        assert_eq!(reopened.load().unwrap(), None);
    }

    #[test]
    fn stale_success_does_not_resurrect_ended_session() {
        let session = session_with_role("stale", "admin");
        let mut app = app_with_session(session);

        app.logout();
        app.process_refresh_result(RefreshResult::Rooms(vec![sample_room()]));

        assert!(app.rooms.is_empty());
        assert!(!app.is_authenticated());
    }

    #[tokio::test]
    async fn issuance_failure_surfaces_on_form_without_touching_session() {
        let mut session = Session::new(temp_store("issuance-fail"));
        session.initialize();

        let mut app = app_with_session(session);
        // Nothing listens here, so the issuance request fails fast
        app.api = ApiClient::new("http://127.0.0.1:9".to_string()).unwrap();
        app.login_username = "admin1".to_string();
        app.login_password = "secret".to_string();

        assert!(app.attempt_login().await.is_err());
        assert!(app.login_error.is_some());
        assert!(!app.is_authenticated());
    }

    #[test]
    fn non_auth_failure_leaves_session_intact() {
        let session = session_with_role("net-fail", "admin");
        let mut app = app_with_session(session);

        app.process_refresh_result(RefreshResult::Failed(ApiError::ServerError(
            "boom".to_string(),
        )));

        assert!(app.is_authenticated());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn input_length_limits() {
        assert!(can_add_username_char("short"));
        assert!(!can_add_username_char(&"x".repeat(MAX_USERNAME_LENGTH)));
        assert!(can_add_password_char("short"));
        assert!(!can_add_password_char(&"x".repeat(MAX_PASSWORD_LENGTH)));
    }
}
