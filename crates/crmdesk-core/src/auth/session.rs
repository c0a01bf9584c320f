use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, HttpClient};
use crate::gate::{self, GateDecision, Route};
use crate::models::{AuthResponse, LoginRequest, ProfileResponse, RegisterRequest, User};

use super::TokenStore;

pub const PROFILE_PATH: &str = "/api/auth/profile";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// A stored token was found and the profile check has not resolved yet
    Initializing,
    Unauthenticated,
    Authenticated,
}

/// Owned copy of the session state at one instant.
#[derive(Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub token: Option<String>,
    pub loading: bool,
}

impl SessionSnapshot {
    fn initial() -> Self {
        Self {
            user: None,
            token: None,
            loading: true,
        }
    }

    pub fn status(&self) -> SessionStatus {
        if self.user.is_some() {
            SessionStatus::Authenticated
        } else if self.loading {
            SessionStatus::Initializing
        } else {
            SessionStatus::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }
}

impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("loading", &self.loading)
            .finish()
    }
}

/// Single source of truth for who is signed in.
///
/// The store owns the persisted token and the `Authorization` default header
/// of the shared [`HttpClient`]; both are only ever written from here, so the
/// header always reflects the current token. Share it behind an `Arc` and
/// read it through [`snapshot`](Self::snapshot) or [`subscribe`](Self::subscribe).
pub struct SessionStore {
    http: Arc<HttpClient>,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<SessionSnapshot>,
    initialized: AtomicBool,
}

impl SessionStore {
    pub fn new(http: Arc<HttpClient>, tokens: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::initial());
        Self {
            http,
            tokens,
            state,
            initialized: AtomicBool::new(false),
        }
    }

    /// The HTTP client views use for resource requests
    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    // =========================================================================
    // State access
    // =========================================================================

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    /// Receive a notification on every session change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Resolve once the initial authentication check is over
    pub async fn wait_until_loaded(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close here
        let _ = rx.wait_for(|snapshot| !snapshot.loading).await;
    }

    /// Gate decision for `route` given the current session
    pub fn gate(&self, route: Route) -> GateDecision {
        gate::resolve(route, &self.snapshot())
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Restore the session from the stored token.
    ///
    /// Only the first call does anything; later calls return the current
    /// status.
    pub async fn initialize(&self) -> SessionStatus {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("Session already initialized");
            return self.status();
        }

        let stored = match self.tokens.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to load stored token");
                None
            }
        };

        let Some(token) = stored else {
            debug!("No stored token");
            self.state.send_modify(|s| {
                s.user = None;
                s.loading = false;
            });
            return self.status();
        };

        let header = match bearer_header(&token) {
            Ok(header) => header,
            Err(e) => {
                warn!(error = %e, "Stored token is unusable, signing out");
                self.clear_session();
                self.state.send_modify(|s| s.loading = false);
                return self.status();
            }
        };

        debug!("Stored token found, checking profile");
        self.http.set_default_header(AUTHORIZATION, header);
        self.state.send_modify(|s| s.token = Some(token));
        self.fetch_profile().await
    }

    /// Load the profile for the current token.
    ///
    /// Any failure signs the session out; nothing is returned to the caller
    /// but the resulting status. A result that arrives after the token
    /// changed (login, register or logout in the meantime) is discarded.
    ///
    /// Call [`initialize`](Self::initialize) first. Until it has run,
    /// `loading` stays set, so the gate keeps reporting `Loading`.
    pub async fn fetch_profile(&self) -> SessionStatus {
        let token = self.token();
        let result = self.http.get::<ProfileResponse>(PROFILE_PATH).await;
        let superseded = self.token() != token;

        match result {
            _ if superseded => {
                debug!("Session changed during profile fetch, discarding result");
            }
            Ok(profile) if token.is_some() => {
                info!(user = %profile.user.name, "Profile loaded");
                self.state.send_modify(|s| s.user = Some(profile.user));
            }
            Ok(_) => {
                debug!("Profile fetched without a session token, ignoring");
            }
            Err(e) => {
                error!(error = %e, "Error fetching user, signing out");
                self.clear_session();
            }
        }

        if self.initialized.load(Ordering::SeqCst) {
            self.state.send_modify(|s| s.loading = false);
        }
        self.status()
    }

    /// Sign in with email and password.
    ///
    /// On failure the normalized error is returned and the session is left
    /// as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let request = LoginRequest::new(email, password);
        let response: AuthResponse = self
            .http
            .post_public(LOGIN_PATH, &request)
            .await
            .inspect_err(|e| error!(error = %e, "Login error"))?;

        let user = self.establish(response)?;
        info!(user = %user.name, "Login successful");
        Ok(user)
    }

    /// Create an account and sign in with it. Same contract as [`login`](Self::login).
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let response: AuthResponse = self
            .http
            .post_public(REGISTER_PATH, request)
            .await
            .inspect_err(|e| error!(error = %e, "Registration error"))?;

        let user = self.establish(response)?;
        info!(user = %user.name, "Registration successful");
        Ok(user)
    }

    /// Forget the session locally. Never fails and never contacts the server.
    pub fn logout(&self) {
        self.clear_session();
        info!("Logged out");
    }

    /// Adopt the token and user of a successful login or register
    fn establish(&self, response: AuthResponse) -> Result<User, ApiError> {
        let AuthResponse { token, user } = response;
        let header = bearer_header(&token)
            .inspect_err(|e| error!(error = %e, "Rejecting auth response"))?;

        if let Err(e) = self.tokens.save(&token) {
            warn!(error = %e, "Failed to persist token");
        }
        self.http.set_default_header(AUTHORIZATION, header);

        let returned = user.clone();
        self.state.send_modify(|s| {
            s.token = Some(token);
            s.user = Some(user);
        });
        Ok(returned)
    }

    fn clear_session(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
        self.http.remove_default_header(&AUTHORIZATION);
        self.state.send_modify(|s| {
            s.user = None;
            s.token = None;
        });
    }
}

/// `Authorization: Bearer <token>` header value for a token
fn bearer_header(token: &str) -> Result<HeaderValue, ApiError> {
    if token.is_empty() {
        return Err(ApiError::InvalidResponse("empty token".to_string()));
    }
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
        ApiError::InvalidResponse("token contains characters not allowed in a header".to_string())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

// ============================================================================
// Tests
// ============================================================================
