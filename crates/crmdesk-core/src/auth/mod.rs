//! Authentication module for managing the signed-in session.
//!
//! This module provides:
//! - `SessionStore`: current user, login/register/logout, token persistence
//!   and the `Authorization` header of the shared `HttpClient`
//! - `TokenStore`: where the bearer token lives between runs, with file,
//!   OS keychain and in-memory backends
//!
//! A stored token is checked against the profile endpoint at startup; if the
//! check fails for any reason the session is cleared.

pub mod keychain;
pub mod session;
pub mod token_store;

pub use keychain::KeyringTokenStore;
pub use session::{SessionSnapshot, SessionStatus, SessionStore};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
