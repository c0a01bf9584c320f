//! Core library for crmdesk.
//!
//! Client side of the internal IT CRM: the session store that tracks who is
//! signed in, the HTTP client every view talks to the backend through, token
//! storage, route gating and configuration.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use crmdesk_core::auth::{MemoryTokenStore, SessionStore};
//! use crmdesk_core::api::HttpClient;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let http = Arc::new(HttpClient::new("http://localhost:5000")?);
//! let session = SessionStore::new(http, Arc::new(MemoryTokenStore::new()));
//!
//! session.initialize().await;
//! let user = session.login("ann@example.com", "secret").await?;
//! println!("signed in as {}", user.name);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod gate;
pub mod models;

pub use api::{ApiError, HttpClient};
pub use auth::{SessionSnapshot, SessionStatus, SessionStore, TokenStore};
pub use config::Config;
pub use gate::{GateDecision, Route};
pub use models::{RegisterRequest, Role, User};
