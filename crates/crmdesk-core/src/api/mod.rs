//! REST API client module for the CRM backend.
//!
//! This module provides the `HttpClient` used by the session store and by
//! every resource view, plus the `ApiError` all of its calls return.
//!
//! The backend uses bearer token authentication; the token is installed as
//! a default `Authorization` header by `auth::SessionStore`.

pub mod client;
pub mod error;

pub use client::{HttpClient, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::{ApiError, ErrorPayload, NO_RESPONSE_MESSAGE, REQUEST_FAILED_MESSAGE};
