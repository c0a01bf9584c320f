//! Data models for the CRM auth API.
//!
//! - `User`, `UserId`, `Role`: the signed-in employee
//! - `LoginRequest`, `RegisterRequest`: auth request bodies
//! - `AuthResponse`, `ProfileResponse`: auth response bodies

pub mod auth;
pub mod user;

pub use auth::{AuthResponse, LoginRequest, ProfileResponse, RegisterRequest};
pub use user::{Role, RoleParseError, User, UserId, DEPARTMENTS};
