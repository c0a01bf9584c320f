//! Request and response bodies of the `/api/auth` endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::user::{Role, User};

/// Body of `POST /api/auth/login`
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /api/auth/register`
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub department: String,
    pub role: Role,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("department", &self.department)
            .field("role", &self.role)
            .finish()
    }
}

/// Response of the login and register endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Response of `GET /api/auth/profile`
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_wire_shape() {
        let req = RegisterRequest {
            name: "Ann".to_string(),
            email: "a@x.com".to_string(),
            password: "pw".to_string(),
            department: "IT".to_string(),
            role: Role::Employee,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Ann",
                "email": "a@x.com",
                "password": "pw",
                "department": "IT",
                "role": "employee"
            })
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let login = LoginRequest::new("a@x.com", "hunter2");
        let debug = format!("{:?}", login);
        assert!(debug.contains("a@x.com"));
        assert!(!debug.contains("hunter2"));
    }
}
