use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Departments offered by the sign-up form.
pub const DEPARTMENTS: [&str; 5] = ["IT", "HR", "Finance", "Marketing", "Sales"];

/// Backend user identifier. Depending on the store behind the API it
/// arrives as a number or as a string (`_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(id) => write!(f, "{}", id),
            UserId::Text(id) => f.write_str(id),
        }
    }
}

/// Role an employee holds in the CRM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Employee,
    Manager,
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Roles a new account may pick at sign-up
    pub const SELECTABLE: [Role; 2] = [Role::Employee, Role::Manager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
            Role::Unknown => "unknown",
        }
    }

    /// Capitalized label as shown in menus
    pub fn label(&self) -> &'static str {
        match self {
            Role::Employee => "Employee",
            Role::Manager => "Manager",
            Role::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role '{0}' (expected employee or manager)")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "employee" => Ok(Role::Employee),
            "manager" => Ok(Role::Manager),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

/// Signed-in user as returned by the auth endpoints.
///
/// Fields the backend adds beyond the ones named here are kept in `extra`
/// and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl User {
    pub fn is_manager(&self) -> bool {
        self.role == Some(Role::Manager)
    }

    /// Name with role and department, e.g. "Ann (employee, IT)"
    pub fn display_line(&self) -> String {
        let details: Vec<&str> = [
            self.role.as_ref().map(Role::as_str),
            self.department.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if details.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, details.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_minimal_payload() {
        let user: User =
            serde_json::from_str(r#"{"id":1,"name":"Ann","role":"employee"}"#).unwrap();
        assert_eq!(user.id, Some(UserId::Number(1)));
        assert_eq!(user.name, "Ann");
        assert_eq!(user.role, Some(Role::Employee));
        assert!(user.email.is_none());
        assert!(user.extra.is_empty());
    }

    #[test]
    fn test_user_mongo_id_and_extra_fields() {
        let user: User = serde_json::from_str(
            r#"{"_id":"65a1","name":"Bo","email":"bo@x.com","role":"manager",
                "department":"HR","createdAt":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(user.id, Some(UserId::Text("65a1".to_string())));
        assert!(user.is_manager());
        assert_eq!(user.extra.get("createdAt"), Some(&Value::from("2024-01-01")));
        assert_eq!(user.display_line(), "Bo (manager, HR)");
    }

    #[test]
    fn test_null_name_decodes_as_empty() {
        let user: User = serde_json::from_str(r#"{"id":2,"name":null,"email":null}"#).unwrap();
        assert_eq!(user.name, "");
        assert!(user.email.is_none());
        assert_eq!(user.id, Some(UserId::Number(2)));
    }

    #[test]
    fn test_unknown_role_decodes() {
        let user: User = serde_json::from_str(r#"{"name":"Root","role":"admin"}"#).unwrap();
        assert_eq!(user.role, Some(Role::Unknown));
        assert_eq!(user.display_line(), "Root (unknown)");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Manager".parse::<Role>(), Ok(Role::Manager));
        assert_eq!(" employee ".parse::<Role>(), Ok(Role::Employee));
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Employee);
        assert_eq!(Role::Manager.label(), "Manager");
    }

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId::Number(7).to_string(), "7");
        assert_eq!(UserId::Text("abc".to_string()).to_string(), "abc");
    }
}
