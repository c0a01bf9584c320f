//! Routes of the CRM client and the private-route gate.
//!
//! Protected routes wait while the session is loading, send signed-out users
//! to the login page, and render for a signed-in user.

use std::fmt;

use crate::auth::SessionSnapshot;
use crate::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Customers,
    Projects,
    Tasks,
    EmployeeDetails,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Customers,
        Route::Projects,
        Route::Tasks,
        Route::EmployeeDetails,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/",
            Route::Customers => "/customers",
            Route::Projects => "/projects",
            Route::Tasks => "/tasks",
            Route::EmployeeDetails => "/employee-details",
        }
    }

    /// Match a path to a route. Unknown paths land on the dashboard.
    pub fn from_path(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };

        Self::ALL
            .into_iter()
            .find(|route| route.path() == normalized)
            .unwrap_or(Route::Dashboard)
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What to show for a route
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Initial session check still running
    Loading,
    Redirect(Route),
    /// Show the route; carries the user for protected routes
    Render(Route, Option<User>),
}

pub fn resolve(route: Route, session: &SessionSnapshot) -> GateDecision {
    if !route.is_protected() {
        return GateDecision::Render(route, session.user.clone());
    }
    if session.loading {
        return GateDecision::Loading;
    }
    match &session.user {
        Some(user) => GateDecision::Render(route, Some(user.clone())),
        None => GateDecision::Redirect(Route::Login),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(user: Option<&str>, loading: bool) -> SessionSnapshot {
        SessionSnapshot {
            user: user.map(|name| {
                serde_json::from_value(serde_json::json!({ "name": name })).unwrap()
            }),
            token: user.map(|_| "t".to_string()),
            loading,
        }
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Route::from_path("/customers"), Route::Customers);
        assert_eq!(Route::from_path("/customers/"), Route::Customers);
        assert_eq!(Route::from_path("/tasks?status=open"), Route::Tasks);
        assert_eq!(Route::from_path("/employee-details"), Route::EmployeeDetails);
        assert_eq!(Route::from_path(""), Route::Dashboard);
        assert_eq!(Route::from_path("/nowhere"), Route::Dashboard);
    }

    #[test]
    fn test_paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), route);
        }
    }

    #[test]
    fn test_protected_route_while_loading() {
        assert_eq!(
            resolve(Route::Projects, &snapshot(None, true)),
            GateDecision::Loading
        );
    }

    #[test]
    fn test_protected_route_redirects_when_signed_out() {
        assert_eq!(
            resolve(Route::Dashboard, &snapshot(None, false)),
            GateDecision::Redirect(Route::Login)
        );
    }

    #[test]
    fn test_protected_route_renders_for_user() {
        let session = snapshot(Some("Ann"), false);
        match resolve(Route::Tasks, &session) {
            GateDecision::Render(Route::Tasks, Some(user)) => assert_eq!(user.name, "Ann"),
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_public_routes_always_render() {
        assert_eq!(
            resolve(Route::Login, &snapshot(None, true)),
            GateDecision::Render(Route::Login, None)
        );
        assert_eq!(
            resolve(Route::Register, &snapshot(None, false)),
            GateDecision::Render(Route::Register, None)
        );
    }
}
