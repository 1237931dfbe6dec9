//! Navigation gating.

use std::fmt;

use crate::store::SessionState;

/// Access requirement of a navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    RequiresAuthentication,
}

/// Outcome of a navigation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the target.
    Allow,
    /// Send the user to the login page.
    RedirectToLogin,
    /// Session still initializing; show a neutral waiting state.
    Defer,
}

/// Decide whether a target with `access` may be shown in `state`.
pub fn decide(state: &SessionState, access: Access) -> GuardDecision {
    match (access, state) {
        (Access::Public, _) => GuardDecision::Allow,
        (Access::RequiresAuthentication, SessionState::Initializing) => GuardDecision::Defer,
        (Access::RequiresAuthentication, SessionState::Anonymous) => GuardDecision::RedirectToLogin,
        (Access::RequiresAuthentication, SessionState::Authenticated(_)) => GuardDecision::Allow,
    }
}

/// Pages of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Events,
    EventDetails(String),
    MyTickets,
    Profile,
    Settings,
}

impl Route {
    /// Route for a path, ignoring query string, fragment and a trailing slash.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["events"] => Route::Events,
            ["events", id] if !id.is_empty() => Route::EventDetails((*id).to_string()),
            ["my-tickets"] => Route::MyTickets,
            ["profile"] => Route::Profile,
            ["settings"] => Route::Settings,
            _ => return None,
        };

        if !path.starts_with('/') {
            return None;
        }
        Some(route)
    }

    /// Canonical path.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Events => "/events".to_string(),
            Route::EventDetails(id) => format!("/events/{}", id),
            Route::MyTickets => "/my-tickets".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Settings => "/settings".to_string(),
        }
    }

    /// Who may see this page.
    pub fn access(&self) -> Access {
        match self {
            Route::MyTickets | Route::Profile | Route::Settings => Access::RequiresAuthentication,
            _ => Access::Public,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// [`decide`] for a known route.
pub fn guard_route(state: &SessionState, route: &Route) -> GuardDecision {
    decide(state, route.access())
}
