//! Route guard driven by the auth snapshot.

use std::fmt;

use crate::domain::{AuthSnapshot, AuthStatus, Role};

/// Screens of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    NewLot,
    Offers,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::NewLot => "/lots/new",
            Self::Offers => "/offers",
        }
    }

    fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    fn required_role(self) -> Option<Role> {
        match self {
            Self::NewLot => Some(Role::Farmer),
            Self::Offers => Some(Role::Buyer),
            Self::Login | Self::Register | Self::Dashboard => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What the view layer should do with a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    /// The session is still being restored; show a placeholder.
    Wait,
    Redirect(Route),
}

/// Decide whether `route` may be shown for `snapshot`.
///
/// Anonymous users only reach Login and Register. Signed-in users are sent
/// from those to the dashboard, and role-restricted screens redirect users
/// of the other role to the dashboard too.
pub fn gate(route: Route, snapshot: &AuthSnapshot) -> RouteDecision {
    match &snapshot.status {
        AuthStatus::Initializing => RouteDecision::Wait,
        AuthStatus::Anonymous if route.is_public() => RouteDecision::Render,
        AuthStatus::Anonymous => RouteDecision::Redirect(Route::Login),
        AuthStatus::Authenticated(_) if route.is_public() => {
            RouteDecision::Redirect(Route::Dashboard)
        }
        AuthStatus::Authenticated(identity) => match route.required_role() {
            Some(role) if role != identity.role() => RouteDecision::Redirect(Route::Dashboard),
            _ => RouteDecision::Render,
        },
    }
}
