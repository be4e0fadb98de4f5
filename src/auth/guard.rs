//! Client-side routes and the authentication guard in front of them

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use log::debug;

use super::session::SessionService;
use crate::error::Error;

/// A location in the console.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    ForgotPassword,
    NewPassword,
    ResetPassword,
    VerifyEmail,
    Users,
    User(String),
    Organizations,
    Organization(String),
    OrganizationUser { org_id: String, user_id: String },
    Rules(Option<String>),
    Roles,
    Keywords(Option<String>),
    Creatives,
    CreativeMaker,
    BulkUpload,
    ActivityLog,
}

impl Route {
    /// Routes reachable without a session
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::Login
                | Route::ForgotPassword
                | Route::NewPassword
                | Route::ResetPassword
                | Route::VerifyEmail
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => write!(f, "/login"),
            Route::ForgotPassword => write!(f, "/forgot-password"),
            Route::NewPassword => write!(f, "/new-password"),
            Route::ResetPassword => write!(f, "/reset-password"),
            Route::VerifyEmail => write!(f, "/verify-email"),
            Route::Users => write!(f, "/users"),
            Route::User(id) => write!(f, "/users/{}", id),
            Route::Organizations => write!(f, "/organizations"),
            Route::Organization(id) => write!(f, "/organizations/{}", id),
            Route::OrganizationUser { org_id, user_id } => {
                write!(f, "/organizations/{}/user/{}", org_id, user_id)
            }
            Route::Rules(None) => write!(f, "/rules"),
            Route::Rules(Some(rest)) => write!(f, "/rules/{}", rest),
            Route::Roles => write!(f, "/roles"),
            Route::Keywords(None) => write!(f, "/keywords"),
            Route::Keywords(Some(rest)) => write!(f, "/keywords/{}", rest),
            Route::Creatives => write!(f, "/creatives"),
            Route::CreativeMaker => write!(f, "/creative-maker"),
            Route::BulkUpload => write!(f, "/bulk-upload"),
            Route::ActivityLog => write!(f, "/activity-log"),
        }
    }
}

impl FromStr for Route {
    type Err = Error;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let tail = |from: usize| -> Option<String> {
            (segments.len() > from).then(|| segments[from..].join("/"))
        };

        let route = match segments.as_slice() {
            [] => Route::Users,
            ["login"] => Route::Login,
            ["forgot-password"] => Route::ForgotPassword,
            ["new-password"] => Route::NewPassword,
            ["reset-password"] => Route::ResetPassword,
            ["verify-email"] => Route::VerifyEmail,
            ["users"] => Route::Users,
            ["users", id] => Route::User(id.to_string()),
            ["organizations"] => Route::Organizations,
            ["organizations", id] => Route::Organization(id.to_string()),
            ["organizations", org_id, "user", user_id] => Route::OrganizationUser {
                org_id: org_id.to_string(),
                user_id: user_id.to_string(),
            },
            ["rules", ..] => Route::Rules(tail(1)),
            ["roles"] => Route::Roles,
            ["keywords", ..] => Route::Keywords(tail(1)),
            ["creatives"] => Route::Creatives,
            ["creative-maker"] => Route::CreativeMaker,
            ["bulk-upload"] => Route::BulkUpload,
            ["activity-log"] => Route::ActivityLog,
            _ => return Err(Error::Other(format!("Unknown route: {}", path))),
        };
        Ok(route)
    }
}

/// Where the guard currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Check in progress; nothing is rendered
    Checking,
    Authenticated,
    Unauthenticated,
}

/// Result of a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    /// Go to `to`, remembering the location that was asked for
    Redirect { to: Route, from: Route },
}

/// Re-checks authentication on every protected navigation.
#[derive(Clone)]
pub struct RouteGuard {
    session: SessionService,
    state: Arc<Mutex<GuardState>>,
}

impl RouteGuard {
    pub fn new(session: &SessionService) -> Self {
        Self {
            session: session.clone(),
            state: Arc::new(Mutex::new(GuardState::Checking)),
        }
    }

    pub fn state(&self) -> GuardState {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, state: GuardState) {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }

    pub async fn navigate(&self, route: Route) -> Navigation {
        if route.is_public() {
            return Navigation::Render(route);
        }

        self.set_state(GuardState::Checking);
        let authenticated = self.session.is_authenticated().await;

        if authenticated {
            self.set_state(GuardState::Authenticated);
            Navigation::Render(route)
        } else {
            self.set_state(GuardState::Unauthenticated);
            debug!("{} requires a session; redirecting to {}", route, Route::Login);
            Navigation::Redirect {
                to: Route::Login,
                from: route,
            }
        }
    }
}
