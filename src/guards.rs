//! Route guards. Pure functions over the session; redirects are returned, not
//! performed. These are a UX convenience, real access control lives on the API.

use crate::domain::Session;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Profile,
    Users,
    UserDetail(String),
    NotFound,
}

impl Route {
    /// Parses a path, ignoring query string, fragment and trailing slashes.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim()
            .trim_end_matches('/');

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["profile"] => Self::Profile,
            ["users"] => Self::Users,
            ["users", id] => Self::UserDetail((*id).to_string()),
            _ => Self::NotFound,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::Users => "/users".to_string(),
            Self::UserDetail(id) => format!("/users/{id}"),
            Self::NotFound => "/404".to_string(),
        }
    }

    #[must_use]
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Profile | Self::Users | Self::UserDetail(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of a guard check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Render,
    Redirect(Route),
}

/// Protected routes bounce anonymous sessions to the login page; the login
/// page bounces authenticated sessions to the profile.
#[must_use]
pub fn guard(route: &Route, session: &Session) -> Navigation {
    if route.is_protected() && !session.is_authenticated() {
        Navigation::Redirect(Route::Login)
    } else if *route == Route::Login && session.is_authenticated() {
        Navigation::Redirect(Route::Profile)
    } else {
        Navigation::Render
    }
}
