use crate::{domain::Session, error::Error};
use std::fmt;

/// Operation currently in flight on the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Login,
    Logout,
    Refresh,
}

/// Coarse lifecycle state derived from [`SessionState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Authenticating,
    Authenticated,
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
        })
    }
}

/// Snapshot published to session observers.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub session: Session,
    pub in_flight: Option<Operation>,
    pub error: Option<Error>,
}

impl SessionState {
    #[must_use]
    pub fn status(&self) -> AuthStatus {
        if self.in_flight.is_some() {
            AuthStatus::Authenticating
        } else if self.session.is_authenticated() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Anonymous
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }
}
