use thiserror::Error;

/// Errors surfaced by the portal library.
///
/// Variants carry plain messages so the error can be cloned into session
/// state and shown verbatim to the user.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("{0}")]
    Validation(String),
    #[error("Authentication required")]
    AuthenticationRequired,
}

impl Error {
    /// HTTP status for `Http` errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the shared query layer may retry after this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::AuthenticationRequired | Self::Validation(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
