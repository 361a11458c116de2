//! Domain records shared by the adapters, the session manager and the CLI.

mod auth;
mod user;

pub use auth::{AuthToken, Credentials, Session, SessionUser};
pub use user::{valid_email, Theme, User, UserProfile, UserSettings};
