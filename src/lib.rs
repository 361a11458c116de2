//! # Portal
//!
//! Client for an OAuth-style account API: sign in, view and edit the signed-in
//! user's profile, and browse the user directory.
//!
//! ## Session flow
//!
//! 1. **Restore:** [`app::App`] reads `auth_token` and `user` from the local store;
//!    both present means the session starts authenticated.
//! 2. **Login:** the password grant is POSTed to `/oauth/token`. The returned
//!    access token (and refresh token, when issued) is persisted and every
//!    cached query is marked stale.
//! 3. **Requests:** the bearer token is passed explicitly to each adapter call;
//!    nothing mutates shared client headers.
//! 4. **Logout:** persisted credentials, session state and the query cache are
//!    always cleared, even if the optional remote logout call fails.
//!
//! Tokens and passwords are held in `SecretString` and are never logged.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod directory;
pub mod domain;
pub mod error;
pub mod guards;
pub mod preferences;
pub mod profile;
pub mod query;
pub mod session;
pub mod storage;

pub use error::{Error, Result};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
