//! User directory queries.

use crate::{app::App, domain::User, error::Result, query::QueryKey};
use tracing::instrument;

/// # Errors
/// Returns `AuthenticationRequired` without a stored token, otherwise the
/// adapter error after retries.
#[instrument(skip_all)]
pub async fn list_users(app: &App) -> Result<Vec<User>> {
    let token = app.stored_token()?;
    app.cache()
        .fetch(&QueryKey::users(), || app.users().list_users(&token))
        .await
}

/// # Errors
/// Returns `AuthenticationRequired`, `Validation` for a blank id, or the adapter
/// error after retries.
#[instrument(skip(app))]
pub async fn get_user(app: &App, id: &str) -> Result<User> {
    let token = app.stored_token()?;
    let id = id.trim();
    app.cache()
        .fetch(&QueryKey::user(id), || app.users().get_user(&token, id))
        .await
}
