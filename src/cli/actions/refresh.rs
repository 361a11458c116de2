use crate::{app::App, error::Error};
use anyhow::{bail, Result};

/// Execute the refresh action.
/// # Errors
/// Returns an error when no refresh token is stored or the exchange fails.
pub async fn execute(app: &App) -> Result<()> {
    match app.session().refresh().await {
        Ok(token) => {
            println!("Token refreshed, expires in {}s", token.expires_in);
            Ok(())
        }
        Err(Error::AuthenticationRequired) => {
            bail!("No refresh token stored. Run `portal login` first.")
        }
        Err(err) => Err(err.into()),
    }
}
