use crate::{app::App, domain::Credentials, error::Error};
use anyhow::{anyhow, bail, Result};
use secrecy::SecretString;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const LOGIN_FAILED: &str = "Login failed. Please try again.";

#[derive(Debug)]
pub struct Args {
    pub username: String,
    pub password: Option<SecretString>,
}

/// Execute the login action.
/// # Errors
/// Returns the login error message, or a generic one when it is empty.
pub async fn execute(app: &App, args: Args) -> Result<()> {
    let username = args.username.trim().to_string();
    if username.is_empty() {
        bail!("Username is required.");
    }

    let password = match args.password {
        Some(password) => password,
        None => prompt_password().await?,
    };

    let credentials = Credentials { username, password };
    match app.session().login(&credentials).await {
        Ok(token) => {
            debug!(expires_in = token.expires_in, "token issued");
            println!("Signed in as {}", credentials.username);
            Ok(())
        }
        Err(err) => Err(anyhow!(failure_message(&err))),
    }
}

/// Message shown for a failed login: the error text, or a generic fallback.
#[must_use]
pub fn failure_message(err: &Error) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        LOGIN_FAILED.to_string()
    } else {
        message
    }
}

async fn prompt_password() -> Result<SecretString> {
    eprint!("Password: ");
    std::io::stderr().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password is required.");
    }
    Ok(SecretString::from(password))
}
