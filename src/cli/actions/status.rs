use crate::{app::App, GIT_COMMIT_HASH};
use anyhow::Result;
use std::fmt::Write;

/// Execute the status action.
/// # Errors
/// Returns an error if the output cannot be formatted.
pub fn execute(app: &App) -> Result<()> {
    print!("{}", render(app)?);
    Ok(())
}

fn render(app: &App) -> Result<String> {
    let state = app.session().snapshot();
    let config = app.config();
    let mut out = String::new();

    writeln!(out, "status:  {}", state.status())?;
    if let Some(name) = state.session.user_name() {
        writeln!(out, "user:    {name}")?;
    }
    writeln!(out, "api:     {}", config.api_base_url)?;
    writeln!(out, "store:   {}", config.store_path.display())?;
    writeln!(out, "mode:    {}", config.mode.as_str())?;
    writeln!(
        out,
        "version: {} {} - {}",
        config.app_name,
        env!("CARGO_PKG_VERSION"),
        GIT_COMMIT_HASH
    )?;
    Ok(out)
}
