use crate::{app::App, error::Error};
use anyhow::Result;

/// Execute the logout action. The local session is cleared even when the
/// server call fails; the failure is still reported.
/// # Errors
/// Returns an error if the remote logout or the store cleanup failed.
pub async fn execute(app: &App) -> Result<()> {
    let name = app.session().session().user_name().map(str::to_string);

    app.session().logout().await.map_err(|err| {
        let context = failure_context(&err);
        anyhow::Error::new(err).context(context)
    })?;

    match name {
        Some(name) => println!("Signed out {name}"),
        None => println!("Signed out"),
    }
    Ok(())
}

fn failure_context(err: &Error) -> &'static str {
    match err {
        Error::Storage(_) => "Signed out, but the local session could not be fully cleared",
        _ => "Signed out locally, but the server logout failed",
    }
}
