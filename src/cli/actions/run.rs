use crate::{
    app::App,
    cli::{
        actions::{login, logout, prefs, profile, refresh, status, users, Action},
        globals::GlobalArgs,
    },
    guards::{guard, Navigation, Route},
};
use anyhow::{bail, Context, Result};
use tracing::debug;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions. Every action passes
// the route guard before it runs.
/// # Errors
/// Returns an error if the guard redirects to login or the action fails.
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    let config = globals.app_config()?;
    let app = App::new(config).context("failed to initialize portal")?;

    let route = action.route();
    if let Navigation::Redirect(target) = guard(&route, &app.session().session()) {
        debug!(from = %route, to = %target, "route guard redirect");
        return redirect(&app, &route, &target);
    }

    match action {
        Action::Login(args) => login::execute(&app, args).await,
        Action::Logout => logout::execute(&app).await,
        Action::Status => status::execute(&app),
        Action::Refresh => refresh::execute(&app).await,
        Action::Profile(args) => profile::execute(&app, args).await,
        Action::Users(args) => users::execute(&app, args).await,
        Action::Prefs(args) => prefs::execute(&app, args),
    }
}

fn redirect(app: &App, from: &Route, to: &Route) -> Result<()> {
    match to {
        Route::Login => bail!("Authentication required to open {from}. Run `portal login` first."),
        Route::Profile => {
            let session = app.session().session();
            println!(
                "Already signed in as {}. Run `portal logout` to switch accounts.",
                session.user_name().unwrap_or("unknown user")
            );
            Ok(())
        }
        other => bail!("Cannot open {from}, redirected to {other}"),
    }
}
