use crate::{
    cli::{
        actions::{login, prefs, profile, users, Action},
        globals::GlobalArgs,
    },
    config::DeviceHeaders,
    domain::{Theme, UserProfile},
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// Converts parsed arguments into the action to run plus the shared settings.
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = globals(matches)?;

    let action = match matches.subcommand() {
        Some(("login", sub_m)) => Action::Login(login::Args {
            username: sub_m
                .get_one::<String>("username")
                .cloned()
                .context("missing required argument: --username")?,
            password: sub_m
                .get_one::<String>("password")
                .cloned()
                .map(SecretString::from),
        }),
        Some(("logout", _)) => Action::Logout,
        Some(("status", _)) => Action::Status,
        Some(("refresh", _)) => Action::Refresh,
        Some(("profile", sub_m)) => Action::Profile(match sub_m.subcommand() {
            Some(("update", update_m)) => profile::Args::Update(UserProfile {
                name: update_m.get_one::<String>("name").cloned(),
                email: update_m.get_one::<String>("email").cloned(),
                avatar: update_m.get_one::<String>("avatar").cloned(),
            }),
            _ => profile::Args::Show,
        }),
        Some(("users", sub_m)) => Action::Users(match sub_m.subcommand() {
            Some(("show", show_m)) => users::Args::Show {
                id: show_m
                    .get_one::<String>("id")
                    .cloned()
                    .context("missing required argument: <id>")?,
            },
            _ => users::Args::List,
        }),
        Some(("prefs", sub_m)) => Action::Prefs(match sub_m.subcommand() {
            Some(("set", set_m)) => prefs::Args::Set(prefs::Changes {
                theme: set_m
                    .get_one::<String>("theme")
                    .map(|theme| theme.parse::<Theme>())
                    .transpose()?,
                notifications: set_m.get_one::<bool>("notifications").copied(),
                language: set_m.get_one::<String>("language").cloned(),
            }),
            _ => prefs::Args::Show,
        }),
        Some((name, _)) => return Err(anyhow!("unknown command: {name}")),
        None => return Err(anyhow!("missing command")),
    };

    Ok((action, globals))
}

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let value = |id: &str| -> Result<String> {
        matches
            .get_one::<String>(id)
            .cloned()
            .with_context(|| format!("missing required argument: --{id}"))
    };

    let mut globals = GlobalArgs::new(value("api-url")?);
    globals.app_name = value("app-name")?;
    globals.mode = value("mode")?;
    globals.device = DeviceHeaders {
        app_id: value("app-id")?,
        app_version: value("app-version")?,
        device_family: value("device-family")?,
        device_id: value("device-id")?,
        device_locale: value("device-locale")?,
        device_os: value("device-os")?,
        device_os_version: value("device-os-version")?,
    };
    globals.store = matches.get_one::<String>("store").map(PathBuf::from);
    globals.timeout = matches
        .get_one::<u64>("timeout")
        .copied()
        .unwrap_or(crate::config::DEFAULT_TIMEOUT_SECS);
    globals.query_retry = matches
        .get_one::<u32>("query-retry")
        .copied()
        .unwrap_or(crate::config::DEFAULT_QUERY_RETRY);
    globals.logout_path = matches.get_one::<String>("logout-path").cloned();

    Ok(globals)
}
