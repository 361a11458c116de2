mod device;
mod logging;

pub use self::logging::validator_log_level;

use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        BoolishValueParser,
    },
    Arg, ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("portal")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Base URL of the account API")
                .env("PORTAL_API_BASE_URL")
                .global(true)
                .default_value(crate::config::DEFAULT_API_BASE_URL),
        )
        .arg(
            Arg::new("app-name")
                .long("app-name")
                .help("Application name")
                .env("PORTAL_APP_NAME")
                .global(true)
                .default_value(env!("CARGO_PKG_NAME")),
        )
        .arg(
            Arg::new("app-version")
                .long("app-version")
                .help("Application version, sent as X-App-Version")
                .env("PORTAL_APP_VERSION")
                .global(true)
                .default_value("1.0.0"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .help("Runtime mode: development, production or test")
                .env("PORTAL_MODE")
                .global(true)
                .default_value("development"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .help("Path of the local session store (default: $HOME/.portal/storage.json)")
                .env("PORTAL_STORE")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("HTTP request timeout in seconds")
                .env("PORTAL_TIMEOUT")
                .global(true)
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("query-retry")
                .long("query-retry")
                .help("Retries for failed queries")
                .env("PORTAL_QUERY_RETRY")
                .global(true)
                .default_value("1")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("logout-path")
                .long("logout-path")
                .help("Server logout endpoint; logout is local-only when unset")
                .env("PORTAL_LOGOUT_PATH")
                .global(true),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in with username and password")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("Account username")
                        .env("PORTAL_USERNAME")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Account password, prompted for when omitted")
                        .env("PORTAL_PASSWORD")
                        .hide_env_values(true),
                ),
        )
        .subcommand(Command::new("logout").about("Sign out and clear the local session"))
        .subcommand(Command::new("status").about("Show the current session"))
        .subcommand(
            Command::new("refresh").about("Exchange the refresh token for a new access token"),
        )
        .subcommand(
            Command::new("profile")
                .about("Show or edit the signed-in user's profile")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Show the profile"))
                .subcommand(
                    Command::new("update")
                        .about("Update profile fields")
                        .arg(Arg::new("name").long("name").help("Display name"))
                        .arg(Arg::new("email").long("email").help("Email address"))
                        .arg(Arg::new("avatar").long("avatar").help("Avatar URL")),
                ),
        )
        .subcommand(
            Command::new("users")
                .about("Browse the user directory")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List users"))
                .subcommand(
                    Command::new("show")
                        .about("Show a single user")
                        .arg(Arg::new("id").help("User id").required(true)),
                ),
        )
        .subcommand(
            Command::new("prefs")
                .about("Show or change local preferences")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Show preferences"))
                .subcommand(
                    Command::new("set")
                        .about("Change preferences")
                        .arg(
                            Arg::new("theme")
                                .long("theme")
                                .help("light, dark or system"),
                        )
                        .arg(
                            Arg::new("notifications")
                                .long("notifications")
                                .value_parser(BoolishValueParser::new())
                                .help("on or off"),
                        )
                        .arg(Arg::new("language").long("language").help("Language, e.g. en_US")),
                ),
        );

    let command = device::with_args(command);
    logging::with_args(command)
}
