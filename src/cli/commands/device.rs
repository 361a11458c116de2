use clap::{Arg, Command};

/// Values for the fixed `X-App-*` / `X-Device-*` request headers.
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("app-id")
                .long("app-id")
                .help("Value of the X-App-Id header")
                .env("PORTAL_APP_ID")
                .global(true)
                .default_value("dev"),
        )
        .arg(
            Arg::new("device-family")
                .long("device-family")
                .help("Value of the X-Device-Family header")
                .env("PORTAL_DEVICE_FAMILY")
                .global(true)
                .default_value("web"),
        )
        .arg(
            Arg::new("device-id")
                .long("device-id")
                .help("Value of the X-Device-Id header")
                .env("PORTAL_DEVICE_ID")
                .global(true)
                .default_value("dev"),
        )
        .arg(
            Arg::new("device-locale")
                .long("device-locale")
                .help("Value of the X-Device-Locale header")
                .env("PORTAL_DEVICE_LOCALE")
                .global(true)
                .default_value("en_US"),
        )
        .arg(
            Arg::new("device-os")
                .long("device-os")
                .help("Value of the X-Device-Os header")
                .env("PORTAL_DEVICE_OS")
                .global(true)
                .default_value("web"),
        )
        .arg(
            Arg::new("device-os-version")
                .long("device-os-version")
                .help("Value of the X-Device-Os-Version header")
                .env("PORTAL_DEVICE_OS_VERSION")
                .global(true)
                .default_value("1.0.0"),
        )
}
