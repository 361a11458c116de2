//! Runtime configuration, read once at startup. Values are public metadata;
//! do not put secrets here.

use crate::error::{Error, Result};
use std::{path::PathBuf, str::FromStr, time::Duration};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://dev-oauth.proxy.simplifi.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_QUERY_RETRY: u32 = 1;

/// Build mode, mirrors the development/production split of the deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Development,
    Production,
    Test,
}

impl Mode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(Error::Config(format!("unknown mode: {other}"))),
        }
    }
}

/// Values for the fixed header bundle sent with every API request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceHeaders {
    pub app_id: String,
    pub app_version: String,
    pub device_family: String,
    pub device_id: String,
    pub device_locale: String,
    pub device_os: String,
    pub device_os_version: String,
}

impl Default for DeviceHeaders {
    fn default() -> Self {
        Self {
            app_id: "dev".to_string(),
            app_version: "1.0.0".to_string(),
            device_family: "web".to_string(),
            device_id: "dev".to_string(),
            device_locale: "en_US".to_string(),
            device_os: "web".to_string(),
            device_os_version: "1.0.0".to_string(),
        }
    }
}

impl DeviceHeaders {
    /// Header name/value pairs in wire order.
    #[must_use]
    pub fn pairs(&self) -> [(&'static str, &str); 7] {
        [
            ("X-App-Id", self.app_id.as_str()),
            ("X-App-Version", self.app_version.as_str()),
            ("X-Device-Family", self.device_family.as_str()),
            ("X-Device-Id", self.device_id.as_str()),
            ("X-Device-Locale", self.device_locale.as_str()),
            ("X-Device-Os", self.device_os.as_str()),
            ("X-Device-Os-Version", self.device_os_version.as_str()),
        ]
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub app_name: String,
    pub app_version: String,
    pub mode: Mode,
    pub device: DeviceHeaders,
    pub store_path: PathBuf,
    pub timeout: Duration,
    pub query_retry: u32,
    pub retry_delay: Duration,
    pub logout_path: Option<String>,
}

impl AppConfig {
    /// Config with defaults for everything but the API base URL.
    /// # Errors
    /// Returns an error if `api_base_url` is not an absolute http(s) URL.
    pub fn new(api_base_url: &str) -> Result<Self> {
        Ok(Self {
            api_base_url: parse_base_url(api_base_url)?,
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: "1.0.0".to_string(),
            mode: Mode::default(),
            device: DeviceHeaders::default(),
            store_path: default_store_path(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            query_retry: DEFAULT_QUERY_RETRY,
            retry_delay: Duration::from_secs(1),
            logout_path: None,
        })
    }

    #[must_use]
    pub fn is_dev(&self) -> bool {
        self.mode == Mode::Development
    }

    #[must_use]
    pub fn is_prod(&self) -> bool {
        self.mode == Mode::Production
    }
}

/// Parses the API base URL, keeping any path prefix.
/// # Errors
/// Returns an error for relative URLs or non-http(s) schemes.
pub fn parse_base_url(value: &str) -> Result<Url> {
    let trimmed = value.trim();
    let url = Url::parse(trimmed)
        .map_err(|err| Error::Config(format!("invalid API base URL '{trimmed}': {err}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::Config(format!(
            "invalid API base URL '{trimmed}': unsupported scheme {scheme}"
        ))),
    }
}

/// `$HOME/.portal/storage.json`, or a relative `.portal/storage.json` when
/// `HOME` is not set.
#[must_use]
pub fn default_store_path() -> PathBuf {
    let base = std::env::var_os("HOME").map_or_else(PathBuf::new, PathBuf::from);
    base.join(".portal").join("storage.json")
}
