use crate::config::{default_store_path, parse_base_url, AppConfig, DeviceHeaders, Mode};
use anyhow::{Context, Result};
use std::{path::PathBuf, time::Duration};

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_base_url: String,
    pub app_name: String,
    pub mode: String,
    pub device: DeviceHeaders,
    pub store: Option<PathBuf>,
    pub timeout: u64,
    pub query_retry: u32,
    pub logout_path: Option<String>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_base_url: String) -> Self {
        Self {
            api_base_url,
            app_name: env!("CARGO_PKG_NAME").to_string(),
            mode: Mode::default().as_str().to_string(),
            device: DeviceHeaders::default(),
            store: None,
            timeout: crate::config::DEFAULT_TIMEOUT_SECS,
            query_retry: crate::config::DEFAULT_QUERY_RETRY,
            logout_path: None,
        }
    }

    /// # Errors
    /// Returns an error for an invalid base URL or mode.
    pub fn app_config(&self) -> Result<AppConfig> {
        let api_base_url =
            parse_base_url(&self.api_base_url).context("invalid PORTAL_API_BASE_URL")?;
        let mode = self.mode.parse::<Mode>().context("invalid PORTAL_MODE")?;

        Ok(AppConfig {
            api_base_url,
            app_name: self.app_name.clone(),
            app_version: self.device.app_version.clone(),
            mode,
            device: self.device.clone(),
            store_path: self.store.clone().unwrap_or_else(default_store_path),
            timeout: Duration::from_secs(self.timeout),
            query_retry: self.query_retry,
            retry_delay: Duration::from_secs(1),
            logout_path: self
                .logout_path
                .clone()
                .filter(|path| !path.trim().is_empty()),
        })
    }
}
