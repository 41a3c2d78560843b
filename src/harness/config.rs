use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::screenshot::config::{BrowserProfile, Readiness, SessionSettings, DEFAULT_WEBDRIVER_URL};

/// Prefix of the environment variables that override harness settings
pub const ENV_PREFIX: &str = "SCREENSHOT";

/// Settings shared by every test that drives the remote browser
///
/// Read once during setup and handed to the harness explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HarnessConfig {
    /// Root that relative screenshot directories are resolved against
    pub base_dir: PathBuf,

    /// Screenshot directory, relative to `base_dir`
    pub screenshot_dir: String,

    /// Remote WebDriver endpoint, e.g. `http://host:4444/wd/hub`
    pub webdriver_url: String,

    pub browser: BrowserProfile,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Pause after the page reports ready, in milliseconds
    pub settle_delay_ms: u64,
    pub ready_timeout_ms: u64,
    pub ready_poll_interval_ms: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        let readiness = Readiness::default();
        Self {
            base_dir: PathBuf::from("."),
            screenshot_dir: "screenshots".to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            browser: BrowserProfile::Chrome,
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            settle_delay_ms: readiness.settle_delay.as_millis() as u64,
            ready_timeout_ms: readiness.timeout.as_millis() as u64,
            ready_poll_interval_ms: readiness.poll_interval.as_millis() as u64,
        }
    }
}

impl HarnessConfig {
    /// Loads defaults, then `file` if given, then `SCREENSHOT_*` environment variables
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(file, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(file: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("base_dir", defaults.base_dir.to_string_lossy().into_owned())?
            .set_default("screenshot_dir", defaults.screenshot_dir)?
            .set_default("webdriver_url", defaults.webdriver_url)?
            .set_default("browser", defaults.browser.browser_name())?
            .set_default("headless", defaults.headless)?
            .set_default("viewport_width", i64::from(defaults.viewport_width))?
            .set_default("viewport_height", i64::from(defaults.viewport_height))?
            .set_default("settle_delay_ms", defaults.settle_delay_ms as i64)?
            .set_default("ready_timeout_ms", defaults.ready_timeout_ms as i64)?
            .set_default("ready_poll_interval_ms", defaults.ready_poll_interval_ms as i64)?;

        if let Some(path) = file {
            debug!("Loading harness config from {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
            .build()
            .context("Failed to build harness configuration")?;

        settings
            .try_deserialize()
            .context("Invalid harness configuration")
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        self.base_dir.join(&self.screenshot_dir)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            webdriver_url: self.webdriver_url.clone(),
            browser: self.browser,
            headless: self.headless,
            viewport_size: Some((self.viewport_width, self.viewport_height)),
        }
    }

    pub fn readiness(&self) -> Readiness {
        Readiness {
            timeout: Duration::from_millis(self.ready_timeout_ms),
            poll_interval: Duration::from_millis(self.ready_poll_interval_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_sources() {
        let config = HarnessConfig::load_with_prefix(None, "SHOTCFG_UNSET").unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.screenshot_dir(), Path::new("./screenshots"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "webdriver_url = \"http://grid:4444/wd/hub\"\nbrowser = \"firefox\"\nsettle_delay_ms = 2000"
        ).unwrap();

        let config = HarnessConfig::load_with_prefix(Some(file.path()), "SHOTCFG_FILE").unwrap();
        assert_eq!(config.webdriver_url, "http://grid:4444/wd/hub");
        assert_eq!(config.browser, BrowserProfile::Firefox);
        assert_eq!(config.readiness().settle_delay, Duration::from_secs(2));
        assert_eq!(config.viewport_width, 1280);
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("SHOTCFG_ENV_HEADLESS", "false");
        std::env::set_var("SHOTCFG_ENV_BASE_DIR", "/srv/app");

        let config = HarnessConfig::load_with_prefix(None, "SHOTCFG_ENV").unwrap();
        assert!(!config.headless);
        assert_eq!(config.screenshot_dir(), Path::new("/srv/app/screenshots"));
    }

    #[test]
    fn test_environment_browser_is_case_insensitive() {
        std::env::set_var("SHOTCFG_CASE_BROWSER", "Firefox");

        let config = HarnessConfig::load_with_prefix(None, "SHOTCFG_CASE").unwrap();
        assert_eq!(config.browser, BrowserProfile::Firefox);
    }

    #[test]
    fn test_session_settings_carry_viewport() {
        let settings = HarnessConfig::default().session_settings();
        assert_eq!(settings.viewport_size, Some((1280, 800)));
        assert_eq!(settings.browser, BrowserProfile::Chrome);
    }
}
