use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Map, Value};

// Constants for capture behavior and readiness polling
pub const FILE_EXTENSION: &str = "png";                     // Screenshots are always written as PNG
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444/wd/hub";
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500); // Pause after the page reports ready
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);   // Upper bound on readiness polling
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(5);          // Timeout for the endpoint status probe

/// Browser engine a session should target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum BrowserProfile {
    #[default]
    Chrome,
    Firefox,
}

impl BrowserProfile {
    pub fn browser_name(&self) -> &'static str {
        match self {
            BrowserProfile::Chrome => "chrome",
            BrowserProfile::Firefox => "firefox",
        }
    }

    /// Builds the W3C capabilities declared when the session is created
    pub fn capabilities(&self, headless: bool) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!(self.browser_name()));
        match self {
            BrowserProfile::Chrome => {
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_arguments(headless) }));
            }
            BrowserProfile::Firefox => {
                let args: Vec<&str> = if headless { vec!["-headless"] } else { Vec::new() };
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
        }
        caps
    }
}

impl std::str::FromStr for BrowserProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" => Ok(BrowserProfile::Chrome),
            "firefox" => Ok(BrowserProfile::Firefox),
            other => Err(format!("unknown browser profile: {}", other)),
        }
    }
}

impl TryFrom<String> for BrowserProfile {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// Chrome browser arguments
pub fn chrome_arguments(headless: bool) -> Vec<String> {
    vec![
        "--no-sandbox",
        "--disable-gpu",
        "--disable-dev-shm-usage",
        "--disable-extensions",
        "--disable-notifications",
        "--disable-infobars",
        "--force-color-profile=srgb",
        "--hide-scrollbars",
        "--mute-audio",
        if headless { "--headless=new" } else { "" }
    ].into_iter()
    .filter(|s| !s.is_empty())
    .map(String::from)
    .collect()
}

/// Everything needed to open a remote browser session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub webdriver_url: String,
    pub browser: BrowserProfile,
    pub headless: bool,
    pub viewport_size: Option<(u32, u32)>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            browser: BrowserProfile::default(),
            headless: true,
            viewport_size: Some((1280, 800)),
        }
    }
}

/// How long to wait for a navigated page before capturing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub settle_delay: Duration,
}

impl Default for Readiness {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_READY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}
