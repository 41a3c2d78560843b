use fantoccini::{Client, ClientBuilder};
use serde::Deserialize;
use tracing::{debug, error, trace, warn};

use crate::error::CaptureError;
use crate::screenshot::config::{SessionSettings, STATUS_TIMEOUT};

#[derive(Debug, Deserialize)]
struct StatusResponse {
    value: StatusValue,
}

#[derive(Debug, Deserialize)]
struct StatusValue {
    #[serde(default = "default_ready")]
    ready: bool,
    #[serde(default)]
    message: String,
}

fn default_ready() -> bool {
    true
}

/// Checks that the WebDriver endpoint answers `GET /status` and reports itself ready
pub async fn probe_endpoint(webdriver_url: &str) -> Result<(), CaptureError> {
    let status_url = format!("{}/status", webdriver_url.trim_end_matches('/'));
    trace!("Probing WebDriver endpoint at {}", status_url);

    let http = reqwest::Client::builder()
        .timeout(STATUS_TIMEOUT)
        .build()
        .map_err(|e| CaptureError::SessionUnavailable(e.to_string()))?;

    let response = http.get(&status_url).send().await.map_err(|e| {
        error!("WebDriver endpoint {} is unreachable: {}", webdriver_url, e);
        CaptureError::SessionUnavailable(format!("{} is unreachable: {}", webdriver_url, e))
    })?;

    if !response.status().is_success() {
        return Err(CaptureError::SessionUnavailable(format!(
            "{} answered status probe with {}",
            webdriver_url,
            response.status()
        )));
    }

    let status: StatusResponse = response
        .json()
        .await
        .map_err(|e| CaptureError::SessionUnavailable(format!("malformed status from {}: {}", webdriver_url, e)))?;

    if !status.value.ready {
        return Err(CaptureError::SessionUnavailable(format!(
            "{} is not ready: {}",
            webdriver_url, status.value.message
        )));
    }

    debug!("WebDriver endpoint {} is ready", webdriver_url);
    Ok(())
}

/// Creates a new WebDriver client for the configured capability profile
///
/// The window size is applied when a viewport is configured. Failing to resize
/// only logs a warning.
pub async fn create_client(settings: &SessionSettings) -> Result<Client, CaptureError> {
    let caps = settings.browser.capabilities(settings.headless);
    trace!("Session capabilities: {:?}", caps);

    // Hub paths like /wd/hub need the trailing slash before session paths are joined on
    let endpoint = format!("{}/", settings.webdriver_url.trim_end_matches('/'));

    debug!(
        "Connecting to WebDriver at {} for {}",
        settings.webdriver_url,
        settings.browser.browser_name()
    );
    let client = match ClientBuilder::native()
        .capabilities(caps)
        .connect(&endpoint)
        .await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to WebDriver at {}: {}", settings.webdriver_url, e);
                return Err(e.into());
            }
        };

    if let Some((width, height)) = settings.viewport_size {
        debug!("Setting viewport size to {}x{}", width, height);
        if let Err(e) = client.set_window_size(width, height).await {
            warn!("Failed to set window size to {}x{}: {}", width, height, e);
        }
    }

    trace!("Successfully created WebDriver client");
    Ok(client)
}
