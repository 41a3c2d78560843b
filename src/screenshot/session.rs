use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use fantoccini::Client;
use tracing::{debug, info, trace};

use crate::error::CaptureError;
use crate::screenshot::client;
use crate::screenshot::config::SessionSettings;

/// A live handle to a remotely controlled browser
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigates the current window to `url`
    async fn goto(&self, url: &str) -> Result<(), CaptureError>;

    /// Returns `document.readyState` of the current page
    async fn ready_state(&self) -> Result<String, CaptureError>;

    /// Captures the current viewport as PNG and writes it to `path`, replacing any existing file
    async fn save_screenshot(&self, path: &Path) -> Result<(), CaptureError>;

    /// Releases the remote browser. Calling it more than once is a no-op.
    async fn quit(&self) -> Result<(), CaptureError>;
}

#[async_trait]
impl<T: BrowserSession + ?Sized> BrowserSession for Arc<T> {
    async fn goto(&self, url: &str) -> Result<(), CaptureError> {
        (**self).goto(url).await
    }

    async fn ready_state(&self) -> Result<String, CaptureError> {
        (**self).ready_state().await
    }

    async fn save_screenshot(&self, path: &Path) -> Result<(), CaptureError> {
        (**self).save_screenshot(path).await
    }

    async fn quit(&self) -> Result<(), CaptureError> {
        (**self).quit().await
    }
}

/// `BrowserSession` backed by a fantoccini WebDriver client
#[derive(Debug)]
pub struct RemoteSession {
    client: Client,
    endpoint: String,
    closed: AtomicBool,
}

impl RemoteSession {
    /// Probes the endpoint and opens a new session with the configured capability profile
    pub async fn connect(settings: &SessionSettings) -> Result<Self, CaptureError> {
        client::probe_endpoint(&settings.webdriver_url).await?;
        let client = client::create_client(settings).await?;
        info!(
            "Opened {} session on {}",
            settings.browser.browser_name(),
            settings.webdriver_url
        );
        Ok(Self {
            client,
            endpoint: settings.webdriver_url.clone(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), CaptureError> {
        if self.is_closed() {
            return Err(CaptureError::SessionUnavailable(format!(
                "session on {} has already been closed",
                self.endpoint
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for RemoteSession {
    async fn goto(&self, url: &str) -> Result<(), CaptureError> {
        self.ensure_open()?;
        debug!("Navigating to URL: {}", url);
        self.client.goto(url).await?;
        Ok(())
    }

    async fn ready_state(&self) -> Result<String, CaptureError> {
        self.ensure_open()?;
        let state = self
            .client
            .execute("return document.readyState", Vec::new())
            .await?;
        Ok(state.as_str().unwrap_or_default().to_string())
    }

    async fn save_screenshot(&self, path: &Path) -> Result<(), CaptureError> {
        self.ensure_open()?;
        debug!("Capturing screenshot");
        let png = self.client.screenshot().await?;
        trace!("Screenshot captured successfully, {} bytes", png.len());

        fs::write(path, &png).map_err(|e| CaptureError::io(path, e))?;
        Ok(())
    }

    async fn quit(&self) -> Result<(), CaptureError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            trace!("Session on {} already closed", self.endpoint);
            return Ok(());
        }
        debug!("Closing session on {}", self.endpoint);
        self.client.clone().close().await?;
        Ok(())
    }
}
