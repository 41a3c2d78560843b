use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::future::BoxFuture;

use crate::error::CaptureError;
use crate::harness::config::HarnessConfig;
use crate::harness::{catch_panic, finish, rethrow};
use crate::screenshot::{capture, navigate_and_settle, BrowserSession, Readiness, RemoteSession, ScreenshotRequest};

/// Screenshot directory used by tests in `test_file`: `../screenshots` next to it
pub fn screenshot_dir_for(test_file: &Path) -> PathBuf {
    test_file
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("..")
        .join("screenshots")
}

/// Standalone fixture: a session plus caller-named screenshots
pub struct ScreenshotFixture<S: BrowserSession> {
    session: S,
    screenshot_dir: PathBuf,
    readiness: Readiness,
}

impl<S: BrowserSession> ScreenshotFixture<S> {
    /// Prepares the screenshot directory for `test_file`
    ///
    /// The session is quit if the directory can't be created.
    pub async fn new(session: S, test_file: &Path, readiness: Readiness) -> Result<Self> {
        let screenshot_dir = screenshot_dir_for(test_file);
        if let Err(e) = fs::create_dir_all(&screenshot_dir) {
            let err = anyhow::Error::new(e)
                .context(format!("Failed to create directory: {}", screenshot_dir.display()));
            return finish(Err(err), session.quit().await);
        }
        Ok(Self {
            session,
            screenshot_dir,
            readiness,
        })
    }

    /// Builds a fixture, runs `body` with it and always quits the session afterwards,
    /// even if `body` panics
    pub async fn scoped<T, F>(session: S, test_file: &Path, readiness: Readiness, body: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a ScreenshotFixture<S>) -> BoxFuture<'a, Result<T>>,
    {
        let fixture = Self::new(session, test_file, readiness).await?;
        let outcome = catch_panic(async { body(&fixture).await }).await;
        let released = fixture.finish().await;
        match outcome {
            Ok(outcome) => finish(outcome, released),
            Err(panic) => rethrow(panic, released),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn screenshot_dir(&self) -> &Path {
        &self.screenshot_dir
    }

    pub async fn navigate(&self, url: &str) -> Result<(), CaptureError> {
        navigate_and_settle(&self.session, url, &self.readiness).await
    }

    /// Saves the current viewport as `{name}.png`
    pub async fn screenshot(&self, name: &str) -> Result<PathBuf, CaptureError> {
        let request = ScreenshotRequest::new(&self.screenshot_dir, name)?;
        capture(&self.session, &request).await
    }

    pub async fn finish(self) -> Result<(), CaptureError> {
        self.session.quit().await
    }
}

impl ScreenshotFixture<RemoteSession> {
    /// Connects to the configured endpoint and runs `body` with a fresh fixture
    pub async fn run<T, F>(config: &HarnessConfig, test_file: &Path, body: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a ScreenshotFixture<RemoteSession>) -> BoxFuture<'a, Result<T>>,
    {
        let session = RemoteSession::connect(&config.session_settings())
            .await
            .with_context(|| format!("Failed to open browser session on {}", config.webdriver_url))?;
        Self::scoped(session, test_file, config.readiness(), body).await
    }
}
