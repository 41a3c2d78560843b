use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use tracing::{info, warn};

use crate::error::CaptureError;
use crate::harness::config::HarnessConfig;
use crate::harness::{catch_panic, finish, rethrow};
use crate::screenshot::{capture, navigate_and_settle, BrowserSession, RemoteSession, ScreenshotRequest};

/// Screenshots a test's final browser state as `{Class}-{Method}.png`
///
/// Each test runs `body`, then teardown captures the screenshot and quits the
/// session. Teardown runs even when `body` fails or panics.
#[derive(Debug, Clone)]
pub struct ScreenshotTestCase {
    class_name: String,
    config: HarnessConfig,
}

impl ScreenshotTestCase {
    pub fn new(class_name: impl Into<String>, config: HarnessConfig) -> Self {
        Self {
            class_name: class_name.into(),
            config,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        self.config.screenshot_dir()
    }

    /// Creates the screenshot directory if needed
    pub fn setup(&self) -> Result<PathBuf> {
        let dir = self.screenshot_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        Ok(dir)
    }

    /// Opens a remote session from the config and runs one test method against it
    pub async fn run<T, F>(&self, method_name: &str, body: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a RemoteSession) -> BoxFuture<'a, Result<T>>,
    {
        self.setup()?;
        let session = RemoteSession::connect(&self.config.session_settings()).await?;
        self.run_with_session(session, method_name, body).await
    }

    /// Runs one test method against an already open session
    ///
    /// Errors are reported in order of precedence: the body, the capture, then quitting.
    pub async fn run_with_session<S, T, F>(&self, session: S, method_name: &str, body: F) -> Result<T>
    where
        S: BrowserSession,
        F: for<'a> FnOnce(&'a S) -> BoxFuture<'a, Result<T>>,
    {
        if let Err(e) = self.setup() {
            return finish(Err(e), session.quit().await);
        }

        let outcome = catch_panic(async { body(&session).await }).await;
        let captured = self.take_screenshot(&session, method_name).await;
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(panic) => {
                if let Err(e) = captured {
                    warn!(
                        "Could not capture screenshot for panicked test {}.{}: {}",
                        self.class_name, method_name, e
                    );
                }
                rethrow(panic, session.quit().await);
            }
        };
        let outcome = match (outcome, captured) {
            (Ok(value), Ok(_)) => Ok(value),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(capture_err)) => {
                warn!(
                    "Could not capture screenshot for failed test {}.{}: {}",
                    self.class_name, method_name, capture_err
                );
                Err(e)
            }
        };

        finish(outcome, session.quit().await)
    }

    /// Navigates and waits using the configured readiness policy
    pub async fn navigate<S>(&self, session: &S, url: &str) -> Result<(), CaptureError>
    where
        S: BrowserSession + ?Sized,
    {
        navigate_and_settle(session, url, &self.config.readiness()).await
    }

    async fn take_screenshot<S>(&self, session: &S, method_name: &str) -> Result<PathBuf, CaptureError>
    where
        S: BrowserSession + ?Sized,
    {
        let request = ScreenshotRequest::for_test(self.screenshot_dir(), &self.class_name, method_name)?;
        let path = capture(session, &request).await?;
        info!("{}.{} screenshot at {}", self.class_name, method_name, path.display());
        Ok(path)
    }
}
