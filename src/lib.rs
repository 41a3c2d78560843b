//! Screenshot capture for browser-driven integration tests
//!
//! Connects to a remote WebDriver endpoint, navigates, waits for the page to be
//! ready and writes `{name}.png` into a screenshot directory.

pub mod error;
pub mod harness;
pub mod screenshot;
pub mod utils;

pub use error::CaptureError;
pub use harness::{with_session, HarnessConfig, LiveServer, ScreenshotFixture, ScreenshotTestCase};
pub use screenshot::{
    capture, navigate_and_settle, BrowserProfile, BrowserSession, Readiness, RemoteSession,
    ScreenshotRequest, SessionSettings,
};
