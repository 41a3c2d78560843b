//! Screenshot capture against a remote WebDriver session
//!
//! A [`ScreenshotRequest`] fixes where an image goes, a [`BrowserSession`]
//! produces it and [`capture`] ties the two together.

pub mod client;
pub mod config;
pub mod model;
pub mod session;
pub mod taker;

pub use config::{BrowserProfile, Readiness, SessionSettings};
pub use model::ScreenshotRequest;
pub use session::{BrowserSession, RemoteSession};
pub use taker::{capture, navigate_and_settle};
