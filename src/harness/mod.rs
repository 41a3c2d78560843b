//! Test-harness glue around [`crate::screenshot`]
//!
//! Two ways to use it: [`ScreenshotTestCase`] names files after the test
//! class and method, [`ScreenshotFixture`] takes caller-chosen names.
//! Both release the browser session on every exit path.

pub mod config;
pub mod fixture;
pub mod live_server;
pub mod test_case;

pub use config::HarnessConfig;
pub use fixture::ScreenshotFixture;
pub use live_server::LiveServer;
pub use test_case::ScreenshotTestCase;

use std::any::Any;
use std::panic::{resume_unwind, AssertUnwindSafe};

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{error, warn};

use crate::screenshot::BrowserSession;

/// Runs `body` against `session`, then quits the session whatever the outcome
///
/// An error from `body` takes precedence over an error from quitting. A panic in
/// `body` is re-raised once the session has been quit.
pub async fn with_session<S, T, F>(session: S, body: F) -> Result<T>
where
    S: BrowserSession,
    F: for<'a> FnOnce(&'a S) -> BoxFuture<'a, Result<T>>,
{
    let outcome = catch_panic(async { body(&session).await }).await;
    let released = session.quit().await;
    match outcome {
        Ok(outcome) => finish(outcome, released),
        Err(panic) => rethrow(panic, released),
    }
}

/// Awaits `fut`, turning a panic inside it into `Err` with the panic payload
pub(crate) async fn catch_panic<T>(
    fut: impl std::future::Future<Output = T>,
) -> std::result::Result<T, Box<dyn Any + Send>> {
    AssertUnwindSafe(fut).catch_unwind().await
}

/// Resumes a caught panic after teardown has run
pub(crate) fn rethrow(panic: Box<dyn Any + Send>, released: Result<(), crate::error::CaptureError>) -> ! {
    if let Err(e) = released {
        error!("Failed to release browser session after panic: {}", e);
    }
    resume_unwind(panic)
}

pub(crate) fn finish<T>(outcome: Result<T>, released: Result<(), crate::error::CaptureError>) -> Result<T> {
    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(quit_err)) => {
            warn!("Failed to release browser session after error: {}", quit_err);
            Err(e)
        }
    }
}
