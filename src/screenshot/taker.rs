use std::io;
use std::path::PathBuf;

use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, trace};

use crate::error::CaptureError;
use crate::screenshot::config::Readiness;
use crate::screenshot::model::ScreenshotRequest;
use crate::screenshot::session::BrowserSession;

/// Captures the current viewport of `session` into `request.file_path()`
///
/// The output directory must already exist. Errors from the session are
/// returned as-is and never retried.
pub async fn capture<S>(session: &S, request: &ScreenshotRequest) -> Result<PathBuf, CaptureError>
where
    S: BrowserSession + ?Sized,
{
    let dir = request.output_directory();
    let file_path = request.file_path();
    if !dir.is_dir() {
        error!("Screenshot directory {} does not exist", dir.display());
        return Err(CaptureError::io(
            &file_path,
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("screenshot directory {} does not exist", dir.display()),
            ),
        ));
    }

    debug!("Saving screenshot to {}", file_path.display());
    session.save_screenshot(&file_path).await?;

    info!("Screenshot saved to {}", file_path.display());
    Ok(file_path)
}

/// Navigates to `url` and waits until the page reports `complete`
///
/// After the page is ready a fixed settle delay gives late content time to paint.
pub async fn navigate_and_settle<S>(session: &S, url: &str, readiness: &Readiness) -> Result<(), CaptureError>
where
    S: BrowserSession + ?Sized,
{
    session.goto(url).await?;
    wait_until_ready(session, url, readiness).await?;

    if !readiness.settle_delay.is_zero() {
        debug!("Waiting additional {:?} for page content to render", readiness.settle_delay);
        sleep(readiness.settle_delay).await;
    }
    Ok(())
}

async fn wait_until_ready<S>(session: &S, url: &str, readiness: &Readiness) -> Result<(), CaptureError>
where
    S: BrowserSession + ?Sized,
{
    let poll = async {
        loop {
            let state = session.ready_state().await?;
            trace!("document.readyState = {}", state);
            if state == "complete" {
                return Ok::<(), CaptureError>(());
            }
            sleep(readiness.poll_interval).await;
        }
    };

    match timeout(readiness.timeout, poll).await {
        Ok(result) => result,
        Err(_) => Err(CaptureError::NotReady {
            url: url.to_string(),
            timeout: readiness.timeout,
        }),
    }
}
