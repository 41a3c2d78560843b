use std::io;
use std::path::PathBuf;
use std::time::Duration;

use fantoccini::error::{CmdError, NewSessionError};
use thiserror::Error;

/// Errors raised while driving a browser session or persisting its screenshots
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The remote endpoint is unreachable, or the session was closed or expired
    #[error("browser session unavailable: {0}")]
    SessionUnavailable(String),

    /// The output path is missing or cannot be written
    #[error("failed to write screenshot to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid screenshot name {0:?}")]
    InvalidName(String),

    #[error("page at {url} was not ready after {timeout:?}")]
    NotReady { url: String, timeout: Duration },

    #[error("webdriver command failed: {0}")]
    WebDriver(#[source] CmdError),
}

impl CaptureError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CaptureError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_session_unavailable(&self) -> bool {
        matches!(self, CaptureError::SessionUnavailable(_))
    }
}

impl From<CmdError> for CaptureError {
    fn from(err: CmdError) -> Self {
        match err {
            CmdError::Standard(ref wd)
                if matches!(wd.error(), "invalid session id" | "no such window") =>
            {
                CaptureError::SessionUnavailable(err.to_string())
            }
            CmdError::NoSuchWindow(_) | CmdError::Lost(_) | CmdError::Failed(_) => {
                CaptureError::SessionUnavailable(err.to_string())
            }
            other => CaptureError::WebDriver(other),
        }
    }
}

impl From<NewSessionError> for CaptureError {
    fn from(err: NewSessionError) -> Self {
        CaptureError::SessionUnavailable(err.to_string())
    }
}
