use std::path::{Path, PathBuf};

use sanitize_filename::sanitize;

use crate::error::CaptureError;
use crate::screenshot::config::FILE_EXTENSION;

/// Where a single screenshot is going to be written
///
/// Built right before a capture and dropped after it; only the image file outlives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotRequest {
    output_directory: PathBuf,
    base_name: String,
}

impl ScreenshotRequest {
    /// Creates a request for `{base_name}.png` inside `output_directory`
    ///
    /// The name is sanitized so it can't escape the directory. A name that is
    /// empty after sanitizing is rejected.
    pub fn new(output_directory: impl Into<PathBuf>, base_name: &str) -> Result<Self, CaptureError> {
        let sanitized = sanitize(base_name);
        if sanitized.trim().is_empty() {
            return Err(CaptureError::InvalidName(base_name.to_string()));
        }
        Ok(Self {
            output_directory: output_directory.into(),
            base_name: sanitized,
        })
    }

    /// Names the screenshot after a test: `{class_name}-{method_name}`
    pub fn for_test(
        output_directory: impl Into<PathBuf>,
        class_name: &str,
        method_name: &str,
    ) -> Result<Self, CaptureError> {
        Self::new(output_directory, &format!("{}-{}", class_name, method_name))
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn file_path(&self) -> PathBuf {
        self.output_directory
            .join(format!("{}.{}", self.base_name, FILE_EXTENSION))
    }
}
