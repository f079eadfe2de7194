//! Packaging job description.

use mosaic_common::{ProfileKind, ProgressInfo};
use std::fmt;
use std::path::PathBuf;

/// Progress callback, invoked once per progress chunk in arrival order.
pub type ProgressHandler = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// One source to package.
pub struct Job {
    /// Path or URL of the source video.
    pub input: String,
    /// Directory receiving manifests and segments.
    pub output_dir: PathBuf,
    /// Packaging profile.
    pub profile: ProfileKind,
    /// Optional progress callback; enables ffmpeg progress reporting.
    pub progress_handler: Option<ProgressHandler>,
}

impl Job {
    /// A VOD job with no progress reporting.
    pub fn new(input: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            profile: ProfileKind::Vod,
            progress_handler: None,
        }
    }

    pub fn with_profile(mut self, profile: ProfileKind) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_progress_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(ProgressInfo) + Send + Sync + 'static,
    {
        self.progress_handler = Some(Box::new(handler));
        self
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("input", &self.input)
            .field("output_dir", &self.output_dir)
            .field("profile", &self.profile)
            .field("progress_handler", &self.progress_handler.is_some())
            .finish()
    }
}
