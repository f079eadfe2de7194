//! Scratch space for a single packaging job.

use crate::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Private temporary directory for intermediate files of one job.
///
/// The directory and everything in it is removed when the workspace is
/// dropped, whether the job succeeded or not.
///
/// # Example
///
/// ```
/// use mosaic_av::Workspace;
///
/// let workspace = Workspace::new()?;
/// let upright = workspace.intermediate_for("/videos/clip.mov");
/// assert!(upright.starts_with(workspace.path()));
/// assert_eq!(upright.extension().unwrap(), "mov");
/// # Ok::<(), mosaic_av::Error>(())
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Create a workspace under the system temp directory.
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::Builder::new().prefix("mosaic-").tempdir()?;
        tracing::debug!("Created workspace {}", temp_dir.path().display());
        Ok(Self { temp_dir })
    }

    /// Get the workspace directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a path for a named file inside the workspace.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Path for an intermediate copy of `input`, keeping its extension so
    /// ffmpeg picks the same muxer. URLs and extensionless inputs get `.mp4`.
    pub fn intermediate_for(&self, input: &str) -> PathBuf {
        let ext = Path::new(input)
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "mp4".to_string());
        self.temp_file(&format!("source.{}", ext))
    }
}
