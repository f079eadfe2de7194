//! Command execution abstraction.
//!
//! Every component that runs ffmpeg or ffprobe does so through a
//! [`CommandExecutor`], so tests can swap in [`MockExecutor`] and callers can
//! bring their own implementation (remote workers, sandboxes).

mod mock;
#[cfg(unix)]
mod process;

pub use mock::{MockCall, MockExecutor, MockFailure, MockResponse};
#[cfg(unix)]
pub use process::ProcessExecutor;

use crate::{ExecContext, Result};
use async_trait::async_trait;
use mosaic_common::Usage;
use tokio::sync::mpsc;

/// Maximum size of one progress chunk forwarded from stdout.
pub const CHUNK_SIZE: usize = 4096;

/// Result of a successful command run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// Everything the process wrote to stdout.
    pub stdout: Vec<u8>,
    /// Resource usage, when the platform reports it.
    pub usage: Option<Usage>,
}

impl CommandOutput {
    /// Stdout decoded as lossy UTF-8.
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Runs external commands under an [`ExecContext`].
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `name` with `args` to completion.
    async fn execute(&self, ctx: &ExecContext, name: &str, args: &[String]) -> Result<CommandOutput>;

    /// Run `name` with `args`, forwarding raw stdout chunks to `progress`.
    ///
    /// Chunks arrive in emission order. The sender is dropped exactly once
    /// before this returns, whatever the outcome, so a receiver loop ends
    /// when the command does.
    async fn execute_with_progress(
        &self,
        ctx: &ExecContext,
        progress: Option<mpsc::Sender<String>>,
        name: &str,
        args: &[String],
    ) -> Result<CommandOutput>;
}

/// Collect string-like arguments into an owned argument vector.
pub fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}
