//! # mosaic-av
//!
//! Everything in mosaic that touches an external process:
//!
//! - [`CommandExecutor`]: run ffmpeg/ffprobe under an [`ExecContext`]
//!   (cancellation + deadline), optionally streaming stdout chunks
//! - [`ProcessExecutor`] for real subprocesses (Unix), [`MockExecutor`] for tests
//! - [`probe()`]: source dimensions, frame rate, rotation and audio presence
//! - [`normalize_orientation`]: physically de-rotate a source with
//!   verification and encoder fallback
//! - [`Workspace`] and tool detection helpers
//!
//! ## Example
//!
//! ```no_run
//! use mosaic_av::{probe, ExecContext, ProcessExecutor};
//! use std::time::Duration;
//!
//! # async fn example() -> mosaic_av::Result<()> {
//! let exec = ProcessExecutor::new();
//! let ctx = ExecContext::new().with_timeout(Duration::from_secs(10));
//! let info = probe(&ctx, &exec, "/path/to/video.mp4").await?;
//! println!("{}x{} @ {} fps", info.display_width(), info.display_height(), info.fps);
//! # Ok(())
//! # }
//! ```

pub mod command;
mod context;
mod error;
pub mod orientation;
pub mod probe;
pub mod tools;
pub mod workspace;

// Re-exports
pub use command::{args, CommandExecutor, CommandOutput, MockCall, MockExecutor, MockFailure, MockResponse};
#[cfg(unix)]
pub use command::ProcessExecutor;
pub use context::{CancelReason, ExecContext};
pub use error::{CommandError, Error, ExitFailure, OrientationPhase, Result};
pub use orientation::{normalize_orientation, NormalizeOutcome};
pub use probe::{parse_fps, probe};
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo};
pub use workspace::Workspace;
