//! Error types for mosaic-av.

use crate::context::CancelReason;
use mosaic_common::Usage;
use std::fmt;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while probing, normalizing or encoding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Probing the input failed or produced unusable output.
    #[error("probe failed for {input}: {reason}")]
    Probe {
        input: String,
        reason: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// An external command exited unsuccessfully.
    #[error(transparent)]
    Process(#[from] CommandError),

    /// The context was cancelled or its deadline passed while a command ran.
    #[error("{command} aborted: {reason}")]
    Cancelled { command: String, reason: CancelReason },

    /// The normalized output still carries rotation metadata.
    #[error("verification failed: output still reports rotation {rotation}")]
    Verification { rotation: u32 },

    /// Invalid input or configuration supplied by the caller.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// The process could not be started for a reason other than a missing binary.
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stage of orientation normalization failed.
    #[error("orientation {phase} failed: {source}")]
    Orientation {
        phase: OrientationPhase,
        #[source]
        source: Box<Error>,
    },

    /// The final packaging invocation failed.
    #[error("ffmpeg {format} failed: {source}")]
    Encode {
        format: String,
        #[source]
        source: Box<Error>,
    },

    /// A background task panicked or was aborted.
    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// Create a probe error without an underlying cause.
    pub fn probe(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Probe {
            input: input.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a probe error wrapping a cause. Cancellations pass through unchanged.
    pub fn probe_caused(input: impl Into<String>, reason: impl Into<String>, source: Error) -> Self {
        if source.is_cancelled() {
            return source;
        }
        Self::Probe {
            input: input.into(),
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a cancellation error for `command`.
    pub fn cancelled(command: impl Into<String>, reason: CancelReason) -> Self {
        Self::Cancelled {
            command: command.into(),
            reason,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Wrap a failure in an orientation phase. Cancellations pass through unchanged.
    pub fn orientation(phase: OrientationPhase, source: Error) -> Self {
        if source.is_cancelled() {
            return source;
        }
        Self::Orientation {
            phase,
            source: Box::new(source),
        }
    }

    /// Wrap a failed packaging run. Cancellations pass through unchanged.
    pub fn encode(format: impl Into<String>, source: Error) -> Self {
        if source.is_cancelled() {
            return source;
        }
        Self::Encode {
            format: format.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error (or anything it wraps) is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled { .. } => true,
            Self::Probe {
                source: Some(inner),
                ..
            } => inner.is_cancelled(),
            Self::Orientation { source, .. } | Self::Encode { source, .. } => {
                source.is_cancelled()
            }
            _ => false,
        }
    }

    /// The failed command's details, if this error came from a non-zero exit.
    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            Self::Process(err) => Some(err),
            Self::Probe {
                source: Some(inner),
                ..
            } => inner.command_error(),
            Self::Orientation { source, .. } | Self::Encode { source, .. } => {
                source.command_error()
            }
            _ => None,
        }
    }
}

/// Details of an external command that exited unsuccessfully.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{command} failed ({cause}): {}", .stderr.trim())]
pub struct CommandError {
    /// Command name as requested (e.g. `ffmpeg`).
    pub command: String,
    /// Arguments the command was started with.
    pub args: Vec<String>,
    /// Everything the process wrote to stderr.
    pub stderr: String,
    /// How the process ended.
    #[source]
    pub cause: ExitFailure,
    /// Resource usage, when it could be collected.
    pub usage: Option<Usage>,
}

/// How an unsuccessful process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExitFailure {
    /// Exited with a non-zero status code.
    #[error("exit status {0}")]
    Exited(i32),
    /// Terminated by a signal.
    #[error("killed by signal {0}")]
    Signaled(i32),
}

/// Stage of orientation normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationPhase {
    Probe,
    Encode,
    Verify,
    Finalize,
}

impl fmt::Display for OrientationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probe => write!(f, "probe"),
            Self::Encode => write!(f, "encode"),
            Self::Verify => write!(f, "verify"),
            Self::Finalize => write!(f, "finalize"),
        }
    }
}
