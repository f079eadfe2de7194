//! Deterministic in-memory executor for tests.

use super::{CommandExecutor, CommandOutput};
use crate::error::{CommandError, ExitFailure};
use crate::{Error, ExecContext, Result};
use async_trait::async_trait;
use mosaic_common::Usage;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tokio::sync::mpsc;

/// How a mocked command fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Non-zero exit with the given stderr.
    Exit { code: i32, stderr: String },
    /// The binary does not exist.
    NotFound,
}

/// One canned result for a mocked command.
#[derive(Debug, Clone, Default)]
pub struct MockResponse {
    pub output: Vec<u8>,
    pub failure: Option<MockFailure>,
    /// Chunks replayed to the progress sink, in order.
    pub progress: Vec<String>,
    pub usage: Option<Usage>,
}

impl MockResponse {
    /// Succeed with `output` on stdout.
    pub fn ok(output: impl Into<Vec<u8>>) -> Self {
        Self {
            output: output.into(),
            ..Self::default()
        }
    }

    /// Exit with `code`, writing `stderr`.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            failure: Some(MockFailure::Exit {
                code,
                stderr: stderr.into(),
            }),
            ..Self::default()
        }
    }

    /// Fail as if the binary were missing.
    pub fn not_found() -> Self {
        Self {
            failure: Some(MockFailure::NotFound),
            ..Self::default()
        }
    }

    /// Replay these chunks when called with a progress sink.
    pub fn with_progress<I, S>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.progress = chunks.into_iter().map(Into::into).collect();
        self
    }

    /// Report this resource usage.
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// A recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub name: String,
    pub args: Vec<String>,
}

/// Executor returning canned responses keyed by command name.
///
/// Each name holds a sequence: every call consumes the next response and the
/// last one repeats forever. Every call is recorded, including ones that fail.
///
/// # Example
///
/// ```
/// use mosaic_av::{CommandExecutor, ExecContext, MockExecutor, MockResponse};
///
/// # tokio_test::block_on(async {
/// let mock = MockExecutor::new()
///     .with_response("ffprobe", MockResponse::failed(1, "busy"))
///     .with_response("ffprobe", MockResponse::ok("{}"));
///
/// let ctx = ExecContext::new();
/// assert!(mock.execute(&ctx, "ffprobe", &[]).await.is_err());
/// assert!(mock.execute(&ctx, "ffprobe", &[]).await.is_ok());
/// assert!(mock.execute(&ctx, "ffprobe", &[]).await.is_ok());
/// assert_eq!(mock.call_count("ffprobe"), 3);
/// # });
/// ```
#[derive(Debug)]
pub struct MockExecutor {
    responses: Mutex<Option<HashMap<String, VecDeque<MockResponse>>>>,
    calls: Mutex<Vec<MockCall>>,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutor {
    /// An executor with an empty response map.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Some(HashMap::new())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// An executor with no response map at all; every call fails.
    pub fn unconfigured() -> Self {
        Self {
            responses: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Append a response to the sequence for `name`.
    pub fn with_response(self, name: impl Into<String>, response: MockResponse) -> Self {
        self.push_response(name, response);
        self
    }

    /// Append a response to the sequence for `name` on a shared executor.
    pub fn push_response(&self, name: impl Into<String>, response: MockResponse) {
        self.responses
            .lock()
            .get_or_insert_with(HashMap::new)
            .entry(name.into())
            .or_default()
            .push_back(response);
    }

    /// Number of calls made to `name`.
    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.name == name).count()
    }

    /// Every recorded call, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Forget recorded calls. Configured responses are kept.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }

    fn next_response(&self, name: &str) -> Result<MockResponse> {
        let mut guard = self.responses.lock();
        let responses = guard
            .as_mut()
            .ok_or_else(|| Error::config("mock executor has no responses configured"))?;

        let queue = responses
            .get_mut(name)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| Error::config(format!("no mock response for command: {}", name)))?;

        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        response.ok_or_else(|| Error::config(format!("no mock response for command: {}", name)))
    }

    async fn run(
        &self,
        ctx: &ExecContext,
        progress: Option<mpsc::Sender<String>>,
        name: &str,
        args: &[String],
    ) -> Result<CommandOutput> {
        self.calls.lock().push(MockCall {
            name: name.to_string(),
            args: args.to_vec(),
        });

        if let Some(reason) = ctx.cancel_reason() {
            return Err(Error::cancelled(name, reason));
        }

        let response = self.next_response(name)?;

        if let Some(tx) = progress {
            for chunk in &response.progress {
                if tx.send(chunk.clone()).await.is_err() {
                    break;
                }
            }
        }

        match response.failure {
            None => Ok(CommandOutput {
                stdout: response.output,
                usage: response.usage,
            }),
            Some(MockFailure::NotFound) => Err(Error::tool_not_found(name)),
            Some(MockFailure::Exit { code, stderr }) => Err(Error::Process(CommandError {
                command: name.to_string(),
                args: args.to_vec(),
                stderr,
                cause: ExitFailure::Exited(code),
                usage: response.usage,
            })),
        }
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(&self, ctx: &ExecContext, name: &str, args: &[String]) -> Result<CommandOutput> {
        self.run(ctx, None, name, args).await
    }

    async fn execute_with_progress(
        &self,
        ctx: &ExecContext,
        progress: Option<mpsc::Sender<String>>,
        name: &str,
        args: &[String],
    ) -> Result<CommandOutput> {
        self.run(ctx, progress, name, args).await
    }
}
