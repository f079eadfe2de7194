//! Real subprocess execution with cancellation, progress streaming and rusage.

use super::{CommandExecutor, CommandOutput, CHUNK_SIZE};
use crate::error::{CommandError, ExitFailure};
use crate::{Error, ExecContext, Result};
use async_trait::async_trait;
use mosaic_common::Usage;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::collections::HashMap;
use std::io::Read;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use tokio::sync::mpsc;

/// Runs commands as child processes of the current process.
///
/// Commands are resolved through `PATH` unless a tool path override was
/// registered with [`with_tool_path`](Self::with_tool_path).
///
/// # Example
///
/// ```no_run
/// use mosaic_av::{args, CommandExecutor, ExecContext, ProcessExecutor};
///
/// # async fn example() -> mosaic_av::Result<()> {
/// let exec = ProcessExecutor::new().with_tool_path("ffprobe", "/opt/ffmpeg/bin/ffprobe");
/// let out = exec
///     .execute(&ExecContext::new(), "ffprobe", &args(["-version"]))
///     .await?;
/// println!("{}", out.stdout_lossy());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    tool_paths: HashMap<String, PathBuf>,
}

impl ProcessExecutor {
    /// Executor resolving every command through `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `path` whenever `name` is requested.
    pub fn with_tool_path(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.tool_paths.insert(name.into(), path.into());
        self
    }

    fn program(&self, name: &str) -> PathBuf {
        self.tool_paths
            .get(name)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(name))
    }

    async fn run(
        &self,
        ctx: &ExecContext,
        progress: Option<mpsc::Sender<String>>,
        name: &str,
        args: &[String],
    ) -> Result<CommandOutput> {
        if let Some(reason) = ctx.cancel_reason() {
            return Err(Error::cancelled(name, reason));
        }

        let program = self.program(name);
        tracing::debug!("Running {} {}", program.display(), args.join(" "));

        // Own process group, so a kill also reaches anything the tool spawned
        // that still holds our pipes.
        let mut child = Command::new(&program)
            .args(args)
            .process_group(0)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found(name)
                } else {
                    Error::Spawn {
                        command: name.to_string(),
                        source: e,
                    }
                }
            })?;

        let pid = child.id() as libc::pid_t;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // The reader owns the sender; it is dropped when stdout hits EOF.
        let stdout_task = tokio::task::spawn_blocking(move || read_stdout(stdout, progress));
        let stderr_task = tokio::task::spawn_blocking(move || read_all(stderr));
        let mut waiter = tokio::task::spawn_blocking(move || wait_child(pid));

        let (waited, cancelled) = tokio::select! {
            biased;
            res = &mut waiter => (res, None),
            reason = ctx.done() => {
                tracing::debug!("Killing {} (process group {}): {}", name, pid, reason);
                // ESRCH means the whole group already exited.
                let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
                (waiter.await, Some(reason))
            }
        };

        let stdout_buf = stdout_task.await??;
        let stderr_buf = stderr_task.await??;
        let (status, usage) = waited??;

        if let Some(reason) = cancelled {
            return Err(Error::cancelled(name, reason));
        }

        if status.success() {
            return Ok(CommandOutput {
                stdout: stdout_buf,
                usage: Some(usage),
            });
        }

        let cause = match (status.code(), status.signal()) {
            (Some(code), _) => ExitFailure::Exited(code),
            (None, Some(signal)) => ExitFailure::Signaled(signal),
            (None, None) => ExitFailure::Exited(-1),
        };

        Err(Error::Process(CommandError {
            command: name.to_string(),
            args: args.to_vec(),
            stderr: String::from_utf8_lossy(&stderr_buf).into_owned(),
            cause,
            usage: Some(usage),
        }))
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
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

/// Read stdout to EOF, forwarding each chunk to `sink` and accumulating it.
///
/// A receiver that goes away stops forwarding but not draining, so the child
/// never blocks on a full pipe.
fn read_stdout<R: Read>(
    source: Option<R>,
    mut sink: Option<mpsc::Sender<String>>,
) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let Some(mut source) = source else {
        return Ok(out);
    };

    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        out.extend_from_slice(&buf[..n]);

        if let Some(tx) = &sink {
            let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
            if tx.blocking_send(chunk).is_err() {
                sink = None;
            }
        }
    }

    Ok(out)
}

fn read_all<R: Read>(source: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    if let Some(mut source) = source {
        source.read_to_end(&mut out)?;
    }
    Ok(out)
}

/// Reap `pid` with `wait4`, returning its exit status and resource usage.
fn wait_child(pid: libc::pid_t) -> std::io::Result<(ExitStatus, Usage)> {
    let mut status: libc::c_int = 0;
    // SAFETY: rusage is plain old data; all-zero is a valid value.
    let mut rusage: libc::rusage = unsafe { std::mem::zeroed() };

    loop {
        // SAFETY: both out-pointers reference live stack values.
        let rc = unsafe { libc::wait4(pid, &mut status, 0, &mut rusage) };
        if rc == -1 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        break;
    }

    Ok((ExitStatus::from_raw(status), usage_from_rusage(&rusage)))
}

fn usage_from_rusage(r: &libc::rusage) -> Usage {
    let seconds = |tv: &libc::timeval| tv.tv_sec as f64 + tv.tv_usec as f64 / 1_000_000.0;

    // Linux reports ru_maxrss in kilobytes, macOS in bytes.
    #[cfg(target_os = "macos")]
    let max_memory = r.ru_maxrss as u64;
    #[cfg(not(target_os = "macos"))]
    let max_memory = (r.ru_maxrss as u64).saturating_mul(1024);

    Usage {
        user_time: seconds(&r.ru_utime),
        system_time: seconds(&r.ru_stime),
        max_memory,
    }
}
