//! Bounded subprocess invocation.
//!
//! Every call to the external tool goes through [`run_probe`]: stdin is null,
//! stdout and stderr are piped (never inherited), and the wait for the child
//! to exit is capped. A child that outlives the bound is killed and reaped
//! before returning, so a hanging binary can never pile up orphaned processes.
//!
//! Pipe reading is decoupled from the exit deadline. Descendants that inherit
//! the pipes (launcher wrappers, backgrounded helpers) may keep them open
//! after the child exits; output is then collected for [`PIPE_GRACE`] at most.

use std::ffi::OsStr;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Output beyond this is read and discarded; `--version` output is a single line.
const MAX_CAPTURE_BYTES: usize = 64 * 1024;

/// How long pipes are still read once the child has exited or been killed.
pub const PIPE_GRACE: Duration = Duration::from_millis(250);

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// What happened when the tool was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Process ran to completion. `code` is `None` when killed by a signal.
    Exited { code: Option<i32>, stdout: String },
    /// Process could not be started (missing binary, permissions, ...).
    SpawnFailed(String),
    /// Process started but waiting on it failed.
    WaitFailed(String),
    /// Process did not exit within the bound and was killed.
    TimedOut,
}

impl ProbeOutcome {
    /// True only for a clean exit with status 0.
    pub fn succeeded(&self) -> bool {
        matches!(self, ProbeOutcome::Exited { code: Some(0), .. })
    }

    /// Trimmed standard output of a successful run.
    pub fn version_text(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Exited {
                code: Some(0),
                stdout,
            } => Some(stdout.trim()),
            _ => None,
        }
    }
}

/// Run `<program> --version` with a bounded wait.
pub async fn probe_version(program: impl AsRef<OsStr>, timeout: Duration) -> ProbeOutcome {
    run_probe(program.as_ref(), &["--version"], timeout).await
}

/// Run `program` with `args`, capturing stdout, waiting at most `timeout`
/// for it to exit.
pub async fn run_probe(program: &OsStr, args: &[&str], timeout: Duration) -> ProbeOutcome {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::debug!(program = ?program, error = %e, "probe_spawn_failed");
            return ProbeOutcome::SpawnFailed(e.to_string());
        }
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let started = Instant::now();

    // `stop` abandons the pipes; `drained` reports both reached EOF.
    let stop = CancellationToken::new();
    let drained = CancellationToken::new();

    let wait = async {
        let waited = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(result) => Some(result),
            Err(_elapsed) => {
                // kill() also waits, so the child is reaped here
                if let Err(e) = child.kill().await {
                    tracing::warn!(program = ?program, error = %e, "probe_kill_failed");
                }
                None
            }
        };
        tokio::select! {
            _ = drained.cancelled() => {}
            _ = tokio::time::sleep(PIPE_GRACE) => {
                tracing::debug!(program = ?program, "probe_pipes_abandoned");
                stop.cancel();
            }
        }
        waited
    };
    let collect = async {
        let (stdout, _stderr) = tokio::join!(drain(stdout, &stop), drain(stderr, &stop));
        drained.cancel();
        stdout
    };
    let (waited, stdout) = tokio::join!(wait, collect);

    match waited {
        Some(Ok(status)) => {
            tracing::debug!(
                program = ?program,
                code = ?status.code(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "probe_exited"
            );
            ProbeOutcome::Exited {
                code: status.code(),
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
            }
        }
        Some(Err(e)) => {
            tracing::debug!(program = ?program, error = %e, "probe_wait_failed");
            ProbeOutcome::WaitFailed(e.to_string())
        }
        None => {
            tracing::debug!(
                program = ?program,
                timeout_ms = timeout.as_millis() as u64,
                "probe_timed_out"
            );
            ProbeOutcome::TimedOut
        }
    }
}

/// Read `pipe` to EOF or until `stop` fires. Keeps the first
/// `MAX_CAPTURE_BYTES` and discards the rest without closing the pipe, so a
/// chatty child never sees a broken pipe.
async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>, stop: &CancellationToken) -> Vec<u8> {
    let mut buf = Vec::new();
    let Some(mut pipe) = pipe else {
        return buf;
    };
    let mut chunk = [0u8; 8192];
    loop {
        let read = tokio::select! {
            _ = stop.cancelled() => break,
            read = pipe.read(&mut chunk) => read,
        };
        match read {
            Ok(0) => break,
            Ok(n) => {
                let room = MAX_CAPTURE_BYTES.saturating_sub(buf.len());
                buf.extend_from_slice(&chunk[..n.min(room)]);
            }
            Err(e) => {
                tracing::debug!(error = %e, "probe_pipe_read_failed");
                break;
            }
        }
    }
    buf
}
