//! Child process execution with a wall-clock deadline.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::error::RenderError;

/// Cap per captured stream so a chatty renderer cannot exhaust memory.
const MAX_OUTPUT_BYTES: u64 = 4 * 1024 * 1024;

#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Runs `cmd` in `cwd`, capturing output, and kills it if `timeout` elapses.
///
/// A non-zero exit status becomes [`RenderError::Process`] carrying both
/// captured streams.
pub async fn run_with_timeout(
    cmd: &mut Command,
    cwd: &Path,
    timeout: Duration,
) -> Result<ProcessOutput, RenderError> {
    cmd.current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start = Instant::now();
    let mut child = cmd.spawn()?;

    let mut stdout_task = tokio::spawn(read_stream(child.stdout.take()));
    let mut stderr_task = tokio::spawn(read_stream(child.stderr.take()));

    // One deadline covers both the exit and draining the pipes, which a
    // backgrounded grandchild can hold open after the child itself exits.
    let deadline = tokio::time::Instant::now() + timeout;

    let status = match tokio::time::timeout_at(deadline, child.wait()).await {
        Ok(status) => status?,
        Err(_elapsed) => {
            if let Err(err) = child.kill().await {
                tracing::warn!("Failed to kill timed out render process: {}", err);
            }
            stdout_task.abort();
            stderr_task.abort();
            return Err(RenderError::Timeout(timeout));
        }
    };

    let drained = tokio::time::timeout_at(deadline, async {
        let stdout = (&mut stdout_task).await.unwrap_or_default();
        let stderr = (&mut stderr_task).await.unwrap_or_default();
        (stdout, stderr)
    })
    .await;
    let (stdout_bytes, stderr_bytes) = match drained {
        Ok(bytes) => bytes,
        Err(_elapsed) => {
            tracing::warn!("Render process exited but its output pipes stayed open");
            stdout_task.abort();
            stderr_task.abort();
            return Err(RenderError::Timeout(timeout));
        }
    };

    let stdout = String::from_utf8_lossy(&stdout_bytes).into_owned();
    let stderr = String::from_utf8_lossy(&stderr_bytes).into_owned();

    if !status.success() {
        return Err(RenderError::Process {
            exit_code: status.code().unwrap_or(-1),
            stderr,
            stdout,
        });
    }

    Ok(ProcessOutput {
        stdout,
        stderr,
        duration: start.elapsed(),
    })
}

async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(h) = handle {
        let _ = h.take(MAX_OUTPUT_BYTES).read_to_end(&mut buf).await;
    }
    buf
}
