use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

use crate::errors::{PackcoreError, Result};

/// Captured result of a finished external tool.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Run `program` with `args`, capturing output, and kill it once `timeout` elapses.
///
/// A non-zero exit status is not an error here; callers decide what a failed
/// run means for them. Spawn failures and timeouts are reported as
/// [`PackcoreError::Tool`].
pub fn run_tool<I, S>(program: &Path, args: I, timeout: Duration) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
    let command_line = describe(program, &args);
    log::debug!("Running {command_line} (timeout {}s)", timeout.as_secs());

    let tool_err = |reason: String| PackcoreError::Tool { command: command_line.clone(), reason };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| tool_err(format!("failed to start process runtime: {e}")))?;

    runtime.block_on(async {
        let child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| tool_err(format!("failed to spawn: {e}")))?;

        // Dropping the wait future on timeout drops the child, which kills it.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ToolOutput {
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            }),
            Ok(Err(e)) => Err(tool_err(format!("failed waiting for exit: {e}"))),
            Err(_) => Err(tool_err(format!("timed out after {}s", timeout.as_secs()))),
        }
    })
}

/// Like [`run_tool`], but a non-zero exit status is an error carrying stderr.
pub fn run_tool_checked<I, S>(program: &Path, args: I, timeout: Duration) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
    let output = run_tool(program, &args, timeout)?;
    if !output.status.success() {
        let stderr = output.stderr_lossy();
        let reason = if stderr.is_empty() {
            format!("exited with {}", output.status)
        } else {
            format!("exited with {}: {stderr}", output.status)
        };
        return Err(PackcoreError::Tool { command: describe(program, &args), reason });
    }
    Ok(output)
}

fn describe<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> String {
    let mut parts = vec![program.display().to_string()];
    parts.extend(args.iter().map(|a| a.as_ref().to_string_lossy().to_string()));
    format!("[{}]", parts.join(" "))
}
