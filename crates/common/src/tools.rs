//! External tool discovery and invocation.
//!
//! QuietCut shells out to ffmpeg, ffprobe and whisper.cpp. These helpers
//! give every crate the same checks and the same error shape.

use std::ffi::OsStr;
use std::process::{Command, Output};

use crate::error::{QuietcutError, QuietcutResult};

/// Whether `binary` resolves on `PATH`.
pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Fail with [`QuietcutError::ToolMissing`] unless `binary` is on `PATH`.
pub fn require_tool(binary: &str) -> QuietcutResult<()> {
    if command_exists(binary) {
        Ok(())
    } else {
        Err(QuietcutError::tool_missing(binary))
    }
}

/// Run `binary` to completion and return its output.
///
/// A non-zero exit becomes an error carrying the trimmed stderr, built by
/// `make_error` so callers keep their own error category.
pub fn run_tool<I, S>(
    binary: &str,
    args: I,
    make_error: fn(String) -> QuietcutError,
) -> QuietcutResult<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(binary);
    cmd.args(args);
    tracing::debug!(command = ?cmd, "Running external tool");

    let output = cmd.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            QuietcutError::tool_missing(binary)
        } else {
            make_error(format!("Failed to start {binary}: {e}"))
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(make_error(format!(
            "{binary} failed (status {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(output)
}
