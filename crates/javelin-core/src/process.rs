//! Synchronous subprocess execution.
//!
//! Build compilation and artifact runs are blocking, run-to-completion
//! calls. Callers wanting cancellation must kill the child out-of-band.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::Result;

/// Outcome of a finished subprocess.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Exit code; -1 when the process was terminated by a signal.
    pub exit_code: i32,

    /// Combined stdout/stderr. Empty when the streams were redirected to the
    /// caller's.
    pub output: String,

    /// Whether the process exited with status zero.
    pub success: bool,
}

/// Run `binary args…` from `working_dir` and wait for it to finish.
///
/// With `redirect` the child inherits the caller's standard streams and the
/// returned output is empty; otherwise stdout and stderr are captured.
pub fn run(working_dir: &Path, binary: &str, args: &[String], redirect: bool) -> Result<ProcessResult> {
    tracing::debug!(binary = %binary, ?args, dir = %working_dir.display(), "spawning");

    let mut command = Command::new(binary);
    command.args(args).current_dir(working_dir);

    if redirect {
        let status = command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        let exit_code = status.code().unwrap_or(-1);
        Ok(ProcessResult {
            exit_code,
            output: String::new(),
            success: status.success(),
        })
    } else {
        let output = command.output()?;
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(ProcessResult {
            exit_code: output.status.code().unwrap_or(-1),
            output: combined,
            success: output.status.success(),
        })
    }
}
