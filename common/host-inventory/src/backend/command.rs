//! Helper-command execution with timeout enforcement

use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;

use crate::error::{InventoryError, InventoryResult};

/// Run `program` with `args`, killing it if it outlives `timeout`
///
/// A missing binary maps to `Unavailable`. A non-zero exit is not an error
/// here; callers classify it from the output.
pub(crate) async fn run(program: &str, args: &[&str], timeout: Duration) -> InventoryResult<Output> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(program, ?args, "running helper command");

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(InventoryError::from_io(&format!("run {}", program), io_err)),
        // The child is dropped (and killed) with the timed-out future
        Err(_elapsed) => Err(InventoryError::Timeout {
            what: format!("{} {}", program, args.join(" ")),
            secs: timeout.as_secs_f64(),
        }),
    }
}

/// Lossy stdout/stderr text of a finished command
pub(crate) fn output_text(output: &Output) -> (String, String) {
    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}
