use std::path::Path;

use harness_util::{HarnessError, HarnessResult};
use thiserror::Error;

/// Captured result of one sandbox client invocation.
#[derive(Debug, Clone)]
pub struct ClientOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// A sandbox client command that ran but reported failure. Distinct from
/// [`HarnessError`]: this is a routine outcome the action pipeline turns
/// into a `failure`-status `ActionResult`, not an HTTP-level error.
#[derive(Debug, Clone, Error)]
pub enum SandboxError {
    #[error("{0}")]
    ClientFailed(String),
    #[error("sandbox client exited with a non-zero status and produced no diagnostic output")]
    OpaqueFailure,
}

/// Invokes the sandbox client binary with the given argv, capturing stdout
/// and stderr separately.
pub async fn run_client(binary: &Path, args: &[String]) -> HarnessResult<ClientOutput> {
    let output = tokio::process::Command::new(binary)
        .args(args)
        .output()
        .await
        .map_err(|err| {
            HarnessError::internal(
                anyhow::Error::new(err)
                    .context(format!("spawning sandbox client {}", binary.display())),
            )
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let success = output.status.success();

    tracing::debug!(?args, success, stderr = %stderr, "sandbox client invocation");

    Ok(ClientOutput {
        stdout,
        stderr,
        success,
    })
}

/// Turns a client invocation's exit status into `Ok` or a [`SandboxError`],
/// per the non-zero-exit-with/without-stderr distinction.
pub fn ensure_success(output: &ClientOutput) -> Result<(), SandboxError> {
    if output.success {
        Ok(())
    } else if !output.stderr.trim().is_empty() {
        Err(SandboxError::ClientFailed(output.stderr.clone()))
    } else {
        Err(SandboxError::OpaqueFailure)
    }
}
