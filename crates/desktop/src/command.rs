//! Thin wrappers around external commands.

use crate::{DesktopError, DesktopResult};
use std::process::Stdio;
use tokio::process::Command;

/// Whether `command` resolves on `PATH`.
pub async fn command_exists(command: &str) -> bool {
    Command::new("which")
        .arg(command)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// First command in `candidates` that exists on `PATH`.
pub async fn first_available<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    for &candidate in candidates {
        if command_exists(candidate).await {
            return Some(candidate);
        }
    }
    None
}

pub async fn run_checked(command: &str, args: &[&str]) -> DesktopResult<()> {
    let output = Command::new(command)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await?;
    if output.status.success() {
        return Ok(());
    }
    Err(DesktopError::OperationFailed(format!(
        "{} exited with {}: {}",
        command,
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
    )))
}

/// Run a command and return its trimmed stdout.
pub async fn run_output(command: &str, args: &[&str]) -> DesktopResult<String> {
    let output = Command::new(command)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await?;
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
    }
    Err(DesktopError::OperationFailed(
        String::from_utf8_lossy(&output.stderr).trim().to_string(),
    ))
}
