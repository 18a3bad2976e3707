use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{error, info, warn};

use crate::ports::{ShutdownAction, ShutdownError};

/// Shuts the host down by running an external command (by default
/// `sudo shutdown now`).
///
/// Only the first request runs the command. It is never retried, even
/// when it fails.
pub struct CommandShutdown {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    requested: AtomicBool,
}

impl CommandShutdown {
    /// Split a whitespace-separated command line
    pub fn from_command_line(command_line: &str, timeout: Duration) -> Result<Self, ShutdownError> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words.next().ok_or(ShutdownError::EmptyCommand)?;

        Ok(Self {
            program,
            args: words.collect(),
            timeout,
            requested: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl ShutdownAction for CommandShutdown {
    async fn shutdown(&self, reason: &str) -> Result<(), ShutdownError> {
        if self.requested.swap(true, Ordering::SeqCst) {
            info!("Shutdown already requested, ignoring: {}", reason);
            return Ok(());
        }

        warn!("Running {} {} ({})", self.program, self.args.join(" "), reason);

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| ShutdownError::Timeout(self.timeout))??;

        if !output.status.success() {
            error!(
                "Shutdown command failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(ShutdownError::ExitStatus(output.status.to_string()));
        }

        Ok(())
    }
}
