use std::process::{Command, Stdio};
use tracing::info;

use crate::config::PowerConfig;
use crate::error::{Result, ToolsError};

/// Host power control
pub trait PowerControl: Send + Sync {
    /// Ask the host to power off. The request is not followed up.
    fn request_shutdown(&self) -> Result<()>;
}

/// Spawns the configured shutdown command and lets it run on its own
pub struct HostPower {
    command: Vec<String>,
}

impl HostPower {
    pub fn new(config: &PowerConfig) -> Self {
        Self {
            command: config.shutdown_command.clone(),
        }
    }
}

impl PowerControl for HostPower {
    fn request_shutdown(&self) -> Result<()> {
        let (program, args) = self.command.split_first()
            .ok_or_else(|| ToolsError::Power("no shutdown command configured".to_string()))?;

        info!("Requesting host shutdown: {}", self.command.join(" "));

        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| ToolsError::Power(format!("failed to run {}: {}", program, e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_is_rejected() {
        let power = HostPower::new(&PowerConfig { shutdown_command: Vec::new() });
        assert!(matches!(power.request_shutdown(), Err(ToolsError::Power(_))));
    }

    #[test]
    fn test_missing_program_is_reported() {
        let power = HostPower::new(&PowerConfig {
            shutdown_command: vec!["/nonexistent/fftools-test-shutdown".to_string()],
        });
        assert!(matches!(power.request_shutdown(), Err(ToolsError::Power(_))));
    }
}
