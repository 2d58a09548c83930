use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, debug, warn};

use crate::config::MediaConfig;
use crate::error::{Result, ToolsError};
use super::{MediaProcessorTrait, MediaCommand, MediaCommandBuilder, ProcessOutcome};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path, config.hide_banner);

        Self {
            config,
            command_builder,
        }
    }

    fn spinner(&self, message: String) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn invoke(&self, command: &MediaCommand) -> Result<ProcessOutcome> {
        info!("Running {}", command.description);

        let outcome = if self.config.show_output {
            command.execute(true).await?
        } else {
            let pb = self.spinner(command.description.clone());
            let result = command.execute(false).await;
            pb.finish_and_clear();
            result?
        };

        match outcome.exit_code {
            Some(0) => debug!("{} exited cleanly", command.description),
            Some(code) => warn!("{} exited with status {}", command.description, code),
            None => warn!("{} was terminated by a signal", command.description),
        }

        Ok(outcome)
    }

    async fn check_availability(&self) -> Result<()> {
        let outcome = self.command_builder.version_check().execute(false).await
            .map_err(|e| ToolsError::Media(format!("Media processor not found: {}", e)))?;

        if outcome.success() {
            info!("Media processor is available: {}", self.command_builder.binary_path());
            Ok(())
        } else {
            Err(ToolsError::Media("Media processor version check failed".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(binary: &str) -> MediaConfig {
        MediaConfig {
            binary_path: binary.to_string(),
            hide_banner: true,
            show_output: false,
        }
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let processor = MediaProcessorImpl::new(config("/nonexistent/fftools-test-ffmpeg"));
        let result = tokio_test::block_on(processor.check_availability());
        assert!(matches!(result, Err(ToolsError::Media(_))));
    }

    #[tokio::test]
    async fn test_invoke_missing_binary_is_media_error() {
        let processor = MediaProcessorImpl::new(config("/nonexistent/fftools-test-ffmpeg"));
        let command = MediaCommand::new("/nonexistent/fftools-test-ffmpeg", "Rewrap").arg("-version");
        let result = processor.invoke(&command).await;
        assert!(matches!(result, Err(ToolsError::Media(_))));
    }
}
