use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, ToolsError};

/// Abstract media processing command representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<OsString>,
    pub description: String,
}

/// What came back from one processor invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// None when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().as_os_str())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().as_os_str())
    }

    /// Select streams, e.g. `0` or `-0:d`
    pub fn map<S: Into<OsString>>(self, spec: S) -> Self {
        self.arg("-map").arg(spec)
    }

    /// Set video codec
    pub fn video_codec<S: Into<OsString>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<OsString>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Set subtitle codec
    pub fn subtitle_codec<S: Into<OsString>>(self, codec: S) -> Self {
        self.arg("-c:s").arg(codec)
    }

    /// Copy every stream without re-encoding
    pub fn copy_all(self) -> Self {
        self.arg("-c").arg("copy")
    }

    /// Copy video stream
    pub fn copy_video(self) -> Self {
        self.video_codec("copy")
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Copy subtitle streams
    pub fn copy_subtitles(self) -> Self {
        self.subtitle_codec("copy")
    }

    /// Set audio bitrate, e.g. `640k`
    pub fn audio_bitrate<S: Into<OsString>>(self, bitrate: S) -> Self {
        self.arg("-b:a").arg(bitrate)
    }

    /// Set encoder preset and constant rate factor
    pub fn quality(self, preset: &str, crf: u8) -> Self {
        self.arg("-preset").arg(preset).arg("-crf").arg(crf.to_string())
    }

    /// Add video filter
    pub fn video_filter<S: Into<OsString>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// The last argument, which is the output path for every command built here
    pub fn output_path(&self) -> Option<PathBuf> {
        self.args.last().map(PathBuf::from)
    }

    /// Render as a single line for logs and dry runs
    pub fn display_line(&self) -> String {
        let mut line = self.binary_path.clone();
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            line.push(' ');
            if arg.contains(char::is_whitespace) {
                line.push_str(&format!("\"{}\"", arg));
            } else {
                line.push_str(&arg);
            }
        }
        line
    }

    /// Execute the command and wait for it. With `show_output` the child
    /// shares the terminal; otherwise its output is discarded.
    pub async fn execute(&self, show_output: bool) -> Result<ProcessOutcome> {
        debug!("Executing media processing command: {}", self.display_line());
        debug!("Description: {}", self.description);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args).stdin(Stdio::null());
        if !show_output {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let status = cmd.status().await
            .map_err(|e| ToolsError::Media(format!("Failed to execute media processor: {}", e)))?;

        Ok(ProcessOutcome { exit_code: status.code() })
    }
}

/// Builder for media processing commands sharing one binary and common flags
#[derive(Debug, Clone)]
pub struct MediaCommandBuilder {
    binary_path: String,
    hide_banner: bool,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S, hide_banner: bool) -> Self {
        Self {
            binary_path: binary_path.into(),
            hide_banner,
        }
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check")
            .arg("-version")
    }

    /// Start a command carrying the common flags
    pub fn custom<S: Into<String>>(&self, description: S) -> MediaCommand {
        let cmd = MediaCommand::new(&self.binary_path, description.into());
        if self.hide_banner {
            cmd.arg("-hide_banner")
        } else {
            cmd
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_adds_common_flags() {
        let with_banner = MediaCommandBuilder::new("ffmpeg", false).custom("Rewrap");
        assert!(with_banner.args.is_empty());

        let hidden = MediaCommandBuilder::new("ffmpeg", true).custom("Rewrap");
        assert_eq!(hidden.args, vec![OsString::from("-hide_banner")]);
    }

    #[test]
    fn test_display_line_quotes_spaces() {
        let cmd = MediaCommand::new("ffmpeg", "Rewrap")
            .input("/tmp/my movie.mov")
            .map("0")
            .copy_all()
            .output("/tmp/out.avi");

        assert_eq!(
            cmd.display_line(),
            "ffmpeg -i \"/tmp/my movie.mov\" -map 0 -c copy /tmp/out.avi"
        );
        assert_eq!(cmd.output_path(), Some(PathBuf::from("/tmp/out.avi")));
    }

    #[test]
    fn test_outcome_success() {
        assert!(ProcessOutcome { exit_code: Some(0) }.success());
        assert!(!ProcessOutcome { exit_code: Some(1) }.success());
        assert!(!ProcessOutcome { exit_code: None }.success());
    }
}
