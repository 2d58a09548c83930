use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, ToolsError};

/// Default file looked up in the working directory when no --config is given
pub const DEFAULT_CONFIG_FILE: &str = "fftools.toml";

// Default values for fields that may be omitted from a config file
fn default_hide_banner() -> bool {
    true
}

fn default_show_output() -> bool {
    true
}

fn default_min_output_bytes() -> u64 {
    100_000
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".fftools").join("log")
}

fn default_shutdown_command() -> Vec<String> {
    if cfg!(windows) {
        vec!["shutdown".to_string(), "/s".to_string(), "/t".to_string(), "0".to_string()]
    } else {
        vec!["shutdown".to_string(), "-h".to_string(), "now".to_string()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub media: MediaConfig,
    pub batch: BatchConfig,
    pub power: PowerConfig,
    /// Directory for the rolling log file
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Pass -hide_banner to every invocation
    #[serde(default = "default_hide_banner")]
    pub hide_banner: bool,
    /// Let ffmpeg write to the terminal. When false its output is discarded
    /// and a spinner is shown while each unit runs.
    #[serde(default = "default_show_output")]
    pub show_output: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Outputs smaller than this are counted as failed. This is a stand-in
    /// for real validation of the produced file.
    #[serde(default = "default_min_output_bytes")]
    pub min_output_bytes: u64,
    /// Extensions accepted as video inputs, compared case-insensitively
    pub video_extensions: Vec<String>,
    /// Extensions accepted as subtitle inputs, compared case-insensitively
    pub subtitle_extensions: Vec<String>,
    /// What to do with inputs that are not videos in single-input operations
    #[serde(default)]
    pub on_ineligible: IneligiblePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IneligiblePolicy {
    /// Skip the file and tell the user about it
    #[default]
    Warn,
    /// Skip the file without a message
    Skip,
    /// Abort before any processing
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerConfig {
    /// Command spawned when the user asks to power off after the batch
    #[serde(default = "default_shutdown_command")]
    pub shutdown_command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                hide_banner: default_hide_banner(),
                show_output: default_show_output(),
            },
            batch: BatchConfig {
                min_output_bytes: default_min_output_bytes(),
                video_extensions: vec!["mp4".to_string(), "mov".to_string(), "mkv".to_string()],
                subtitle_extensions: vec!["srt".to_string(), "sub".to_string(), "stl".to_string()],
                on_ineligible: IneligiblePolicy::default(),
            },
            power: PowerConfig {
                shutdown_command: default_shutdown_command(),
            },
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ToolsError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ToolsError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ToolsError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ToolsError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Resolve the configuration: explicit path, then the default file in
    /// the working directory, then built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.media.binary_path.trim().is_empty() {
            return Err(ToolsError::Config("media.binary_path must not be empty".to_string()));
        }
        if self.batch.video_extensions.is_empty() {
            return Err(ToolsError::Config("batch.video_extensions must not be empty".to_string()));
        }
        if self.batch.subtitle_extensions.is_empty() {
            return Err(ToolsError::Config("batch.subtitle_extensions must not be empty".to_string()));
        }
        if self.power.shutdown_command.is_empty() {
            return Err(ToolsError::Config("power.shutdown_command must not be empty".to_string()));
        }
        Ok(())
    }
}
