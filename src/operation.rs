//! The fixed, ordered set of jobs offered by the menu.
//!
//! Each [`Operation`] knows its display title, how its output file is named,
//! whether it needs an extra value from the user, and how to turn one unit of
//! work into a processor command.

use std::path::Path;

use crate::classify::WorkUnit;
use crate::error::{Result, ToolsError};
use crate::media::{MediaCommand, MediaCommandBuilder};
use crate::naming::MediaFile;

/// Container forced for subtitle muxing
const SUBTITLE_CONTAINER: &str = ".mkv";
/// Container forced for every transcode
const TRANSCODE_CONTAINER: &str = ".mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AddSubtitles,
    ConvertAudioAc3,
    TranscodeH264,
    TranscodeH265,
    TranscodeH265Scaled,
    Rewrap,
}

/// How an operation consumes the input list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Exactly one video plus one subtitle file, processed as one unit
    VideoWithSubtitles,
    /// Every video file is its own unit
    EachVideo,
}

/// Typed value collected by an operation's extra prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraParameter {
    /// Target width in pixels; height follows the aspect ratio
    Width(u32),
    /// Container extension including the leading dot
    Container(String),
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::AddSubtitles,
        Operation::ConvertAudioAc3,
        Operation::TranscodeH264,
        Operation::TranscodeH265,
        Operation::TranscodeH265Scaled,
        Operation::Rewrap,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Operation::AddSubtitles => "Add Subtitles",
            Operation::ConvertAudioAc3 => "Convert Audio to AC3",
            Operation::TranscodeH264 => "Transcode to HQ H264",
            Operation::TranscodeH265 => "Transcode to HQ H265",
            Operation::TranscodeH265Scaled => "Transcode to H265 and Scale",
            Operation::Rewrap => "Rewrap",
        }
    }

    pub fn output_suffix(&self) -> Option<&'static str> {
        match self {
            Operation::AddSubtitles => Some("_SUBS"),
            Operation::ConvertAudioAc3 => Some("_AC3"),
            _ => None,
        }
    }

    /// Extension forced on every output, when the operation has one
    pub fn output_extension(&self) -> Option<&'static str> {
        match self {
            Operation::AddSubtitles => Some(SUBTITLE_CONTAINER),
            Operation::TranscodeH264
            | Operation::TranscodeH265
            | Operation::TranscodeH265Scaled => Some(TRANSCODE_CONTAINER),
            Operation::ConvertAudioAc3 | Operation::Rewrap => None,
        }
    }

    pub fn extra_parameter_prompt(&self) -> Option<&'static str> {
        match self {
            Operation::TranscodeH265Scaled => Some("Desired width of output files: "),
            Operation::Rewrap => Some("New file wrapper: "),
            _ => None,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        match self {
            Operation::AddSubtitles => InputMode::VideoWithSubtitles,
            _ => InputMode::EachVideo,
        }
    }

    /// Turn the user's free-form answer into a typed parameter
    pub fn parse_extra(&self, raw: &str) -> Result<ExtraParameter> {
        let raw = raw.trim();
        match self {
            Operation::TranscodeH265Scaled => match raw.parse::<u32>() {
                Ok(width) if width > 0 => Ok(ExtraParameter::Width(width)),
                _ => Err(ToolsError::InvalidParameter(format!(
                    "'{}' is not a positive whole number of pixels", raw
                ))),
            },
            Operation::Rewrap => {
                let ext = raw.trim_start_matches('.');
                if ext.is_empty() || ext.contains(|c: char| c.is_whitespace() || c == '/' || c == '\\' || c == '.') {
                    return Err(ToolsError::InvalidParameter(format!(
                        "'{}' is not a container extension", raw
                    )));
                }
                Ok(ExtraParameter::Container(format!(".{}", ext)))
            }
            _ => Err(ToolsError::InvalidParameter(format!(
                "{} takes no extra parameter", self.title()
            ))),
        }
    }

    /// Check that the parameter matches what the operation expects
    pub fn check_extra(&self, extra: Option<&ExtraParameter>) -> Result<()> {
        let ok = matches!(
            (self, extra),
            (Operation::TranscodeH265Scaled, Some(ExtraParameter::Width(_)))
                | (Operation::Rewrap, Some(ExtraParameter::Container(_)))
                | (
                    Operation::AddSubtitles
                        | Operation::ConvertAudioAc3
                        | Operation::TranscodeH264
                        | Operation::TranscodeH265,
                    None
                )
        );

        if ok {
            Ok(())
        } else {
            Err(ToolsError::InvalidParameter(format!(
                "{} was given an unexpected parameter: {:?}", self.title(), extra
            )))
        }
    }

    /// Suffix and extension for the output of `input`
    pub fn output_naming(&self, input: &MediaFile, extra: Option<&ExtraParameter>) -> (String, String) {
        let suffix = self.output_suffix().unwrap_or_default().to_string();
        let extension = match (self.output_extension(), extra) {
            (Some(forced), _) => forced.to_string(),
            (None, Some(ExtraParameter::Container(ext))) => ext.clone(),
            (None, _) => input.extension.clone(),
        };
        (suffix, extension)
    }

    /// Build the processor invocation for one unit
    pub fn build_command(
        &self,
        builder: &MediaCommandBuilder,
        unit: &WorkUnit,
        output: &Path,
        extra: Option<&ExtraParameter>,
    ) -> Result<MediaCommand> {
        self.check_extra(extra)?;
        let input = &unit.primary.path;
        let cmd = builder.custom(self.title());

        let cmd = match (self, extra) {
            (Operation::AddSubtitles, _) => {
                let subtitles = unit.auxiliary.as_ref().ok_or_else(|| {
                    ToolsError::Classification("Please provide one video file and one sub file".to_string())
                })?;
                cmd.input(input)
                    .input(subtitles)
                    .map("0")
                    .map("1")
                    .copy_all()
            }
            (Operation::ConvertAudioAc3, _) => cmd
                .input(input)
                .map("0")
                .copy_video()
                .copy_subtitles()
                .audio_codec("ac3")
                .audio_bitrate("640k"),
            (Operation::TranscodeH264, _) => cmd
                .input(input)
                .map("0")
                .map("-0:d")
                .video_codec("libx264")
                .quality("slower", 15)
                .audio_codec("aac")
                .audio_bitrate("380k"),
            (Operation::TranscodeH265, _) => cmd
                .input(input)
                .map("0")
                .map("-0:d")
                .video_codec("libx265")
                .quality("slow", 26)
                .audio_codec("aac")
                .audio_bitrate("380k"),
            (Operation::TranscodeH265Scaled, Some(ExtraParameter::Width(width))) => cmd
                .input(input)
                .video_filter(format!("scale={}:-1", width))
                .map("0")
                .map("-0:d")
                .video_codec("libx265")
                .quality("slow", 26)
                .copy_audio(),
            (Operation::Rewrap, _) => cmd
                .input(input)
                .map("0")
                .copy_all(),
            // check_extra already rejected a scale without a width
            (Operation::TranscodeH265Scaled, _) => {
                return Err(ToolsError::InvalidParameter("missing output width".to_string()));
            }
        };

        Ok(cmd.output(output))
    }
}

/// One line of the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEntry {
    Run(Operation),
    Exit,
}

impl CatalogEntry {
    pub fn title(&self) -> &'static str {
        match self {
            CatalogEntry::Run(op) => op.title(),
            CatalogEntry::Exit => "Exit",
        }
    }
}

/// Every operation in menu order, followed by Exit
#[derive(Debug, Clone)]
pub struct OperationCatalog {
    entries: Vec<CatalogEntry>,
}

impl Default for OperationCatalog {
    fn default() -> Self {
        let mut entries: Vec<CatalogEntry> = Operation::ALL.iter().copied().map(CatalogEntry::Run).collect();
        entries.push(CatalogEntry::Exit);
        Self { entries }
    }
}

impl OperationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Look up a 1-based menu position
    pub fn select(&self, index: usize) -> Result<CatalogEntry> {
        if index == 0 || index > self.entries.len() {
            return Err(ToolsError::Usage(format!(
                "Choose a number between 1 and {}", self.entries.len()
            )));
        }
        Ok(self.entries[index - 1])
    }
}
