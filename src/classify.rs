use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{BatchConfig, IneligiblePolicy};
use crate::error::{Result, ToolsError};
use crate::naming::MediaFile;
use crate::operation::{InputMode, Operation};

/// One processor invocation's worth of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub primary: MediaFile,
    /// Second input, currently only the subtitle file for muxing
    pub auxiliary: Option<PathBuf>,
}

/// Inputs split into units of work and files that were left out
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub units: Vec<WorkUnit>,
    pub ignored: Vec<PathBuf>,
}

/// Sorts command-line inputs into video and subtitle files by extension
#[derive(Debug, Clone)]
pub struct InputClassifier {
    video_extensions: Vec<String>,
    subtitle_extensions: Vec<String>,
    policy: IneligiblePolicy,
}

fn normalize(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .collect()
}

impl InputClassifier {
    pub fn new(config: &BatchConfig) -> Self {
        Self {
            video_extensions: normalize(&config.video_extensions),
            subtitle_extensions: normalize(&config.subtitle_extensions),
            policy: config.on_ineligible,
        }
    }

    pub fn policy(&self) -> IneligiblePolicy {
        self.policy
    }

    pub fn is_video<P: AsRef<Path>>(&self, path: P) -> bool {
        let ext = MediaFile::new(path).normalized_extension();
        !ext.is_empty() && self.video_extensions.contains(&ext)
    }

    pub fn is_subtitle<P: AsRef<Path>>(&self, path: P) -> bool {
        let ext = MediaFile::new(path).normalized_extension();
        !ext.is_empty() && self.subtitle_extensions.contains(&ext)
    }

    /// Split `inputs` into units for `operation`, or explain why they can't be used
    pub fn classify(&self, inputs: &[PathBuf], operation: Operation) -> Result<Classification> {
        if inputs.is_empty() {
            return Err(ToolsError::Usage("Please provide at least one input file".to_string()));
        }

        match operation.input_mode() {
            InputMode::VideoWithSubtitles => self.pair_video_and_subtitles(inputs),
            InputMode::EachVideo => self.collect_videos(inputs),
        }
    }

    fn pair_video_and_subtitles(&self, inputs: &[PathBuf]) -> Result<Classification> {
        if inputs.len() != 2 {
            return Err(ToolsError::Classification(
                "Please provide one video file and one sub file".to_string(),
            ));
        }

        let videos: Vec<&PathBuf> = inputs.iter().filter(|p| self.is_video(p)).collect();
        let subtitles: Vec<&PathBuf> = inputs
            .iter()
            .filter(|p| !self.is_video(p) && self.is_subtitle(p))
            .collect();

        match (videos.as_slice(), subtitles.as_slice()) {
            ([video], [subs]) => {
                debug!("Pairing video {} with subtitles {}", video.display(), subs.display());
                Ok(Classification {
                    units: vec![WorkUnit {
                        primary: MediaFile::new(video),
                        auxiliary: Some((*subs).clone()),
                    }],
                    ignored: Vec::new(),
                })
            }
            _ => Err(ToolsError::Classification(
                "Invalid combination of files provided".to_string(),
            )),
        }
    }

    fn collect_videos(&self, inputs: &[PathBuf]) -> Result<Classification> {
        let mut classification = Classification::default();

        for input in inputs {
            if self.is_video(input) {
                classification.units.push(WorkUnit {
                    primary: MediaFile::new(input),
                    auxiliary: None,
                });
                continue;
            }

            match self.policy {
                IneligiblePolicy::Fail => {
                    return Err(ToolsError::Classification(format!(
                        "{} is not a supported video file", input.display()
                    )));
                }
                IneligiblePolicy::Warn => info!("Ignoring non-video input: {}", input.display()),
                IneligiblePolicy::Skip => debug!("Ignoring non-video input: {}", input.display()),
            }
            classification.ignored.push(input.clone());
        }

        if classification.units.is_empty() {
            return Err(ToolsError::Classification(
                "None of the provided files is a supported video file".to_string(),
            ));
        }

        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn classifier() -> InputClassifier {
        InputClassifier::new(&Config::default().batch)
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let c = classifier();
        assert!(c.is_video("A.MP4"));
        assert!(c.is_video("b.MkV"));
        assert!(c.is_subtitle("c.SRT"));
        assert!(!c.is_video("notes.txt"));
        assert!(!c.is_video("mp4"));
    }

    #[test]
    fn test_subtitles_accepts_pair_in_any_order() {
        let c = classifier();
        for inputs in [paths(&["video.mp4", "subs.srt"]), paths(&["subs.srt", "video.mp4"])] {
            let result = c.classify(&inputs, Operation::AddSubtitles).unwrap();
            assert_eq!(result.units.len(), 1);
            assert_eq!(result.units[0].primary.path, PathBuf::from("video.mp4"));
            assert_eq!(result.units[0].auxiliary, Some(PathBuf::from("subs.srt")));
        }
    }

    #[test]
    fn test_subtitles_rejects_bad_combinations() {
        let c = classifier();
        let rejected = [
            paths(&["video.mp4", "video2.mp4"]),
            paths(&["subs.srt", "subs2.srt"]),
            paths(&["video.mp4"]),
            paths(&["video.mp4", "subs.srt", "extra.mkv"]),
            paths(&["notes.txt", "readme.md"]),
            paths(&["video.mp4", "notes.txt"]),
        ];
        for inputs in rejected {
            let result = c.classify(&inputs, Operation::AddSubtitles);
            assert!(matches!(result, Err(ToolsError::Classification(_))), "{:?}", inputs);
        }
    }

    #[test]
    fn test_empty_input_is_usage_error() {
        let result = classifier().classify(&[], Operation::Rewrap);
        assert!(matches!(result, Err(ToolsError::Usage(_))));
    }

    #[test]
    fn test_single_input_operations_skip_non_videos() {
        let inputs = paths(&["a.mov", "notes.txt", "b.MKV"]);
        let result = classifier().classify(&inputs, Operation::TranscodeH265).unwrap();

        let units: Vec<PathBuf> = result.units.iter().map(|u| u.primary.path.clone()).collect();
        assert_eq!(units, paths(&["a.mov", "b.MKV"]));
        assert_eq!(result.ignored, paths(&["notes.txt"]));
        assert!(result.units.iter().all(|u| u.auxiliary.is_none()));
    }

    #[test]
    fn test_fail_policy_aborts_on_non_video() {
        let mut config = Config::default().batch;
        config.on_ineligible = IneligiblePolicy::Fail;
        let c = InputClassifier::new(&config);

        let result = c.classify(&paths(&["a.mov", "notes.txt"]), Operation::Rewrap);
        assert!(matches!(result, Err(ToolsError::Classification(_))));
    }

    #[test]
    fn test_no_videos_at_all_is_rejected() {
        let result = classifier().classify(&paths(&["subs.srt"]), Operation::ConvertAudioAc3);
        assert!(matches!(result, Err(ToolsError::Classification(_))));
    }

    #[test]
    fn test_configured_extensions_accept_dots() {
        let mut config = Config::default().batch;
        config.video_extensions = vec![".AVI".to_string()];
        let c = InputClassifier::new(&config);
        assert!(c.is_video("clip.avi"));
        assert!(!c.is_video("clip.mp4"));
    }
}
