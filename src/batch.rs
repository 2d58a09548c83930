use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::classify::WorkUnit;
use crate::error::Result;
use crate::media::{MediaCommandBuilder, MediaProcessorTrait};
use crate::naming::next_available_name_with;
use crate::operation::{ExtraParameter, Operation};
use crate::power::PowerControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    Success,
    Failed,
    /// Dry run: the command was built but not executed
    Skipped,
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitStatus::Success => write!(f, "Success"),
            UnitStatus::Failed => write!(f, "Failed"),
            UnitStatus::Skipped => write!(f, "Skipped"),
        }
    }
}

/// Output path to status, in the order units were processed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    entries: Vec<(PathBuf, UnitStatus)>,
}

impl BatchResult {
    fn record(&mut self, output: PathBuf, status: UnitStatus) {
        debug_assert!(self.get(&output).is_none(), "duplicate output {}", output.display());
        self.entries.push((output, status));
    }

    pub fn entries(&self) -> &[(PathBuf, UnitStatus)] {
        &self.entries
    }

    pub fn get<P: AsRef<Path>>(&self, output: P) -> Option<UnitStatus> {
        self.entries
            .iter()
            .find(|(path, _)| path == output.as_ref())
            .map(|(_, status)| *status)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, status: UnitStatus) -> usize {
        self.entries.iter().filter(|(_, s)| *s == status).count()
    }

    /// Summary shown to the user once the batch is over
    pub fn render_summary(&self) -> String {
        let heading = if self.entries.len() == 1 { "File made:" } else { "Files made:" };
        let mut summary = format!("{}\n", heading);

        for (path, status) in &self.entries {
            summary.push_str(&format!("{:<8} {}\n", status.to_string(), path.display()));
        }

        let skipped = self.count(UnitStatus::Skipped);
        summary.push_str(&format!(
            "\n{} succeeded, {} failed",
            self.count(UnitStatus::Success),
            self.count(UnitStatus::Failed)
        ));
        if skipped > 0 {
            summary.push_str(&format!(", {} skipped (dry run)", skipped));
        }
        summary.push('\n');
        summary
    }
}

/// Everything the user chose in the menu, handed to the runner as one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub operation: Operation,
    pub extra: Option<ExtraParameter>,
    pub shutdown_after: bool,
}

/// How a finished batch was wrapped up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conclusion {
    Summarized,
    ShutdownRequested,
}

/// Classify an output as produced or not. Existence plus a size floor is
/// only a proxy: a large but corrupt file still passes.
pub fn verify_output<P: AsRef<Path>>(output: P, min_bytes: u64) -> UnitStatus {
    match std::fs::metadata(output.as_ref()) {
        Ok(meta) if meta.is_file() && meta.len() > min_bytes => UnitStatus::Success,
        _ => UnitStatus::Failed,
    }
}

pub struct BatchRunner {
    processor: Box<dyn MediaProcessorTrait>,
    command_builder: MediaCommandBuilder,
    min_output_bytes: u64,
    dry_run: bool,
}

impl BatchRunner {
    pub fn new(
        processor: Box<dyn MediaProcessorTrait>,
        command_builder: MediaCommandBuilder,
        min_output_bytes: u64,
    ) -> Self {
        Self {
            processor,
            command_builder,
            min_output_bytes,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn check_processor(&self) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        self.processor.check_availability().await
    }

    /// Run every unit once, in order. A failed unit is recorded and the
    /// batch moves on.
    pub async fn run(&self, units: &[WorkUnit], plan: &BatchPlan) -> Result<BatchResult> {
        plan.operation.check_extra(plan.extra.as_ref())?;
        info!("Starting {} on {} unit(s)", plan.operation.title(), units.len());

        let mut result = BatchResult::default();
        // Names handed out in this batch stay taken even if no file appears
        let mut reserved: HashSet<PathBuf> = HashSet::new();

        for (index, unit) in units.iter().enumerate() {
            let (suffix, extension) = plan.operation.output_naming(&unit.primary, plan.extra.as_ref());
            let output = next_available_name_with(&unit.primary.base_name, &suffix, &extension, |candidate| {
                candidate.exists() || reserved.contains(candidate)
            });
            reserved.insert(output.clone());

            let command = plan.operation.build_command(&self.command_builder, unit, &output, plan.extra.as_ref())?;
            info!(
                "[{}/{}] {} -> {}",
                index + 1,
                units.len(),
                unit.primary.path.display(),
                output.display()
            );

            let status = if self.dry_run {
                info!("Dry run: {}", command.display_line());
                UnitStatus::Skipped
            } else {
                match self.processor.invoke(&command).await {
                    Ok(outcome) => {
                        let status = verify_output(&output, self.min_output_bytes);
                        if status == UnitStatus::Failed {
                            warn!(
                                "{} is missing or not larger than {} bytes (exit code {:?})",
                                output.display(),
                                self.min_output_bytes,
                                outcome.exit_code
                            );
                        }
                        status
                    }
                    Err(e) => {
                        warn!("Failed to process {}: {}", unit.primary.path.display(), e);
                        UnitStatus::Failed
                    }
                }
            };

            result.record(output, status);
        }

        info!(
            "Batch finished: {} succeeded, {} failed",
            result.count(UnitStatus::Success),
            result.count(UnitStatus::Failed)
        );
        Ok(result)
    }

    /// Print the summary, or power the host off when that was asked for.
    /// A dry run never shuts down.
    pub fn conclude<W: Write>(
        &self,
        result: &BatchResult,
        plan: &BatchPlan,
        power: &dyn PowerControl,
        out: &mut W,
    ) -> Result<Conclusion> {
        if plan.shutdown_after && !self.dry_run {
            power.request_shutdown()?;
            return Ok(Conclusion::ShutdownRequested);
        }

        writeln!(out, "\nAll done")?;
        write!(out, "{}", result.render_summary())?;
        if plan.shutdown_after {
            writeln!(out, "Dry run: shutdown not requested")?;
        }
        out.flush()?;
        Ok(Conclusion::Summarized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolsError;
    use crate::media::{MockMediaProcessorTrait, ProcessOutcome};
    use crate::naming::MediaFile;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakePower {
        calls: Arc<AtomicUsize>,
    }

    impl PowerControl for FakePower {
        fn request_shutdown(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn unit(path: &Path) -> WorkUnit {
        WorkUnit { primary: MediaFile::new(path), auxiliary: None }
    }

    fn plan(operation: Operation, extra: Option<ExtraParameter>) -> BatchPlan {
        BatchPlan { operation, extra, shutdown_after: false }
    }

    /// A processor that writes `size` bytes to each command's output path
    fn writing_processor(size: usize, expected_calls: usize) -> MockMediaProcessorTrait {
        let mut mock = MockMediaProcessorTrait::new();
        mock.expect_invoke()
            .times(expected_calls)
            .returning(move |cmd| {
                let output = cmd.output_path().expect("command has an output");
                fs::write(&output, vec![0u8; size]).expect("write output");
                Ok(ProcessOutcome { exit_code: Some(0) })
            });
        mock
    }

    fn runner(processor: MockMediaProcessorTrait) -> BatchRunner {
        BatchRunner::new(Box::new(processor), MediaCommandBuilder::new("ffmpeg", true), 100_000)
    }

    #[test]
    fn test_verify_output_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("small.mkv");
        let big = dir.path().join("big.mkv");
        fs::write(&small, vec![0u8; 100_000]).unwrap();
        fs::write(&big, vec![0u8; 100_001]).unwrap();

        assert_eq!(verify_output(&small, 100_000), UnitStatus::Failed);
        assert_eq!(verify_output(&big, 100_000), UnitStatus::Success);
        assert_eq!(verify_output(dir.path().join("missing.mkv"), 100_000), UnitStatus::Failed);
        assert_eq!(verify_output(dir.path(), 0), UnitStatus::Failed);
    }

    #[tokio::test]
    async fn test_ac3_output_name_and_collision() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("movie.mkv");
        fs::write(&input, b"source").unwrap();

        let runner = runner(writing_processor(200_000, 2));
        let plan = plan(Operation::ConvertAudioAc3, None);

        let first = runner.run(&[unit(&input)], &plan).await.unwrap();
        let expected = dir.path().join("movie_AC3.mkv");
        assert_eq!(first.entries(), &[(expected.clone(), UnitStatus::Success)]);

        let second = runner.run(&[unit(&input)], &plan).await.unwrap();
        assert_eq!(second.get(dir.path().join("movie_AC3_2.mkv")), Some(UnitStatus::Success));
    }

    #[tokio::test]
    async fn test_rewrap_uses_requested_container() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mov");
        let b = dir.path().join("b.mov");

        let runner = runner(writing_processor(200_000, 2));
        let plan = plan(Operation::Rewrap, Some(ExtraParameter::Container(".avi".to_string())));
        let result = runner.run(&[unit(&a), unit(&b)], &plan).await.unwrap();

        let outputs: Vec<PathBuf> = result.entries().iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(outputs, vec![dir.path().join("a.avi"), dir.path().join("b.avi")]);
    }

    #[tokio::test]
    async fn test_small_output_fails_without_stopping_batch() {
        let dir = tempfile::tempdir().unwrap();
        let units = [unit(&dir.path().join("a.mkv")), unit(&dir.path().join("b.mkv"))];

        let mut mock = MockMediaProcessorTrait::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        mock.expect_invoke().times(2).returning(move |cmd| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let size = if n == 0 { 10 } else { 150_000 };
            fs::write(cmd.output_path().unwrap(), vec![0u8; size]).unwrap();
            Ok(ProcessOutcome { exit_code: Some(0) })
        });

        let result = runner(mock)
            .run(&units, &plan(Operation::TranscodeH264, None))
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.get(dir.path().join("a.mp4")), Some(UnitStatus::Failed));
        assert_eq!(result.get(dir.path().join("b.mp4")), Some(UnitStatus::Success));
    }

    #[tokio::test]
    async fn test_spawn_error_is_recorded_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockMediaProcessorTrait::new();
        mock.expect_invoke()
            .times(1)
            .returning(|_| Err(ToolsError::Media("not found".to_string())));

        let result = runner(mock)
            .run(&[unit(&dir.path().join("a.mkv"))], &plan(Operation::TranscodeH265, None))
            .await
            .unwrap();
        assert_eq!(result.get(dir.path().join("a.mp4")), Some(UnitStatus::Failed));
    }

    #[tokio::test]
    async fn test_outputs_stay_unique_when_nothing_is_written() {
        let dir = tempfile::tempdir().unwrap();
        // Two inputs that map to the same rewrapped name
        let units = [unit(&dir.path().join("clip.mov")), unit(&dir.path().join("clip.mkv"))];

        let runner = runner(MockMediaProcessorTrait::new()).with_dry_run(true);
        let plan = plan(Operation::Rewrap, Some(ExtraParameter::Container(".avi".to_string())));
        let result = runner.run(&units, &plan).await.unwrap();

        assert_eq!(
            result.entries(),
            &[
                (dir.path().join("clip.avi"), UnitStatus::Skipped),
                (dir.path().join("clip_2.avi"), UnitStatus::Skipped),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_extra_parameter_is_rejected_before_work() {
        let runner = runner(MockMediaProcessorTrait::new());
        let result = runner
            .run(&[unit(Path::new("a.mkv"))], &plan(Operation::TranscodeH265Scaled, None))
            .await;
        assert!(matches!(result, Err(ToolsError::InvalidParameter(_))));
    }

    #[test]
    fn test_summary_heading_and_counts() {
        let mut result = BatchResult::default();
        result.record(PathBuf::from("a.mp4"), UnitStatus::Success);
        assert!(result.render_summary().starts_with("File made:\n"));

        result.record(PathBuf::from("b.mp4"), UnitStatus::Failed);
        let summary = result.render_summary();
        assert!(summary.starts_with("Files made:\n"));
        assert!(summary.contains("Success  a.mp4"));
        assert!(summary.contains("Failed   b.mp4"));
        assert!(summary.contains("1 succeeded, 1 failed"));
    }

    #[test]
    fn test_conclude_shutdown_skips_summary() {
        let calls = Arc::new(AtomicUsize::new(0));
        let power = FakePower { calls: calls.clone() };
        let runner = runner(MockMediaProcessorTrait::new());
        let mut plan = plan(Operation::Rewrap, None);
        plan.shutdown_after = true;

        let mut out = Vec::new();
        let conclusion = runner.conclude(&BatchResult::default(), &plan, &power, &mut out).unwrap();

        assert_eq!(conclusion, Conclusion::ShutdownRequested);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_conclude_prints_summary() {
        let calls = Arc::new(AtomicUsize::new(0));
        let power = FakePower { calls: calls.clone() };
        let runner = runner(MockMediaProcessorTrait::new());

        let mut result = BatchResult::default();
        result.record(PathBuf::from("a.mp4"), UnitStatus::Success);

        let mut out = Vec::new();
        let conclusion = runner
            .conclude(&result, &plan(Operation::TranscodeH264, None), &power, &mut out)
            .unwrap();

        assert_eq!(conclusion, Conclusion::Summarized);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("All done"));
        assert!(text.contains("a.mp4"));
    }
}
