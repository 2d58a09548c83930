//! One interactive session: menu, classification, batch, wrap-up.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use walkdir::WalkDir;

use crate::batch::{BatchResult, BatchRunner, Conclusion};
use crate::classify::InputClassifier;
use crate::config::Config;
use crate::error::{Result, ToolsError};
use crate::media::{MediaCommandBuilder, MediaProcessorTrait};
use crate::menu::{MenuController, MenuOutcome};
use crate::operation::OperationCatalog;
use crate::power::PowerControl;

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Build and log commands without running them
    pub dry_run: bool,
    /// Wait for enter before returning after the summary
    pub pause_at_end: bool,
}

#[derive(Debug)]
pub enum SessionOutcome {
    Exited,
    Completed(BatchResult),
    ShutdownRequested(BatchResult),
}

/// Replace each directory argument with the regular files directly inside
/// it, sorted by name. Other paths pass through untouched.
pub fn expand_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::new();

    for path in paths {
        if path.is_dir() {
            let before = expanded.len();
            for entry in WalkDir::new(path)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() {
                    expanded.push(entry.into_path());
                }
            }
            info!("Expanded {} into {} file(s)", path.display(), expanded.len() - before);
        } else {
            expanded.push(path.clone());
        }
    }

    if expanded.is_empty() {
        return Err(ToolsError::Usage("Please provide at least one input file".to_string()));
    }
    Ok(expanded)
}

/// Drive one session against the given terminal streams
pub async fn run_session<R: BufRead, W: Write>(
    inputs: &[PathBuf],
    config: &Config,
    options: &SessionOptions,
    processor: Box<dyn MediaProcessorTrait>,
    power: &dyn PowerControl,
    input: R,
    output: W,
) -> Result<SessionOutcome> {
    let inputs = expand_inputs(inputs)?;
    let catalog = OperationCatalog::new();
    let classifier = InputClassifier::new(&config.batch);
    let runner = BatchRunner::new(
        processor,
        MediaCommandBuilder::new(&config.media.binary_path, config.media.hide_banner),
        config.batch.min_output_bytes,
    )
    .with_dry_run(options.dry_run);

    // Fail before asking anything if ffmpeg can't be run
    runner.check_processor().await?;

    let mut menu = MenuController::new(&catalog, input, output);
    let (plan, classification) = match menu.collect(&inputs, &classifier)? {
        MenuOutcome::Exit => return Ok(SessionOutcome::Exited),
        MenuOutcome::Ready { plan, classification } => (plan, classification),
    };

    let result = runner.run(&classification.units, &plan).await?;

    match runner.conclude(&result, &plan, power, menu.output())? {
        Conclusion::ShutdownRequested => {
            menu.mark_done();
            Ok(SessionOutcome::ShutdownRequested(result))
        }
        Conclusion::Summarized => {
            if options.pause_at_end {
                menu.pause()?;
            } else {
                menu.mark_done();
            }
            Ok(SessionOutcome::Completed(result))
        }
    }
}
