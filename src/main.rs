//! FFmpeg Tools
//!
//! Entry point: parse arguments, set up logging and configuration, then hand
//! the terminal to the interactive menu.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::{filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use tracing_appender::{non_blocking, rolling};

use fftools::app::{run_session, SessionOptions, SessionOutcome};
use fftools::cli::Args;
use fftools::config::Config;
use fftools::error::ToolsError;
use fftools::media::MediaProcessorFactory;
use fftools::power::HostPower;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Usage problems get one plain line; anything else is logged too
            match e.downcast_ref::<ToolsError>() {
                Some(tools_error) if tools_error.is_user_facing() => eprintln!("{}", tools_error),
                _ => {
                    error!("{:#}", e);
                    eprintln!("Error: {:#}", e);
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;

    if let Some(path) = &args.write_config {
        config.save_to_file(path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    setup_logging(&config.log_dir, args.verbose)?;
    info!("Starting FFmpeg Tools with {} input argument(s)", args.inputs.len());

    let options = SessionOptions {
        dry_run: args.dry_run,
        pause_at_end: !args.no_pause,
    };
    let processor = MediaProcessorFactory::create_processor(config.media.clone());
    let power = HostPower::new(&config.power);

    let stdin = std::io::stdin();
    let outcome = run_session(
        &args.inputs,
        &config,
        &options,
        processor,
        &power,
        stdin.lock(),
        std::io::stdout(),
    )
    .await?;

    match outcome {
        SessionOutcome::Exited => info!("Exited from menu"),
        SessionOutcome::Completed(result) => info!("Session completed with {} output(s)", result.len()),
        SessionOutcome::ShutdownRequested(result) => {
            info!("Session completed with {} output(s), shutdown requested", result.len())
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(log_dir: &Path, verbose: bool) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(log_dir, "fftools.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // The console shares the terminal with the menu, so it stays quiet
    // unless asked otherwise
    let console_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .with_filter(console_level);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - level: {}, file: {}",
          log_level, log_dir.join("fftools.log").display());

    Ok(())
}
