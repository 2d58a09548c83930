use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input files. A directory stands for the files directly inside it.
    #[arg(required_unless_present = "write_config", value_name = "INPUTS")]
    pub inputs: Vec<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the effective configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,

    /// Show what would be run without starting ffmpeg
    #[arg(long)]
    pub dry_run: bool,

    /// Return right after the summary instead of waiting for enter
    #[arg(long)]
    pub no_pause: bool,
}
