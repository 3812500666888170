use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "url-checker", version)]
#[command(about = "Check which URLs in a list are alive", long_about = None)]
pub struct Cli {
    /// Text file with one URL per line.
    pub input: PathBuf,

    /// Number of concurrent workers.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Per-request timeout in seconds. A check may take up to twice this.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Write results to this file; format follows the extension (.txt, .csv, .json).
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Settings file (RON).
    #[arg(short, long, default_value = "url-checker.ron")]
    pub config: PathBuf,

    /// Write the effective settings back to the settings file.
    #[arg(long)]
    pub save_config: bool,

    /// Status code counted as alive; repeat for several. Replaces the configured set.
    #[arg(long = "accept", value_name = "CODE")]
    pub accept: Vec<u16>,

    /// Drop duplicate URLs before checking.
    #[arg(long)]
    pub dedupe: bool,

    /// Also log to ./url-checker.log.
    #[arg(long)]
    pub log_file: bool,

    /// Log only to ./url-checker.log, keeping the terminal for the progress bar.
    #[arg(long, conflicts_with = "log_file")]
    pub log_file_only: bool,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long)]
    pub no_progress: bool,
}
