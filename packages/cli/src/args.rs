//! CLI argument definitions.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use chunkcopy_config::Config;
use clap::Parser;

/// CLI arguments for chunkcopy.
#[derive(Debug, Parser)]
#[command(
    name = "chunkcopy",
    about = "Copy a file in parallel chunks with per-chunk progress",
    version
)]
pub struct Args {
    /// File to copy.
    #[arg(index = 1)]
    pub source: Option<PathBuf>,

    /// Where to write the copy.
    #[arg(index = 2)]
    pub destination: Option<PathBuf>,

    /// Number of chunks (one worker thread each).
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Read buffer size per worker, in bytes.
    #[arg(long, short = 'b')]
    pub buffer_size: Option<usize>,

    /// Config file to use instead of the discovered one.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Fill the destination with zeros before copying.
    #[arg(long)]
    pub zero_fill: bool,

    /// Stop the remaining chunks as soon as one fails.
    #[arg(long)]
    pub cancel_on_failure: bool,

    /// Run without prompts (requires source and destination).
    #[arg(long)]
    pub non_interactive: bool,

    /// Disable progress bars (useful for CI environments).
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Enable verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Args {
    /// Overlay command-line flags on top of file configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.worker_count = workers;
        }
        if let Some(buffer_size) = self.buffer_size {
            config.buffer_size = buffer_size;
        }
        if self.zero_fill {
            config.zero_fill = true;
        }
        if self.cancel_on_failure {
            config.cancel_on_failure = true;
        }
        if self.no_progress {
            config.show_progress = false;
        }
    }
}
