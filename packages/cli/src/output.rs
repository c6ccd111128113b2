//! Terminal output formatting.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;
use std::time::Duration;

use chunkcopy_engine::{CopySettings, Preallocation};
use colored::Colorize;
use indicatif::{HumanBytes, HumanDuration};

/// Print a header message.
pub fn print_header(message: &str) {
    println!("\n{} {}\n", "📦", message.bold());
}

/// Print the settings a copy will run with.
pub fn print_settings(settings: &CopySettings) {
    let preallocation = match settings.preallocation {
        Preallocation::Sparse => "sparse",
        Preallocation::ZeroFill => "zero-fill",
    };
    println!(
        "Workers: {}  Buffer: {}  Preallocation: {}",
        settings.worker_count.to_string().cyan(),
        HumanBytes(settings.buffer_size as u64).to_string().cyan(),
        preallocation.cyan()
    );
}

/// Print the copy about to start.
pub fn print_copy_start(source: &Path, destination: &Path, total_bytes: u64) {
    println!(
        "\nCopying {} -> {} ({})",
        source.display().to_string().yellow(),
        destination.display().to_string().yellow(),
        HumanBytes(total_bytes)
    );
}

/// Print a successful run summary.
pub fn print_success(total_bytes: u64, elapsed: Duration) {
    println!(
        "{} Copied {} in {}",
        "✅",
        HumanBytes(total_bytes),
        HumanDuration(elapsed)
    );
}

/// Print a per-chunk failure line.
pub fn print_chunk_failure(chunk_index: usize, percent: u8) {
    println!(
        "  {} chunk {:<3} stopped at {}%",
        "✗".red(),
        chunk_index,
        percent
    );
}

/// Print error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "Warning:".yellow().bold(), message);
}
