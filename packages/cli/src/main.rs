//! chunkcopy CLI entry point.
//!
//! Copies one file by splitting it into contiguous chunks that are copied
//! concurrently, showing a progress bar per chunk.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod args;
mod interactive;
mod output;
mod progress;

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use path_clean::PathClean;

use args::Args;
use chunkcopy_config::{Config, discover_config, load_config};
use chunkcopy_engine::{CopySession, CopySettings, Preallocation, RunOutcome};
use progress::ChunkProgressBars;

fn main() {
    let args = Args::parse();

    // Set up logging
    if args.verbose {
        // SAFETY: We're setting this before any other threads are spawned
        unsafe {
            env::set_var("RUST_LOG", "debug");
        }
    }
    pretty_env_logger::init();

    if let Err(e) = run(&args) {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = env::current_dir()?;
    let config = load_effective_config(args, &cwd)?;
    let settings = copy_settings(&config);

    let interactive = !args.non_interactive && console::user_attended();
    let show_progress = config.show_progress && console::user_attended_stderr();

    output::print_header("Chunked Copy");
    output::print_settings(&settings);

    let bars = Arc::new(ChunkProgressBars::new(show_progress));
    let mut session = CopySession::new(settings, bars.clone());

    let mut source_arg = args.source.clone();
    let mut destination_arg = args.destination.clone();

    loop {
        let source = match source_arg.take() {
            Some(path) => path,
            None if interactive => interactive::prompt_source_path()?,
            None => return Err("Source path is required in non-interactive mode.".into()),
        };
        let destination = match destination_arg.take() {
            Some(path) => path,
            None if interactive => interactive::prompt_destination_path()?,
            None => {
                return Err("Destination path is required in non-interactive mode.".into());
            }
        };

        let source = absolutize(&cwd, &source);
        let destination = absolutize(&cwd, &destination);

        if interactive && destination.exists() && !interactive::prompt_overwrite(&destination)? {
            println!("Skipped.");
        } else {
            let outcome = copy_once(&mut session, &bars, &source, &destination);

            match outcome {
                // Could not start: nothing was written
                Err(e) if !interactive => return Err(e),
                Err(e) => output::print_error(&e.to_string()),
                Ok(RunOutcome::Failure(error)) if !interactive => {
                    return Err(format!("Copy failed: {error}").into());
                }
                Ok(RunOutcome::Failure(error)) => {
                    output::print_error(&format!("Copy failed: {error}"));
                }
                Ok(RunOutcome::Success) => {}
            }
        }

        if !interactive || !interactive::prompt_copy_another()? {
            return Ok(());
        }

        session.reset()?;
    }
}

/// Start one run, wait for it, and print its summary.
///
/// Errors returned here mean the run never started; failures during the
/// copy come back as [`RunOutcome::Failure`].
fn copy_once(
    session: &mut CopySession,
    bars: &ChunkProgressBars,
    source: &Path,
    destination: &Path,
) -> Result<RunOutcome, Box<dyn std::error::Error>> {
    bars.prepare(session.settings().worker_count);

    let started = Instant::now();
    let handle = match session.start_copy(source, destination) {
        Ok(handle) => handle,
        Err(e) => {
            bars.clear();
            return Err(e.into());
        }
    };

    output::print_copy_start(source, destination, handle.total_bytes());

    let outcome = handle.wait();
    bars.clear();

    match &outcome {
        RunOutcome::Success => output::print_success(handle.total_bytes(), started.elapsed()),
        RunOutcome::Failure(_) => {
            for progress in handle.progress().iter().filter(|p| !p.is_complete()) {
                output::print_chunk_failure(progress.chunk_index, progress.percent);
            }
            output::print_warning(&format!(
                "{} may be incomplete",
                destination.display()
            ));
        }
    }

    Ok(outcome)
}

/// Load the config file (explicit or discovered) and apply CLI overrides.
fn load_effective_config(args: &Args, cwd: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let path = args.config.clone().or_else(|| discover_config(cwd));

    let mut config = match path {
        Some(path) => load_config(&path)?,
        None => Config::default(),
    };

    args.apply_overrides(&mut config);
    config.validate()?;

    Ok(config)
}

/// Translate file configuration into engine settings.
const fn copy_settings(config: &Config) -> CopySettings {
    CopySettings {
        worker_count: config.worker_count,
        buffer_size: config.buffer_size,
        preallocation: if config.zero_fill {
            Preallocation::ZeroFill
        } else {
            Preallocation::Sparse
        },
        cancel_on_failure: config.cancel_on_failure,
    }
}

/// Make `path` absolute against `cwd` and normalize `.`/`..` components.
fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.clean()
    } else {
        cwd.join(path).clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_settings_from_config() {
        let config = Config {
            worker_count: 2,
            buffer_size: 512,
            zero_fill: true,
            cancel_on_failure: true,
            show_progress: false,
        };

        let settings = copy_settings(&config);

        assert_eq!(settings.worker_count, 2);
        assert_eq!(settings.buffer_size, 512);
        assert_eq!(settings.preallocation, Preallocation::ZeroFill);
        assert!(settings.cancel_on_failure);
    }

    #[test]
    fn test_absolutize_relative_path() {
        let cwd = Path::new("/work/dir");
        assert_eq!(
            absolutize(cwd, Path::new("../out/./file.bin")),
            PathBuf::from("/work/out/file.bin")
        );
    }

    #[test]
    fn test_absolutize_keeps_absolute_path() {
        let cwd = Path::new("/work/dir");
        assert_eq!(
            absolutize(cwd, Path::new("/data/a/../file.bin")),
            PathBuf::from("/data/file.bin")
        );
    }
}
