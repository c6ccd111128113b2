//! Interactive prompts using dialoguer.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::io;
use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input};

/// Prompt for the file to copy.
///
/// # Errors
///
/// * If the user cancels the input
pub fn prompt_source_path() -> io::Result<PathBuf> {
    let path: String = Input::new()
        .with_prompt("File to copy")
        .interact_text()?;

    Ok(PathBuf::from(path))
}

/// Prompt for the destination path.
///
/// # Errors
///
/// * If the user cancels the input
pub fn prompt_destination_path() -> io::Result<PathBuf> {
    let path: String = Input::new()
        .with_prompt("Copy to")
        .interact_text()?;

    Ok(PathBuf::from(path))
}

/// Ask whether an existing destination may be overwritten.
///
/// # Errors
///
/// * If the user cancels the prompt
pub fn prompt_overwrite(destination: &Path) -> io::Result<bool> {
    Ok(Confirm::new()
        .with_prompt(format!(
            "{} already exists. Overwrite it?",
            destination.display()
        ))
        .default(false)
        .interact()?)
}

/// Ask whether to start another copy.
///
/// # Errors
///
/// * If the user cancels the prompt
pub fn prompt_copy_another() -> io::Result<bool> {
    Ok(Confirm::new()
        .with_prompt("Copy another file?")
        .default(false)
        .interact()?)
}
