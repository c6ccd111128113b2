//! Configuration file discovery.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

/// File names looked up in the working directory, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &["chunkcopy.toml", "chunkcopy.json"];

/// Path of the per-user config file (`<config dir>/chunkcopy/config.toml`).
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chunkcopy").join("config.toml"))
}

/// Find the config file that applies to `cwd`.
///
/// Checks [`CONFIG_FILE_NAMES`] in `cwd` first, then [`user_config_path`].
/// Returns `None` when no file exists.
#[must_use]
pub fn discover_config(cwd: &Path) -> Option<PathBuf> {
    let local = CONFIG_FILE_NAMES.iter().map(|name| cwd.join(name));

    let found = local
        .chain(user_config_path())
        .find(|path| path.is_file());

    match &found {
        Some(path) => log::debug!("Using config {}", path.display()),
        None => log::debug!("No config file found, using defaults"),
    }

    found
}
