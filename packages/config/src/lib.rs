//! Configuration loading for chunkcopy.
//!
//! Tunable copy parameters (worker count, buffer size, preallocation and
//! failure policy) can be read from a config file instead of being passed on
//! every invocation.
//!
//! # Supported Config Formats
//!
//! * TOML (`chunkcopy.toml`)
//! * JSON (`chunkcopy.json`)
//!
//! # Example
//!
//! ```rust,ignore
//! use chunkcopy_config::{discover_config, load_config};
//!
//! let config = match discover_config(&cwd) {
//!     Some(path) => load_config(&path)?,
//!     None => Config::default(),
//! };
//! println!("{} workers", config.worker_count);
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod discovery;
mod error;
mod json_loader;
mod toml_loader;
mod types;

pub use discovery::{CONFIG_FILE_NAMES, discover_config, user_config_path};
pub use error::ConfigError;
pub use json_loader::load_json_config;
pub use toml_loader::load_toml_config;
pub use types::Config;

use std::path::Path;

/// Load a configuration file, auto-detecting the format based on extension.
///
/// The loaded values are validated before being returned.
///
/// # Arguments
///
/// * `path` - Path to the configuration file
///
/// # Errors
///
/// * If the file extension is not supported
/// * If the file cannot be read
/// * If the file cannot be parsed
/// * If a value is out of range
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let config = match extension {
        "toml" => load_toml_config(path)?,
        "json" => load_json_config(path)?,
        _ => return Err(ConfigError::UnsupportedFormat(extension.to_string())),
    };

    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_by_extension() {
        let dir = TempDir::new().unwrap();

        let toml_path = dir.path().join("chunkcopy.toml");
        fs::write(&toml_path, "workerCount = 6\n").unwrap();
        assert_eq!(load_config(&toml_path).unwrap().worker_count, 6);

        let json_path = dir.path().join("chunkcopy.json");
        fs::write(&json_path, r#"{ "bufferSize": 4096 }"#).unwrap();
        assert_eq!(load_config(&json_path).unwrap().buffer_size, 4096);
    }

    #[test]
    fn test_load_config_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunkcopy.yaml");
        fs::write(&path, "workerCount: 2").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "yaml"));
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunkcopy.toml");
        fs::write(&path, "workerCount = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "workerCount", .. }));
    }
}
