//! JSON configuration file loader.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::Config;

/// Load a JSON configuration file.
///
/// # Errors
///
/// * If the file cannot be read
/// * If the file cannot be parsed as JSON
pub fn load_json_config(path: &Path) -> Result<Config, ConfigError> {
    log::debug!("Loading JSON config from {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::JsonParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_json_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "workerCount": 2, "zeroFill": true }}"#).unwrap();

        let config = load_json_config(file.path()).unwrap();

        assert_eq!(config.worker_count, 2);
        assert_eq!(config.buffer_size, 2048);
        assert!(config.zero_fill);
        assert!(config.show_progress);
    }

    #[test]
    fn test_load_malformed_json_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ workerCount: 2").unwrap();

        let err = load_json_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::JsonParseError { .. }));
    }
}
