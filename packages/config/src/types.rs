//! Configuration types for chunkcopy.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_worker_count() -> usize {
    4
}

const fn default_buffer_size() -> usize {
    2048
}

const fn default_true() -> bool {
    true
}

/// Copy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Number of chunks the file is split into, one worker each.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Read buffer size per worker in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Write zeros over the destination before copying instead of extending it sparsely.
    #[serde(default)]
    pub zero_fill: bool,

    /// Stop the remaining chunks as soon as one fails.
    #[serde(default)]
    pub cancel_on_failure: bool,

    /// Show per-chunk progress bars.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            buffer_size: default_buffer_size(),
            zero_fill: false,
            cancel_on_failure: false,
            show_progress: true,
        }
    }
}

impl Config {
    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// * If `worker_count` is zero
    /// * If `buffer_size` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "workerCount",
                message: "must be at least 1".to_string(),
            });
        }
        if self.buffer_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bufferSize",
                message: "must be at least 1 byte".to_string(),
            });
        }
        Ok(())
    }
}
