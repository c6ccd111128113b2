//! Request, settings, and state types shared across the engine.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use crate::error::CopyError;

/// Default number of concurrent workers per run.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Default size of each worker's read buffer in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 2048;

/// A single copy run's inputs.
///
/// Immutable once handed to [`crate::CopyCoordinator::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    source: PathBuf,
    destination: PathBuf,
    worker_count: usize,
}

impl CopyRequest {
    /// Create a new request.
    #[must_use]
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        worker_count: usize,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            worker_count,
        }
    }

    /// Path of the file being copied.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Path the copy is written to.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Number of chunks (and workers) the file is split into.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Check the shape of the request without touching the filesystem.
    ///
    /// # Errors
    ///
    /// * If either path is empty
    /// * If both paths are the same
    /// * If the worker count is zero
    pub fn validate(&self) -> Result<(), CopyError> {
        if self.source.as_os_str().is_empty() {
            return Err(CopyError::invalid_argument("source path is empty"));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(CopyError::invalid_argument("destination path is empty"));
        }
        if self.source == self.destination {
            return Err(CopyError::invalid_argument(
                "source and destination are the same path",
            ));
        }
        if self.worker_count == 0 {
            return Err(CopyError::invalid_argument(
                "worker count must be at least 1",
            ));
        }
        Ok(())
    }
}

/// How the destination is prepared before workers start writing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Preallocation {
    /// Extend the file with `set_len`, leaving holes where the platform supports them.
    #[default]
    Sparse,
    /// Write zeros over the whole length so every block is allocated up front.
    ZeroFill,
}

/// Tunable parameters for the copy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopySettings {
    /// Workers used by [`crate::CopySession::start_copy`].
    pub worker_count: usize,
    /// Read buffer size per worker in bytes.
    pub buffer_size: usize,
    /// Destination preparation strategy.
    pub preallocation: Preallocation,
    /// Cancel the remaining chunks as soon as one of them fails.
    pub cancel_on_failure: bool,
}

impl Default for CopySettings {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            preallocation: Preallocation::default(),
            cancel_on_failure: false,
        }
    }
}

/// Lifecycle state of a [`crate::CopySession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyRunState {
    /// No run has been started since creation or the last reset.
    Idle,
    /// Workers are copying.
    Running,
    /// Every chunk finished successfully.
    Completed,
    /// At least one chunk failed.
    Failed,
}

impl std::fmt::Display for CopyRunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
