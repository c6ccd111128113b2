//! Error types for chunked copy operations.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while starting or running a chunked copy.
#[derive(Debug, Error)]
pub enum CopyError {
    /// The request is malformed (empty paths, zero workers, zero buffer size).
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the request.
        message: String,
    },

    /// The source file does not exist.
    #[error("Source file not found: {}", path.display())]
    SourceNotFound {
        /// The source path.
        path: PathBuf,
    },

    /// The source exists but cannot be opened or inspected for reading.
    #[error("Source file {} is not readable: {source}", path.display())]
    SourceUnreadable {
        /// The source path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The destination could not be created or sized.
    #[error("Destination {} is not writable: {source}", path.display())]
    DestinationUnwritable {
        /// The destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The source ended before a chunk received all of its bytes.
    #[error(
        "Chunk {chunk_index} hit end of file after {transferred} of {expected} bytes (source shrank?)"
    )]
    UnexpectedEof {
        /// Index of the failing chunk.
        chunk_index: usize,
        /// Bytes the chunk was assigned.
        expected: u64,
        /// Bytes copied before end of file.
        transferred: u64,
    },

    /// Generic open/seek/read/write failure inside a chunk.
    #[error("Chunk {chunk_index} failed on {}: {source}", path.display())]
    Io {
        /// Index of the failing chunk.
        chunk_index: usize,
        /// The file the operation was performed on.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The chunk stopped because cancellation was requested.
    #[error("Chunk {chunk_index} was cancelled")]
    Cancelled {
        /// Index of the cancelled chunk.
        chunk_index: usize,
    },

    /// A progress callback panicked while the chunk was running.
    #[error("Chunk {chunk_index} panicked: {message}")]
    Panicked {
        /// Index of the chunk whose worker panicked.
        chunk_index: usize,
        /// The panic payload, if it was a string.
        message: String,
    },

    /// The operation is not allowed in the session's current state.
    #[error("Cannot {action} while session is {state}")]
    InvalidState {
        /// The attempted action.
        action: &'static str,
        /// The state the session was in.
        state: crate::CopyRunState,
    },

    /// Worker threads could not be spawned.
    #[error("Failed to start copy workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl CopyError {
    /// Index of the chunk this error belongs to, if it was raised by a worker.
    #[must_use]
    pub const fn chunk_index(&self) -> Option<usize> {
        match self {
            Self::UnexpectedEof { chunk_index, .. }
            | Self::Io { chunk_index, .. }
            | Self::Panicked { chunk_index, .. }
            | Self::Cancelled { chunk_index } => Some(*chunk_index),
            _ => None,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_index_only_for_worker_errors() {
        let eof = CopyError::UnexpectedEof {
            chunk_index: 3,
            expected: 10,
            transferred: 4,
        };
        assert_eq!(eof.chunk_index(), Some(3));
        assert_eq!(CopyError::Cancelled { chunk_index: 1 }.chunk_index(), Some(1));

        let missing = CopyError::SourceNotFound {
            path: PathBuf::from("missing.bin"),
        };
        assert_eq!(missing.chunk_index(), None);
    }

    #[test]
    fn test_invalid_state_message() {
        let err = CopyError::InvalidState {
            action: "reset",
            state: crate::CopyRunState::Running,
        };
        assert_eq!(err.to_string(), "Cannot reset while session is running");
    }
}
