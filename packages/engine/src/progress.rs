//! Progress reporting for chunked copy runs.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::CopyError;
use crate::plan::ChunkRange;

/// Progress of a single chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkProgress {
    /// Index of the chunk being reported.
    pub chunk_index: usize,
    /// Bytes of the chunk copied so far.
    pub bytes_transferred: u64,
    /// `floor(100 * bytes_transferred / chunk length)`, or 100 for an empty chunk.
    pub percent: u8,
}

impl ChunkProgress {
    /// Create a progress report for `range` after `bytes_transferred` bytes.
    #[must_use]
    pub fn new(range: &ChunkRange, bytes_transferred: u64) -> Self {
        Self {
            chunk_index: range.index,
            bytes_transferred,
            percent: percent_of(bytes_transferred, range.len()),
        }
    }

    /// Whether the chunk has copied all of its bytes.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.percent >= 100
    }
}

#[allow(clippy::cast_possible_truncation)]
fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = u128::from(done.min(total)) * 100 / u128::from(total);
    percent as u8
}

/// Terminal result of a copy run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Every chunk copied all of its bytes.
    Success,
    /// At least one chunk failed; holds the first error observed.
    Failure(Arc<CopyError>),
}

impl RunOutcome {
    /// Whether the run succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The first error of a failed run.
    #[must_use]
    pub fn error(&self) -> Option<&CopyError> {
        match self {
            Self::Success => None,
            Self::Failure(error) => Some(error),
        }
    }
}

/// Consumer of progress events.
///
/// Methods are called directly from worker threads, possibly concurrently
/// for different chunks. Events for one chunk arrive in order with
/// non-decreasing `bytes_transferred`.
pub trait ProgressSink: Send + Sync {
    /// Called after every read/write cycle of a chunk.
    fn on_chunk_progress(&self, progress: &ChunkProgress);

    /// Called once when a chunk has copied all of its bytes.
    fn on_chunk_done(&self, chunk_index: usize) {
        let _ = chunk_index;
    }

    /// Called exactly once per run, after every chunk has finished or failed.
    fn on_run_done(&self, outcome: &RunOutcome);
}

/// Thread-safe per-chunk progress tracker using atomics.
#[derive(Debug)]
pub struct ProgressTracker {
    ranges: Vec<ChunkRange>,
    transferred: Vec<AtomicU64>,
}

impl ProgressTracker {
    /// Create a tracker for the given plan.
    #[must_use]
    pub fn new(ranges: &[ChunkRange]) -> Arc<Self> {
        Arc::new(Self {
            ranges: ranges.to_vec(),
            transferred: ranges.iter().map(|_| AtomicU64::new(0)).collect(),
        })
    }

    /// Record a progress event.
    pub fn record(&self, progress: &ChunkProgress) {
        if let Some(counter) = self.transferred.get(progress.chunk_index) {
            counter.fetch_max(progress.bytes_transferred, Ordering::SeqCst);
        }
    }

    /// Total bytes copied across all chunks.
    #[must_use]
    pub fn bytes_transferred(&self) -> u64 {
        self.transferred
            .iter()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }

    /// Total bytes the run has to copy.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.ranges.iter().map(ChunkRange::len).sum()
    }

    /// Overall completion across all chunks.
    #[must_use]
    pub fn overall_percent(&self) -> u8 {
        percent_of(self.bytes_transferred(), self.total_bytes())
    }

    /// Get a per-chunk progress snapshot, ordered by chunk index.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ChunkProgress> {
        self.ranges
            .iter()
            .zip(&self.transferred)
            .map(|(range, counter)| ChunkProgress::new(range, counter.load(Ordering::SeqCst)))
            .collect()
    }
}
