//! Splitting a file into per-worker byte ranges.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use crate::error::CopyError;

/// A contiguous byte range `[start, end)` assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// 0-based position of the chunk in the plan.
    pub index: usize,
    /// First byte of the range.
    pub start: u64,
    /// One past the last byte of the range.
    pub end: u64,
}

impl ChunkRange {
    /// Number of bytes in the range.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Whether the range holds no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Partition `[0, file_size)` into exactly `worker_count` ranges.
///
/// Every range but the last gets `file_size / worker_count` bytes; the last
/// one absorbs the remainder. When the file is smaller than the worker
/// count, the leading ranges are empty.
///
/// # Errors
///
/// * If `worker_count` is zero
pub fn plan_chunks(file_size: u64, worker_count: usize) -> Result<Vec<ChunkRange>, CopyError> {
    if worker_count == 0 {
        return Err(CopyError::invalid_argument(
            "worker count must be at least 1",
        ));
    }

    let workers = worker_count as u64;
    let chunk_size = file_size / workers;

    let ranges = (0..worker_count)
        .map(|index| {
            let start = index as u64 * chunk_size;
            let end = if index == worker_count - 1 {
                file_size
            } else {
                start + chunk_size
            };
            ChunkRange { index, start, end }
        })
        .collect();

    log::debug!("Planned {worker_count} chunks of {chunk_size} bytes for {file_size} bytes");

    Ok(ranges)
}
