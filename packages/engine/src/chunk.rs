//! Copying one chunk of a file with positioned reads and writes.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::cancel::CancelToken;
use crate::error::CopyError;
use crate::plan::ChunkRange;
use crate::progress::ChunkProgress;

/// Copies the bytes of a single [`ChunkRange`] from source to destination.
///
/// The destination must already be at least `range.end` bytes long; the
/// coordinator sizes it before any copier runs.
#[derive(Debug, Clone, Copy)]
pub struct ChunkCopier<'a> {
    source: &'a Path,
    destination: &'a Path,
    range: ChunkRange,
    buffer_size: usize,
    cancel: Option<&'a CancelToken>,
}

impl<'a> ChunkCopier<'a> {
    /// Create a copier for `range`.
    #[must_use]
    pub const fn new(
        source: &'a Path,
        destination: &'a Path,
        range: ChunkRange,
        buffer_size: usize,
    ) -> Self {
        Self {
            source,
            destination,
            range,
            buffer_size,
            cancel: None,
        }
    }

    /// Stop with [`CopyError::Cancelled`] once `token` is cancelled.
    #[must_use]
    pub const fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The range this copier is responsible for.
    #[must_use]
    pub const fn range(&self) -> &ChunkRange {
        &self.range
    }

    /// Copy the range, reporting progress after every read/write cycle.
    ///
    /// An empty range reports 100% once and performs no I/O. Both file
    /// handles are closed on every return path.
    ///
    /// Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// * If the buffer size is zero
    /// * If either file cannot be opened or seeked
    /// * If a read or write fails
    /// * If the source ends before the range is filled
    /// * If cancellation is requested
    pub fn copy<F>(&self, mut on_progress: F) -> Result<u64, CopyError>
    where
        F: FnMut(&ChunkProgress),
    {
        if self.buffer_size == 0 {
            return Err(CopyError::invalid_argument(
                "buffer size must be at least 1 byte",
            ));
        }

        let index = self.range.index;
        let expected = self.range.len();

        if self.range.is_empty() {
            log::trace!("Chunk {index} is empty, nothing to copy");
            on_progress(&ChunkProgress::new(&self.range, 0));
            return Ok(0);
        }

        log::debug!(
            "Chunk {index}: copying [{}, {}) from {} to {}",
            self.range.start,
            self.range.end,
            self.source.display(),
            self.destination.display()
        );

        let mut source = File::open(self.source).map_err(|e| self.io_error(self.source, e))?;
        let mut destination = OpenOptions::new()
            .write(true)
            .open(self.destination)
            .map_err(|e| self.io_error(self.destination, e))?;

        source
            .seek(SeekFrom::Start(self.range.start))
            .map_err(|e| self.io_error(self.source, e))?;
        destination
            .seek(SeekFrom::Start(self.range.start))
            .map_err(|e| self.io_error(self.destination, e))?;

        let capacity = usize::try_from(expected).map_or(self.buffer_size, |len| {
            len.min(self.buffer_size)
        });
        let mut buffer = vec![0u8; capacity];
        let mut transferred: u64 = 0;

        while transferred < expected {
            if self.cancel.is_some_and(CancelToken::is_cancelled) {
                log::debug!("Chunk {index} cancelled after {transferred} bytes");
                return Err(CopyError::Cancelled { chunk_index: index });
            }

            // Never read past the end of our own range.
            let want = usize::try_from(expected - transferred)
                .map_or(buffer.len(), |remaining| remaining.min(buffer.len()));

            let read = match source.read(&mut buffer[..want]) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.io_error(self.source, e)),
            };

            if read == 0 {
                return Err(CopyError::UnexpectedEof {
                    chunk_index: index,
                    expected,
                    transferred,
                });
            }

            destination
                .write_all(&buffer[..read])
                .map_err(|e| self.io_error(self.destination, e))?;

            transferred += read as u64;
            log::trace!("Chunk {index}: {transferred}/{expected} bytes");

            on_progress(&ChunkProgress::new(&self.range, transferred));
        }

        log::debug!("Chunk {index} finished ({transferred} bytes)");

        Ok(transferred)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> CopyError {
        CopyError::Io {
            chunk_index: self.range.index,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Copy one chunk without cancellation support.
///
/// # Errors
///
/// * See [`ChunkCopier::copy`]
pub fn copy_chunk<F>(
    source: &Path,
    destination: &Path,
    range: ChunkRange,
    buffer_size: usize,
    on_progress: F,
) -> Result<u64, CopyError>
where
    F: FnMut(&ChunkProgress),
{
    ChunkCopier::new(source, destination, range, buffer_size).copy(on_progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::pseudo_random_bytes;
    use std::fs;
    use tempfile::TempDir;

    fn range(index: usize, start: u64, end: u64) -> ChunkRange {
        ChunkRange { index, start, end }
    }

    #[test]
    fn test_copy_chunk_copies_only_its_range() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.bin");
        let target = dir.path().join("target.bin");

        let data = pseudo_random_bytes(1000, 7);
        fs::write(&source, &data).unwrap();
        fs::write(&target, vec![0u8; 1000]).unwrap();

        let copied = copy_chunk(&source, &target, range(1, 250, 500), 64, |_| {}).unwrap();
        assert_eq!(copied, 250);

        let written = fs::read(&target).unwrap();
        assert_eq!(&written[250..500], &data[250..500]);
        assert!(written[..250].iter().all(|&b| b == 0));
        assert!(written[500..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_progress_after_every_cycle() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.bin");
        let target = dir.path().join("target.bin");

        fs::write(&source, pseudo_random_bytes(100, 1)).unwrap();
        fs::write(&target, vec![0u8; 100]).unwrap();

        let mut events = Vec::new();
        copy_chunk(&source, &target, range(0, 0, 100), 16, |p| events.push(*p)).unwrap();

        // 6 full buffers and one 4-byte tail
        assert_eq!(events.len(), 7);
        assert!(
            events
                .windows(2)
                .all(|w| w[0].bytes_transferred <= w[1].bytes_transferred)
        );
        let last = events.last().unwrap();
        assert_eq!(last.bytes_transferred, 100);
        assert_eq!(last.percent, 100);
        assert_eq!(events[0].percent, 16);
    }

    #[test]
    fn test_empty_range_reports_complete_without_io() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("missing-source.bin");
        let target = dir.path().join("missing-target.bin");

        let mut events = Vec::new();
        let copied = copy_chunk(&source, &target, range(3, 10, 10), 2048, |p| events.push(*p)).unwrap();

        assert_eq!(copied, 0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].chunk_index, 3);
        assert_eq!(events[0].percent, 100);
        assert!(!target.exists());
    }

    #[test]
    fn test_source_shorter_than_range_is_eof_error() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.bin");
        let target = dir.path().join("target.bin");

        fs::write(&source, vec![1u8; 60]).unwrap();
        fs::write(&target, vec![0u8; 100]).unwrap();

        let err = copy_chunk(&source, &target, range(2, 50, 100), 8, |_| {}).unwrap_err();
        match err {
            CopyError::UnexpectedEof {
                chunk_index,
                expected,
                transferred,
            } => {
                assert_eq!(chunk_index, 2);
                assert_eq!(expected, 50);
                assert_eq!(transferred, 10);
            }
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("missing.bin");
        let target = dir.path().join("target.bin");
        fs::write(&target, vec![0u8; 10]).unwrap();

        let err = copy_chunk(&source, &target, range(1, 0, 10), 4, |_| {}).unwrap_err();
        assert!(matches!(err, CopyError::Io { chunk_index: 1, .. }));
    }

    #[test]
    fn test_missing_destination_is_io_error() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.bin");
        let target = dir.path().join("missing.bin");
        fs::write(&source, vec![5u8; 10]).unwrap();

        let err = copy_chunk(&source, &target, range(0, 0, 10), 4, |_| {}).unwrap_err();
        match err {
            CopyError::Io { path, .. } => assert_eq!(path, target),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn test_cancelled_token_stops_chunk() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.bin");
        let target = dir.path().join("target.bin");

        fs::write(&source, vec![9u8; 64]).unwrap();
        fs::write(&target, vec![0u8; 64]).unwrap();

        let token = CancelToken::new();
        let mut events = 0;
        let err = ChunkCopier::new(&source, &target, range(0, 0, 64), 8)
            .with_cancel(&token)
            .copy(|_| {
                events += 1;
                if events == 2 {
                    token.cancel();
                }
            })
            .unwrap_err();

        assert!(matches!(err, CopyError::Cancelled { chunk_index: 0 }));
        assert_eq!(events, 2);
    }

    #[test]
    fn test_zero_buffer_size_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("any.bin");

        let err = copy_chunk(&path, &path, range(0, 0, 1), 0, |_| {}).unwrap_err();
        assert!(matches!(err, CopyError::InvalidArgument { .. }));
    }
}
