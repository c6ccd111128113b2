//! Orchestration of one concurrent chunked copy run.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::{self, File, OpenOptions};
use std::any::Any;
use std::io::{self, ErrorKind, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use rayon::ThreadPoolBuilder;

use crate::cancel::CancelToken;
use crate::chunk::ChunkCopier;
use crate::error::CopyError;
use crate::plan::{ChunkRange, plan_chunks};
use crate::progress::{ChunkProgress, ProgressSink, ProgressTracker, RunOutcome};
use crate::types::{CopyRequest, CopySettings, Preallocation};

/// Size of the zero block written by [`Preallocation::ZeroFill`].
const ZERO_BLOCK_SIZE: usize = 64 * 1024;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Starts copy runs and aggregates their per-chunk outcomes.
#[derive(Debug, Clone, Default)]
pub struct CopyCoordinator {
    settings: CopySettings,
}

impl CopyCoordinator {
    /// Create a coordinator with the given settings.
    #[must_use]
    pub const fn new(settings: CopySettings) -> Self {
        Self { settings }
    }

    /// The settings runs are started with.
    #[must_use]
    pub const fn settings(&self) -> &CopySettings {
        &self.settings
    }

    /// Start copying `request.source()` to `request.destination()`.
    ///
    /// Validation, source inspection and destination sizing happen before
    /// this returns; if any of them fails no worker is spawned. Otherwise
    /// one worker per chunk is started and the returned handle tracks the
    /// run. `sink.on_run_done` is called exactly once, after every chunk has
    /// either finished or failed. Failing chunks do not stop their peers
    /// unless [`CopySettings::cancel_on_failure`] is set.
    ///
    /// # Errors
    ///
    /// * If the request or settings are malformed
    /// * If the source is missing or unreadable
    /// * If source and destination are the same file
    /// * If the destination cannot be created or sized
    /// * If the worker threads cannot be spawned
    pub fn run(
        &self,
        request: CopyRequest,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<RunHandle, CopyError> {
        request.validate()?;
        if self.settings.buffer_size == 0 {
            return Err(CopyError::invalid_argument(
                "buffer size must be at least 1 byte",
            ));
        }

        log::debug!(
            "Starting copy: {} -> {} with {} workers",
            request.source().display(),
            request.destination().display(),
            request.worker_count()
        );

        let file_size = inspect_source(request.source())?;
        ensure_distinct(request.source(), request.destination())?;

        let ranges = plan_chunks(file_size, request.worker_count())?;

        // Sized before any worker thread exists.
        prepare_destination(
            request.destination(),
            file_size,
            self.settings.preallocation,
        )?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(ranges.len())
            .thread_name(|i| format!("chunkcopy-worker-{i}"))
            .build()?;

        let shared = Arc::new(RunShared {
            tracker: ProgressTracker::new(&ranges),
            remaining: AtomicUsize::new(ranges.len()),
            ranges,
            request,
            cancel: CancelToken::new(),
            first_error: Mutex::new(None),
            terminal: Mutex::new(Terminal::default()),
            finished: Condvar::new(),
        });

        for range in shared.ranges.iter().copied() {
            let shared = Arc::clone(&shared);
            let sink = Arc::clone(&sink);
            let buffer_size = self.settings.buffer_size;
            let cancel_on_failure = self.settings.cancel_on_failure;

            pool.spawn(move || {
                shared.run_chunk(sink.as_ref(), range, buffer_size, cancel_on_failure);
            });
        }

        Ok(RunHandle { shared })
    }
}

/// State shared between the workers of one run and its handles.
#[derive(Debug)]
struct RunShared {
    request: CopyRequest,
    ranges: Vec<ChunkRange>,
    tracker: Arc<ProgressTracker>,
    cancel: CancelToken,
    remaining: AtomicUsize,
    first_error: Mutex<Option<Arc<CopyError>>>,
    terminal: Mutex<Terminal>,
    finished: Condvar,
}

/// Terminal state of a run.
///
/// `outcome` is set before the sink hears about it so the sink can observe
/// (and react to) a finished run; `delivered` flips once the sink returns.
#[derive(Debug, Default)]
struct Terminal {
    outcome: Option<RunOutcome>,
    delivered: bool,
}

impl RunShared {
    fn run_chunk(
        &self,
        sink: &dyn ProgressSink,
        range: ChunkRange,
        buffer_size: usize,
        cancel_on_failure: bool,
    ) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| -> Result<(), CopyError> {
            ChunkCopier::new(
                self.request.source(),
                self.request.destination(),
                range,
                buffer_size,
            )
            .with_cancel(&self.cancel)
            .copy(|progress: &ChunkProgress| {
                self.tracker.record(progress);
                sink.on_chunk_progress(progress);
            })?;
            sink.on_chunk_done(range.index);
            Ok(())
        }))
        .unwrap_or_else(|payload| {
            Err(CopyError::Panicked {
                chunk_index: range.index,
                message: panic_message(payload.as_ref()),
            })
        });

        if let Err(error) = result {
            log::warn!("{error}");
            self.record_failure(error);
            if cancel_on_failure {
                self.cancel.cancel();
            }
        }

        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.finish(sink);
        }
    }

    fn record_failure(&self, error: CopyError) {
        let mut first = lock(&self.first_error);
        if first.is_none() {
            *first = Some(Arc::new(error));
        }
    }

    fn finish(&self, sink: &dyn ProgressSink) {
        let outcome = lock(&self.first_error)
            .clone()
            .map_or(RunOutcome::Success, RunOutcome::Failure);

        match &outcome {
            RunOutcome::Success => log::info!(
                "Copied {} bytes to {}",
                self.tracker.total_bytes(),
                self.request.destination().display()
            ),
            RunOutcome::Failure(error) => log::info!("Copy failed: {error}"),
        }

        lock(&self.terminal).outcome = Some(outcome.clone());

        if panic::catch_unwind(AssertUnwindSafe(|| sink.on_run_done(&outcome))).is_err() {
            log::warn!("Progress sink panicked in on_run_done");
        }

        lock(&self.terminal).delivered = true;
        self.finished.notify_all();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Handle to a run started by [`CopyCoordinator::run`].
///
/// Cheap to clone; all clones observe the same run.
#[derive(Debug, Clone)]
pub struct RunHandle {
    shared: Arc<RunShared>,
}

impl RunHandle {
    /// The request this run is copying.
    #[must_use]
    pub fn request(&self) -> &CopyRequest {
        &self.shared.request
    }

    /// The planned chunk ranges.
    #[must_use]
    pub fn chunks(&self) -> &[ChunkRange] {
        &self.shared.ranges
    }

    /// Per-chunk progress snapshot, ordered by chunk index.
    #[must_use]
    pub fn progress(&self) -> Vec<ChunkProgress> {
        self.shared.tracker.snapshot()
    }

    /// Bytes copied so far across all chunks.
    #[must_use]
    pub fn bytes_transferred(&self) -> u64 {
        self.shared.tracker.bytes_transferred()
    }

    /// Size of the source file when the run started.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.shared.tracker.total_bytes()
    }

    /// Overall completion across all chunks.
    #[must_use]
    pub fn overall_percent(&self) -> u8 {
        self.shared.tracker.overall_percent()
    }

    /// Ask every running chunk to stop before its next read.
    pub fn cancel(&self) {
        log::debug!("Cancellation requested");
        self.shared.cancel.cancel();
    }

    /// The terminal outcome, or `None` while chunks are still running.
    #[must_use]
    pub fn outcome(&self) -> Option<RunOutcome> {
        lock(&self.shared.terminal).outcome.clone()
    }

    /// Whether every chunk has reported a terminal outcome.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        lock(&self.shared.terminal).outcome.is_some()
    }

    /// Block until the run is over.
    ///
    /// Returns after the sink's `on_run_done` has returned, so it must not
    /// be called from inside that callback.
    #[must_use]
    pub fn wait(&self) -> RunOutcome {
        let mut guard = lock(&self.shared.terminal);
        loop {
            if guard.delivered
                && let Some(outcome) = guard.outcome.as_ref()
            {
                return outcome.clone();
            }
            guard = self
                .shared
                .finished
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Query the source length, making sure it is a readable regular file.
fn inspect_source(path: &Path) -> Result<u64, CopyError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CopyError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(CopyError::SourceUnreadable {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    if !metadata.is_file() {
        return Err(CopyError::SourceUnreadable {
            path: path.to_path_buf(),
            source: io::Error::new(ErrorKind::InvalidInput, "not a regular file"),
        });
    }

    File::open(path).map_err(|e| CopyError::SourceUnreadable {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(metadata.len())
}

/// Refuse to copy a file onto itself, including through hard links or a
/// different spelling of its path.
fn ensure_distinct(source: &Path, destination: &Path) -> Result<(), CopyError> {
    let Ok(destination_meta) = fs::metadata(destination) else {
        // Destination doesn't exist yet, so it can't be the source.
        return Ok(());
    };

    let source_meta = fs::metadata(source).map_err(|e| CopyError::SourceUnreadable {
        path: source.to_path_buf(),
        source: e,
    })?;

    if same_file(source, &source_meta, destination, &destination_meta) {
        return Err(CopyError::invalid_argument(format!(
            "source and destination are the same file: {}",
            destination.display()
        )));
    }

    Ok(())
}

#[cfg(unix)]
fn same_file(_: &Path, a: &fs::Metadata, _: &Path, b: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_file(a: &Path, _: &fs::Metadata, b: &Path, _: &fs::Metadata) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Create the destination and size it to exactly `size` bytes.
fn prepare_destination(
    path: &Path,
    size: u64,
    preallocation: Preallocation,
) -> Result<(), CopyError> {
    let unwritable = |e: io::Error| CopyError::DestinationUnwritable {
        path: path.to_path_buf(),
        source: e,
    };

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(unwritable)?;

    match preallocation {
        Preallocation::Sparse => file.set_len(size).map_err(unwritable)?,
        Preallocation::ZeroFill => {
            file.set_len(0).map_err(unwritable)?;

            let block_len = usize::try_from(size).map_or(ZERO_BLOCK_SIZE, |s| s.min(ZERO_BLOCK_SIZE));
            let zeros = vec![0u8; block_len];
            let mut writer = &file;
            let mut written: u64 = 0;
            while written < size {
                let len = usize::try_from(size - written).map_or(block_len, |r| r.min(block_len));
                writer.write_all(&zeros[..len]).map_err(unwritable)?;
                written += len as u64;
            }
        }
    }

    log::debug!(
        "Prepared destination {} ({size} bytes, {preallocation:?})",
        path.display()
    );

    Ok(())
}
