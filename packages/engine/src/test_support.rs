//! Shared fixtures for engine tests.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use crate::progress::{ChunkProgress, ProgressSink, RunOutcome};

/// Deterministic xorshift byte stream.
pub fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state.to_le_bytes()[0]
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Progress(ChunkProgress),
    ChunkDone(usize),
    RunDone(bool),
}

/// Records every event in arrival order.
///
/// Optionally truncates a file the first time a given chunk reports progress.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
    truncate: Option<(PathBuf, usize, u64)>,
    truncated: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_truncation(path: PathBuf, chunk_index: usize, len: u64) -> Arc<Self> {
        Arc::new(Self {
            truncate: Some((path, chunk_index, len)),
            ..Self::default()
        })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn chunk_done_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::ChunkDone(_)))
            .count()
    }

    pub fn run_done_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::RunDone(_)))
            .count()
    }
}

impl ProgressSink for RecordingSink {
    fn on_chunk_progress(&self, progress: &ChunkProgress) {
        self.events.lock().unwrap().push(Event::Progress(*progress));

        if let Some((path, chunk_index, len)) = &self.truncate
            && progress.chunk_index == *chunk_index
            && !self.truncated.swap(true, Ordering::SeqCst)
        {
            let file = OpenOptions::new().write(true).open(path).unwrap();
            file.set_len(*len).unwrap();
        }
    }

    fn on_chunk_done(&self, chunk_index: usize) {
        self.events.lock().unwrap().push(Event::ChunkDone(chunk_index));
    }

    fn on_run_done(&self, outcome: &RunOutcome) {
        self.events
            .lock()
            .unwrap()
            .push(Event::RunDone(outcome.is_success()));
    }
}

/// Blocks every progress callback until released.
#[derive(Debug, Default)]
pub struct GateSink {
    inner: RecordingSink,
    state: Mutex<GateState>,
    changed: Condvar,
}

#[derive(Debug, Default)]
struct GateState {
    open: bool,
    blocked: usize,
}

impl GateSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub const fn inner(&self) -> &RecordingSink {
        &self.inner
    }

    /// Wait until `count` callbacks are parked at the gate.
    pub fn wait_for_blocked(&self, count: usize) {
        let mut state = self.state.lock().unwrap();
        while state.blocked < count {
            state = self.changed.wait(state).unwrap();
        }
    }

    pub fn release(&self) {
        self.state.lock().unwrap().open = true;
        self.changed.notify_all();
    }
}

impl ProgressSink for GateSink {
    fn on_chunk_progress(&self, progress: &ChunkProgress) {
        self.inner.on_chunk_progress(progress);

        let mut state = self.state.lock().unwrap();
        if state.open {
            return;
        }
        state.blocked += 1;
        self.changed.notify_all();
        while !state.open {
            state = self.changed.wait(state).unwrap();
        }
    }

    fn on_chunk_done(&self, chunk_index: usize) {
        self.inner.on_chunk_done(chunk_index);
    }

    fn on_run_done(&self, outcome: &RunOutcome) {
        self.inner.on_run_done(outcome);
    }
}

/// Panics on the first progress event of one chunk.
#[derive(Debug, Default)]
pub struct PanickingSink {
    inner: RecordingSink,
    chunk_index: usize,
}

impl PanickingSink {
    pub fn new(chunk_index: usize) -> Arc<Self> {
        Arc::new(Self {
            chunk_index,
            ..Self::default()
        })
    }

    pub const fn inner(&self) -> &RecordingSink {
        &self.inner
    }
}

impl ProgressSink for PanickingSink {
    fn on_chunk_progress(&self, progress: &ChunkProgress) {
        self.inner.on_chunk_progress(progress);
        assert_ne!(progress.chunk_index, self.chunk_index, "sink failure");
    }

    fn on_chunk_done(&self, chunk_index: usize) {
        self.inner.on_chunk_done(chunk_index);
    }

    fn on_run_done(&self, outcome: &RunOutcome) {
        self.inner.on_run_done(outcome);
    }
}

/// Forwards the run result to another thread, then stays inside
/// `on_run_done` for a while.
#[derive(Debug)]
pub struct NotifyingSink {
    done: Mutex<Sender<bool>>,
    linger: Duration,
}

impl NotifyingSink {
    pub fn new(done: Sender<bool>, linger: Duration) -> Arc<Self> {
        Arc::new(Self {
            done: Mutex::new(done),
            linger,
        })
    }
}

impl ProgressSink for NotifyingSink {
    fn on_chunk_progress(&self, _progress: &ChunkProgress) {}

    fn on_run_done(&self, outcome: &RunOutcome) {
        self.done.lock().unwrap().send(outcome.is_success()).unwrap();
        thread::sleep(self.linger);
    }
}
