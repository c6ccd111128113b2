//! Progress bars fed by the copy engine.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::{PoisonError, RwLock};

use chunkcopy_engine::{ChunkProgress, ProgressSink, RunOutcome};
use indicatif::{HumanBytes, MultiProgress, ProgressBar, ProgressStyle};

/// One progress bar per chunk, safe to update from any worker thread.
pub struct ChunkProgressBars {
    multi: MultiProgress,
    bars: RwLock<Vec<ProgressBar>>,
    enabled: bool,
}

impl ChunkProgressBars {
    /// Create an empty set of bars.
    ///
    /// If progress is disabled, every bar created later is hidden.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: RwLock::new(Vec::new()),
            enabled,
        }
    }

    /// Replace the current bars with `count` fresh ones.
    ///
    /// Must be called before the run starts so no event arrives for a
    /// missing bar.
    pub fn prepare(&self, count: usize) {
        self.clear();

        let bars = (0..count).map(|index| self.create_chunk_bar(index)).collect();
        *self.bars.write().unwrap_or_else(PoisonError::into_inner) = bars;
    }

    fn create_chunk_bar(&self, index: usize) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi.add(ProgressBar::new(100));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  chunk {prefix:<3} [{bar:30.green/dim}] {pos:>3}% {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("━━─"),
        );
        pb.set_prefix(index.to_string());
        pb
    }

    /// Remove all bars from the terminal.
    pub fn clear(&self) {
        let mut bars = self.bars.write().unwrap_or_else(PoisonError::into_inner);
        for bar in bars.drain(..) {
            bar.finish_and_clear();
        }
        self.multi.clear().ok();
    }

    fn with_bar(&self, index: usize, f: impl FnOnce(&ProgressBar)) {
        let bars = self.bars.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = bars.get(index) {
            f(bar);
        }
    }
}

impl ProgressSink for ChunkProgressBars {
    fn on_chunk_progress(&self, progress: &ChunkProgress) {
        self.with_bar(progress.chunk_index, |bar| {
            bar.set_position(u64::from(progress.percent));
            bar.set_message(HumanBytes(progress.bytes_transferred).to_string());
        });
    }

    fn on_chunk_done(&self, chunk_index: usize) {
        self.with_bar(chunk_index, ProgressBar::finish);
    }

    fn on_run_done(&self, outcome: &RunOutcome) {
        match outcome {
            RunOutcome::Success => log::debug!("All chunks finished"),
            RunOutcome::Failure(error) => log::debug!("Run failed: {error}"),
        }
    }
}
