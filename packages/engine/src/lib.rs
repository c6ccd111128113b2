//! Concurrent chunked file copying with per-chunk progress.
//!
//! A file is split into fixed, contiguous byte ranges and every range is
//! copied by its own worker thread:
//!
//! * [`plan_chunks`] partitions the source length into ranges
//! * [`ChunkCopier`] copies one range with seek/read/write and reports progress
//! * [`CopyCoordinator`] sizes the destination, spawns the workers and
//!   aggregates their outcomes
//! * [`CopySession`] wraps runs in an idle/running/finished lifecycle
//!
//! # Example
//!
//! ```rust,ignore
//! use chunkcopy_engine::{CopySession, CopySettings};
//!
//! let mut session = CopySession::new(CopySettings::default(), sink);
//! session.start_copy("big.iso", "copy.iso")?;
//!
//! if let Some(outcome) = session.wait() {
//!     println!("success: {}", outcome.is_success());
//! }
//! session.reset()?;
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod cancel;
mod chunk;
mod coordinator;
mod error;
mod plan;
mod progress;
mod session;
mod types;

#[cfg(test)]
mod test_support;

pub use cancel::CancelToken;
pub use chunk::{ChunkCopier, copy_chunk};
pub use coordinator::{CopyCoordinator, RunHandle};
pub use error::CopyError;
pub use plan::{ChunkRange, plan_chunks};
pub use progress::{ChunkProgress, ProgressSink, ProgressTracker, RunOutcome};
pub use session::CopySession;
pub use types::{
    CopyRequest, CopyRunState, CopySettings, DEFAULT_BUFFER_SIZE, DEFAULT_WORKER_COUNT,
    Preallocation,
};
