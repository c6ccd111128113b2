//! Start/cancel/reset lifecycle around copy runs.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use std::sync::Arc;

use crate::coordinator::{CopyCoordinator, RunHandle};
use crate::error::CopyError;
use crate::progress::{ChunkProgress, ProgressSink, RunOutcome};
use crate::types::{CopyRequest, CopyRunState, CopySettings};

/// User-facing copy session.
///
/// `Idle -> Running -> Completed | Failed -> (reset) -> Idle`. A finished
/// run stays visible until [`CopySession::reset`] is called.
pub struct CopySession {
    coordinator: CopyCoordinator,
    sink: Arc<dyn ProgressSink>,
    request: Option<CopyRequest>,
    run: Option<RunHandle>,
}

impl std::fmt::Debug for CopySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopySession")
            .field("coordinator", &self.coordinator)
            .field("request", &self.request)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CopySession {
    /// Create an idle session reporting to `sink`.
    #[must_use]
    pub fn new(settings: CopySettings, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            coordinator: CopyCoordinator::new(settings),
            sink,
            request: None,
            run: None,
        }
    }

    /// The settings runs are started with.
    #[must_use]
    pub const fn settings(&self) -> &CopySettings {
        self.coordinator.settings()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CopyRunState {
        match &self.run {
            None => CopyRunState::Idle,
            Some(run) => match run.outcome() {
                None => CopyRunState::Running,
                Some(RunOutcome::Success) => CopyRunState::Completed,
                Some(RunOutcome::Failure(_)) => CopyRunState::Failed,
            },
        }
    }

    /// The request of the current (or last finished) run.
    #[must_use]
    pub const fn request(&self) -> Option<&CopyRequest> {
        self.request.as_ref()
    }

    /// Handle to the current (or last finished) run.
    #[must_use]
    pub const fn run(&self) -> Option<&RunHandle> {
        self.run.as_ref()
    }

    /// Per-chunk progress of the current run; empty when idle.
    #[must_use]
    pub fn progress(&self) -> Vec<ChunkProgress> {
        self.run.as_ref().map(RunHandle::progress).unwrap_or_default()
    }

    /// Start copying with the configured worker count.
    ///
    /// # Errors
    ///
    /// * See [`CopySession::start`]
    pub fn start_copy(
        &mut self,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Result<RunHandle, CopyError> {
        let request = CopyRequest::new(source, destination, self.settings().worker_count);
        self.start(request)
    }

    /// Start a run for `request`.
    ///
    /// On error the session stays idle and no worker has been spawned.
    ///
    /// # Errors
    ///
    /// * If the session is not idle
    /// * If the coordinator refuses to start the run
    pub fn start(&mut self, request: CopyRequest) -> Result<RunHandle, CopyError> {
        let state = self.state();
        if state != CopyRunState::Idle {
            return Err(CopyError::InvalidState {
                action: "start",
                state,
            });
        }

        let handle = self
            .coordinator
            .run(request.clone(), Arc::clone(&self.sink))?;

        self.request = Some(request);
        self.run = Some(handle.clone());

        Ok(handle)
    }

    /// Request cancellation of the running copy.
    ///
    /// # Errors
    ///
    /// * If no run is in progress
    pub fn cancel(&self) -> Result<(), CopyError> {
        match (&self.run, self.state()) {
            (Some(run), CopyRunState::Running) => {
                run.cancel();
                Ok(())
            }
            (_, state) => Err(CopyError::InvalidState {
                action: "cancel",
                state,
            }),
        }
    }

    /// Block until the current run finishes.
    ///
    /// Returns `None` when idle.
    #[must_use]
    pub fn wait(&self) -> Option<RunOutcome> {
        self.run.as_ref().map(RunHandle::wait)
    }

    /// Forget the finished run and return to idle.
    ///
    /// Calling this while already idle is a no-op.
    ///
    /// # Errors
    ///
    /// * If a run is in progress
    pub fn reset(&mut self) -> Result<(), CopyError> {
        let state = self.state();
        if state == CopyRunState::Running {
            return Err(CopyError::InvalidState {
                action: "reset",
                state,
            });
        }

        log::debug!("Resetting session (was {state})");
        self.request = None;
        self.run = None;

        Ok(())
    }
}
