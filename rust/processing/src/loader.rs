// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background load orchestration
//!
//! [`MeshLoader::start`] runs the pipeline on one named worker thread. The
//! worker resolves a one-shot channel exactly once, after every buffer of the
//! outcome is built; the owning thread picks it up with
//! [`MeshLoader::try_complete`] or [`MeshLoader::wait`].

use crate::cancel::CancellationToken;
use crate::config::LoadConfig;
use crate::error::{LoadError, Result};
use crate::pipeline::{check_path, run_pipeline, LoadedMesh};
use mesh_ingest_geometry::{Importer, ObjImporter};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvError, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const WORKER_NAME: &str = "mesh-ingest-loader";

/// Slice used while waiting out the completion delay
const DELAY_POLL: Duration = Duration::from_millis(10);

/// Lifecycle of a [`MeshLoader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Never started (empty or missing path); never signals
    Idle,
    /// Worker running or outcome not yet collected
    Running,
    /// Outcome collected: success
    Completed,
    /// Outcome collected: failure
    Failed,
}

/// Handle to one background load
#[derive(Debug)]
pub struct MeshLoader {
    path: PathBuf,
    state: LoadState,
    cancel: CancellationToken,
    receiver: Option<Receiver<Result<LoadedMesh>>>,
    worker: Option<JoinHandle<()>>,
}

impl MeshLoader {
    /// Start loading `path` with the built-in OBJ importer
    pub fn start(path: impl AsRef<Path>, config: LoadConfig) -> Self {
        Self::start_with_importer(path, config, Arc::new(ObjImporter::new()))
    }

    /// Start loading `path` with a custom importer
    ///
    /// An empty or non-existent path yields an [`LoadState::Idle`] loader
    /// that never starts a worker; check [`MeshLoader::is_started`].
    pub fn start_with_importer(
        path: impl AsRef<Path>,
        config: LoadConfig,
        importer: Arc<dyn Importer>,
    ) -> Self {
        let path = path.as_ref().to_path_buf();
        if let Err(e) = check_path(&path) {
            tracing::debug!(error = %e, "Load not started");
            return Self::idle(path);
        }

        let cancel = CancellationToken::new();
        let (sender, receiver) = mpsc::sync_channel(1);

        let worker_path = path.clone();
        let worker_cancel = cancel.clone();
        let worker_sender = sender.clone();
        let spawned = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || {
                let outcome =
                    run_pipeline(&worker_path, &config, importer.as_ref(), &worker_cancel);
                wait_out_delay(config.completion_delay, &worker_cancel);
                if worker_sender.send(outcome).is_err() {
                    tracing::trace!("Load outcome dropped, loader is gone");
                }
            });

        let worker = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "Failed to spawn load worker");
                // Capacity 1 and no other sender has run, so this cannot block
                let _ = sender.send(Err(LoadError::Worker(e.to_string())));
                None
            }
        };

        Self {
            path,
            state: LoadState::Running,
            cancel,
            receiver: Some(receiver),
            worker,
        }
    }

    fn idle(path: PathBuf) -> Self {
        Self {
            path,
            state: LoadState::Idle,
            cancel: CancellationToken::new(),
            receiver: None,
            worker: None,
        }
    }

    /// Whether a worker was started for this load
    pub fn is_started(&self) -> bool {
        self.state != LoadState::Idle
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Request cancellation; the outcome still arrives, usually as
    /// [`LoadError::Cancelled`]
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Poll for the outcome without blocking; yields `Some` exactly once
    pub fn try_complete(&mut self) -> Option<Result<LoadedMesh>> {
        let receiver = self.receiver.as_ref()?;
        let outcome = match receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(Self::worker_lost()),
        };
        Some(self.finish(outcome))
    }

    /// Block until the outcome arrives; `None` if idle or already collected
    pub fn wait(&mut self) -> Option<Result<LoadedMesh>> {
        let receiver = self.receiver.as_ref()?;
        let outcome = match receiver.recv() {
            Ok(outcome) => outcome,
            Err(RecvError) => Err(Self::worker_lost()),
        };
        Some(self.finish(outcome))
    }

    fn worker_lost() -> LoadError {
        LoadError::Worker("worker exited without an outcome".to_string())
    }

    fn finish(&mut self, outcome: Result<LoadedMesh>) -> Result<LoadedMesh> {
        self.receiver = None;
        self.join_worker();
        self.state = match &outcome {
            Ok(_) => LoadState::Completed,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Load failed");
                LoadState::Failed
            }
        };
        outcome
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                tracing::error!(path = %self.path.display(), "Load worker panicked");
            }
        }
    }
}

impl Drop for MeshLoader {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.cancel.cancel();
            self.join_worker();
        }
    }
}

/// Sleep for `delay`, returning early once cancelled
fn wait_out_delay(delay: Duration, cancel: &CancellationToken) {
    if delay.is_zero() {
        return;
    }
    let deadline = Instant::now() + delay;
    while !cancel.is_cancelled() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(DELAY_POLL.min(deadline - now));
    }
}
