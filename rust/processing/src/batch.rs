// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parallel loading of many independent sources.
//!
//! Configuration is snapshotted once under the config lock, every path is loaded
//! on the rayon pool with no shared mutable state, and the outcomes come back
//! to the caller in input order.

use crate::cancel::CancellationToken;
use crate::config::LoadConfig;
use crate::error::Result;
use crate::pipeline::{run_pipeline, LoadedMesh};
use mesh_ingest_geometry::{Importer, ObjImporter};
use rayon::prelude::*;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Loads many paths concurrently
pub struct BatchLoader {
    config: Mutex<LoadConfig>,
    importer: Arc<dyn Importer>,
    cancel: CancellationToken,
}

impl BatchLoader {
    pub fn new(config: LoadConfig) -> Self {
        Self::with_importer(config, Arc::new(ObjImporter::new()))
    }

    pub fn with_importer(config: LoadConfig, importer: Arc<dyn Importer>) -> Self {
        Self {
            config: Mutex::new(config),
            importer,
            cancel: CancellationToken::new(),
        }
    }

    /// Copy of the current configuration
    pub fn config(&self) -> LoadConfig {
        self.config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the configuration used by later batches
    pub fn set_config(&self, config: LoadConfig) {
        *self
            .config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    }

    /// Token that cancels every in-flight load of this loader
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Load every path; outcome `i` belongs to `paths[i]`
    pub fn load_all<P>(&self, paths: &[P]) -> Vec<Result<LoadedMesh>>
    where
        P: AsRef<Path> + Sync,
    {
        let config = self.config();
        let start = Instant::now();
        tracing::info!(count = paths.len(), threads = config.batch_threads, "Starting batch load");

        let run = || -> Vec<Result<LoadedMesh>> {
            paths
                .par_iter()
                .map(|path| {
                    run_pipeline(path.as_ref(), &config, self.importer.as_ref(), &self.cancel)
                })
                .collect()
        };

        let outcomes = if config.batch_threads > 0 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(config.batch_threads)
                .thread_name(|i| format!("mesh-ingest-batch-{}", i))
                .build()
            {
                Ok(pool) => pool.install(run),
                Err(e) => {
                    tracing::warn!(error = %e, "Falling back to the global rayon pool");
                    run()
                }
            }
        } else {
            run()
        };

        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        tracing::info!(
            count = outcomes.len(),
            failed,
            total_time_ms = start.elapsed().as_millis() as u64,
            "Batch load complete"
        );
        outcomes
    }
}
