// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! mesh-ingest - load WKT outlines or mesh files and report statistics.
//!
//! Prints one JSON line per path on stdout; logs go to stderr. A single path
//! runs on a background loader, several paths run as one parallel batch.
//!
//! Configuration comes from `MESH_INGEST_*` environment variables and log
//! filtering from `RUST_LOG`.

use anyhow::{bail, Context};
use mesh_ingest_processing::{BatchLoader, LoadConfig, LoadedMesh, MeshLoader, Result};
use std::path::{Path, PathBuf};

fn report(path: &Path, outcome: &Result<LoadedMesh>) -> anyhow::Result<String> {
    let line = match outcome {
        Ok(loaded) => serde_json::json!({
            "path": path.display().to_string(),
            "source": loaded.source,
            "stats": loaded.stats,
        }),
        Err(e) => serde_json::json!({
            "path": path.display().to_string(),
            "error": e.to_string(),
        }),
    };
    serde_json::to_string(&line).context("Failed to encode report")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,mesh_ingest=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        bail!("usage: mesh-ingest <path>...");
    }

    let config = LoadConfig::from_env();
    tracing::info!(
        paths = paths.len(),
        polygon_policy = ?config.polygon_policy,
        extrusion_height = config.extrusion_height,
        coordinate_scale = config.coordinate_scale,
        "Starting mesh-ingest"
    );

    let outcomes = if let [path] = paths.as_slice() {
        let mut loader = MeshLoader::start(path, config);
        if !loader.is_started() {
            bail!("{} is empty or does not exist", path.display());
        }
        match loader.wait() {
            Some(outcome) => vec![outcome],
            None => bail!("Loader for {} produced no outcome", path.display()),
        }
    } else {
        BatchLoader::new(config).load_all(&paths)
    };

    let mut failed = 0usize;
    for (path, outcome) in paths.iter().zip(&outcomes) {
        if outcome.is_err() {
            failed += 1;
        }
        println!("{}", report(path, outcome)?);
    }

    if failed > 0 {
        bail!("{} of {} loads failed", failed, outcomes.len());
    }
    Ok(())
}
