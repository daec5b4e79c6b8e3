// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One load, start to finish, on the calling thread.

use crate::cancel::CancellationToken;
use crate::config::{LoadConfig, PolygonPolicy};
use crate::error::{LoadError, Result};
use crate::source::SourceKind;
use mesh_ingest_core::{parse_geometry_collection, parse_geometry_collection_all};
use mesh_ingest_geometry::{
    assemble, build_extruded_solids, ImportOptions, ImportSource, Importer, Mesh,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Counts and timings of one load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadStats {
    /// Polygons extruded (WKT sources only).
    pub polygons: usize,
    /// Sub-meshes in the imported scene.
    pub sub_meshes: usize,
    /// Vertices in the unified mesh.
    pub vertices: usize,
    /// Triangles in the unified mesh.
    pub triangles: usize,
    /// Time spent reading and parsing WKT (ms).
    pub parse_time_ms: u64,
    /// Time spent synthesizing the solid (ms).
    pub synthesize_time_ms: u64,
    /// Time spent in the importer (ms).
    pub import_time_ms: u64,
    /// Time spent assembling the unified mesh (ms).
    pub assemble_time_ms: u64,
    /// Total load time (ms).
    pub total_time_ms: u64,
}

/// Successful load outcome
#[derive(Debug, Clone)]
pub struct LoadedMesh {
    pub path: PathBuf,
    pub source: SourceKind,
    pub mesh: Mesh,
    pub stats: LoadStats,
}

/// Reject empty and non-existent paths
pub fn check_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(LoadError::InvalidPath("empty path".to_string()));
    }
    if !path.exists() {
        return Err(LoadError::InvalidPath(format!(
            "{} does not exist",
            path.display()
        )));
    }
    Ok(())
}

/// Read a WKT file and extrude its polygons into OBJ text for the importer
fn synthesize_wkt(
    path: &Path,
    config: &LoadConfig,
    cancel: &CancellationToken,
    stats: &mut LoadStats,
) -> Result<ImportSource> {
    cancel.checkpoint("read")?;
    let parse_start = Instant::now();
    let text = std::fs::read_to_string(path)?;

    cancel.checkpoint("parse")?;
    let polygons = match config.polygon_policy {
        PolygonPolicy::FirstOnly => vec![parse_geometry_collection(&text)?],
        PolygonPolicy::All => parse_geometry_collection_all(&text)?,
    };
    stats.polygons = polygons.len();
    stats.parse_time_ms = parse_start.elapsed().as_millis() as u64;

    cancel.checkpoint("synthesize")?;
    let synthesize_start = Instant::now();
    let solid = build_extruded_solids(
        &polygons,
        config.extrusion_height,
        config.coordinate_scale,
    )?;
    stats.synthesize_time_ms = synthesize_start.elapsed().as_millis() as u64;

    tracing::debug!(
        polygons = polygons.len(),
        vertices = solid.vertex_count(),
        faces = solid.face_count(),
        "Synthesized solid"
    );

    Ok(ImportSource::memory(solid.to_obj_text(), "obj"))
}

/// Run every stage of one load
pub fn run_pipeline(
    path: &Path,
    config: &LoadConfig,
    importer: &dyn Importer,
    cancel: &CancellationToken,
) -> Result<LoadedMesh> {
    let total_start = Instant::now();
    check_path(path)?;

    let source = SourceKind::classify(path);
    tracing::info!(path = %path.display(), source = ?source, "Starting load");

    let mut stats = LoadStats::default();
    let (import_source, options) = match source {
        SourceKind::Wkt => (
            synthesize_wkt(path, config, cancel, &mut stats)?,
            ImportOptions::for_wkt(),
        ),
        SourceKind::File => (ImportSource::path(path), ImportOptions::for_file()),
    };

    cancel.checkpoint("import")?;
    let import_start = Instant::now();
    let scene = importer.import(&import_source, &options)?;
    stats.import_time_ms = import_start.elapsed().as_millis() as u64;
    stats.sub_meshes = scene.mesh_count();

    cancel.checkpoint("assemble")?;
    let assemble_start = Instant::now();
    let mesh = assemble(&scene, source.is_wkt())?;
    mesh.validate()?;
    stats.assemble_time_ms = assemble_start.elapsed().as_millis() as u64;

    stats.vertices = mesh.vertex_count();
    stats.triangles = mesh.triangle_count();
    stats.total_time_ms = total_start.elapsed().as_millis() as u64;

    tracing::info!(
        path = %path.display(),
        sub_meshes = stats.sub_meshes,
        vertices = stats.vertices,
        triangles = stats.triangles,
        total_time_ms = stats.total_time_ms,
        "Load complete"
    );

    Ok(LoadedMesh {
        path: path.to_path_buf(),
        source,
        mesh,
        stats,
    })
}
