// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use mesh_ingest_geometry::{Importer, ImportOptions, ImportSource, Scene};
use mesh_ingest_processing::{
    BatchLoader, LoadConfig, LoadError, LoadState, LoadStats, MeshLoader, SourceKind,
};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const HOLED: &str = "GEOMETRYCOLLECTION(POLYGON((0 0,10 0,10 10,0 10,0 0),(3 3,7 3,7 7,3 7,3 3)))";

/// Importer that records calls and returns an empty scene
#[derive(Default)]
struct EmptyImporter {
    calls: AtomicUsize,
}

impl Importer for EmptyImporter {
    fn import(
        &self,
        _source: &ImportSource,
        _options: &ImportOptions,
    ) -> mesh_ingest_geometry::Result<Scene> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Scene::new())
    }

    fn supports(&self, _format: &str) -> bool {
        true
    }
}

#[test]
fn wkt_load_produces_valid_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Floor.WKT");
    fs::write(&path, format!("  {}\r\n", HOLED)).unwrap();

    let mut loader = MeshLoader::start(&path, LoadConfig::default());
    let loaded = loader.wait().unwrap().unwrap();

    assert_eq!(loaded.source, SourceKind::Wkt);
    assert_eq!(loaded.path, path);
    loaded.mesh.validate().unwrap();
    assert_eq!(loaded.mesh.triangle_count(), 48);
    assert_eq!(loader.state(), LoadState::Completed);
}

#[test]
fn obj_file_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quad.obj");
    fs::write(&path, "o quad\nv 0 0 0\nv 2 0 0\nv 2 2 0\nv 0 2 0\nf 1 2 3 4\n").unwrap();

    let mut loader = MeshLoader::start(&path, LoadConfig::default());
    let loaded = loader.wait().unwrap().unwrap();

    assert_eq!(loaded.source, SourceKind::File);
    assert_eq!(loaded.stats.sub_meshes, 1);
    assert_eq!(loaded.stats.triangles, 2);
    loaded.mesh.validate().unwrap();
}

#[test]
fn empty_scene_from_custom_importer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.any");
    fs::write(&path, "data").unwrap();

    let importer = Arc::new(EmptyImporter::default());
    let mut loader =
        MeshLoader::start_with_importer(&path, LoadConfig::default(), importer.clone());
    let err = loader.wait().unwrap().unwrap_err();

    assert!(matches!(err, LoadError::EmptyScene));
    assert_eq!(importer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(loader.state(), LoadState::Failed);
}

#[test]
fn invalid_path_never_starts_importer() {
    let importer = Arc::new(EmptyImporter::default());
    let mut loader = MeshLoader::start_with_importer("", LoadConfig::default(), importer.clone());

    assert!(!loader.is_started());
    assert!(loader.wait().is_none());
    assert_eq!(importer.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn batch_stats_serialize() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("floor.wkt");
    fs::write(&path, HOLED).unwrap();

    let outcomes = BatchLoader::new(LoadConfig::default()).load_all(&[&path]);
    let stats = &outcomes[0].as_ref().unwrap().stats;

    let json = serde_json::to_string(stats).unwrap();
    let back: LoadStats = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, stats);
    assert!(json.contains("\"triangles\":48"));
}
