// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end: WKT outline -> extruded solid -> OBJ import -> unified mesh

use approx::assert_relative_eq;
use mesh_ingest_core::{parse_geometry_collection, parse_geometry_collection_all};
use mesh_ingest_geometry::{
    assemble, build_extruded_solid, build_extruded_solids, ImportOptions, ImportSource, Importer,
    Mesh, ObjImporter, CENTIMETERS_PER_METER, DEFAULT_EXTRUSION_HEIGHT,
};
use std::io::Write;

const SQUARE_WITH_HOLE: &str =
    "GEOMETRYCOLLECTION(POLYGON((0 0,10 0,10 10,0 10,0 0),(3 3,7 3,7 7,3 7,3 3)))";

fn load_wkt(wkt: &str) -> Mesh {
    let polygon = parse_geometry_collection(wkt).unwrap();
    let solid =
        build_extruded_solid(&polygon, DEFAULT_EXTRUSION_HEIGHT, CENTIMETERS_PER_METER).unwrap();
    let source = ImportSource::memory(solid.to_obj_text(), "obj");
    let scene = ObjImporter::new()
        .import(&source, &ImportOptions::for_wkt())
        .unwrap();
    assemble(&scene, true).unwrap()
}

fn assert_unit_normals(mesh: &Mesh) {
    for n in mesh.normals.chunks_exact(3) {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert_relative_eq!(len, 1.0, epsilon = 1e-5);
    }
}

#[test]
fn square_solid_mesh_invariants() {
    let mesh = load_wkt("GEOMETRYCOLLECTION(POLYGON((0 0,10 0,10 10,0 10,0 0)))");

    mesh.validate().unwrap();
    assert_eq!(mesh.triangle_count(), 20);
    assert_unit_normals(&mesh);

    let (min, max) = mesh.bounds();
    assert_eq!((min.x, min.y, min.z), (0.0, 0.0, 0.0));
    assert_eq!((max.x, max.y, max.z), (1000.0, 1000.0, 100.0));
}

#[test]
fn holed_solid_mesh_invariants() {
    let mesh = load_wkt(SQUARE_WITH_HOLE);

    mesh.validate().unwrap();
    assert_unit_normals(&mesh);
    // 8 floor triangles twice plus 8 ring edges with 4 wall triangles each
    assert_eq!(mesh.triangle_count(), 16 + 32);
}

#[test]
fn every_polygon_becomes_a_block() {
    let polygons = parse_geometry_collection_all(
        "GEOMETRYCOLLECTION(POLYGON((0 0,1 0,1 1,0 0)),POLYGON((5 5,6 5,6 6,5 6,5 5)))",
    )
    .unwrap();
    assert_eq!(polygons.len(), 2);

    let solid = build_extruded_solids(&polygons, 100.0, 100.0).unwrap();
    let scene = ObjImporter::new()
        .import(
            &ImportSource::memory(solid.to_obj_text(), "obj"),
            &ImportOptions::for_wkt(),
        )
        .unwrap();
    let mesh = assemble(&scene, true).unwrap();

    mesh.validate().unwrap();
    // Triangle: 2 floor + 12 wall, square: 4 floor + 16 wall
    assert_eq!(mesh.triangle_count(), 14 + 20);
    let (_, max) = mesh.bounds();
    assert_eq!((max.x, max.y), (600.0, 600.0));
}

#[test]
fn obj_file_import_is_left_handed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tri.obj");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "o tri\nv 0 0 1\nv 1 0 1\nv 0 1 1\nvn 0 0 1\nf 1//1 2//1 3//1").unwrap();
    drop(file);

    let scene = ObjImporter::new()
        .import(&ImportSource::path(&path), &ImportOptions::for_file())
        .unwrap();
    let mesh = assemble(&scene, false).unwrap();

    mesh.validate().unwrap();
    assert_eq!(mesh.position(0).unwrap().z, -1.0);
    assert_relative_eq!(mesh.normal(0).unwrap().z, -1.0);
    // Winding reversed by the handedness flip
    assert_eq!(mesh.indices, vec![2, 1, 0]);
}
