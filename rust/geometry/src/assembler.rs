// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh assembly - flattening an imported scene into one [`Mesh`]
//!
//! Every sub-mesh is scaled by the scene's unit factor and remapped into the
//! target axis convention. Only triangle faces are kept; their indices are
//! offset by the number of vertices already emitted.

use crate::axis::{resolve_rotation, rotate_normal, transform_vector, AxisConvention, Rotation};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::scene::{Scene, SceneMesh};
use nalgebra::{Point3, Vector3};

/// Flatten a scene, reading axis convention and unit scale from its metadata
pub fn assemble(scene: &Scene, is_wkt_source: bool) -> Result<Mesh> {
    let convention = AxisConvention::from_metadata(&scene.metadata);
    let unit_scale = scene.metadata.unit_scale_factor();
    assemble_with(scene, &convention, unit_scale, is_wkt_source)
}

/// Flatten a scene with an explicit convention and unit scale
///
/// `unit_scale` of zero is treated as one. Normals of WKT-sourced scenes are
/// inverted after rotation.
pub fn assemble_with(
    scene: &Scene,
    convention: &AxisConvention,
    unit_scale: f64,
    is_wkt_source: bool,
) -> Result<Mesh> {
    if !scene.has_meshes() {
        return Err(Error::EmptyScene);
    }

    let scale = if unit_scale == 0.0 { 1.0 } else { unit_scale };
    let rotation = resolve_rotation(convention);

    let vertex_total: usize = scene.meshes.iter().map(SceneMesh::vertex_count).sum();
    let index_total: usize = scene.meshes.iter().map(|m| m.faces.len() * 3).sum();
    let mut mesh = Mesh::with_capacity(vertex_total, index_total);

    let remap = (!convention.preserves_positions()).then_some(convention);
    for sub_mesh in &scene.meshes {
        append_sub_mesh(&mut mesh, sub_mesh, remap, &rotation, scale, is_wkt_source);
    }

    tracing::debug!(
        meshes = scene.mesh_count(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        rotated = !rotation.is_zero(),
        remapped = remap.is_some(),
        scale,
        "Assembled mesh"
    );

    Ok(mesh)
}

fn append_sub_mesh(
    mesh: &mut Mesh,
    sub_mesh: &SceneMesh,
    remap: Option<&AxisConvention>,
    rotation: &Rotation,
    scale: f64,
    invert_normals: bool,
) {
    let base = mesh.vertex_count() as u32;
    let vertex_count = sub_mesh.vertex_count();

    for (i, position) in sub_mesh.positions.iter().enumerate() {
        let mut v = position.coords * scale;
        if let Some(convention) = remap {
            v = transform_vector(&v, convention);
        }

        let normal = match sub_mesh.normals.as_ref().and_then(|n| n.get(i)) {
            Some(n) => rotate_normal(&(n * scale), rotation, invert_normals),
            None => Vector3::zeros(),
        };

        mesh.add_vertex(Point3::from(v), normal);
    }

    let mut triangles = 0usize;
    for face in sub_mesh.triangle_faces() {
        triangles += 1;
        if face.iter().any(|&i| i as usize >= vertex_count) {
            tracing::warn!(
                mesh = %sub_mesh.name,
                face = ?face.as_slice(),
                vertices = vertex_count,
                "Skipping face with out-of-range index"
            );
            continue;
        }
        mesh.add_triangle(base + face[0], base + face[1], base + face[2]);
    }

    let dropped = sub_mesh.faces.len() - triangles;
    if dropped > 0 {
        tracing::debug!(mesh = %sub_mesh.name, dropped, "Dropped non-triangle faces");
    }
}
