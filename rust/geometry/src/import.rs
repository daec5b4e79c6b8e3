// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Importer boundary
//!
//! An [`Importer`] turns a file path or an in-memory text buffer into a
//! [`Scene`]. Format-independent post-processing requested through
//! [`ImportOptions`] runs afterwards in a fixed order: triangulate, generate
//! normals, convert to left-handed, join identical vertices.

use crate::error::Result;
use crate::scene::{Face, Scene, SceneMesh};
use crate::triangulation::calculate_polygon_normal;
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use std::fmt;
use std::path::PathBuf;

/// Where an importer reads from
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSource {
    /// File on disk; the format comes from its extension
    Path(PathBuf),
    /// Text buffer with an explicit format hint such as `"obj"`
    Memory { text: String, format_hint: String },
}

impl ImportSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ImportSource::Path(path.into())
    }

    pub fn memory(text: impl Into<String>, format_hint: impl Into<String>) -> Self {
        ImportSource::Memory {
            text: text.into(),
            format_hint: format_hint.into(),
        }
    }

    /// Lowercase format name without a leading dot
    pub fn format(&self) -> Option<String> {
        match self {
            ImportSource::Path(path) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase()),
            ImportSource::Memory { format_hint, .. } => {
                let hint = format_hint.trim().trim_start_matches('.');
                (!hint.is_empty()).then(|| hint.to_ascii_lowercase())
            }
        }
    }

}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportSource::Path(path) => write!(f, "{}", path.display()),
            ImportSource::Memory { text, format_hint } => {
                write!(f, "<memory {} bytes, {}>", text.len(), format_hint)
            }
        }
    }
}

/// Post-processing flags requested from an importer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportOptions {
    /// Split polygons with more than three corners into triangle fans
    pub triangulate: bool,
    /// Weld corners that share both position and normal
    pub join_identical_vertices: bool,
    /// Give sub-meshes without normals flat per-face normals
    pub generate_normals: bool,
    /// Mirror Z and reverse face winding
    pub make_left_handed: bool,
}

impl ImportOptions {
    /// Flags used for synthesized WKT solids
    pub const fn for_wkt() -> Self {
        Self {
            triangulate: true,
            join_identical_vertices: true,
            generate_normals: true,
            make_left_handed: false,
        }
    }

    /// Flags used for mesh files read from disk
    pub const fn for_file() -> Self {
        Self {
            make_left_handed: true,
            ..Self::for_wkt()
        }
    }
}

/// Mesh importer
pub trait Importer: Send + Sync {
    /// Read a scene, applying the requested post-processing
    fn import(&self, source: &ImportSource, options: &ImportOptions) -> Result<Scene>;

    /// Whether this importer reads the given lowercase format name
    fn supports(&self, format: &str) -> bool;
}

/// Apply the requested post-processing steps to every sub-mesh
pub fn post_process(scene: &mut Scene, options: &ImportOptions) {
    for mesh in &mut scene.meshes {
        if options.triangulate {
            triangulate_faces(mesh);
        }
        if options.generate_normals && mesh.normals.is_none() {
            generate_flat_normals(mesh);
        }
        if options.make_left_handed {
            make_left_handed(mesh);
        }
        if options.join_identical_vertices {
            join_identical_vertices(mesh);
        }
    }
}

/// Fan-triangulate every face with more than three corners
pub fn triangulate_faces(mesh: &mut SceneMesh) {
    if mesh.faces.iter().all(|f| f.len() <= 3) {
        return;
    }

    let mut faces = Vec::with_capacity(mesh.faces.len() * 2);
    for face in mesh.faces.drain(..) {
        if face.len() <= 3 {
            faces.push(face);
            continue;
        }
        for i in 1..face.len() - 1 {
            faces.push(Face::from_slice(&[face[0], face[i], face[i + 1]]));
        }
    }
    mesh.faces = faces;
}

/// Unweld corners and give each the normal of its face
pub fn generate_flat_normals(mesh: &mut SceneMesh) {
    let corner_count: usize = mesh.faces.iter().map(|f| f.len()).sum();
    let mut positions = Vec::with_capacity(corner_count);
    let mut normals = Vec::with_capacity(corner_count);
    let mut faces = Vec::with_capacity(mesh.faces.len());

    for face in &mesh.faces {
        let corners: Option<Vec<Point3<f64>>> = face
            .iter()
            .map(|&i| mesh.positions.get(i as usize).copied())
            .collect();
        let Some(corners) = corners else {
            tracing::warn!(mesh = %mesh.name, "Dropping face with out-of-range index");
            continue;
        };

        let normal = calculate_polygon_normal(&corners);
        let start = positions.len() as u32;
        let mut new_face = Face::new();
        for (offset, corner) in corners.into_iter().enumerate() {
            positions.push(corner);
            normals.push(normal);
            new_face.push(start + offset as u32);
        }
        faces.push(new_face);
    }

    mesh.positions = positions;
    mesh.normals = Some(normals);
    mesh.faces = faces;
}

/// Mirror along Z and flip winding so faces keep pointing outward
pub fn make_left_handed(mesh: &mut SceneMesh) {
    for p in &mut mesh.positions {
        p.z = -p.z;
    }
    if let Some(normals) = mesh.normals.as_mut() {
        for n in normals {
            n.z = -n.z;
        }
    }
    for face in &mut mesh.faces {
        face.reverse();
    }
}

#[inline]
fn key_bits(v: f64) -> u64 {
    // Fold -0.0 into 0.0
    (v + 0.0).to_bits()
}

/// Weld vertices whose position and normal are bit-identical
pub fn join_identical_vertices(mesh: &mut SceneMesh) {
    let mut lookup: FxHashMap<[u64; 6], u32> = FxHashMap::default();
    let mut remap = Vec::with_capacity(mesh.positions.len());
    let mut positions = Vec::with_capacity(mesh.positions.len());
    let mut normals = mesh.normals.as_ref().map(|n| Vec::with_capacity(n.len()));

    for (i, p) in mesh.positions.iter().enumerate() {
        let n = mesh
            .normals
            .as_ref()
            .and_then(|normals| normals.get(i).copied())
            .unwrap_or_else(Vector3::zeros);
        let key = [
            key_bits(p.x),
            key_bits(p.y),
            key_bits(p.z),
            key_bits(n.x),
            key_bits(n.y),
            key_bits(n.z),
        ];

        let index = *lookup.entry(key).or_insert_with(|| {
            positions.push(*p);
            if let Some(normals) = normals.as_mut() {
                normals.push(n);
            }
            (positions.len() - 1) as u32
        });
        remap.push(index);
    }

    if positions.len() == mesh.positions.len() {
        return;
    }

    tracing::trace!(
        mesh = %mesh.name,
        before = mesh.positions.len(),
        after = positions.len(),
        "Joined identical vertices"
    );

    for face in &mut mesh.faces {
        for index in face.iter_mut() {
            if let Some(&mapped) = remap.get(*index as usize) {
                *index = mapped;
            }
        }
    }
    mesh.positions = positions;
    mesh.normals = normals;
}
