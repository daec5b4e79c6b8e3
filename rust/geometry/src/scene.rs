// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Imported scene graph: raw sub-meshes plus string-keyed metadata

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Polygon as 0-based indices into its sub-mesh; triangles stay inline
pub type Face = SmallVec<[u32; 4]>;

/// Well-known metadata keys
pub mod metadata_keys {
    pub const UNIT_SCALE_FACTOR: &str = "UnitScaleFactor";
    pub const UP_AXIS: &str = "UpAxis";
    pub const UP_AXIS_SIGN: &str = "UpAxisSign";
    pub const FRONT_AXIS: &str = "FrontAxis";
    pub const FRONT_AXIS_SIGN: &str = "FrontAxisSign";
}

/// Typed metadata value
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Int(v)
    }
}

impl From<i32> for MetadataValue {
    fn from(v: i32) -> Self {
        MetadataValue::Int(v as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Text(v.to_string())
    }
}

/// String-keyed scene metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: FxHashMap<String, MetadataValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    /// Integer view; floats are truncated
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            MetadataValue::Int(v) => Some(*v),
            MetadataValue::Float(v) if v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    /// Float view; integers are widened
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            MetadataValue::Float(v) => Some(*v),
            MetadataValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Unit scale factor; a missing, zero or non-finite value means 1
    pub fn unit_scale_factor(&self) -> f64 {
        self.get_float(metadata_keys::UNIT_SCALE_FACTOR)
            .filter(|s| *s != 0.0 && s.is_finite())
            .unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One sub-mesh of an imported scene
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMesh {
    pub name: String,
    pub positions: Vec<Point3<f64>>,
    /// Per-vertex normals, parallel to `positions` when present
    pub normals: Option<Vec<Vector3<f64>>>,
    pub faces: Vec<Face>,
}

impl SceneMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_faces(&self) -> impl Iterator<Item = &Face> {
        self.faces.iter().filter(|f| f.len() == 3)
    }
}

/// Importer output: sub-meshes in file order plus metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub meshes: Vec<SceneMesh>,
    pub metadata: Metadata,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn has_meshes(&self) -> bool {
        !self.meshes.is_empty()
    }
}
