// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh-Ingest Geometry
//!
//! Extrudes WKT floor outlines into solids using earcutr triangulation,
//! imports OBJ scenes, and flattens them into one axis-normalized mesh with
//! nalgebra transforms.

pub mod assembler;
pub mod axis;
pub mod error;
pub mod import;
pub mod mesh;
pub mod obj;
pub mod profile;
pub mod scene;
pub mod solid;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use assembler::{assemble, assemble_with};
pub use axis::{
    resolve_rotation, transform_normal, transform_vector, AxisConvention, Orientation, Rotation,
    Sign,
};
pub use error::{Error, Result};
pub use import::{ImportOptions, ImportSource, Importer};
pub use mesh::Mesh;
pub use obj::ObjImporter;
pub use profile::Profile2D;
pub use scene::{metadata_keys, Face, Metadata, MetadataValue, Scene, SceneMesh};
pub use solid::{
    append_extruded_solid, build_extruded_solid, build_extruded_solids, IntermediateSolid,
    CENTIMETERS_PER_METER, DEFAULT_EXTRUSION_HEIGHT,
};
pub use triangulation::triangulate_polygon;
