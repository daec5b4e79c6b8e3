// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load failure kinds

use thiserror::Error;

/// Result type for load operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// Why a load produced no mesh
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Importer failure: {0}")]
    ImporterFailure(String),

    #[error("The scene does not have any meshes")]
    EmptyScene,

    #[error("Malformed WKT: {0}")]
    MalformedWkt(String),

    #[error("No valid POLYGON found in GEOMETRYCOLLECTION")]
    NoPolygonFound,

    #[error("Polygon has no outer ring with at least 3 points")]
    InvalidOuterRing,

    #[error("Unsupported WKT geometry type: {0}")]
    UnsupportedGeometryType(String),

    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    #[error("Assembled mesh is invalid: {0}")]
    InvalidMesh(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Load cancelled")]
    Cancelled,

    #[error("Load worker failed: {0}")]
    Worker(String),
}

impl From<mesh_ingest_core::Error> for LoadError {
    fn from(err: mesh_ingest_core::Error) -> Self {
        use mesh_ingest_core::Error as E;
        match err {
            E::MalformedWkt(msg) => LoadError::MalformedWkt(msg),
            E::NoPolygonFound => LoadError::NoPolygonFound,
            E::InvalidOuterRing => LoadError::InvalidOuterRing,
            E::UnsupportedGeometryType(kind) => LoadError::UnsupportedGeometryType(kind),
        }
    }
}

impl From<mesh_ingest_geometry::Error> for LoadError {
    fn from(err: mesh_ingest_geometry::Error) -> Self {
        use mesh_ingest_geometry::Error as E;
        match err {
            E::TriangulationError(msg) | E::InvalidProfile(msg) => LoadError::Triangulation(msg),
            E::ImporterFailure(msg) => LoadError::ImporterFailure(msg),
            E::EmptyScene => LoadError::EmptyScene,
            E::InvalidMesh(msg) => LoadError::InvalidMesh(msg),
            E::Io(e) => LoadError::Io(e),
            E::CoreError(e) => e.into(),
        }
    }
}
