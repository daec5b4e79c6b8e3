// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Importer failure: {0}")]
    ImporterFailure(String),

    #[error("The scene does not have any meshes")]
    EmptyScene,

    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WKT error: {0}")]
    CoreError(#[from] mesh_ingest_core::Error),
}

impl Error {
    pub(crate) fn importer(msg: impl Into<String>) -> Self {
        Error::ImporterFailure(msg.into())
    }
}
