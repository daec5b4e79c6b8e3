// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load orchestration shared by the CLI and embedding applications.
//!
//! A load routes a path by extension: `.wkt` outlines are parsed, extruded
//! and imported from OBJ text, anything else goes to the importer directly.
//! Either way the scene is assembled into one axis-normalized
//! [`Mesh`](mesh_ingest_geometry::Mesh).

pub mod batch;
pub mod cancel;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod source;

pub use batch::BatchLoader;
pub use cancel::CancellationToken;
pub use config::{LoadConfig, PolygonPolicy};
pub use error::{LoadError, Result};
pub use loader::{LoadState, MeshLoader};
pub use pipeline::{run_pipeline, LoadStats, LoadedMesh};
pub use source::SourceKind;
