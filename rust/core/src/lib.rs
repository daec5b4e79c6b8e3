// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Mesh-Ingest Core
//!
//! Well-known-text parsing for floor outlines that are later extruded into
//! solids by `mesh-ingest-geometry`.
//!
//! ## Quick Start
//!
//! ```rust
//! use mesh_ingest_core::parse_geometry_collection;
//!
//! let polygon = parse_geometry_collection(
//!     "GEOMETRYCOLLECTION(POLYGON((0 0,10 0,10 10,0 10,0 0),(3 3,7 3,7 7,3 7,3 3)))",
//! )
//! .unwrap();
//!
//! assert_eq!(polygon.outer.len(), 4);
//! assert_eq!(polygon.holes.len(), 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for the polygon data model

pub mod error;
pub mod polygon;
pub mod wkt;

pub use error::{Error, Result};
pub use polygon::{Point2D, PolygonWithHoles, Ring, MIN_RING_POINTS};
pub use wkt::{parse_geometry_collection, parse_geometry_collection_all, parse_points};
