// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for WKT parsing
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing WKT text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed WKT: {0}")]
    MalformedWkt(String),

    #[error("No valid POLYGON found in GEOMETRYCOLLECTION")]
    NoPolygonFound,

    #[error("Polygon has no outer ring with at least 3 points")]
    InvalidOuterRing,

    #[error("Unsupported WKT geometry type: {0}")]
    UnsupportedGeometryType(String),
}

impl Error {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedWkt(msg.into())
    }
}
