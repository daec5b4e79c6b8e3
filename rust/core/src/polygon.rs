// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar polygon data model produced by the WKT parser

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Planar coordinate in source units (meters for WKT input)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Implicitly closed sequence of points; the last point connects back to the first
pub type Ring = Vec<Point2D>;

/// Minimum number of points for a ring to enclose an area
pub const MIN_RING_POINTS: usize = 3;

/// Outer boundary with zero or more holes
///
/// Holes are expected to lie inside the outer ring and not overlap each other.
/// Neither condition is validated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolygonWithHoles {
    pub outer: Ring,
    pub holes: Vec<Ring>,
}

impl PolygonWithHoles {
    /// Create a polygon without holes
    pub fn new(outer: Ring) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Add a hole ring
    pub fn add_hole(&mut self, hole: Ring) {
        self.holes.push(hole);
    }

    /// All rings in triangulation order: outer first, then each hole
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Number of rings including the outer boundary
    #[inline]
    pub fn ring_count(&self) -> usize {
        1 + self.holes.len()
    }

    /// Total points across all rings
    #[inline]
    pub fn point_count(&self) -> usize {
        self.rings().map(|r| r.len()).sum()
    }
}
