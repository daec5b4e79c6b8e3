// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Profile definitions and triangulation

use crate::error::{Error, Result};
use crate::triangulation::triangulate_polygon_with_holes;
use mesh_ingest_core::{Point2D, PolygonWithHoles};
use nalgebra::Point2;

/// 2D Profile with optional holes
#[derive(Debug, Clone)]
pub struct Profile2D {
    /// Outer boundary
    pub outer: Vec<Point2<f64>>,
    /// Holes
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Profile2D {
    /// Create a new profile
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Convert a parsed polygon, multiplying every coordinate by `scale`
    pub fn from_polygon(polygon: &PolygonWithHoles, scale: f64) -> Self {
        let convert = |ring: &[Point2D]| -> Vec<Point2<f64>> {
            ring.iter()
                .map(|p| Point2::new(p.x * scale, p.y * scale))
                .collect()
        };

        Self {
            outer: convert(polygon.outer.as_slice()),
            holes: polygon.holes.iter().map(|h| convert(h.as_slice())).collect(),
        }
    }

    /// Outer ring followed by every hole
    pub fn rings(&self) -> impl Iterator<Item = &Vec<Point2<f64>>> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Total number of points across all rings
    pub fn point_count(&self) -> usize {
        self.rings().map(|r| r.len()).sum()
    }

    /// Triangulate the profile using earcutr
    /// Returns triangle indices into the flattened vertex array
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "Profile must have at least 3 vertices".to_string(),
            ));
        }

        let indices = triangulate_polygon_with_holes(&self.outer, &self.holes)?;
        let mut points = Vec::with_capacity(self.point_count());
        points.extend(self.rings().flatten().copied());

        Ok(Triangulation { points, indices })
    }
}

/// Triangulated profile result
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// All vertices (outer + holes)
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_polygon_scales_all_rings() {
        let mut polygon = PolygonWithHoles::new(vec![
            Point2D::new(1.0, 2.0),
            Point2D::new(4.0, 2.0),
            Point2D::new(4.0, 6.0),
        ]);
        polygon.add_hole(vec![
            Point2D::new(2.0, 3.0),
            Point2D::new(3.0, 3.0),
            Point2D::new(3.0, 4.0),
        ]);

        let profile = Profile2D::from_polygon(&polygon, 100.0);
        assert_eq!(profile.outer[0], Point2::new(100.0, 200.0));
        assert_eq!(profile.holes[0][2], Point2::new(300.0, 400.0));
        assert_eq!(profile.point_count(), 6);
    }

    #[test]
    fn test_triangulation_points_follow_ring_order() {
        let mut profile = Profile2D::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ]);
        profile.holes.push(vec![
            Point2::new(4.0, 4.0),
            Point2::new(6.0, 4.0),
            Point2::new(6.0, 6.0),
        ]);

        let tri = profile.triangulate().unwrap();
        assert_eq!(tri.points.len(), 7);
        assert_eq!(tri.points[4], Point2::new(4.0, 4.0));
        assert!(tri.indices.len() / 3 > 2);
    }

    #[test]
    fn test_triangulate_rejects_short_outer() {
        let profile = Profile2D::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        assert!(matches!(profile.triangulate(), Err(Error::InvalidProfile(_))));
    }
}
