// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extruded solid synthesis - converting WKT floor outlines to polygon soup
//!
//! The output is an append-only vertex/face list with 1-based face indices,
//! rendered as OBJ text and handed straight to the importer. Every face is
//! emitted in both windings so the solid reads correctly from either side
//! without relying on normals.

use crate::error::Result;
use crate::profile::Profile2D;
use mesh_ingest_core::PolygonWithHoles;
use nalgebra::Point3;
use std::fmt;

/// WKT coordinates are meters; the synthesized solid is in centimeters
pub const CENTIMETERS_PER_METER: f64 = 100.0;

/// Wall height of the synthesized solid, in output units (1 m)
pub const DEFAULT_EXTRUSION_HEIGHT: f64 = 100.0;

/// Object name written at the top of the OBJ text
const OBJECT_NAME: &str = "WktSolid";

/// Polygon soup with 1-based triangle indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntermediateSolid {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[u32; 3]>,
}

impl IntermediateSolid {
    /// Create an empty solid
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex and return its 1-based index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.vertices.push(position);
        self.vertices.len() as u32
    }

    /// Append a triangle of 1-based indices
    ///
    /// Indices must refer to vertices that were already added.
    #[inline]
    pub fn add_face(&mut self, a: u32, b: u32, c: u32) {
        debug_assert!(
            [a, b, c].iter().all(|&i| i >= 1 && i as usize <= self.vertices.len()),
            "face ({a}, {b}, {c}) references a vertex that does not exist yet"
        );
        self.faces.push([a, b, c]);
    }

    /// Vertex positions in insertion order
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Faces in insertion order (1-based indices)
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Render as OBJ face/vertex text for the importer
    pub fn to_obj_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IntermediateSolid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "o {}", OBJECT_NAME)?;
        for v in &self.vertices {
            writeln!(f, "v {} {} {}", v.x, v.y, v.z)?;
        }
        for [a, b, c] in &self.faces {
            writeln!(f, "f {} {} {}", a, b, c)?;
        }
        Ok(())
    }
}

/// Extrude one polygon into a fresh solid
///
/// `scale` converts polygon coordinates to output units and `height` is the
/// roof elevation in output units.
pub fn build_extruded_solid(
    polygon: &PolygonWithHoles,
    height: f64,
    scale: f64,
) -> Result<IntermediateSolid> {
    let mut solid = IntermediateSolid::new();
    append_extruded_solid(&mut solid, polygon, height, scale)?;
    Ok(solid)
}

/// Extrude several polygons into one solid, one block per polygon
pub fn build_extruded_solids(
    polygons: &[PolygonWithHoles],
    height: f64,
    scale: f64,
) -> Result<IntermediateSolid> {
    let mut solid = IntermediateSolid::new();
    for polygon in polygons {
        append_extruded_solid(&mut solid, polygon, height, scale)?;
    }
    Ok(solid)
}

/// Append floor, roof vertices and walls for one polygon
///
/// Block layout: floor vertices (z = 0), floor faces, roof vertices
/// (z = height), wall faces. Face indices are offset past any block that is
/// already in `solid`.
pub fn append_extruded_solid(
    solid: &mut IntermediateSolid,
    polygon: &PolygonWithHoles,
    height: f64,
    scale: f64,
) -> Result<()> {
    let profile = Profile2D::from_polygon(polygon, scale);
    let triangulation = profile.triangulate()?;

    let base = solid.vertex_count() as u32;
    let floor_count = triangulation.points.len() as u32;

    solid.vertices.reserve(triangulation.points.len() * 2);
    for p in &triangulation.points {
        solid.add_vertex(Point3::new(p.x, p.y, 0.0));
    }

    // Floor: each triangle once as returned and once reversed
    for tri in triangulation.indices.chunks_exact(3) {
        let a = base + tri[0] as u32 + 1;
        let b = base + tri[1] as u32 + 1;
        let c = base + tri[2] as u32 + 1;
        solid.add_face(a, b, c);
        solid.add_face(c, b, a);
    }

    let roof_base = base + floor_count;
    for p in &triangulation.points {
        solid.add_vertex(Point3::new(p.x, p.y, height));
    }

    // Walls: four triangles per ring edge, two outward and two inward
    let mut ring_start = base;
    for ring in profile.rings() {
        let n = ring.len() as u32;
        for i in 0..n {
            let a = ring_start + i + 1;
            let b = ring_start + (i + 1) % n + 1;
            let a_top = a + floor_count;
            let b_top = b + floor_count;

            solid.add_face(a, b, b_top);
            solid.add_face(a, b_top, a_top);

            solid.add_face(b_top, b, a);
            solid.add_face(a_top, b_top, a);
        }
        ring_start += n;
    }

    tracing::trace!(
        vertices = solid.vertex_count(),
        faces = solid.face_count(),
        roof_base,
        "Appended extruded solid block"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_ingest_core::{parse_geometry_collection, Point2D};

    fn face_normal_z(solid: &IntermediateSolid, face: &[u32; 3]) -> f64 {
        let v = |i: u32| solid.vertices()[(i - 1) as usize];
        let (p0, p1, p2) = (v(face[0]), v(face[1]), v(face[2]));
        (p1 - p0).cross(&(p2 - p0)).z
    }

    fn is_floor_face(solid: &IntermediateSolid, face: &[u32; 3]) -> bool {
        face.iter().all(|&i| solid.vertices()[(i - 1) as usize].z == 0.0)
    }

    fn square_polygon() -> PolygonWithHoles {
        parse_geometry_collection("GEOMETRYCOLLECTION(POLYGON((0 0,10 0,10 10,0 10,0 0)))").unwrap()
    }

    fn square_with_hole() -> PolygonWithHoles {
        parse_geometry_collection(
            "GEOMETRYCOLLECTION(POLYGON((0 0,10 0,10 10,0 10,0 0),(3 3,7 3,7 7,3 7,3 3)))",
        )
        .unwrap()
    }

    #[test]
    fn test_square_solid_shape() {
        let solid = build_extruded_solid(
            &square_polygon(),
            DEFAULT_EXTRUSION_HEIGHT,
            CENTIMETERS_PER_METER,
        )
        .unwrap();

        assert_eq!(solid.vertex_count(), 8);
        assert_eq!(solid.face_count(), 20);

        let floor: Vec<_> = solid.faces().iter().filter(|f| is_floor_face(&solid, f)).collect();
        assert_eq!(floor.len(), 4);
        let up = floor.iter().filter(|f| face_normal_z(&solid, f) > 0.0).count();
        let down = floor.iter().filter(|f| face_normal_z(&solid, f) < 0.0).count();
        assert_eq!(up, 2);
        assert_eq!(down, 2);

        let walls = solid.face_count() - floor.len();
        assert_eq!(walls, 16);
    }

    #[test]
    fn test_floor_and_roof_vertices() {
        let solid = build_extruded_solid(
            &square_polygon(),
            DEFAULT_EXTRUSION_HEIGHT,
            CENTIMETERS_PER_METER,
        )
        .unwrap();

        assert_eq!(solid.vertices()[2], Point3::new(1000.0, 1000.0, 0.0));
        assert_eq!(solid.vertices()[6], Point3::new(1000.0, 1000.0, 100.0));
    }

    #[test]
    fn test_coordinates_scaled_to_centimeters() {
        let polygon = PolygonWithHoles::new(vec![
            Point2D::new(1.0, 2.0),
            Point2D::new(3.0, 2.0),
            Point2D::new(3.0, 5.0),
        ]);
        let solid = build_extruded_solid(&polygon, DEFAULT_EXTRUSION_HEIGHT, CENTIMETERS_PER_METER)
            .unwrap();

        assert_eq!(solid.vertices()[0], Point3::new(100.0, 200.0, 0.0));
    }

    #[test]
    fn test_hole_excluded_from_floor() {
        let solid = build_extruded_solid(
            &square_with_hole(),
            DEFAULT_EXTRUSION_HEIGHT,
            CENTIMETERS_PER_METER,
        )
        .unwrap();

        for face in solid.faces().iter().filter(|f| is_floor_face(&solid, f)) {
            let centroid = face
                .iter()
                .map(|&i| solid.vertices()[(i - 1) as usize].coords)
                .sum::<nalgebra::Vector3<f64>>()
                / 3.0;
            let inside_hole = centroid.x > 300.0
                && centroid.x < 700.0
                && centroid.y > 300.0
                && centroid.y < 700.0;
            assert!(!inside_hole, "floor triangle centroid {:?} inside hole", centroid);
        }
    }

    #[test]
    fn test_hole_doubles_wall_faces() {
        let plain = build_extruded_solid(&square_polygon(), 100.0, 100.0).unwrap();
        let holed = build_extruded_solid(&square_with_hole(), 100.0, 100.0).unwrap();

        let walls = |s: &IntermediateSolid| {
            s.faces().iter().filter(|f| !is_floor_face(s, f)).count()
        };
        assert_eq!(walls(&plain), 16);
        assert_eq!(walls(&holed), 32);
        assert_eq!(holed.vertex_count(), 16);
    }

    #[test]
    fn test_face_indices_in_bounds() {
        let solid = build_extruded_solids(&[square_with_hole(), square_polygon()], 100.0, 100.0)
            .unwrap();

        let count = solid.vertex_count() as u32;
        assert_eq!(count, 16 + 8);
        assert!(solid
            .faces()
            .iter()
            .flatten()
            .all(|&i| i >= 1 && i <= count));

        // Second block starts after the first block's 16 vertices and 48 faces
        assert!(solid.faces().iter().skip(48).flatten().all(|&i| i > 16));
    }

    #[test]
    fn test_obj_text() {
        let solid = build_extruded_solid(&square_polygon(), 100.0, 100.0).unwrap();
        let text = solid.to_obj_text();

        assert!(text.starts_with("o WktSolid\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 8);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 20);
        assert!(text.contains("v 1000 1000 100\n"));
        // First outward wall triangle of the first edge
        assert!(text.contains("f 1 2 6\n"));
    }
}
