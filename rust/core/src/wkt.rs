// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WKT parsing for `GEOMETRYCOLLECTION(POLYGON(...))` floor outlines
//!
//! The parser is shallow: it locates blocks by delimiter search
//! (`((`, `))`, `),`) instead of building a full WKT grammar. Coordinate pairs
//! are the only part parsed with nom.

use crate::error::{Error, Result};
use crate::polygon::{Point2D, PolygonWithHoles, Ring, MIN_RING_POINTS};
use memchr::memmem;
use nom::{
    character::complete::{multispace0, multispace1},
    combinator::{all_consuming, verify},
    number::complete::double,
    sequence::{delimited, separated_pair},
    IResult,
};
use smallvec::SmallVec;

const COLLECTION_KEYWORD: &str = "GEOMETRYCOLLECTION";
const POLYGON_KEYWORD: &[u8] = b"POLYGON";
const RING_BLOCK_START: &[u8] = b"((";
const RING_BLOCK_END: &[u8] = b"))";
const RING_SEPARATOR: &str = "),";

/// Trim surrounding whitespace and drop line breaks anywhere in the text
fn clean_wkt(text: &str) -> String {
    text.trim().chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

/// Parse `"X Y"` with arbitrary whitespace between and around the numbers
///
/// `double` also accepts `nan` and `inf`; such pairs are rejected.
fn coordinate_pair(input: &str) -> IResult<&str, (f64, f64)> {
    all_consuming(delimited(
        multispace0,
        verify(separated_pair(double, multispace1, double), |(x, y): &(f64, f64)| {
            x.is_finite() && y.is_finite()
        }),
        multispace0,
    ))(input)
}

/// Parse a comma separated list of coordinate pairs
///
/// Pairs that are not exactly two numbers are skipped. A trailing point equal
/// to the first one is dropped because rings are implicitly closed.
fn parse_ring(ring: &str) -> Ring {
    let stripped: String = ring.chars().filter(|c| *c != '(' && *c != ')').collect();

    let mut points = Ring::new();
    for pair in stripped.split(',') {
        if pair.trim().is_empty() {
            continue;
        }
        match coordinate_pair(pair) {
            Ok((_, (x, y))) => points.push(Point2D::new(x, y)),
            Err(_) => tracing::trace!(pair = pair.trim(), "Skipping unparseable WKT coordinate pair"),
        }
    }

    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    points
}

/// Build a polygon from the text between `((` and `))`
///
/// Ring 0 is the outer boundary and later rings are holes, but rings with
/// fewer than three points are discarded first, so the first *sufficient*
/// ring becomes the outer boundary.
fn parse_polygon_block(block: &str) -> Result<PolygonWithHoles> {
    let rings: SmallVec<[Ring; 4]> = block.split(RING_SEPARATOR).map(parse_ring).collect();

    let mut polygon: Option<PolygonWithHoles> = None;
    for (index, ring) in rings.into_iter().enumerate() {
        if ring.len() < MIN_RING_POINTS {
            tracing::debug!(ring = index, points = ring.len(), "Discarding WKT ring with too few points");
            continue;
        }
        match polygon.as_mut() {
            Some(p) => p.add_hole(ring),
            None => polygon = Some(PolygonWithHoles::new(ring)),
        }
    }

    let polygon = polygon.ok_or(Error::InvalidOuterRing)?;
    tracing::trace!(
        rings = polygon.ring_count(),
        points = polygon.point_count(),
        "Parsed WKT polygon"
    );
    Ok(polygon)
}

/// Extract the text between the first `(` and the last `)` of a collection
fn collection_body(clean: &str) -> Result<&str> {
    let has_keyword = clean
        .get(..COLLECTION_KEYWORD.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(COLLECTION_KEYWORD));
    if !has_keyword {
        return Err(Error::malformed("WKT does not begin with GEOMETRYCOLLECTION"));
    }
    if !clean[COLLECTION_KEYWORD.len()..].trim_start().starts_with('(') {
        return Err(Error::malformed("GEOMETRYCOLLECTION is not followed by '('"));
    }

    let bytes = clean.as_bytes();
    let open = memchr::memchr(b'(', bytes);
    let close = memchr::memrchr(b')', bytes);
    match (open, close) {
        (Some(open), Some(close)) if close > open => Ok(clean[open + 1..close].trim()),
        _ => Err(Error::malformed("Malformed GEOMETRYCOLLECTION parentheses")),
    }
}

/// Locate the next polygon ring block at or after `from`
///
/// Returns the byte range of the block contents (without `((` / `))`) and the
/// offset where scanning for the following polygon should resume.
fn next_polygon_block(upper: &[u8], from: usize) -> Option<(std::ops::Range<usize>, usize)> {
    let keyword = from + memmem::find(&upper[from..], POLYGON_KEYWORD)?;
    let start = keyword + memmem::find(&upper[keyword..], RING_BLOCK_START)?;
    let content_start = start + RING_BLOCK_START.len();
    let end = content_start + memmem::find(&upper[content_start..], RING_BLOCK_END)?;
    Some((content_start..end, end + RING_BLOCK_END.len()))
}

/// Parse the first `POLYGON` of a `GEOMETRYCOLLECTION`
///
/// Later polygons in the collection are ignored; use
/// [`parse_geometry_collection_all`] to read all of them.
pub fn parse_geometry_collection(text: &str) -> Result<PolygonWithHoles> {
    let clean = clean_wkt(text);
    let body = collection_body(&clean)?;
    let upper = body.to_ascii_uppercase();

    let (block, _) = next_polygon_block(upper.as_bytes(), 0).ok_or(Error::NoPolygonFound)?;
    parse_polygon_block(&body[block])
}

/// Parse every `POLYGON` of a `GEOMETRYCOLLECTION`, in document order
///
/// Polygons without a usable outer ring are skipped. Fails with
/// [`Error::NoPolygonFound`] when no polygon survives.
pub fn parse_geometry_collection_all(text: &str) -> Result<Vec<PolygonWithHoles>> {
    let clean = clean_wkt(text);
    let body = collection_body(&clean)?;
    let upper = body.to_ascii_uppercase();

    let mut polygons = Vec::new();
    let mut pos = 0;
    while let Some((block, next)) = next_polygon_block(upper.as_bytes(), pos) {
        match parse_polygon_block(&body[block]) {
            Ok(polygon) => polygons.push(polygon),
            Err(e) => tracing::debug!(error = %e, "Skipping polygon in GEOMETRYCOLLECTION"),
        }
        pos = next;
    }

    if polygons.is_empty() {
        return Err(Error::NoPolygonFound);
    }
    Ok(polygons)
}

/// Parse the points of a bare `POINT`, `LINESTRING` or single-ring `POLYGON`
///
/// For polygons only the outer ring is returned. Any other geometry type fails
/// with [`Error::UnsupportedGeometryType`]; callers that treat this as
/// non-fatal can fall back to an empty point list.
pub fn parse_points(fragment: &str) -> Result<Vec<Point2D>> {
    let clean = clean_wkt(fragment);
    let open = memchr::memchr(b'(', clean.as_bytes());
    let prefix = match open {
        Some(open) => clean[..open].trim().to_ascii_uppercase(),
        None => String::new(),
    };
    let coords = open.map(|open| &clean[open..]).unwrap_or_default();

    match prefix.as_str() {
        "POINT" => {
            let stripped: String = coords.chars().filter(|c| *c != '(' && *c != ')').collect();
            Ok(coordinate_pair(&stripped)
                .map(|(_, (x, y))| vec![Point2D::new(x, y)])
                .unwrap_or_default())
        }
        "LINESTRING" => {
            let stripped: String = coords.chars().filter(|c| *c != '(' && *c != ')').collect();
            Ok(stripped
                .split(',')
                .filter_map(|pair| coordinate_pair(pair).ok())
                .map(|(_, (x, y))| Point2D::new(x, y))
                .collect())
        }
        "POLYGON" => {
            let bytes = coords.as_bytes();
            let outer = match memmem::find(bytes, RING_BLOCK_START) {
                Some(start) => {
                    let content_start = start + RING_BLOCK_START.len();
                    let end = memmem::find(&bytes[content_start..], RING_BLOCK_END)
                        .map(|e| content_start + e)
                        .unwrap_or(coords.len());
                    let block = &coords[content_start..end];
                    block.split(RING_SEPARATOR).next().unwrap_or_default()
                }
                None => coords,
            };
            Ok(parse_ring(outer))
        }
        _ => {
            tracing::warn!(geometry_type = %prefix, "Unsupported WKT geometry type");
            Err(Error::UnsupportedGeometryType(prefix))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_square_drops_closing_point() {
        let polygon =
            parse_geometry_collection("GEOMETRYCOLLECTION(POLYGON((0 0,10 0,10 10,0 10,0 0)))")
                .unwrap();

        assert_eq!(polygon.outer.len(), 4);
        assert!(polygon.holes.is_empty());
        assert_eq!(polygon.outer[2], Point2D::new(10.0, 10.0));
    }

    #[test]
    fn test_parse_polygon_with_hole() {
        let wkt = "GEOMETRYCOLLECTION(POLYGON((0 0,10 0,10 10,0 10,0 0),(3 3,7 3,7 7,3 7,3 3)))";
        let polygon = parse_geometry_collection(wkt).unwrap();

        assert_eq!(polygon.outer.len(), 4);
        assert_eq!(polygon.holes.len(), 1);
        assert_eq!(polygon.holes[0][0], Point2D::new(3.0, 3.0));
    }

    #[test]
    fn test_case_insensitive_and_multiline() {
        let wkt = "  geometrycollection (\r\n  polygon ((0 0, 4 0,\n 4 4, 0 4)) )\n";
        let polygon = parse_geometry_collection(wkt).unwrap();
        assert_eq!(polygon.outer.len(), 4);
    }

    #[test]
    fn test_negative_and_scientific_coordinates() {
        let wkt = "GEOMETRYCOLLECTION(POLYGON((-1.5 -2.5,1e1 0,10 1.5E1)))";
        let polygon = parse_geometry_collection(wkt).unwrap();
        assert_eq!(polygon.outer[0], Point2D::new(-1.5, -2.5));
        assert_eq!(polygon.outer[1], Point2D::new(10.0, 0.0));
        assert_eq!(polygon.outer[2], Point2D::new(10.0, 15.0));
    }

    #[test]
    fn test_only_first_polygon_consumed() {
        let wkt = "GEOMETRYCOLLECTION(POLYGON((0 0,1 0,1 1)),POLYGON((5 5,6 5,6 6,5 6)))";
        let polygon = parse_geometry_collection(wkt).unwrap();
        assert_eq!(polygon.outer.len(), 3);
        assert_eq!(polygon.outer[0], Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_all_polygons_consumed() {
        let wkt = "GEOMETRYCOLLECTION(POLYGON((0 0,1 0,1 1)),POINT(3 3),POLYGON((5 5,6 5,6 6,5 6)))";
        let polygons = parse_geometry_collection_all(wkt).unwrap();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[1].outer.len(), 4);
    }

    #[test]
    fn test_degenerate_outer_ring_rejected() {
        let result = parse_geometry_collection("GEOMETRYCOLLECTION(POLYGON((0 0,1 1)))");
        assert_eq!(result, Err(Error::InvalidOuterRing));

        // Closing point removal leaves two distinct points
        let result = parse_geometry_collection("GEOMETRYCOLLECTION(POLYGON((0 0,1 1,0 0)))");
        assert_eq!(result, Err(Error::InvalidOuterRing));
    }

    #[test]
    fn test_short_hole_discarded() {
        let wkt = "GEOMETRYCOLLECTION(POLYGON((0 0,10 0,10 10,0 10),(2 2,3 3)))";
        let polygon = parse_geometry_collection(wkt).unwrap();
        assert!(polygon.holes.is_empty());
    }

    #[test]
    fn test_first_sufficient_ring_becomes_outer() {
        let wkt = "GEOMETRYCOLLECTION(POLYGON((0 0,1 1),(0 0,10 0,10 10)))";
        let polygon = parse_geometry_collection(wkt).unwrap();
        assert_eq!(polygon.outer.len(), 3);
        assert_eq!(polygon.outer[1], Point2D::new(10.0, 0.0));
    }

    #[test]
    fn test_missing_collection_keyword() {
        let result = parse_geometry_collection("POLYGON((0 0,1 0,1 1))");
        assert!(matches!(result, Err(Error::MalformedWkt(_))));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let result = parse_geometry_collection("GEOMETRYCOLLECTION(POLYGON((0 0,1 0,1 1");
        assert!(matches!(result, Err(Error::MalformedWkt(_))));

        let result = parse_geometry_collection("GEOMETRYCOLLECTION)(");
        assert!(matches!(result, Err(Error::MalformedWkt(_))));

        let result = parse_geometry_collection("GEOMETRYCOLLECTION(POLYGON((0 0,1 0,1 1)");
        assert_eq!(result, Err(Error::NoPolygonFound));
    }

    #[test]
    fn test_collection_without_polygon() {
        let result = parse_geometry_collection("GEOMETRYCOLLECTION(POINT(1 2))");
        assert_eq!(result, Err(Error::NoPolygonFound));

        let result = parse_geometry_collection_all("GEOMETRYCOLLECTION(LINESTRING(0 0,1 1))");
        assert_eq!(result, Err(Error::NoPolygonFound));
    }

    #[test]
    fn test_bad_pairs_skipped() {
        let wkt = "GEOMETRYCOLLECTION(POLYGON((0 0,1 0 7,abc def,1 1,0 1)))";
        let polygon = parse_geometry_collection(wkt).unwrap();
        assert_eq!(polygon.outer.len(), 3);
    }

    #[test]
    fn test_non_finite_pairs_skipped() {
        let wkt = "GEOMETRYCOLLECTION(POLYGON((0 0,NaN NaN,1 0,inf 2,1 1,3 infinity,0 1)))";
        let polygon = parse_geometry_collection(wkt).unwrap();
        assert_eq!(polygon.outer.len(), 4);
        assert!(polygon.outer.iter().all(|p| p.x.is_finite() && p.y.is_finite()));

        let points = parse_points("LINESTRING(nan 1, 2 2)").unwrap();
        assert_eq!(points, vec![Point2D::new(2.0, 2.0)]);
    }

    #[test]
    fn test_parse_points_point() {
        let points = parse_points("POINT (30 10)").unwrap();
        assert_eq!(points, vec![Point2D::new(30.0, 10.0)]);
    }

    #[test]
    fn test_parse_points_linestring() {
        let points = parse_points("LINESTRING(30 10, 10 30, 40 40)").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2], Point2D::new(40.0, 40.0));
    }

    #[test]
    fn test_parse_points_polygon_outer_ring_only() {
        let points = parse_points("POLYGON((0 0,10 0,10 10,0 0),(2 2,3 2,3 3,2 2))").unwrap();
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_parse_points_unsupported() {
        let result = parse_points("MULTIPOINT((1 2),(3 4))");
        assert_eq!(
            result,
            Err(Error::UnsupportedGeometryType("MULTIPOINT".to_string()))
        );
        assert!(result.unwrap_or_default().is_empty());
        assert!(matches!(parse_points("garbage"), Err(Error::UnsupportedGeometryType(_))));
    }
}
