// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wavefront OBJ importer
//!
//! Reads `v`, `vn` and `f` records; `o` and `g` start a new sub-mesh.
//! Corners may be written `v`, `v/vt`, `v//vn` or `v/vt/vn`, with negative
//! indices counting back from the most recent record. Texture coordinates,
//! materials and smoothing groups are skipped.

use crate::error::{Error, Result};
use crate::import::{post_process, ImportOptions, ImportSource, Importer};
use crate::scene::{Face, Scene, SceneMesh};
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};

const DEFAULT_GROUP: &str = "default";

/// Importer for OBJ text and `.obj` files
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjImporter;

impl ObjImporter {
    pub fn new() -> Self {
        Self
    }

    /// Parse OBJ records from a reader, without post-processing
    pub fn parse<R: BufRead>(&self, reader: R) -> Result<Scene> {
        let mut parser = ObjParser::default();
        for (line_no, line) in reader.lines().enumerate() {
            let at_line = |msg: String| Error::importer(format!("line {}: {}", line_no + 1, msg));
            let line = line.map_err(|e| at_line(e.to_string()))?;
            parser.record(line.trim()).map_err(at_line)?;
        }
        Ok(parser.finish())
    }
}

impl Importer for ObjImporter {
    fn import(&self, source: &ImportSource, options: &ImportOptions) -> Result<Scene> {
        match source.format() {
            Some(format) if self.supports(&format) => {}
            Some(format) => {
                return Err(Error::importer(format!(
                    "unsupported format '{}' for {}",
                    format, source
                )))
            }
            None => return Err(Error::importer(format!("unknown format for {}", source))),
        }

        let mut scene = match source {
            ImportSource::Path(path) => self.parse(BufReader::new(File::open(path)?))?,
            ImportSource::Memory { text, .. } => self.parse(Cursor::new(text.as_bytes()))?,
        };

        post_process(&mut scene, options);

        tracing::debug!(
            source = %source,
            meshes = scene.mesh_count(),
            "Imported OBJ scene"
        );
        Ok(scene)
    }

    fn supports(&self, format: &str) -> bool {
        format == "obj"
    }
}

/// Corner of a face: global position index and optional global normal index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CornerKey {
    position: usize,
    normal: Option<usize>,
}

/// Sub-mesh under construction; corners are welded by their index pair
#[derive(Debug, Default)]
struct GroupBuilder {
    mesh: SceneMesh,
    normals: Vec<Vector3<f64>>,
    has_normals: bool,
    corners: FxHashMap<CornerKey, u32>,
}

impl GroupBuilder {
    fn named(name: &str) -> Self {
        Self {
            mesh: SceneMesh::new(name),
            ..Self::default()
        }
    }

    fn corner(&mut self, key: CornerKey, positions: &[Point3<f64>], normals: &[Vector3<f64>]) -> u32 {
        if let Some(&index) = self.corners.get(&key) {
            return index;
        }

        let index = self.mesh.positions.len() as u32;
        self.mesh.positions.push(positions[key.position]);
        match key.normal {
            Some(n) => {
                self.normals.push(normals[n]);
                self.has_normals = true;
            }
            None => self.normals.push(Vector3::zeros()),
        }
        self.corners.insert(key, index);
        index
    }

    fn build(mut self) -> Option<SceneMesh> {
        if self.mesh.faces.is_empty() {
            return None;
        }
        if self.has_normals {
            self.mesh.normals = Some(self.normals);
        }
        Some(self.mesh)
    }
}

#[derive(Debug, Default)]
struct ObjParser {
    positions: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    current: Option<GroupBuilder>,
    finished: Vec<SceneMesh>,
}

impl ObjParser {
    fn record(&mut self, line: &str) -> std::result::Result<(), String> {
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let mut tokens = line.split_whitespace();
        let tag = tokens.next().unwrap_or("");
        match tag {
            "v" => {
                let [x, y, z] = parse_floats(tokens, tag)?;
                self.positions.push(Point3::new(x, y, z));
            }
            "vn" => {
                let [x, y, z] = parse_floats(tokens, tag)?;
                self.normals.push(Vector3::new(x, y, z));
            }
            "o" | "g" => {
                let name = tokens.collect::<Vec<_>>().join(" ");
                self.start_group(if name.is_empty() { DEFAULT_GROUP } else { &name });
            }
            "f" => self.face(tokens)?,
            _ => {}
        }
        Ok(())
    }

    fn start_group(&mut self, name: &str) {
        if let Some(mesh) = self.current.take().and_then(GroupBuilder::build) {
            self.finished.push(mesh);
        }
        self.current = Some(GroupBuilder::named(name));
    }

    fn face<'a>(&mut self, tokens: impl Iterator<Item = &'a str>) -> std::result::Result<(), String> {
        let mut keys: Face = Face::new();
        let mut corner_keys = Vec::with_capacity(4);
        for token in tokens {
            corner_keys.push(self.corner_key(token)?);
        }
        if corner_keys.len() < 3 {
            return Err(format!("face needs at least 3 corners, got {}", corner_keys.len()));
        }

        let group = self
            .current
            .get_or_insert_with(|| GroupBuilder::named(DEFAULT_GROUP));
        for key in corner_keys {
            keys.push(group.corner(key, &self.positions, &self.normals));
        }
        group.mesh.faces.push(keys);
        Ok(())
    }

    fn corner_key(&self, token: &str) -> std::result::Result<CornerKey, String> {
        let mut parts = token.split('/');
        let position = match parts.next() {
            Some(p) if !p.is_empty() => resolve_index(p, self.positions.len(), "vertex")?,
            _ => return Err(format!("corner '{}' has no vertex index", token)),
        };
        // Texture coordinate index is ignored
        let _ = parts.next();
        let normal = match parts.next() {
            Some(n) if !n.is_empty() => Some(resolve_index(n, self.normals.len(), "normal")?),
            _ => None,
        };
        Ok(CornerKey { position, normal })
    }

    fn finish(mut self) -> Scene {
        if let Some(mesh) = self.current.take().and_then(GroupBuilder::build) {
            self.finished.push(mesh);
        }
        Scene {
            meshes: self.finished,
            ..Scene::default()
        }
    }
}

fn parse_floats<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    tag: &str,
) -> std::result::Result<[f64; 3], String> {
    let mut out = [0.0; 3];
    for slot in &mut out {
        let token = tokens
            .next()
            .ok_or_else(|| format!("'{}' record needs 3 components", tag))?;
        *slot = token
            .parse()
            .map_err(|_| format!("invalid number '{}' in '{}' record", token, tag))?;
    }
    Ok(out)
}

/// Convert a 1-based or negative relative index into a 0-based one
fn resolve_index(token: &str, len: usize, what: &str) -> std::result::Result<usize, String> {
    let raw: i64 = token
        .parse()
        .map_err(|_| format!("invalid {} index '{}'", what, token))?;
    let resolved = match raw {
        0 => None,
        r if r > 0 => Some(r - 1),
        r => Some(len as i64 + r),
    };
    match resolved {
        Some(i) if i >= 0 && (i as usize) < len => Ok(i as usize),
        _ => Err(format!("{} index {} out of range ({} defined)", what, raw, len)),
    }
}
