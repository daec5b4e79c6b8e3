// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a path is routed through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// WKT outline, extruded into a solid before import
    Wkt,
    /// Mesh file handed straight to the importer
    File,
}

impl SourceKind {
    /// `.wkt` (any case) selects the WKT route; everything else is a file
    pub fn classify(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("wkt") => SourceKind::Wkt,
            _ => SourceKind::File,
        }
    }

    pub fn is_wkt(self) -> bool {
        self == SourceKind::Wkt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(SourceKind::classify(Path::new("a/b.wkt")), SourceKind::Wkt);
        assert_eq!(SourceKind::classify(Path::new("a/b.WKT")), SourceKind::Wkt);
        assert_eq!(SourceKind::classify(Path::new("a/b.obj")), SourceKind::File);
        assert_eq!(SourceKind::classify(Path::new("a/wkt")), SourceKind::File);
    }
}
