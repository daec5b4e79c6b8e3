// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load configuration loaded from environment variables.

use mesh_ingest_geometry::{CENTIMETERS_PER_METER, DEFAULT_EXTRUSION_HEIGHT};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Which polygons of a GEOMETRYCOLLECTION are extruded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonPolicy {
    /// Only the first POLYGON
    #[default]
    FirstOnly,
    /// Every POLYGON, one solid block each
    All,
}

impl FromStr for PolygonPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first_only" => Ok(PolygonPolicy::FirstOnly),
            "all" => Ok(PolygonPolicy::All),
            other => Err(format!("unknown polygon policy '{}'", other)),
        }
    }
}

/// Load configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Delay before the worker resolves its outcome.
    pub completion_delay: Duration,
    /// Polygons extruded from a WKT collection.
    pub polygon_policy: PolygonPolicy,
    /// Roof elevation of synthesized solids, in output units.
    pub extrusion_height: f64,
    /// Factor from WKT coordinates to output units.
    pub coordinate_scale: f64,
    /// Worker threads for batch loads (0 = rayon default).
    pub batch_threads: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            completion_delay: Duration::ZERO,
            polygon_policy: PolygonPolicy::FirstOnly,
            extrusion_height: DEFAULT_EXTRUSION_HEIGHT,
            coordinate_scale: CENTIMETERS_PER_METER,
            batch_threads: 0,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        Err(_) => default,
    }
}

impl LoadConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            completion_delay: Duration::from_millis(env_or(
                "MESH_INGEST_COMPLETION_DELAY_MS",
                0u64,
            )),
            polygon_policy: env_or("MESH_INGEST_POLYGON_POLICY", defaults.polygon_policy),
            extrusion_height: env_or("MESH_INGEST_EXTRUSION_HEIGHT", defaults.extrusion_height),
            coordinate_scale: env_or("MESH_INGEST_COORDINATE_SCALE", defaults.coordinate_scale),
            batch_threads: env_or("MESH_INGEST_BATCH_THREADS", defaults.batch_threads),
        }
    }

    pub fn with_polygon_policy(mut self, policy: PolygonPolicy) -> Self {
        self.polygon_policy = policy;
        self
    }

    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoadConfig::default();
        assert_eq!(config.completion_delay, Duration::ZERO);
        assert_eq!(config.polygon_policy, PolygonPolicy::FirstOnly);
        assert_eq!(config.extrusion_height, 100.0);
        assert_eq!(config.coordinate_scale, 100.0);
        assert_eq!(config.batch_threads, 0);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("all".parse::<PolygonPolicy>(), Ok(PolygonPolicy::All));
        assert_eq!(" First ".parse::<PolygonPolicy>(), Ok(PolygonPolicy::FirstOnly));
        assert!("every".parse::<PolygonPolicy>().is_err());
    }

    #[test]
    fn test_env_or_falls_back() {
        assert_eq!(env_or("MESH_INGEST_TEST_UNSET_KEY", 7usize), 7);
    }
}
