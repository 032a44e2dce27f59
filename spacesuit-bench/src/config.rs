//! Benchmark configuration

use crate::stores::StoreResult;
use anyhow::Context;
use spacesuit::errors::SpaceSuitResult;
use spacesuit::SpaceSuit;
use spacesuit_z::{Space, SpaceResult};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Bits per axis of the geographic space used by the places programs.
pub const GEO_BITS: u32 = 24;

/// Maximum number of rewritten queries per places query.
pub const MAX_QUERIES: usize = 4;

/// 100 characters of padding stored with every point.
pub const FILLER: &str = "abcdefghijklmnopqrstabcdefghijklmnopqrstabcdefghijklmnopqrstabcdefghijklmnopqrstabcdefghijklmnopqrst";

/// Configuration for benchmark runs
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Extent of the x axis, `[0, nx]`
    pub nx: u32,
    /// Extent of the y axis, `[0, ny]`
    pub ny: u32,
    /// Bits per axis of the z-order space
    pub bits: u32,
    /// Rows a generated query box should return on average
    pub expected_rows: u32,
    /// `max_ranges` passed to the transformer for z-queries
    pub max_z_queries: usize,
    /// Number of query boxes per run
    pub query_count: usize,
    /// Rows inserted per transaction while loading
    pub batch_size: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            nx: 1_000_000,
            ny: 1_000_000,
            bits: 20,
            expected_rows: 10,
            max_z_queries: 6,
            query_count: 1_000,
            batch_size: 1_000,
        }
    }
}

impl BenchmarkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quick config with fewer queries for fast testing
    pub fn quick() -> Self {
        Self {
            query_count: 50,
            ..Default::default()
        }
    }

    pub fn space(&self) -> SpaceResult<Space> {
        Space::new(
            [0.0, 0.0],
            [self.nx as f64, self.ny as f64],
            [self.bits, self.bits],
        )
    }

    pub fn space_suit(&self) -> SpaceSuitResult<SpaceSuit> {
        SpaceSuit::new(self.space()?.into(), "<<", ">>")
    }

    /// Side of a square query box expected to hold `expected_rows` of `rows` uniformly
    /// spread points, capped at the smaller axis.
    pub fn query_side(&self, rows: u64) -> f64 {
        let (nx, ny) = (self.nx as f64, self.ny as f64);
        if rows == 0 {
            return nx.min(ny);
        }
        (nx * ny * self.expected_rows as f64 / rows as f64)
            .sqrt()
            .floor()
            .min(nx.min(ny))
    }
}

/// Latitude in `[-90, 90]` on x, longitude in `[-180, 180]` on y.
pub fn geo_space() -> SpaceResult<Space> {
    Space::new([-90.0, -180.0], [90.0, 180.0], [GEO_BITS, GEO_BITS])
}

/// Reads a JSON space description from `space_file`, or falls back to [`geo_space`].
pub fn load_space(space_file: Option<&Path>) -> StoreResult<Space> {
    match space_file {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let space = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("reading space from {}", path.display()))?;
            Ok(space)
        }
        None => Ok(geo_space()?),
    }
}
