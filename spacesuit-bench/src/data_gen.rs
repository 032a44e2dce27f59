//! Data generators for benchmarks

use crate::config::BenchmarkConfig;
use fake::faker::address::en::CityName;
use fake::Fake;
use rand::Rng;
use spacesuit::Region;
use std::io::{self, Write};

/// Generate `count` points on the integer grid of the configured domain.
pub fn generate_points<R: Rng>(rng: &mut R, config: &BenchmarkConfig, count: usize) -> Vec<(f64, f64)> {
    (0..count)
        .map(|_| {
            (
                rng.gen_range(0..config.nx) as f64,
                rng.gen_range(0..config.ny) as f64,
            )
        })
        .collect()
}

/// Generate square query boxes sized so each returns about `expected_rows` of `rows` points.
pub fn generate_query_boxes<R: Rng>(
    rng: &mut R,
    config: &BenchmarkConfig,
    rows: u64,
    count: usize,
) -> Vec<Region> {
    let side = config.query_side(rows);
    let x_range = (config.nx as f64 - side).max(0.0) as u32;
    let y_range = (config.ny as f64 - side).max(0.0) as u32;
    (0..count)
        .map(|_| {
            let x_lo = rng.gen_range(0..=x_range) as f64;
            let y_lo = rng.gen_range(0..=y_range) as f64;
            Region::new(x_lo, x_lo + side, y_lo, y_lo + side)
        })
        .collect()
}

/// Generate `count` places lines: `latitude longitude description`.
pub fn generate_place_lines<R: Rng>(rng: &mut R, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| {
            let name: String = CityName().fake();
            let latitude: f64 = rng.gen_range(-90.0..=90.0);
            let longitude: f64 = rng.gen_range(-180.0..=180.0);
            format!("{:.4} {:.4} {}", latitude, longitude, name)
        })
        .collect()
}

/// Write generated places lines to `out`, one per line.
pub fn write_places<R: Rng, W: Write>(rng: &mut R, out: &mut W, count: usize) -> io::Result<()> {
    for line in generate_place_lines(rng, count) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
