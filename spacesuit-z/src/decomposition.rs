//! Covering a query box with a bounded number of z-values.
//!
//! Candidate regions are refined largest first. A region is accepted as is when it is
//! a single cell, when it lies inside the query, or when splitting it would exceed the
//! range budget. Children that miss the query are dropped, so a region with only one
//! overlapping child is refined for free.

use crate::z_value;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Inclusive cell ranges of a query box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellBox {
    pub(crate) x_lo: u64,
    pub(crate) x_hi: u64,
    pub(crate) y_lo: u64,
    pub(crate) y_hi: u64,
}

/// A z-value together with the cells it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ZRegion {
    prefix: u64,
    length: u32,
    cells: CellBox,
}

impl ZRegion {
    fn z(&self) -> i64 {
        z_value::z_value(self.prefix, self.length)
    }

    fn overlaps(&self, query: &CellBox) -> bool {
        self.cells.x_lo <= query.x_hi
            && query.x_lo <= self.cells.x_hi
            && self.cells.y_lo <= query.y_hi
            && query.y_lo <= self.cells.y_hi
    }

    fn inside(&self, query: &CellBox) -> bool {
        query.x_lo <= self.cells.x_lo
            && self.cells.x_hi <= query.x_hi
            && query.y_lo <= self.cells.y_lo
            && self.cells.y_hi <= query.y_hi
    }

    fn split(&self, axis: usize) -> [ZRegion; 2] {
        let mut low = self.cells;
        let mut high = self.cells;
        if axis == 0 {
            let mid = self.cells.x_lo + (self.cells.x_hi - self.cells.x_lo + 1) / 2;
            low.x_hi = mid - 1;
            high.x_lo = mid;
        } else {
            let mid = self.cells.y_lo + (self.cells.y_hi - self.cells.y_lo + 1) / 2;
            low.y_hi = mid - 1;
            high.y_lo = mid;
        }
        [
            ZRegion {
                prefix: self.prefix << 1,
                length: self.length + 1,
                cells: low,
            },
            ZRegion {
                prefix: (self.prefix << 1) | 1,
                length: self.length + 1,
                cells: high,
            },
        ]
    }
}

// BinaryHeap pops the greatest element: shorter prefixes (bigger regions) first,
// then lower z-values.
impl Ord for ZRegion {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .length
            .cmp(&self.length)
            .then_with(|| other.z().cmp(&self.z()))
    }
}

impl PartialOrd for ZRegion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Covers `query` with at most `max_ranges` z-values, sorted ascending.
///
/// `interleave` gives the axis of every z bit; `x_bits`/`y_bits` size the grid.
pub(crate) fn decompose(
    query: &CellBox,
    interleave: &[usize],
    x_bits: u32,
    y_bits: u32,
    max_ranges: usize,
) -> Vec<i64> {
    if max_ranges == 0 {
        return Vec::new();
    }
    let root = ZRegion {
        prefix: 0,
        length: 0,
        cells: CellBox {
            x_lo: 0,
            x_hi: (1u64 << x_bits) - 1,
            y_lo: 0,
            y_hi: (1u64 << y_bits) - 1,
        },
    };
    if !root.overlaps(query) {
        return Vec::new();
    }

    let total_bits = interleave.len() as u32;
    // max_ranges is only a cap and may be huge; never size buffers by it
    let mut accepted: Vec<ZRegion> = Vec::new();
    let mut queue = BinaryHeap::new();
    queue.push(root);

    while let Some(region) = queue.pop() {
        if region.length == total_bits || region.inside(query) {
            accepted.push(region);
            continue;
        }
        let children: Vec<ZRegion> = region
            .split(interleave[region.length as usize])
            .into_iter()
            .filter(|child| child.overlaps(query))
            .collect();
        if accepted.len() + queue.len() + children.len() <= max_ranges {
            queue.extend(children);
        } else {
            accepted.push(region);
        }
    }

    let mut zs: Vec<i64> = accepted.iter().map(ZRegion::z).collect();
    zs.sort_unstable();
    zs
}
