use crate::decomposition::{self, CellBox};
use crate::errors::{SpaceError, SpaceResult};
use crate::z_value::{self, MAX_Z_BITS};
use serde::{Deserialize, Serialize};
use spacesuit::errors::SpaceSuitResult;
use spacesuit::oracle::{KeyRange, PackedKey, Region, SpatialOracle, SpatialOracleProvider};

/// A 2D space partitioned into a grid of `2^x_bits` by `2^y_bits` cells.
///
/// Each axis spans `[lo, hi]`; a coordinate equal to `hi` falls in the last cell. Keys
/// are z-values: the interleaved bits of a point's cell coordinates, packed as
/// described in [`crate::z_value`].
///
/// `Space` deserializes from `{"lo": [..], "hi": [..], "bits": [..]}` and is validated
/// on the way in.
///
/// # Examples
///
/// ```rust
/// use spacesuit_z::Space;
///
/// let space = Space::new([-90.0, -180.0], [90.0, 180.0], [24, 24]).unwrap();
/// let key = space.spatial_index_key(40.785091, -73.968285).unwrap();
/// assert!(key > 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpaceDescriptor", into = "SpaceDescriptor")]
pub struct Space {
    lo: [f64; 2],
    hi: [f64; 2],
    bits: [u32; 2],
    interleave: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpaceDescriptor {
    lo: [f64; 2],
    hi: [f64; 2],
    bits: [u32; 2],
}

impl TryFrom<SpaceDescriptor> for Space {
    type Error = SpaceError;

    fn try_from(descriptor: SpaceDescriptor) -> SpaceResult<Self> {
        Space::new(descriptor.lo, descriptor.hi, descriptor.bits)
    }
}

impl From<Space> for SpaceDescriptor {
    fn from(space: Space) -> Self {
        SpaceDescriptor {
            lo: space.lo,
            hi: space.hi,
            bits: space.bits,
        }
    }
}

impl Space {
    /// Creates a space.
    ///
    /// # Errors
    ///
    /// `InvalidSpace` if a bound is not finite, `lo >= hi` on an axis, an axis has no
    /// bits, or the axes need more than 57 bits together.
    pub fn new(lo: [f64; 2], hi: [f64; 2], bits: [u32; 2]) -> SpaceResult<Self> {
        for axis in 0..2 {
            if !lo[axis].is_finite() || !hi[axis].is_finite() || lo[axis] >= hi[axis] {
                return Err(SpaceError::InvalidSpace(format!(
                    "axis {} bounds [{}, {}] must be finite with lo < hi",
                    axis, lo[axis], hi[axis]
                )));
            }
            if bits[axis] == 0 {
                return Err(SpaceError::InvalidSpace(format!(
                    "axis {} needs at least one bit",
                    axis
                )));
            }
        }
        if u64::from(bits[0]) + u64::from(bits[1]) > u64::from(MAX_Z_BITS) {
            return Err(SpaceError::InvalidSpace(format!(
                "{} + {} bits exceed the maximum of {}",
                bits[0], bits[1], MAX_Z_BITS
            )));
        }
        Ok(Space {
            lo,
            hi,
            bits,
            interleave: z_value::interleave(bits[0], bits[1]),
        })
    }

    pub fn lo(&self, axis: usize) -> f64 {
        self.lo[axis]
    }

    pub fn hi(&self, axis: usize) -> f64 {
        self.hi[axis]
    }

    pub fn bits(&self, axis: usize) -> u32 {
        self.bits[axis]
    }

    /// Total number of bits in a point's key.
    pub fn total_bits(&self) -> u32 {
        self.bits[0] + self.bits[1]
    }

    /// Cell coordinate of `value` along `axis`, clamped to the grid.
    fn cell(&self, axis: usize, value: f64) -> u64 {
        let cells = 1u64 << self.bits[axis];
        let scaled = (value - self.lo[axis]) / (self.hi[axis] - self.lo[axis]) * cells as f64;
        if scaled <= 0.0 {
            0
        } else {
            (scaled as u64).min(cells - 1)
        }
    }

    fn check_bounds(&self, axis: usize, value: f64) -> SpaceResult<()> {
        if !(self.lo[axis] <= value && value <= self.hi[axis]) {
            return Err(SpaceError::OutOfBounds {
                axis,
                value,
                lo: self.lo[axis],
                hi: self.hi[axis],
            });
        }
        Ok(())
    }

    /// Returns the full-length z-value of the cell containing `(x, y)`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if a coordinate is outside the space or not a number.
    pub fn spatial_index_key(&self, x: f64, y: f64) -> SpaceResult<i64> {
        self.check_bounds(0, x)?;
        self.check_bounds(1, y)?;
        let cell = [self.cell(0, x), self.cell(1, y)];
        let mut remaining = self.bits;
        let mut prefix = 0u64;
        for &axis in &self.interleave {
            remaining[axis] -= 1;
            prefix = (prefix << 1) | ((cell[axis] >> remaining[axis]) & 1);
        }
        Ok(z_value::z_value(prefix, self.total_bits()))
    }

    /// Covers `region` with at most `max_ranges` z-values, in ascending order.
    ///
    /// Parts of the region outside the space are ignored. Every cell touched by the
    /// region lies in one of the returned z-values.
    pub fn decompose(&self, region: &Region, max_ranges: usize) -> Vec<i64> {
        let query = CellBox {
            x_lo: self.cell(0, region.x_lo()),
            x_hi: self.cell(0, region.x_hi()),
            y_lo: self.cell(1, region.y_lo()),
            y_hi: self.cell(1, region.y_hi()),
        };
        let zs = decomposition::decompose(
            &query,
            &self.interleave,
            self.bits[0],
            self.bits[1],
            max_ranges,
        );
        log::trace!(
            "decomposed {} into {} z-values (max {})",
            region,
            zs.len(),
            max_ranges
        );
        zs
    }
}

impl SpatialOracleProvider for Space {
    fn axis_low(&self, axis: usize) -> f64 {
        self.lo(axis)
    }

    fn axis_high(&self, axis: usize) -> f64 {
        self.hi(axis)
    }

    fn key_of(&self, x: f64, y: f64) -> SpaceSuitResult<PackedKey> {
        Ok(self.spatial_index_key(x, y)?)
    }

    fn decompose(&self, region: &Region, max_ranges: usize) -> SpaceSuitResult<Vec<KeyRange>> {
        Ok(Space::decompose(self, region, max_ranges)
            .into_iter()
            .map(|z| KeyRange::new(z_value::z_lo(z), z_value::z_hi(z)))
            .collect())
    }
}

impl From<Space> for SpatialOracle {
    fn from(space: Space) -> Self {
        SpatialOracle::new(space)
    }
}
