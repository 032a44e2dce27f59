//! The boundary with the spatial oracle.
//!
//! The oracle owns everything about packed keys: how a point becomes a key, how a
//! region is covered by key ranges, and how keys are rendered as SQL literals. The
//! transformation engine only threads its values through string formatting.

use crate::errors::SpaceSuitResult;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Packed positional key ("z-value"). Bit layout and ordering belong to the oracle.
pub type PackedKey = i64;

/// Index of the x axis for [`SpatialOracleProvider::axis_low`] and friends.
pub const X_AXIS: usize = 0;
/// Index of the y axis.
pub const Y_AXIS: usize = 1;

/// A contiguous, inclusive range of packed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyRange {
    lo: PackedKey,
    hi: PackedKey,
}

impl KeyRange {
    pub fn new(lo: PackedKey, hi: PackedKey) -> Self {
        KeyRange { lo, hi }
    }

    pub fn lo(&self) -> PackedKey {
        self.lo
    }

    pub fn hi(&self) -> PackedKey {
        self.hi
    }
}

impl Display for KeyRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// An axis-aligned query box, built fresh for every invocation.
///
/// Bounds are inclusive. A `Region` does not validate itself; callers check ordering and
/// domain containment before building one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    x_lo: f64,
    x_hi: f64,
    y_lo: f64,
    y_hi: f64,
}

impl Region {
    pub fn new(x_lo: f64, x_hi: f64, y_lo: f64, y_hi: f64) -> Self {
        Region {
            x_lo,
            x_hi,
            y_lo,
            y_hi,
        }
    }

    pub fn x_lo(&self) -> f64 {
        self.x_lo
    }

    pub fn x_hi(&self) -> f64 {
        self.x_hi
    }

    pub fn y_lo(&self) -> f64 {
        self.y_lo
    }

    pub fn y_hi(&self) -> f64 {
        self.y_hi
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({} : {}, {} : {})",
            self.x_lo, self.x_hi, self.y_lo, self.y_hi
        )
    }
}

/// Contract for spatial oracles.
///
/// Implementations must be deterministic and free of shared mutable state: one oracle
/// is shared by every transformation running on a [`crate::SpaceSuit`].
pub trait SpatialOracleProvider: Send + Sync {
    /// Lower bound of the domain along `axis` ([`X_AXIS`] or [`Y_AXIS`]).
    fn axis_low(&self, axis: usize) -> f64;

    /// Upper bound of the domain along `axis`.
    fn axis_high(&self, axis: usize) -> f64;

    /// Computes the packed key of the point `(x, y)`.
    ///
    /// # Errors
    ///
    /// Whatever the oracle rejects, typically points outside the domain.
    fn key_of(&self, x: f64, y: f64) -> SpaceSuitResult<PackedKey>;

    /// Covers `region` with at most `max_ranges` key ranges, in the oracle's order.
    ///
    /// Returning fewer ranges than requested is normal: a small region needs fewer.
    fn decompose(&self, region: &Region, max_ranges: usize) -> SpaceSuitResult<Vec<KeyRange>>;

    /// SQL literal for the low end of `range`.
    fn range_lo_text(&self, range: &KeyRange) -> String {
        range.lo().to_string()
    }

    /// SQL literal for the high end of `range`.
    fn range_hi_text(&self, range: &KeyRange) -> String {
        range.hi().to_string()
    }
}

/// Cheaply cloneable handle to a [`SpatialOracleProvider`].
///
/// Derefs to the provider so its methods can be called directly on the handle.
#[derive(Clone)]
pub struct SpatialOracle {
    inner: Arc<dyn SpatialOracleProvider>,
}

impl SpatialOracle {
    pub fn new<T: SpatialOracleProvider + 'static>(inner: T) -> Self {
        SpatialOracle {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for SpatialOracle {
    type Target = Arc<dyn SpatialOracleProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
