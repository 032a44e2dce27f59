//! Z-value encoding.
//!
//! A z-value is a prefix of the bit-interleaved cell coordinates of a point. Short
//! prefixes denote large regions, the full-length prefix denotes a single cell, and
//! points that are close in 2D space mostly stay close along the z-order.
//!
//! ## Layout
//!
//! Z-values are packed into a non-negative `i64`:
//!
//! ```text
//! bit 63      sign, always 0
//! bits 62..6  prefix bits, most significant first, unused bits zero
//! bits 5..0   prefix length (0..=57)
//! ```
//!
//! A z-value of length `n` covers every full-length z-value sharing its first `n`
//! bits. [`z_lo`] and [`z_hi`] give the smallest and largest packed value of that
//! family, so `z_lo(z) <= z_lo(p) <= z_hi(z)` for every point key `p` inside it.

/// Maximum number of prefix bits a z-value can hold.
pub const MAX_Z_BITS: u32 = 57;

const LENGTH_BITS: u32 = 6;
const LENGTH_MASK: i64 = (1 << LENGTH_BITS) - 1;

/// Axis order of the z bits, most significant first.
///
/// Each bit is taken from the axis with the most bits left, ties going to x, so
/// equal bit counts interleave as x, y, x, y, ...
pub fn interleave(x_bits: u32, y_bits: u32) -> Vec<usize> {
    let mut order = Vec::with_capacity(x_bits as usize + y_bits as usize);
    let (mut x_left, mut y_left) = (x_bits, y_bits);
    while x_left > 0 || y_left > 0 {
        if x_left >= y_left {
            order.push(0);
            x_left -= 1;
        } else {
            order.push(1);
            y_left -= 1;
        }
    }
    order
}

/// Packs the `length`-bit `prefix` into a z-value.
pub fn z_value(prefix: u64, length: u32) -> i64 {
    debug_assert!(length <= MAX_Z_BITS, "z-value length must be at most 57");
    debug_assert!(prefix >> length == 0, "prefix wider than length");
    let shifted = if length == 0 { 0 } else { prefix << (63 - length) };
    (shifted as i64) | length as i64
}

/// Number of prefix bits in `z`.
pub fn length(z: i64) -> u32 {
    (z & LENGTH_MASK) as u32
}

/// The prefix bits of `z`, right-aligned.
pub fn prefix(z: i64) -> u64 {
    let length = length(z);
    if length == 0 {
        0
    } else {
        (z as u64) >> (63 - length)
    }
}

/// Smallest packed value covered by `z`.
pub fn z_lo(z: i64) -> i64 {
    z
}

/// Largest packed value covered by `z`: all unused prefix bits set.
pub fn z_hi(z: i64) -> i64 {
    let unused = ((1u64 << (63 - length(z))) - 1) as i64;
    z | (unused & !LENGTH_MASK)
}

/// Returns `true` if `inner` lies within the region denoted by `outer`.
pub fn contains(outer: i64, inner: i64) -> bool {
    let outer_length = length(outer);
    outer_length <= length(inner) && prefix(inner) >> (length(inner) - outer_length) == prefix(outer)
}
