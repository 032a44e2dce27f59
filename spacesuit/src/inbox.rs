//! The `inbox` box-containment predicate.
//!
//! Invocation: `inbox(z, x, XLO, XHI, y, YLO, YHI)` where
//! - `z` names the column holding packed keys,
//! - `x`, `y` name the coordinate columns,
//! - `XLO`, `XHI`, `YLO`, `YHI` are numeric literals bounding the query box.
//!
//! Column names may be quoted with backticks.
//!
//! Each key range of the decomposition becomes one fragment:
//!
//! ```text
//! (z between <zLo> and <zHi> and x between <xLo> and <xHi> and y between <yLo> and <yHi>)
//! ```
//!
//! A key range over-approximates the box, so every fragment repeats the exact
//! coordinate bounds. The key range narrows the index scan and the coordinate bounds
//! keep the result exact.

use crate::errors::{ErrorKind, SpaceSuitError, SpaceSuitResult};
use crate::function::{format_number, parse_number, unquote, SpatialFunctionProvider};
use crate::oracle::{Region, SpatialOracle, X_AXIS, Y_AXIS};

const INBOX_ARITY: usize = 7;

/// Box-containment predicate bound to one oracle and its domain bounds.
pub struct InBox {
    oracle: SpatialOracle,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl InBox {
    pub fn new(oracle: SpatialOracle) -> Self {
        let x_min = oracle.axis_low(X_AXIS);
        let x_max = oracle.axis_high(X_AXIS);
        let y_min = oracle.axis_low(Y_AXIS);
        let y_max = oracle.axis_high(Y_AXIS);
        InBox {
            oracle,
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    fn validate(&self, region: &Region) -> SpaceSuitResult<()> {
        if region.x_lo() > region.x_hi()
            || region.y_lo() > region.y_hi()
            || region.x_lo() < self.x_min
            || region.x_hi() > self.x_max
            || region.y_lo() < self.y_min
            || region.y_hi() > self.y_max
        {
            return Err(SpaceSuitError::new(
                &format!(
                    "Query box {} is inverted or outside the domain ({} : {}, {} : {})",
                    region, self.x_min, self.x_max, self.y_min, self.y_max
                ),
                ErrorKind::OutOfRange,
            ));
        }
        Ok(())
    }
}

impl SpatialFunctionProvider for InBox {
    fn invoke(&self, arguments: &[String], max_ranges: usize) -> SpaceSuitResult<Vec<String>> {
        if arguments.len() != INBOX_ARITY {
            return Err(SpaceSuitError::new(
                &format!(
                    "inbox expects {} arguments, got {}",
                    INBOX_ARITY,
                    arguments.len()
                ),
                ErrorKind::MalformedInvocation,
            ));
        }
        let z_column = unquote(&arguments[0])?;
        let x_column = unquote(&arguments[1])?;
        let x_lo = parse_number(&arguments[2])?;
        let x_hi = parse_number(&arguments[3])?;
        let y_column = unquote(&arguments[4])?;
        let y_lo = parse_number(&arguments[5])?;
        let y_hi = parse_number(&arguments[6])?;

        let region = Region::new(x_lo, x_hi, y_lo, y_hi);
        self.validate(&region)?;

        let mut ranges = self.oracle.decompose(&region, max_ranges)?;
        ranges.truncate(max_ranges);
        log::trace!("inbox {} decomposed into {} key ranges", region, ranges.len());

        let (x_lo, x_hi) = (format_number(x_lo), format_number(x_hi));
        let (y_lo, y_hi) = (format_number(y_lo), format_number(y_hi));
        let fragments = ranges
            .iter()
            .map(|range| {
                format!(
                    "({} between {} and {} and {} between {} and {} and {} between {} and {})",
                    z_column,
                    self.oracle.range_lo_text(range),
                    self.oracle.range_hi_text(range),
                    x_column,
                    x_lo,
                    x_hi,
                    y_column,
                    y_lo,
                    y_hi
                )
            })
            .collect();
        Ok(fragments)
    }
}
