//! # SpaceSuit - spatial search for databases without spatial indexes
//!
//! A table carries a packed positional key ("z-value") next to its coordinate columns,
//! with an ordinary index on the key column. SpaceSuit rewrites a query that embeds a
//! spatial predicate into a handful of plain SQL queries. Each one restricts the key
//! column to a contiguous range and repeats the exact coordinate bounds. The union of
//! their results is the result of the spatial query.
//!
//! ```text
//! select id, x, y from t where << inbox(z, x, 10, 20, y, 30, 40) >>
//! ```
//!
//! becomes, for every key range the oracle produces,
//!
//! ```text
//! select id, x, y from t where (z between 1234 and 5678 and x between 10.0 and 20.0 and y between 30.0 and 40.0)
//! ```
//!
//! ## Module Organization
//!
//! - [`space_suit`] - The query template engine and its builder
//! - [`transformer`] - Invocation parsing and the function registry
//! - [`function`] - The spatial function extension point and argument helpers
//! - [`inbox`] - The `inbox` box-containment predicate
//! - [`oracle`] - The boundary with the spatial oracle that computes keys and ranges
//! - [`errors`] - Error types and result definitions
//! - [`constants`] - Delimiters, quoting and function names

pub mod constants;
pub mod errors;
pub mod function;
pub mod inbox;
pub mod oracle;
pub mod space_suit;
pub mod transformer;

pub use errors::{ErrorKind, SpaceSuitError, SpaceSuitResult};
pub use function::{SpatialFunction, SpatialFunctionProvider};
pub use inbox::InBox;
pub use oracle::{KeyRange, PackedKey, Region, SpatialOracle, SpatialOracleProvider};
pub use space_suit::{SpaceSuit, SpaceSuitBuilder};
pub use transformer::{Invocation, Transformer};
