//! # SpaceSuit Z - z-order space
//!
//! A [`Space`] divides a 2D domain into a grid of cells and numbers the cells along a
//! z-order (Morton) curve. It is the spatial oracle behind a [`spacesuit::SpaceSuit`]:
//!
//! - [`Space::spatial_index_key`] gives the key to store with a point,
//! - [`Space::decompose`] covers a query box with a bounded number of key ranges.
//!
//! ```rust
//! use spacesuit::SpaceSuit;
//! use spacesuit_z::Space;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let side = (1 << 20) as f64;
//! let space = Space::new([0.0, 0.0], [side, side], [20, 20])?;
//! let space_suit = SpaceSuit::new(space.into(), "<<", ">>")?;
//!
//! let queries = space_suit.transform_query(
//!     "select id from t where <<inbox(z, x, 524287, 524288, y, 524287, 524288)>>",
//!     4,
//! )?;
//! assert_eq!(queries.len(), 4);
//! # Ok(())
//! # }
//! ```

mod decomposition;
pub mod errors;
pub mod space;
pub mod z_value;

pub use errors::{SpaceError, SpaceResult};
pub use space::Space;
