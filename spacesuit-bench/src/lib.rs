//! SpaceSuit Benchmark Library
//!
//! Loads random points and sample places into SQLite and compares plain coordinate
//! queries against the z-indexed queries produced by [`spacesuit::SpaceSuit`].

pub mod config;
pub mod data_gen;
pub mod stores;
