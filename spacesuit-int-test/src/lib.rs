//! Shared helpers for the SpaceSuit integration tests.

pub mod test_util;
