//! Utility functions and helpers.
//!
//! - [`error`] - Error type and result alias
//! - [`hash`] - Fast hash map/set aliases

pub mod error;
pub mod hash;
