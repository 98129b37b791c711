//! Storewatch domain core.
//!
//! Catalog and snapshot types, date normalization helpers, the cooldown
//! gate that throttles aggregation runs, and the shared [`CoreError`].

pub mod cooldown;
pub mod dates;
pub mod error;
pub mod types;

pub use error::CoreError;
