//! Request handlers.
//!
//! Handlers stay thin: they delegate to the snapshot store, the cooldown
//! gate and the aggregator, and map failures via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod dashboard;
