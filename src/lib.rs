//! Hyperparameter sweeps for a binary-encoded genetic optimizer of a scalar
//! function on a bounded interval.
//!
//! The numeric primitives (encoding, fitness transform, cumulative
//! distribution search) live in [`functions`]; the optimizer, the repeated
//! experiment and the grid sweep live in [`engines`].

pub mod config;
pub mod engines;
pub mod error;
pub mod functions;
pub mod types;

pub use error::{Result, SweepError};
