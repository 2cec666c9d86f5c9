//! Aggregation of trial outcomes into per-cell estimates.

mod estimate;

pub use estimate::{estimate, Estimate};
