//! Week-over-week comparison engine.
//!
//! This module joins the current and prior reporting windows on a key,
//! computes per-metric deltas and percent changes, sums window totals, and
//! ranks top rows and biggest movers.

pub mod aggregate;
pub mod analyzer;
pub mod compare;
pub mod rank;
pub mod types;
pub mod utility;
