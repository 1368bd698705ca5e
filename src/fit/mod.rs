//! Half-value-layer fitting.
//!
//! Responsibilities:
//!
//! - evaluate the S-statistic for a candidate τ
//! - drive the coordinate-refinement search to a local minimum

pub mod search;
pub mod statistic;

pub use search::*;
pub use statistic::*;
