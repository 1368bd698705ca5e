//! Attenuation model implementation.
//!
//! Kept as small, pure functions so that the statistic and search code can stay
//! generic.

pub mod model;

pub use model::*;
