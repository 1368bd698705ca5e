//! Reporting utilities: result lines, run summary and residual tables.

pub mod format;

pub use format::*;
