//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - report and residual exports (JSON/CSV) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
