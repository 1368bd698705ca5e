//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observations and ingest options (`Observation`, `IngestOptions`)
//! - search configuration and state (`SearchConfig`, `SearchState`)
//! - search outputs (`FitCandidate`, `SearchOutcome`, `FitReport`)

pub mod types;

pub use types::*;
