//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the search
//! - exported to JSON/CSV
//! - compared across runs for determinism checks

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Finest precision digit the search accepts.
///
/// A step of `1e-15` is already at the edge of f64 resolution for τ values
/// near 1; anything finer cannot move the estimate.
pub const MAX_PRECISION_DIGIT: i32 = 15;

/// One measured `(thickness, transmission, uncertainty)` triple.
///
/// `sigma == 0` marks the point as excluded from the statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub thickness: f64,
    pub measured: f64,
    pub sigma: f64,
}

impl Observation {
    pub fn new(thickness: f64, measured: f64, sigma: f64) -> Self {
        Self {
            thickness,
            measured,
            sigma,
        }
    }

    /// Whether this point contributes to the statistic.
    pub fn is_weighted(&self) -> bool {
        self.sigma != 0.0
    }
}

/// What to do with a data record that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecordPolicy {
    /// Drop the record, log a warning and keep going.
    Skip,
    /// Abort the whole run on the first bad record.
    Fail,
}

/// Options for reading an observation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// The first record is a header row rather than data.
    pub include_header: bool,
    pub record_policy: RecordPolicy,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            include_header: false,
            record_policy: RecordPolicy::Skip,
        }
    }
}

/// Tunables for the coordinate search over τ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Starting estimate (must be finite and > 0).
    pub tau_init: f64,
    /// Precision digit of the first step (`step = 10^-digit`).
    pub starting_digit: i32,
    /// Precision digit at which a local minimum ends the search.
    pub target_digit: i32,
    /// Upper bound on accepted moves across all digit levels.
    pub max_moves: usize,
    /// Evaluate the `+step` / `-step` neighbours concurrently.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tau_init: 0.5,
            starting_digit: 1,
            target_digit: 5,
            max_moves: 1_000_000,
            parallel: false,
        }
    }
}

/// A τ value together with the statistic it produces.
///
/// Construct via [`FitCandidate::evaluate`](crate::fit::statistic); the
/// statistic is never recomputed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitCandidate {
    pub tau: f64,
    pub statistic: f64,
}

/// Mutable cursor of the search loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchState {
    pub current_tau: f64,
    pub precision_digit: i32,
}

impl SearchState {
    /// Step size at the current precision digit.
    pub fn step(&self) -> f64 {
        10f64.powi(-self.precision_digit)
    }
}

/// What the driver did after comparing a center point with its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchAction {
    Increase,
    Decrease,
    Refine,
    Converge,
}

/// One entry of the search trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchStep {
    pub precision_digit: i32,
    /// Center τ at the time of the decision.
    pub tau: f64,
    /// Statistic at the center.
    pub statistic: f64,
    pub action: SearchAction,
}

/// Result of a converged search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub tau: f64,
    pub statistic: f64,
    /// Precision digit at which the search converged.
    pub precision_digit: i32,
    pub moves: usize,
    pub evaluations: usize,
    pub trace: Vec<SearchStep>,
}

/// Per-observation breakdown at a given τ (used for reporting and exports).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservationResidual {
    pub observation: Observation,
    /// Modeled transmission.
    pub model: f64,
    /// `model - measured`.
    pub residual: f64,
    /// Contribution to the statistic (0 when `sigma == 0`).
    pub contribution: f64,
}

/// Summary stats about the observations actually used for fitting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub n_points: usize,
    /// Points with `sigma == 0` (kept, but contributing nothing).
    pub excluded: usize,
    pub thickness_min: f64,
    pub thickness_max: f64,
}

/// A full `hvl fit` run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,
    pub ingest: IngestOptions,
    pub search: SearchConfig,

    pub summary: bool,
    pub residuals: bool,

    pub export_report: Option<PathBuf>,
    pub export_residuals: Option<PathBuf>,
}

/// Configuration for synthetic dataset generation.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Generating half-value layer.
    pub tau: f64,
    pub points: usize,
    /// Thickness of the last point; points are evenly spaced from 0.
    pub thickness_max: f64,
    /// Standard deviation of the Gaussian noise, also written as `sigma`.
    pub noise: f64,
    pub seed: u64,
}

/// A saved fit report (JSON).
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub tool: String,
    pub dataset: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub config: SearchConfig,
    pub rows_read: usize,
    pub rows_used: usize,
    pub rows_skipped: usize,
    pub stats: DatasetStats,
    pub outcome: SearchOutcome,
}
