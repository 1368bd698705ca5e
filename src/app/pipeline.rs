//! Shared "fit pipeline" logic for a single dataset.
//!
//! Keeping this in one place avoids duplicating the core workflow per dataset:
//! ingest -> search -> residuals -> exports
//!
//! The CLI layer can then focus on presentation.

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{FitConfig, FitReport, ObservationResidual, SearchOutcome};
use crate::error::AppError;
use crate::fit::{contributions, search};
use crate::io::export::{write_report_json, write_residuals_csv};
use crate::io::ingest::{IngestedData, load_observations};

/// All computed outputs of a single dataset fit.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub outcome: SearchOutcome,
    pub residuals: Vec<ObservationResidual>,
}

impl RunOutput {
    pub fn report(&self, config: &FitConfig) -> FitReport {
        FitReport {
            tool: concat!("hvl ", env!("CARGO_PKG_VERSION")).to_string(),
            dataset: config.csv_path.clone(),
            generated_at: Utc::now(),
            config: config.search,
            rows_read: self.ingest.rows_read,
            rows_used: self.ingest.rows_used,
            rows_skipped: self.ingest.row_errors.len(),
            stats: self.ingest.stats.clone(),
            outcome: self.outcome.clone(),
        }
    }
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    // 1) Read and validate the observation table.
    let ingest = load_observations(&config.csv_path, &config.ingest)?;
    if !ingest.row_errors.is_empty() {
        warn!(
            dataset = %config.csv_path.display(),
            skipped = ingest.row_errors.len(),
            "some records were skipped"
        );
    }
    info!(
        dataset = %config.csv_path.display(),
        rows = ingest.rows_used,
        "loaded observations"
    );

    // 2) Search for the best tau.
    let outcome = search(&ingest.observations, &config.search)?;

    // 3) Per-observation breakdown at the converged tau.
    let residuals = contributions(outcome.tau, &ingest.observations)?;

    let run = RunOutput {
        ingest,
        outcome,
        residuals,
    };

    // 4) Optional exports.
    if let Some(path) = &config.export_report {
        write_report_json(path, &run.report(config))?;
        info!(path = %path.display(), "wrote fit report");
    }
    if let Some(path) = &config.export_residuals {
        write_residuals_csv(path, &run.residuals)?;
        info!(path = %path.display(), "wrote residuals");
    }

    Ok(run)
}
