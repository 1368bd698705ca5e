//! Export fit results.
//!
//! - a JSON report (configuration, dataset stats, outcome and search trace)
//! - a per-observation residual CSV, easy to consume in spreadsheets or scripts

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{FitReport, Observation, ObservationResidual};
use crate::error::AppError;

#[derive(Serialize)]
struct ResidualRow {
    thickness: f64,
    measured: f64,
    sigma: f64,
    model: f64,
    residual: f64,
    contribution: f64,
}

impl From<&ObservationResidual> for ResidualRow {
    fn from(r: &ObservationResidual) -> Self {
        Self {
            thickness: r.observation.thickness,
            measured: r.observation.measured,
            sigma: r.observation.sigma,
            model: r.model,
            residual: r.residual,
            contribution: r.contribution,
        }
    }
}

/// Write the fit report as pretty JSON.
pub fn write_report_json(path: &Path, report: &FitReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::export(format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::export(format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

/// Write per-observation residuals to a CSV file (with header).
pub fn write_residuals_csv(path: &Path, residuals: &[ObservationResidual]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::export(format!("Failed to create residual CSV '{}': {e}", path.display())))?;

    for r in residuals {
        writer
            .serialize(ResidualRow::from(r))
            .map_err(|e| AppError::export(format!("Failed to write residual CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::export(format!("Failed to flush residual CSV: {e}")))?;

    Ok(())
}

/// Write observations as a `(thickness, measured, sigma)` table readable by ingest.
pub fn write_observations_csv(
    path: &Path,
    observations: &[Observation],
    include_header: bool,
) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(include_header)
        .from_path(path)
        .map_err(|e| AppError::export(format!("Failed to create CSV '{}': {e}", path.display())))?;

    for o in observations {
        writer
            .serialize(o)
            .map_err(|e| AppError::export(format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::export(format!("Failed to flush CSV: {e}")))?;

    Ok(())
}
