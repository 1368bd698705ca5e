//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the statistic/search code stays clean and testable
//! - output changes are localized

use std::path::Path;

use crate::domain::{ObservationResidual, SearchConfig, SearchOutcome};
use crate::io::ingest::IngestedData;
use crate::models::thickness_for;

/// The two result lines: `Tau: <value>` then `S-Statistic: <value>`.
///
/// τ is printed to the precision the search was asked to resolve.
pub fn format_result(tau: f64, statistic: f64, target_digit: i32) -> String {
    let decimals = target_digit.max(0) as usize;
    format!("Tau: {tau:.decimals$}\nS-Statistic: {statistic:.6}")
}

/// Dataset and search diagnostics printed ahead of the result lines.
pub fn format_summary(
    dataset: &Path,
    ingest: &IngestedData,
    outcome: &SearchOutcome,
    config: &SearchConfig,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== hvl - half-value layer fit: {} ===\n", dataset.display()));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    for e in &ingest.row_errors {
        out.push_str(&format!("  (line {}) {}\n", e.line, e.message));
    }
    out.push_str(&format!(
        "Points: n={} (sigma=0: {}) | thickness=[{:.4}, {:.4}]\n",
        ingest.stats.n_points, ingest.stats.excluded, ingest.stats.thickness_min, ingest.stats.thickness_max
    ));
    out.push_str(&format!(
        "Search: tau_init={} digits={}..{} | moves={} evaluations={} converged at digit {}\n",
        config.tau_init,
        config.starting_digit,
        config.target_digit,
        outcome.moves,
        outcome.evaluations,
        outcome.precision_digit
    ));
    if let Some(tvl) = thickness_for(0.1, outcome.tau) {
        out.push_str(&format!("Tenth-value layer: {tvl:.4}\n"));
    }

    out
}

/// Per-observation table of model, residual and statistic contribution.
pub fn format_residual_table(residuals: &[ObservationResidual]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>12} {:>10} {:>10} {:>10} {:>11} {:>12}\n",
        "thickness", "measured", "sigma", "model", "residual", "contrib"
    ));
    for r in residuals {
        let o = &r.observation;
        let contrib = if o.is_weighted() {
            format!("{:.4}", r.contribution)
        } else {
            "excluded".to_string()
        };
        out.push_str(&format!(
            "{:>12.4} {:>10.4} {:>10.4} {:>10.4} {:>11.4} {:>12}\n",
            o.thickness, o.measured, o.sigma, r.model, r.residual, contrib
        ));
    }
    out
}
