//! S-statistic evaluation.
//!
//! For a candidate τ the statistic is
//!
//! `S(τ) = Σ ((0.5^(x_i / τ) - T_i) / σ_i)^2`
//!
//! summed over observations with `σ_i > 0`. Observations with `σ_i == 0` are
//! treated as carrying no information and contribute nothing.

use crate::domain::{FitCandidate, Observation, ObservationResidual};
use crate::error::AppError;
use crate::models::transmission;

/// Compute the S-statistic for `tau`.
///
/// Fails for `tau == 0`, a non-finite `tau`, or a sum that overflows to a
/// non-finite value. An empty slice yields `0`.
pub fn evaluate(tau: f64, observations: &[Observation]) -> Result<f64, AppError> {
    check_tau(tau)?;

    let mut sum = 0.0;
    for obs in observations {
        sum += contribution(obs, tau);
    }

    if !sum.is_finite() {
        return Err(AppError::domain(format!(
            "S-statistic is non-finite at tau={tau} ({sum})."
        )));
    }
    Ok(sum)
}

/// Per-observation breakdown of [`evaluate`].
pub fn contributions(
    tau: f64,
    observations: &[Observation],
) -> Result<Vec<ObservationResidual>, AppError> {
    check_tau(tau)?;

    Ok(observations
        .iter()
        .map(|obs| {
            let model = transmission(obs.thickness, tau);
            ObservationResidual {
                observation: *obs,
                model,
                residual: model - obs.measured,
                contribution: contribution(obs, tau),
            }
        })
        .collect())
}

impl FitCandidate {
    /// Evaluate the statistic once and freeze it alongside `tau`.
    pub fn evaluate(tau: f64, observations: &[Observation]) -> Result<Self, AppError> {
        let statistic = evaluate(tau, observations)?;
        Ok(Self { tau, statistic })
    }
}

fn contribution(obs: &Observation, tau: f64) -> f64 {
    if !obs.is_weighted() {
        return 0.0;
    }
    let r = (transmission(obs.thickness, tau) - obs.measured) / obs.sigma;
    r * r
}

fn check_tau(tau: f64) -> Result<(), AppError> {
    if tau == 0.0 {
        return Err(AppError::domain(
            "Cannot evaluate the S-statistic at tau=0 (division by zero in the model).",
        ));
    }
    if !tau.is_finite() {
        return Err(AppError::domain(format!(
            "Cannot evaluate the S-statistic at non-finite tau={tau}."
        )));
    }
    Ok(())
}
