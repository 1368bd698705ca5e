//! Synthetic attenuation sample generation.
//!
//! Points are evenly spaced in thickness from 0 to `thickness_max`. The measured
//! transmission is the model value plus Gaussian noise, and the noise level is
//! written back as each point's `sigma`.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::debug;

use crate::domain::{Observation, SampleConfig};
use crate::error::AppError;
use crate::models::transmission;

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<Observation>, AppError> {
    if !(config.tau.is_finite() && config.tau > 0.0) {
        return Err(AppError::config(format!(
            "Invalid sample tau {} (must be finite and > 0).",
            config.tau
        )));
    }
    if config.points < 2 {
        return Err(AppError::config("Sample point count must be >= 2."));
    }
    if !(config.thickness_max.is_finite() && config.thickness_max > 0.0) {
        return Err(AppError::config("Sample thickness range must be finite and > 0."));
    }
    // The noise level doubles as sigma, and sigma = 0 would exclude every point.
    if !(config.noise.is_finite() && config.noise > 0.0) {
        return Err(AppError::config("Sample noise must be finite and > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::config(format!("Noise distribution error: {e}")))?;

    let spacing = config.thickness_max / (config.points as f64 - 1.0);
    let observations: Vec<Observation> = (0..config.points)
        .map(|i| {
            let thickness = spacing * i as f64;
            let z: f64 = normal.sample(&mut rng);
            let measured = transmission(thickness, config.tau) + config.noise * z;
            Observation {
                thickness,
                measured,
                sigma: config.noise,
            }
        })
        .collect();

    debug!(
        tau = config.tau,
        points = config.points,
        noise = config.noise,
        seed = config.seed,
        "generated synthetic sample"
    );
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SearchConfig;
    use crate::fit::search;

    fn config(seed: u64) -> SampleConfig {
        SampleConfig {
            tau: 1.7,
            points: 12,
            thickness_max: 8.0,
            noise: 0.002,
            seed,
        }
    }

    #[test]
    fn same_seed_same_sample() {
        assert_eq!(generate_sample(&config(7)).unwrap(), generate_sample(&config(7)).unwrap());
        assert_ne!(generate_sample(&config(7)).unwrap(), generate_sample(&config(8)).unwrap());
    }

    #[test]
    fn sample_is_evenly_spaced_with_noise_as_sigma() {
        let obs = generate_sample(&config(1)).unwrap();
        assert_eq!(obs[0].thickness, 0.0);
        assert!((obs[11].thickness - 8.0).abs() < 1e-12);
        for o in &obs {
            assert_eq!(o.sigma, 0.002);
            assert!((o.measured - transmission(o.thickness, 1.7)).abs() < 0.002 * 6.0);
        }
    }

    #[test]
    fn search_recovers_generating_tau() {
        let obs = generate_sample(&config(42)).unwrap();
        let out = search(
            &obs,
            &SearchConfig {
                tau_init: 0.5,
                starting_digit: 0,
                target_digit: 4,
                ..SearchConfig::default()
            },
        )
        .unwrap();
        assert!((out.tau - 1.7).abs() < 0.05, "tau={}", out.tau);
    }

    #[test]
    fn rejects_degenerate_configs() {
        assert!(generate_sample(&SampleConfig { tau: 0.0, ..config(1) }).is_err());
        assert!(generate_sample(&SampleConfig { points: 1, ..config(1) }).is_err());
        assert!(generate_sample(&SampleConfig { noise: -0.1, ..config(1) }).is_err());
        assert!(generate_sample(&SampleConfig { noise: 0.0, ..config(1) }).is_err());
    }
}
