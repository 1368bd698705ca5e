//! Coordinate-refinement search over τ.
//!
//! The driver compares the statistic at the current estimate against the two
//! neighbours `τ ± 10^-d`. It moves while a neighbour is strictly better and
//! increments `d` once neither is, stopping when a local minimum is found at
//! the target digit.
//!
//! Rules:
//! - `+step` is checked before `-step`; equal statistics never move
//! - a `-step` neighbour at or below zero is not evaluated, so τ stays positive
//! - a center statistic of exactly `0` cannot be improved on and ends the search

use tracing::{debug, info};

use crate::domain::{
    FitCandidate, MAX_PRECISION_DIGIT, Observation, SearchAction, SearchConfig, SearchOutcome,
    SearchState, SearchStep,
};
use crate::error::{AppError, ErrorKind};

/// Run the search to convergence.
pub fn search(observations: &[Observation], config: &SearchConfig) -> Result<SearchOutcome, AppError> {
    validate_search_config(config)?;

    let mut state = SearchState {
        current_tau: config.tau_init,
        precision_digit: config.starting_digit,
    };
    let mut center = FitCandidate::evaluate(state.current_tau, observations)?;
    let mut evaluations = 1usize;
    let mut moves = 0usize;
    let mut trace = Vec::new();

    loop {
        let step_at = |action| SearchStep {
            precision_digit: state.precision_digit,
            tau: center.tau,
            statistic: center.statistic,
            action,
        };

        if center.statistic == 0.0 {
            trace.push(step_at(SearchAction::Converge));
            break;
        }

        let (up, down) = evaluate_neighbours(center.tau, state.step(), observations, config.parallel)?;
        evaluations += 1 + usize::from(down.is_some());

        let next = if up.statistic < center.statistic {
            Some((SearchAction::Increase, up))
        } else {
            match down {
                Some(d) if d.statistic < center.statistic => Some((SearchAction::Decrease, d)),
                _ => None,
            }
        };

        match next {
            Some((action, candidate)) => {
                if moves >= config.max_moves {
                    return Err(AppError::new(
                        ErrorKind::NotConverged,
                        format!(
                            "Search did not converge within {} moves (tau={}, digit={}).",
                            config.max_moves, center.tau, state.precision_digit
                        ),
                    ));
                }
                trace.push(step_at(action));
                debug!(
                    digit = state.precision_digit,
                    from = center.tau,
                    to = candidate.tau,
                    statistic = candidate.statistic,
                    "move"
                );
                center = candidate;
                state.current_tau = candidate.tau;
                moves += 1;
            }
            None if state.precision_digit >= config.target_digit => {
                trace.push(step_at(SearchAction::Converge));
                break;
            }
            None => {
                trace.push(step_at(SearchAction::Refine));
                state.precision_digit += 1;
                debug!(digit = state.precision_digit, tau = center.tau, "refine");
            }
        }
    }

    info!(
        tau = center.tau,
        statistic = center.statistic,
        digit = state.precision_digit,
        moves,
        evaluations,
        "search converged"
    );

    Ok(SearchOutcome {
        tau: center.tau,
        statistic: center.statistic,
        precision_digit: state.precision_digit,
        moves,
        evaluations,
        trace,
    })
}

/// Reject configurations the search cannot honour.
pub fn validate_search_config(config: &SearchConfig) -> Result<(), AppError> {
    if !(config.tau_init.is_finite() && config.tau_init > 0.0) {
        return Err(AppError::config(format!(
            "Invalid initial tau {} (must be finite and > 0).",
            config.tau_init
        )));
    }
    if config.target_digit < config.starting_digit {
        return Err(AppError::config(format!(
            "Target digit {} is below starting digit {}.",
            config.target_digit, config.starting_digit
        )));
    }
    if config.target_digit > MAX_PRECISION_DIGIT || config.starting_digit < -MAX_PRECISION_DIGIT {
        return Err(AppError::config(format!(
            "Precision digits must lie in [-{MAX_PRECISION_DIGIT}, {MAX_PRECISION_DIGIT}] (got {}..{}).",
            config.starting_digit, config.target_digit
        )));
    }
    if config.max_moves == 0 {
        return Err(AppError::config("Move budget must be >= 1."));
    }
    Ok(())
}

fn evaluate_neighbours(
    tau: f64,
    step: f64,
    observations: &[Observation],
    parallel: bool,
) -> Result<(FitCandidate, Option<FitCandidate>), AppError> {
    let up_tau = tau + step;
    let down_tau = tau - step;

    let eval_up = || FitCandidate::evaluate(up_tau, observations);
    let eval_down = || {
        if down_tau > 0.0 {
            FitCandidate::evaluate(down_tau, observations).map(Some)
        } else {
            Ok(None)
        }
    };

    let (up, down) = if parallel {
        rayon::join(eval_up, eval_down)
    } else {
        (eval_up(), eval_down())
    };
    Ok((up?, down?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::evaluate;

    fn half_value_layer_one() -> Vec<Observation> {
        vec![
            Observation::new(0.0, 1.0, 0.01),
            Observation::new(1.0, 0.5, 0.01),
            Observation::new(2.0, 0.25, 0.01),
        ]
    }

    fn noisy_aluminium() -> Vec<Observation> {
        vec![
            Observation::new(0.0, 1.0, 0.02),
            Observation::new(0.5, 0.83, 0.02),
            Observation::new(1.0, 0.71, 0.02),
            Observation::new(1.5, 0.58, 0.03),
            Observation::new(2.0, 0.49, 0.03),
            Observation::new(3.0, 0.36, 0.03),
            Observation::new(4.0, 0.24, 0.04),
        ]
    }

    fn config(tau_init: f64, starting_digit: i32, target_digit: i32) -> SearchConfig {
        SearchConfig {
            tau_init,
            starting_digit,
            target_digit,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn converges_on_exact_half_value_layer() {
        let out = search(&half_value_layer_one(), &config(0.5, 0, 3)).unwrap();
        assert!((out.tau - 1.0).abs() < 1e-3, "tau={}", out.tau);
        assert!(out.statistic < 1e-6, "statistic={}", out.statistic);
        assert!(out.moves > 0);
    }

    #[test]
    fn zero_sigma_terminates_without_moving() {
        let obs = [Observation::new(5.0, 0.9, 0.0)];
        let out = search(&obs, &config(0.5, 1, 5)).unwrap();
        assert_eq!(out.tau, 0.5);
        assert_eq!(out.statistic, 0.0);
        assert_eq!(out.moves, 0);
        assert_eq!(out.precision_digit, 1);
        assert_eq!(out.evaluations, 1);
        assert_eq!(out.trace.len(), 1);
        assert_eq!(out.trace[0].action, SearchAction::Converge);
    }

    #[test]
    fn rejects_target_below_start() {
        let err = search(&half_value_layer_one(), &config(0.5, 3, 2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn rejects_non_positive_initial_tau() {
        for tau in [0.0, -1.0, f64::NAN] {
            let err = search(&half_value_layer_one(), &config(tau, 0, 3)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }
    }

    #[test]
    fn rejects_digits_beyond_f64_resolution() {
        let err = search(&half_value_layer_one(), &config(0.5, 0, 16)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn result_is_local_minimum_at_target_resolution() {
        let obs = noisy_aluminium();
        let out = search(&obs, &config(0.5, 0, 4)).unwrap();
        let step = 1e-4;
        let s = evaluate(out.tau, &obs).unwrap();
        assert_eq!(s, out.statistic);
        assert!(evaluate(out.tau + step, &obs).unwrap() >= out.statistic);
        assert!(evaluate(out.tau - step, &obs).unwrap() >= out.statistic);
    }

    #[test]
    fn statistic_decreases_along_moves() {
        let out = search(&noisy_aluminium(), &config(0.5, 0, 4)).unwrap();
        for pair in out.trace.windows(2) {
            assert!(pair[1].statistic <= pair[0].statistic);
        }
        assert_eq!(out.trace.last().map(|s| s.action), Some(SearchAction::Converge));
    }

    #[test]
    fn parallel_matches_sequential_bit_for_bit() {
        let obs = noisy_aluminium();
        let seq = search(&obs, &config(0.5, 0, 5)).unwrap();
        let par = search(
            &obs,
            &SearchConfig {
                parallel: true,
                ..config(0.5, 0, 5)
            },
        )
        .unwrap();
        assert_eq!(seq.tau.to_bits(), par.tau.to_bits());
        assert_eq!(seq.statistic.to_bits(), par.statistic.to_bits());
        assert_eq!(seq.trace, par.trace);
    }

    #[test]
    fn never_steps_to_non_positive_tau() {
        // Transmission ~0 at thickness 1 pulls tau towards zero.
        let obs = [Observation::new(1.0, 0.0, 0.01)];
        let out = search(&obs, &config(1.0, 0, 6)).unwrap();
        assert!(out.tau > 0.0);
        assert!(out.trace.iter().all(|s| s.tau > 0.0));
    }

    #[test]
    fn move_budget_is_enforced() {
        let cfg = SearchConfig {
            max_moves: 3,
            ..config(0.5, 2, 3)
        };
        let err = search(&half_value_layer_one(), &cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotConverged);
    }

    #[test]
    fn equal_statistics_never_move() {
        // Thickness 0 transmits fully at every tau: a constant, nonzero statistic.
        let obs = [Observation::new(0.0, 0.7, 0.01)];
        let out = search(&obs, &config(0.5, 0, 3)).unwrap();
        assert_eq!(out.tau, 0.5);
        assert!(out.statistic > 0.0);
        assert_eq!(out.moves, 0);
        assert_eq!(out.precision_digit, 3);
        let actions: Vec<SearchAction> = out.trace.iter().map(|s| s.action).collect();
        assert_eq!(
            actions,
            vec![
                SearchAction::Refine,
                SearchAction::Refine,
                SearchAction::Refine,
                SearchAction::Converge
            ]
        );
    }

    #[test]
    fn increase_wins_when_both_neighbours_improve() {
        // Two points pulling towards different tau; tau=2 sits on a local maximum
        // and the -step neighbour is the larger improvement.
        let obs = [Observation::new(0.5, 0.02, 0.01), Observation::new(6.0, 0.7, 0.01)];
        let center = evaluate(2.0, &obs).unwrap();
        let up = evaluate(3.0, &obs).unwrap();
        let down = evaluate(1.0, &obs).unwrap();
        assert!(up < center && down < center && down < up);

        let out = search(&obs, &config(2.0, 0, 2)).unwrap();
        assert_eq!(out.trace[0].action, SearchAction::Increase);
        assert_eq!(out.trace[1].tau, 3.0);
    }

    #[test]
    fn empty_table_converges_immediately() {
        let out = search(&[], &config(0.5, 1, 5)).unwrap();
        assert_eq!(out.tau, 0.5);
        assert_eq!(out.moves, 0);
    }
}
