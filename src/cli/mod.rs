//! Command-line parsing for the half-value-layer fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the statistic/search code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::RecordPolicy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hvl", version, about = "Half-value-layer fitter for attenuation measurements")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit tau for each dataset and print `Tau:` / `S-Statistic:`.
    Fit(FitArgs),
    /// Print the S-statistic of a dataset at a fixed tau.
    Eval(EvalArgs),
    /// Write a synthetic dataset generated from a known tau.
    Sample(SampleArgs),
}

/// Options shared by every command that reads an observation table.
#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    /// The first CSV record is a header row.
    #[arg(long = "header", env = "HVL_INCLUDE_HEADER")]
    pub include_header: bool,

    /// What to do with records that fail to parse.
    #[arg(long, value_enum, default_value_t = RecordPolicy::Skip)]
    pub on_bad_record: RecordPolicy,

    /// Print a per-observation residual table.
    #[arg(long)]
    pub residuals: bool,
}

/// Options for `hvl fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Observation tables `(thickness, measured, sigma)`; each is fitted independently.
    #[arg(value_name = "CSV", required = true)]
    pub datasets: Vec<PathBuf>,

    #[command(flatten)]
    pub table: TableArgs,

    /// Initial tau estimate.
    #[arg(long, env = "HVL_TAU_INIT", default_value_t = 0.5)]
    pub tau_init: f64,

    /// Precision digit of the first step (step = 10^-digit).
    #[arg(long, env = "HVL_START_DIGIT", default_value_t = 1, allow_negative_numbers = true)]
    pub start_digit: i32,

    /// Precision digit at which the search stops.
    #[arg(long, env = "HVL_TARGET_DIGIT", default_value_t = 5, allow_negative_numbers = true)]
    pub target_digit: i32,

    /// Maximum accepted moves before giving up.
    #[arg(long, env = "HVL_MAX_MOVES", default_value_t = 1_000_000)]
    pub max_moves: usize,

    /// Evaluate both neighbours of each step concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Print dataset and search diagnostics before the result.
    #[arg(long)]
    pub summary: bool,

    /// Export a JSON fit report (with a single dataset only).
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export per-observation residuals to CSV (with a single dataset only).
    #[arg(long = "export-residuals")]
    pub export_residuals: Option<PathBuf>,
}

/// Options for `hvl eval`.
#[derive(Debug, Args, Clone)]
pub struct EvalArgs {
    /// Observation table `(thickness, measured, sigma)`.
    #[arg(value_name = "CSV")]
    pub dataset: PathBuf,

    #[command(flatten)]
    pub table: TableArgs,

    /// Tau at which to evaluate the statistic.
    #[arg(long, allow_negative_numbers = true)]
    pub tau: f64,

    /// Decimals used when printing tau.
    #[arg(long, default_value_t = 5)]
    pub digits: i32,
}

/// Options for `hvl sample`.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Generating tau.
    #[arg(long)]
    pub tau: f64,

    /// Number of points.
    #[arg(short = 'n', long, default_value_t = 11)]
    pub points: usize,

    /// Thickness of the last point.
    #[arg(long, default_value_t = 10.0)]
    pub thickness_max: f64,

    /// Gaussian noise standard deviation (also written as sigma).
    #[arg(long, default_value_t = 0.01)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write a `thickness,measured,sigma` header row.
    #[arg(long)]
    pub header: bool,

    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_defaults() {
        let cli = Cli::try_parse_from(["hvl", "fit", "greenalum.csv"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.datasets, vec![PathBuf::from("greenalum.csv")]);
        assert_eq!(args.tau_init, 0.5);
        assert_eq!(args.target_digit, 5);
        assert!(!args.table.include_header);
        assert_eq!(args.table.on_bad_record, RecordPolicy::Skip);
    }

    #[test]
    fn fit_accepts_several_datasets_and_flags() {
        let cli = Cli::try_parse_from([
            "hvl", "-vv", "fit", "a.csv", "b.csv", "--header", "--start-digit", "0",
            "--target-digit", "3", "--on-bad-record", "fail",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.datasets.len(), 2);
        assert!(args.table.include_header);
        assert_eq!(args.start_digit, 0);
        assert_eq!(args.target_digit, 3);
        assert_eq!(args.table.on_bad_record, RecordPolicy::Fail);
    }

    #[test]
    fn fit_requires_a_dataset() {
        assert!(Cli::try_parse_from(["hvl", "fit"]).is_err());
    }
}
