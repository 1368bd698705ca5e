//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - runs the fit pipeline once per dataset
//! - prints results and writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, EvalArgs, FitArgs, SampleArgs, TableArgs};
use crate::domain::{FitConfig, IngestOptions, Observation, SampleConfig, SearchConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `hvl` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may provide `HVL_*` defaults; a missing file is fine.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Eval(args) => handle_eval(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Logs go to stderr so stdout stays limited to results.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    if args.datasets.len() > 1 && (args.export.is_some() || args.export_residuals.is_some()) {
        return Err(AppError::config(
            "`--export` / `--export-residuals` require a single dataset.",
        ));
    }

    let many = args.datasets.len() > 1;
    for config in fit_configs_from_args(&args) {
        let run = pipeline::run_fit(&config)?;

        if many {
            println!("== {} ==", config.csv_path.display());
        }
        if config.summary {
            print!(
                "{}",
                crate::report::format_summary(&config.csv_path, &run.ingest, &run.outcome, &config.search)
            );
        }
        if config.residuals {
            print!("{}", crate::report::format_residual_table(&run.residuals));
        }
        println!(
            "{}",
            crate::report::format_result(run.outcome.tau, run.outcome.statistic, config.search.target_digit)
        );
    }

    Ok(())
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    let ingest = crate::io::load_observations(&args.dataset, &ingest_options(&args.table))?;
    println!("{}", eval_output(&args, &ingest.observations)?);
    Ok(())
}

/// Optional residual table followed by the same result lines `fit` prints.
fn eval_output(args: &EvalArgs, observations: &[Observation]) -> Result<String, AppError> {
    let statistic = crate::fit::evaluate(args.tau, observations)?;

    let mut out = String::new();
    if args.table.residuals {
        let residuals = crate::fit::contributions(args.tau, observations)?;
        out.push_str(&crate::report::format_residual_table(&residuals));
    }
    out.push_str(&crate::report::format_result(args.tau, statistic, args.digits));
    Ok(out)
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        tau: args.tau,
        points: args.points,
        thickness_max: args.thickness_max,
        noise: args.noise,
        seed: args.seed,
    };
    let observations = crate::data::generate_sample(&config)?;
    crate::io::write_observations_csv(&args.output, &observations, args.header)?;
    info!(path = %args.output.display(), points = observations.len(), "wrote sample");
    Ok(())
}

fn ingest_options(table: &TableArgs) -> IngestOptions {
    IngestOptions {
        include_header: table.include_header,
        record_policy: table.on_bad_record,
    }
}

/// One pipeline configuration per dataset, sharing every other flag.
fn fit_configs_from_args(args: &FitArgs) -> Vec<FitConfig> {
    let search = SearchConfig {
        tau_init: args.tau_init,
        starting_digit: args.start_digit,
        target_digit: args.target_digit,
        max_moves: args.max_moves,
        parallel: args.parallel,
    };
    let ingest = ingest_options(&args.table);

    args.datasets
        .iter()
        .map(|csv_path| FitConfig {
            csv_path: csv_path.clone(),
            ingest,
            search,
            summary: args.summary,
            residuals: args.table.residuals,
            export_report: args.export.clone(),
            export_residuals: args.export_residuals.clone(),
        })
        .collect()
}
