use std::path::PathBuf;
use std::process::ExitCode;

use bdd_matchers::expression::{parse_expectation, ExpectExpr};
use bdd_matchers::{Config, Environment, SpecOutcome};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Evaluate expectations given on the command line and print a JSON report.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Expectations, e.g. "expect([1,2]).not.toEqual([1,3])"
    #[arg(required = true)]
    expressions: Vec<String>,
    /// TOML file with printing and evaluation settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Description used for the spec in the report
    #[arg(long, default_value = "command line")]
    describe: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bddm=warn,bdd_matchers=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.config.as_deref().map(Config::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    // parse all expressions before running any of them
    let parsed: Vec<ExpectExpr> = match args.expressions.iter().map(|e| parse_expectation(e)).collect::<Result<Vec<_>, _>>() {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    debug!(count = parsed.len(), "parsed expectations");

    let mut env = Environment::new(config);
    let report = env.run_spec(&args.describe, |env| {
        for expr in parsed {
            // an unknown matcher is already recorded; keep going
            if let Err(e) = expr.apply(env) {
                debug!(error = %e, "expectation did not resolve");
            }
        }
        Ok(())
    });

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("failed to render report: {e}");
            return ExitCode::from(2);
        }
    }

    match report.outcome {
        SpecOutcome::Failed(_) => ExitCode::from(1),
        SpecOutcome::Passed | SpecOutcome::Pending(_) => ExitCode::SUCCESS,
    }
}
