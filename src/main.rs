//! Command-line demo for the integration pipeline.
//!
//! ```text
//! quadpipe [--tasks=N] [--seed=N] [--cancel-after-ms=N]
//!          [--variant=gated|simple|serial] [--json]
//! ```
//!
//! Runs the selected pipeline variant and prints one line per consumed job,
//! or the full report as JSON with `--json`. Logging goes to stderr and is
//! controlled by `RUST_LOG` (default `info`).

use std::process::ExitCode;
use std::time::Duration;

use quadpipe::{run, run_serial, run_simple, PipelineConfig, PipelineReport, ShutdownPolicy};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Variant {
    Gated,
    Simple,
    Serial,
}

struct CliArgs {
    config: PipelineConfig,
    variant: Variant,
    json: bool,
}

fn print_usage() {
    eprintln!(
        "usage: quadpipe [--tasks=N] [--seed=N] [--cancel-after-ms=N] \
         [--variant=gated|simple|serial] [--json]"
    );
    eprintln!();
    eprintln!("  --tasks=N            jobs to run (default 100)");
    eprintln!("  --seed=N             RNG seed for the job stream");
    eprintln!("  --cancel-after-ms=N  cancel the run after N milliseconds");
    eprintln!("  --variant=V          gated (default), simple, or serial");
    eprintln!("  --json               print the full report as JSON");
}

fn parse_args() -> Result<CliArgs, String> {
    let mut config = PipelineConfig::default();
    let mut variant = Variant::Gated;
    let mut json = false;

    for arg in std::env::args().skip(1) {
        if arg == "--help" || arg == "-h" {
            print_usage();
            std::process::exit(0);
        } else if arg == "--json" {
            json = true;
        } else if let Some(value) = arg.strip_prefix("--tasks=") {
            config.target = value
                .parse()
                .map_err(|_| format!("invalid --tasks value: {value}"))?;
        } else if let Some(value) = arg.strip_prefix("--seed=") {
            config.seed = value
                .parse()
                .map_err(|_| format!("invalid --seed value: {value}"))?;
        } else if let Some(value) = arg.strip_prefix("--cancel-after-ms=") {
            let ms: u64 = value
                .parse()
                .map_err(|_| format!("invalid --cancel-after-ms value: {value}"))?;
            config.shutdown = ShutdownPolicy::CancelAfter(Duration::from_millis(ms));
        } else if let Some(value) = arg.strip_prefix("--variant=") {
            variant = match value {
                "gated" => Variant::Gated,
                "simple" => Variant::Simple,
                "serial" => Variant::Serial,
                other => return Err(format!("unknown variant: {other}")),
            };
        } else {
            return Err(format!("unknown argument: {arg}"));
        }
    }

    if variant != Variant::Gated && matches!(config.shutdown, ShutdownPolicy::CancelAfter(_)) {
        return Err("--cancel-after-ms only applies to --variant=gated".into());
    }

    Ok(CliArgs {
        config,
        variant,
        json,
    })
}

fn print_report(report: &PipelineReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("failed to serialize report: {err}"),
        }
        return;
    }

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(value) => println!(
                "Result {}: [{:.4}, {:.4}] step {:.4} = {:.6}",
                outcome.seq, outcome.left, outcome.right, outcome.step, value
            ),
            Err(err) => println!(
                "Result {}: [{:.4}, {:.4}] step {:.4} failed: {err}",
                outcome.seq, outcome.left, outcome.right, outcome.step
            ),
        }
    }
    println!(
        "done: produced {} consumed {} of {} (generator {:?}, integrator {:?}{})",
        report.produced,
        report.consumed,
        report.target,
        report.generator,
        report.integrator,
        if report.cancelled { ", cancelled" } else { "" },
    );
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    let report = match args.variant {
        Variant::Gated => run(&args.config),
        Variant::Simple => run_simple(&args.config),
        Variant::Serial => Ok(run_serial(&args.config)),
    };
    match report {
        Ok(report) => {
            print_report(&report, args.json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("pipeline failed: {err}");
            ExitCode::from(2)
        }
    }
}
