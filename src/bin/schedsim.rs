//! schedsim — Replay a process trace under a CPU scheduling policy.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use sched_sim::{init_tracing, Policy, RandomSource, Report, Simulator, Workload};

/// Replay a process trace under a CPU scheduling policy.
#[derive(Parser)]
#[command(name = "schedsim", version)]
struct Cli {
    /// Process trace: one "arrival total_cpu cpu_burst io_burst" line per process.
    input: PathBuf,

    /// Random-number file: a count line followed by that many integers.
    rfile: PathBuf,

    /// Scheduler: F (FCFS), L (LCFS), S (SJF), R<quantum> (RR) or P<quantum> (PRIO).
    #[arg(short, long = "sched", env = "SCHEDSIM_SCHED", value_parser = parse_policy)]
    sched: Policy,

    /// Print every state transition before the report.
    #[arg(short, long)]
    verbose: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_policy(code: &str) -> Result<Policy, String> {
    code.parse::<Policy>().map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let rng = RandomSource::load(&cli.rfile)?;
    let workload = Workload::load(&cli.input)?;

    let outcome = Simulator::new(cli.sched).run(&workload, rng);
    let report = Report::new(&outcome);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.verbose {
        outcome
            .trace
            .write_to(&mut out)
            .context("failed to write trace")?;
    }
    if cli.json {
        writeln!(out, "{}", report.to_json()?)?;
    } else {
        write!(out, "{report}")?;
    }
    out.flush()?;
    Ok(())
}
