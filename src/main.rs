//! coresim CLI
//!
//! ```bash
//! # Simulate a workload script from stdin with the reference policy
//! coresim run < workload.txt
//!
//! # Same script, FIFO hand-off policy, stop after t=10000, print each step
//! coresim run workload.txt --policy fifo --horizon 10000 --trace
//!
//! # Emit a random workload script
//! coresim generate --ticks 1000 --seed 42 > workload.txt
//! ```

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coresim::{
    PolicyKind, SimConfig, TerminationMode, Workload,
    config::{DEFAULT_STORAGE_LATENCY, DEFAULT_USER_LATENCY},
    sim::{GeneratorConfig, bernoulli_workload, simulate_with},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Discrete-event simulator of processes sharing a fixed pool of CPU cores.
#[derive(Parser, Debug)]
#[command(name = "coresim")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run a workload script and print the final process table.
    Run(RunArgs),
    /// Print a randomly generated workload script.
    Generate(GenerateArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Workload script. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Core allocation policy.
    #[arg(long, value_enum, default_value_t = PolicyKind::Greedy)]
    policy: PolicyKind,

    /// Ticks one storage access takes.
    #[arg(long, default_value_t = DEFAULT_STORAGE_LATENCY)]
    storage_latency: u64,

    /// Ticks one user interaction takes.
    #[arg(long, default_value_t = DEFAULT_USER_LATENCY)]
    user_latency: u64,

    /// Stop once the next event lies past this time. Required by the fifo policy.
    #[arg(long)]
    horizon: Option<u64>,

    /// Termination time reported for each process.
    #[arg(long, value_enum, default_value_t = TerminationMode::Global)]
    termination: TerminationMode,

    /// Print every processed event.
    #[arg(long)]
    trace: bool,

    /// Print aggregate statistics after the table.
    #[arg(long)]
    summary: bool,
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Number of ticks over which processes may arrive.
    #[arg(long, default_value = "500")]
    ticks: u64,

    /// Probability that a process arrives in a given tick.
    #[arg(long, default_value = "0.3")]
    p_arrival: f64,

    /// Probability that a process gets the short CPU request.
    #[arg(long, default_value = "0.3")]
    p_short: f64,

    #[arg(long, default_value = "2")]
    short_cpu: u64,

    #[arg(long, default_value = "6")]
    long_cpu: u64,

    /// Probability that a process gets an SSD command.
    #[arg(long, default_value = "0.2")]
    p_ssd: f64,

    /// Probability that a process gets a USER command.
    #[arg(long, default_value = "0.05")]
    p_user: f64,

    #[arg(long, default_value = "2")]
    cores: u32,

    /// Random seed. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    // Diagnostics go to stderr so the report on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,coresim=info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Cmd::Run(run) => run_workload(run),
        Cmd::Generate(generate) => generate_workload(generate),
    }
}

fn run_workload(args: RunArgs) -> Result<()> {
    let script = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read workload {}", path.display()))?,
        None => {
            let mut script = String::new();
            io::stdin()
                .read_to_string(&mut script)
                .context("Failed to read workload from stdin")?;
            script
        }
    };
    let workload = Workload::parse(&script).context("Invalid workload")?;

    let mut config = SimConfig::default()
        .with_policy(args.policy)
        .with_storage_latency(args.storage_latency)
        .with_user_latency(args.user_latency)
        .with_termination(args.termination);
    if let Some(horizon) = args.horizon {
        config = config.with_horizon(horizon);
    }

    let report = simulate_with(&workload, &config, |step| {
        if args.trace {
            println!("{step}");
        }
    })?;

    print!("{report}");
    if args.summary {
        print!("{}", report.summary());
    }
    Ok(())
}

fn generate_workload(args: GenerateArgs) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let config = GeneratorConfig {
        ticks: args.ticks,
        p_arrival: args.p_arrival,
        p_short: args.p_short,
        short_cpu: args.short_cpu,
        long_cpu: args.long_cpu,
        p_ssd: args.p_ssd,
        p_user: args.p_user,
        cores: args.cores,
        seed,
    };
    info!(seed, ticks = config.ticks, cores = config.cores, "Generating workload");

    print!("{}", bernoulli_workload(&config));
    Ok(())
}
