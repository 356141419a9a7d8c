//! rtsim — run real-time scheduling simulations from JSON task sets.

use std::path::PathBuf;
use std::thread;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rtsim::{workload, BlockPolicy, Discipline, Scenario, SimulationResult, Simulator, TaskDef};

/// Run real-time scheduling simulations from JSON task sets.
#[derive(Parser)]
#[command(name = "rtsim")]
struct Cli {
    /// Path to a JSON task-set file (array of descriptors, or an object
    /// with a "tasks" array). Omit to run the bundled default workload.
    workload: Option<PathBuf>,

    /// Canned workload name (mixed-periodic, resource-contention,
    /// overload, slack).
    #[arg(long, conflicts_with = "workload")]
    builtin: Option<String>,

    /// Scheduler discipline: rms, edf, hybrid, energy-hybrid.
    /// Unknown names fall back to edf.
    #[arg(short, long, default_value = "edf")]
    scheduler: String,

    /// Simulation horizon in ticks. Zero falls back to the default (200).
    #[arg(long, default_value_t = 200)]
    total_time: u64,

    /// Laxity threshold for the energy-hybrid DVFS governor.
    #[arg(long, default_value_t = 20.0)]
    laxity_threshold: f64,

    /// Retry selection among remaining candidates when the pick blocks on
    /// a resource. By default a blocked pick idles the whole tick.
    #[arg(long)]
    reselect_on_block: bool,

    /// Print trace events to stderr.
    #[arg(long)]
    dump_trace: bool,

    /// Emit the full result bundle as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Run every discipline on the same task set and compare metrics.
    #[arg(long, conflicts_with = "scheduler")]
    sweep: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let tasks: Vec<TaskDef> = match (&cli.workload, &cli.builtin) {
        (Some(path), _) => workload::load_tasks(path)?,
        (None, Some(name)) => match workload::by_name(name) {
            Some(tasks) => tasks,
            None => bail!(
                "unknown builtin workload {name:?}; available: {}",
                workload::BUILTIN_NAMES.join(", ")
            ),
        },
        (None, None) => workload::mixed_periodic(),
    };

    let block_policy = if cli.reselect_on_block {
        BlockPolicy::Reselect
    } else {
        BlockPolicy::IdleTick
    };
    let scenario = Scenario::builder()
        .tasks(tasks)
        .total_time(cli.total_time)
        .laxity_threshold(cli.laxity_threshold)
        .block_policy(block_policy)
        .build();

    if cli.sweep {
        return sweep(scenario, cli.json);
    }

    let discipline = Discipline::parse_lenient(&cli.scheduler);
    let result = Simulator::new(discipline).run(scenario);

    if cli.dump_trace {
        result.trace.dump();
    }
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("failed to serialize result")?
        );
    } else {
        result.metrics.print_summary();
    }
    Ok(())
}

/// Run all four disciplines on independent copies of the scenario, in
/// parallel, and print a side-by-side comparison. Each run owns its own
/// task-set copy, so the threads share nothing.
fn sweep(scenario: Scenario, json: bool) -> Result<()> {
    let results: Vec<SimulationResult> = thread::scope(|s| {
        let handles: Vec<_> = Discipline::ALL
            .iter()
            .map(|&d| {
                let scenario = scenario.clone();
                s.spawn(move || Simulator::new(d).run(scenario))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).context("failed to serialize results")?
        );
        return Ok(());
    }

    eprintln!("\n=== Discipline Sweep ===\n");
    eprintln!(
        "{:<15} {:>8} {:>7} {:>12} {:>7} {:>9}",
        "discipline", "energy", "miss%", "turnaround", "util%", "busy"
    );
    for r in &results {
        eprintln!(
            "{:<15} {:>8.1} {:>6.1}% {:>12.2} {:>6.1}% {:>9}",
            r.scheduler,
            r.metrics.total_energy,
            r.metrics.deadline_miss_ratio * 100.0,
            r.metrics.avg_turnaround,
            r.metrics.cpu_utilization * 100.0,
            r.metrics.cpu_busy_time,
        );
    }
    eprintln!();
    Ok(())
}
