//! CLI command implementation

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use event_scheduler_core::workload::run_self_rescheduling;
use event_scheduler_core::{QueueKind, RunReport, SchedulerConfig, TieBreak};
use tracing::info;

/// Benchmark arguments
#[derive(Args, Debug)]
pub struct BenchmarkArgs {
    /// Number of events; the terminal event fires at this time
    pub events: u64,

    /// Nonzero recycles event records through a pool
    #[arg(default_value_t = 0, allow_negative_numbers = true)]
    pub pooling: i64,

    /// JSON scheduler configuration (positional arguments override its
    /// end time and pooling flag)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Idle records retained by the pool
    #[arg(long)]
    pub pool_capacity: Option<usize>,

    /// Hold pending events in a calendar queue spanning this many ticks
    #[arg(long, requires = "calendar_bins")]
    pub calendar_width: Option<u64>,

    /// Number of heap bins in the calendar queue
    #[arg(long, requires = "calendar_width")]
    pub calendar_bins: Option<usize>,

    /// Compare on timestamp only, without the insertion-order tie-break
    #[arg(long)]
    pub unordered_ties: bool,

    /// Print the full run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Build the scheduler configuration for a benchmark run
pub fn build_config(args: &BenchmarkArgs) -> anyhow::Result<SchedulerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SchedulerConfig::from_json_str(&json)?
        }
        None => SchedulerConfig::default(),
    };

    config.end_time = args.events;
    config.pooling = args.pooling != 0;
    if let Some(capacity) = args.pool_capacity {
        config.pool_capacity = capacity;
    }
    if args.unordered_ties {
        config.tie_break = TieBreak::Unordered;
    }
    if let (Some(width), Some(bins)) = (args.calendar_width, args.calendar_bins) {
        config.queue = QueueKind::Calendar { width, bins };
    }

    config.validate()?;
    Ok(config)
}

/// Run the self-rescheduling benchmark and print the result
///
/// # Errors
/// Returns an error if the configuration cannot be read or is invalid
pub fn run_benchmark(args: BenchmarkArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    info!(?config, "running benchmark");

    let report = run_self_rescheduling(config)?;
    print_report(&report, args.json)
}

fn print_report(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("time in ms: {:.0}", report.elapsed_ms);
    }
    Ok(())
}
