//! Event scheduler CLI - event throughput benchmark
//!
//! Runs the self-rescheduling workload for a given number of events and
//! reports the wall-clock time it took.

mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "events")]
#[command(about = "Baseline event throughput benchmark")]
struct Cli {
    #[command(flatten)]
    args: commands::BenchmarkArgs,

    /// Log scheduler activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    commands::run_benchmark(cli.args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_pooling_argument_parses() {
        let cli = Cli::try_parse_from(["events", "100", "-1"]).unwrap();
        assert_eq!(cli.args.events, 100);
        assert_eq!(cli.args.pooling, -1);
        assert!(commands::build_config(&cli.args).unwrap().pooling);
    }

    #[test]
    fn test_pooling_defaults_to_off() {
        let cli = Cli::try_parse_from(["events", "100"]).unwrap();
        assert_eq!(cli.args.pooling, 0);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_calendar_width_needs_bins() {
        assert!(Cli::try_parse_from(["events", "100", "--calendar-width", "64"]).is_err());
        let cli = Cli::try_parse_from([
            "events",
            "100",
            "1",
            "--calendar-width",
            "64",
            "--calendar-bins",
            "8",
        ])
        .unwrap();
        assert_eq!(cli.args.calendar_bins, Some(8));
    }
}
