//! CLI argument definitions using clap derive

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    analyze::AnalyzeArgs, catalog::CatalogArgs, report::ReportArgs, simulate::SimulateArgs,
};
use crate::core::config::SimulationConfig;

#[derive(Parser)]
#[command(name = "flowtwin")]
#[command(author, version, about = "Flowtwin process mining toolkit")]
#[command(
    long_about = "Simulates a manufacturing line as a discrete-event digital twin, then mines the event log for real flow, bottlenecks, rework sources, and optimization KPIs."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Flags shared by every command that runs the simulator.
#[derive(clap::Args, Clone, Debug)]
pub struct SimArgs {
    /// Number of cases to simulate
    #[arg(long, default_value_t = 500)]
    pub cases: usize,

    /// Random seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Simulation epoch (RFC 3339)
    #[arg(long, default_value = "2024-01-01T08:00:00Z")]
    pub start: DateTime<Utc>,

    /// Mean inter-arrival gap between cases, minutes
    #[arg(long, default_value_t = 30.0)]
    pub interarrival: f64,

    /// Catalog YAML file (defaults to the built-in six-operation chain)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

impl SimArgs {
    /// Build the run configuration these flags describe.
    pub fn to_config(&self, wip_interval_minutes: u32) -> SimulationConfig {
        SimulationConfig {
            num_cases: self.cases,
            seed: self.seed,
            start_date: self.start,
            mean_interarrival_minutes: self.interarrival,
            wip_interval_minutes,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the operations chain and theoretical minimum lead time
    Catalog(CatalogArgs),

    /// Run the simulator and export the event log
    Simulate(SimulateArgs),

    /// Discover real flow, WIP, bottlenecks, and rework sources
    Analyze(AnalyzeArgs),

    /// KPI summary with recommendations and projected gains
    Report(ReportArgs),
}
