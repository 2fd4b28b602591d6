//! Simulation run configuration

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Default simulation epoch: 2024-01-01 08:00 UTC.
pub fn default_start_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
}

/// Parameters for one simulation run.
///
/// Everything the engine needs beyond the catalog lives here, so multiple
/// independent, reproducible runs can coexist in one process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of product cases to push through the line
    pub num_cases: usize,

    /// Seed for the run's random generator; a fixed seed reproduces an
    /// identical event log
    pub seed: u64,

    /// Simulation epoch; every workstation becomes available at this instant
    pub start_date: DateTime<Utc>,

    /// Mean of the exponential inter-arrival gap between cases, minutes
    pub mean_interarrival_minutes: f64,

    /// Granularity of downstream WIP snapshots, minutes (not used by the
    /// simulator itself)
    pub wip_interval_minutes: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_cases: 500,
            seed: 42,
            start_date: default_start_date(),
            mean_interarrival_minutes: 30.0,
            wip_interval_minutes: 60,
        }
    }
}
