//! Overall process metrics

use serde::Serialize;

use super::{mean, median, round2, std_dev};
use crate::core::event::EventLog;
use crate::core::leadtime::CaseSummary;

/// Whole-process rollup across all cases.
#[derive(Debug, Clone, Serialize)]
pub struct OverallMetrics {
    pub avg_lead_time_hours: f64,
    pub median_lead_time_hours: f64,
    pub min_lead_time_hours: f64,
    pub max_lead_time_hours: f64,
    pub std_lead_time_hours: f64,

    pub total_cases: usize,
    pub total_events: usize,

    pub total_rework_events: usize,
    pub rework_rate_pct: f64,

    pub total_wait_time_hours: f64,
    pub avg_wait_per_case_minutes: f64,

    /// Value-add share of value-add + wait + setup, percent
    pub process_efficiency_pct: f64,
}

/// Compute the whole-process metrics from the log and per-case summaries.
pub fn overall_metrics(log: &EventLog, summaries: &[CaseSummary]) -> OverallMetrics {
    let lead_hours: Vec<f64> = summaries.iter().map(|s| s.lead_time_hours).collect();

    let total_rework_events = log.events().iter().filter(|e| e.is_rework).count();
    let rework_rate_pct = if log.len() > 0 {
        total_rework_events as f64 / log.len() as f64 * 100.0
    } else {
        0.0
    };

    let total_wait: f64 = log.events().iter().map(|e| e.wait_time_minutes).sum();
    let wait_per_case: Vec<f64> = summaries.iter().map(|s| s.total_wait_time).collect();

    let value_add: f64 = log.events().iter().map(|e| e.cycle_time_minutes).sum();
    let setup: f64 = log.events().iter().map(|e| e.setup_time_minutes).sum();
    let elapsed = value_add + total_wait + setup;
    let process_efficiency_pct = if elapsed > 0.0 {
        value_add / elapsed * 100.0
    } else {
        0.0
    };

    let min_lead = if lead_hours.is_empty() {
        0.0
    } else {
        lead_hours.iter().fold(f64::INFINITY, |a, &b| a.min(b))
    };

    OverallMetrics {
        avg_lead_time_hours: round2(mean(&lead_hours)),
        median_lead_time_hours: round2(median(&lead_hours)),
        min_lead_time_hours: round2(min_lead),
        max_lead_time_hours: round2(lead_hours.iter().fold(0.0_f64, |a, &b| a.max(b))),
        std_lead_time_hours: round2(std_dev(&lead_hours)),
        total_cases: summaries.len(),
        total_events: log.len(),
        total_rework_events,
        rework_rate_pct: round2(rework_rate_pct),
        total_wait_time_hours: round2(total_wait / 60.0),
        avg_wait_per_case_minutes: round2(mean(&wait_per_case)),
        process_efficiency_pct: round2(process_efficiency_pct),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Catalog;
    use crate::core::config::SimulationConfig;
    use crate::core::leadtime::case_lead_times;
    use crate::core::sim::Simulator;

    fn analyze(num_cases: usize, seed: u64) -> OverallMetrics {
        let catalog = Catalog::default();
        let config = SimulationConfig {
            num_cases,
            seed,
            ..SimulationConfig::default()
        };
        let log = Simulator::new(&catalog, &config).run().unwrap();
        let summaries = case_lead_times(&log);
        overall_metrics(&log, &summaries)
    }

    #[test]
    fn test_counts_and_bounds() {
        let metrics = analyze(100, 42);

        assert_eq!(metrics.total_cases, 100);
        assert!(metrics.total_events >= 600);
        assert!(metrics.min_lead_time_hours <= metrics.median_lead_time_hours);
        assert!(metrics.median_lead_time_hours <= metrics.max_lead_time_hours);
        assert!(metrics.rework_rate_pct >= 0.0 && metrics.rework_rate_pct <= 100.0);
        assert!(metrics.process_efficiency_pct > 0.0 && metrics.process_efficiency_pct <= 100.0);
    }

    #[test]
    fn test_lead_time_floor() {
        let metrics = analyze(50, 1);
        // Even with no queueing a case needs the theoretical minimum
        let theoretical_hours = Catalog::default().theoretical_lead_time_minutes() / 60.0;
        assert!(metrics.max_lead_time_hours >= metrics.avg_lead_time_hours);
        assert!(metrics.avg_lead_time_hours > theoretical_hours * 0.5);
    }

    #[test]
    fn test_empty_inputs_do_not_divide_by_zero() {
        let log = EventLog::default();
        let metrics = overall_metrics(&log, &[]);
        assert_eq!(metrics.total_cases, 0);
        assert_eq!(metrics.total_events, 0);
        assert_eq!(metrics.rework_rate_pct, 0.0);
        assert_eq!(metrics.process_efficiency_pct, 0.0);
    }
}
