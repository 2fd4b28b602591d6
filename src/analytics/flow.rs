//! Real-flow discovery - volumes, time statistics, and trace variants

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use super::{mean, median, round2, std_dev};
use crate::core::catalog::Catalog;
use crate::core::event::EventLog;

/// Event volume rollup for one operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationVolume {
    pub operation_id: String,
    pub total_events: usize,
    pub unique_cases: usize,
    pub rework_events: usize,
}

/// Timing rollup for one operation, minutes.
#[derive(Debug, Clone, Serialize)]
pub struct OperationTimeStats {
    pub operation_id: String,
    pub avg_cycle_time: f64,
    pub median_cycle_time: f64,
    pub std_cycle_time: f64,
    pub avg_wait_time: f64,
    pub median_wait_time: f64,
    pub max_wait_time: f64,
    pub avg_total_time: f64,
}

/// One distinct path through the sequence and how often it occurred.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessVariant {
    /// Operation ids joined with " -> "
    pub trace: String,
    pub count: usize,
    pub percentage: f64,
}

/// Everything flow discovery produces from one log.
#[derive(Debug, Clone, Serialize)]
pub struct FlowDiscovery {
    /// Per-operation volumes, in sequence order
    pub volumes: Vec<OperationVolume>,

    /// Per-operation time statistics, in sequence order
    pub time_stats: Vec<OperationTimeStats>,

    /// Distinct traces ranked by frequency
    pub variants: Vec<ProcessVariant>,

    /// Share of cases that followed the standard sequence exactly
    pub standard_flow_percentage: f64,
}

/// Discover the real process flow from the event log.
pub fn discover_flow(log: &EventLog, catalog: &Catalog) -> FlowDiscovery {
    let mut volumes = Vec::with_capacity(catalog.sequence.len());
    let mut time_stats = Vec::with_capacity(catalog.sequence.len());

    for op_id in &catalog.sequence {
        let events: Vec<_> = log
            .events()
            .iter()
            .filter(|e| &e.operation_id == op_id)
            .collect();

        let unique_cases = events
            .iter()
            .map(|e| e.case_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        volumes.push(OperationVolume {
            operation_id: op_id.clone(),
            total_events: events.len(),
            unique_cases,
            rework_events: events.iter().filter(|e| e.is_rework).count(),
        });

        let cycles: Vec<f64> = events.iter().map(|e| e.cycle_time_minutes).collect();
        let waits: Vec<f64> = events.iter().map(|e| e.wait_time_minutes).collect();
        let totals: Vec<f64> = events.iter().map(|e| e.total_time_minutes).collect();

        time_stats.push(OperationTimeStats {
            operation_id: op_id.clone(),
            avg_cycle_time: mean(&cycles),
            median_cycle_time: median(&cycles),
            std_cycle_time: std_dev(&cycles),
            avg_wait_time: mean(&waits),
            median_wait_time: median(&waits),
            max_wait_time: waits.iter().fold(0.0_f64, |a, &b| a.max(b)),
            avg_total_time: mean(&totals),
        });
    }

    // Distinct traces, ranked by frequency
    let by_case = log.by_case();
    let total_cases = by_case.len();
    let mut trace_counts: BTreeMap<String, usize> = BTreeMap::new();
    for events in by_case.values() {
        let trace = events
            .iter()
            .map(|e| e.operation_id.as_str())
            .collect::<Vec<_>>()
            .join(" -> ");
        *trace_counts.entry(trace).or_default() += 1;
    }

    let mut variants: Vec<ProcessVariant> = trace_counts
        .into_iter()
        .map(|(trace, count)| ProcessVariant {
            trace,
            count,
            percentage: if total_cases > 0 {
                round2(count as f64 / total_cases as f64 * 100.0)
            } else {
                0.0
            },
        })
        .collect();
    variants.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.trace.cmp(&b.trace)));

    let standard_trace = catalog.sequence.join(" -> ");
    let standard_cases = variants
        .iter()
        .find(|v| v.trace == standard_trace)
        .map(|v| v.count)
        .unwrap_or(0);
    let standard_flow_percentage = if total_cases > 0 {
        round2(standard_cases as f64 / total_cases as f64 * 100.0)
    } else {
        0.0
    };

    FlowDiscovery {
        volumes,
        time_stats,
        variants,
        standard_flow_percentage,
    }
}
