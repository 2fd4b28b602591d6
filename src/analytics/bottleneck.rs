//! Bottleneck identification and severity scoring
//!
//! Bottleneck indicators: wait time dominating cycle time, extreme maximum
//! waits, and high workstation utilization.

use serde::Serialize;
use std::fmt;

use super::{mean, round2};
use crate::core::catalog::Catalog;
use crate::core::event::EventLog;

/// Severity ladder, ordered so that `Critical` sorts highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum BottleneckSeverity {
    None,
    Medium,
    High,
    Critical,
}

impl fmt::Display for BottleneckSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BottleneckSeverity::None => "None",
            BottleneckSeverity::Medium => "Medium",
            BottleneckSeverity::High => "High",
            BottleneckSeverity::Critical => "Critical",
        };
        write!(f, "{}", s)
    }
}

/// Bottleneck scoring for one operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationBottleneck {
    pub operation_id: String,
    pub operation_name: String,
    pub operation_name_fr: String,
    pub avg_wait_time: f64,
    pub avg_cycle_time: f64,
    pub wait_cycle_ratio: f64,
    pub max_wait_time: f64,
    pub utilization_pct: f64,
    pub workstation_count: usize,
    pub is_bottleneck: bool,
    pub severity: BottleneckSeverity,
    pub reasons: Vec<String>,
}

/// Per-operation bottleneck scores, sorted by severity (worst first).
#[derive(Debug, Clone, Serialize)]
pub struct BottleneckAnalysis {
    pub operations: Vec<OperationBottleneck>,
}

impl BottleneckAnalysis {
    /// Names of operations scored `Critical`.
    pub fn critical_names(&self) -> Vec<&str> {
        self.names_at(BottleneckSeverity::Critical)
    }

    /// Names of operations scored `High`.
    pub fn high_names(&self) -> Vec<&str> {
        self.names_at(BottleneckSeverity::High)
    }

    fn names_at(&self, severity: BottleneckSeverity) -> Vec<&str> {
        self.operations
            .iter()
            .filter(|op| op.severity == severity)
            .map(|op| op.operation_name.as_str())
            .collect()
    }
}

/// Score every operation in the sequence for bottleneck pressure.
pub fn identify_bottlenecks(log: &EventLog, catalog: &Catalog) -> BottleneckAnalysis {
    let mut operations = Vec::with_capacity(catalog.sequence.len());

    for op_id in &catalog.sequence {
        let Ok(stage) = catalog.stage(op_id) else {
            continue;
        };
        let events: Vec<_> = log
            .events()
            .iter()
            .filter(|e| &e.operation_id == op_id)
            .collect();

        let waits: Vec<f64> = events.iter().map(|e| e.wait_time_minutes).collect();
        let cycles: Vec<f64> = events.iter().map(|e| e.cycle_time_minutes).collect();

        let avg_wait = mean(&waits);
        let avg_cycle = mean(&cycles);
        let max_wait = waits.iter().fold(0.0_f64, |a, &b| a.max(b));

        let wait_cycle_ratio = if avg_cycle > 0.0 {
            avg_wait / avg_cycle
        } else {
            0.0
        };

        // Utilization estimate: busy minutes over available station-minutes
        let busy: f64 = events.iter().map(|e| e.total_time_minutes).sum();
        let span = match (
            events.iter().map(|e| e.timestamp_start).min(),
            events.iter().map(|e| e.timestamp_end).max(),
        ) {
            (Some(first), Some(last)) => (last - first).num_milliseconds() as f64 / 60_000.0,
            _ => 0.0,
        };
        let utilization_pct = if span > 0.0 {
            busy / (span * stage.workstation_count as f64) * 100.0
        } else {
            0.0
        };

        let mut reasons = Vec::new();
        if wait_cycle_ratio > 1.0 {
            reasons.push(format!(
                "Wait time ({:.1}min) exceeds cycle time ({:.1}min)",
                avg_wait, avg_cycle
            ));
        }
        if max_wait > avg_cycle * 3.0 {
            reasons.push(format!("Max wait ({:.1}min) is 3x+ cycle time", max_wait));
        }
        if utilization_pct > 85.0 {
            reasons.push(format!("High utilization ({:.1}%)", utilization_pct));
        }

        let is_bottleneck = !reasons.is_empty();
        let severity = if !is_bottleneck {
            BottleneckSeverity::None
        } else if wait_cycle_ratio > 2.0 || utilization_pct > 95.0 {
            BottleneckSeverity::Critical
        } else if wait_cycle_ratio > 1.0 || utilization_pct > 85.0 {
            BottleneckSeverity::High
        } else {
            BottleneckSeverity::Medium
        };

        operations.push(OperationBottleneck {
            operation_id: op_id.clone(),
            operation_name: stage.name.clone(),
            operation_name_fr: stage.name_fr.clone(),
            avg_wait_time: round2(avg_wait),
            avg_cycle_time: round2(avg_cycle),
            wait_cycle_ratio: (wait_cycle_ratio * 1000.0).round() / 1000.0,
            max_wait_time: round2(max_wait),
            utilization_pct: round2(utilization_pct),
            workstation_count: stage.workstation_count,
            is_bottleneck,
            severity,
            reasons,
        });
    }

    // Worst first; stable sort keeps sequence order within a severity band
    operations.sort_by(|a, b| b.severity.cmp(&a.severity));

    BottleneckAnalysis { operations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::sim::Simulator;

    #[test]
    fn test_single_station_stage_is_the_worst_bottleneck() {
        let catalog = Catalog::default();
        let config = SimulationConfig {
            num_cases: 200,
            ..SimulationConfig::default()
        };
        let log = Simulator::new(&catalog, &config).run().unwrap();
        let analysis = identify_bottlenecks(&log, &catalog);

        assert_eq!(analysis.operations.len(), catalog.sequence.len());
        // Heat treatment: one station, 105min of work per ~30min arrival gap
        assert_eq!(analysis.operations[0].operation_id, "OP3");
        assert_eq!(analysis.operations[0].severity, BottleneckSeverity::Critical);
        assert!(!analysis.operations[0].reasons.is_empty());
        assert!(analysis
            .critical_names()
            .contains(&"Heat Treatment"));
    }

    #[test]
    fn test_sorted_by_severity_descending() {
        let catalog = Catalog::default();
        let config = SimulationConfig {
            num_cases: 150,
            seed: 5,
            ..SimulationConfig::default()
        };
        let log = Simulator::new(&catalog, &config).run().unwrap();
        let analysis = identify_bottlenecks(&log, &catalog);

        for pair in analysis.operations.windows(2) {
            assert!(pair[0].severity >= pair[1].severity);
        }
    }

    #[test]
    fn test_non_bottleneck_has_no_reasons() {
        let catalog = Catalog::default();
        let config = SimulationConfig {
            num_cases: 100,
            ..SimulationConfig::default()
        };
        let log = Simulator::new(&catalog, &config).run().unwrap();
        let analysis = identify_bottlenecks(&log, &catalog);

        for op in &analysis.operations {
            assert_eq!(op.is_bottleneck, !op.reasons.is_empty());
            if op.severity == BottleneckSeverity::None {
                assert!(op.reasons.is_empty());
            }
        }
    }
}
