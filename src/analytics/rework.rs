//! Rework source attribution
//!
//! Compares each operation's configured defect rate with the rework traffic
//! it actually generated, and prices the time lost to repeat passes.

use serde::Serialize;

use super::round2;
use crate::core::catalog::Catalog;
use crate::core::event::EventLog;

/// Rework statistics for one operation.
#[derive(Debug, Clone, Serialize)]
pub struct ReworkSource {
    pub operation_id: String,
    pub operation_name: String,

    /// Configured defect probability, percent
    pub expected_defect_rate_pct: f64,

    pub total_passes: usize,
    pub first_passes: usize,
    pub rework_passes: usize,

    /// Rework passes per first pass, percent
    pub actual_rework_rate_pct: f64,

    /// Minutes spent on repeat passes
    pub rework_time_minutes: f64,
    pub rework_time_hours: f64,
}

/// Attribute rework traffic to the operations that absorbed it.
pub fn identify_rework_sources(log: &EventLog, catalog: &Catalog) -> Vec<ReworkSource> {
    let mut sources = Vec::with_capacity(catalog.sequence.len());

    for op_id in &catalog.sequence {
        let Ok(stage) = catalog.stage(op_id) else {
            continue;
        };
        let events: Vec<_> = log
            .events()
            .iter()
            .filter(|e| &e.operation_id == op_id)
            .collect();

        let total_passes = events.len();
        let first_passes = events.iter().filter(|e| e.rework_count == 1).count();
        let rework_passes = events.iter().filter(|e| e.is_rework).count();

        let actual_rework_rate_pct = if first_passes > 0 {
            rework_passes as f64 / first_passes as f64 * 100.0
        } else {
            0.0
        };

        let rework_time_minutes: f64 = events
            .iter()
            .filter(|e| e.is_rework)
            .map(|e| e.total_time_minutes)
            .sum();

        sources.push(ReworkSource {
            operation_id: op_id.clone(),
            operation_name: stage.name.clone(),
            expected_defect_rate_pct: stage.defect_rate * 100.0,
            total_passes,
            first_passes,
            rework_passes,
            actual_rework_rate_pct: round2(actual_rework_rate_pct),
            rework_time_minutes: round2(rework_time_minutes),
            rework_time_hours: round2(rework_time_minutes / 60.0),
        });
    }

    sources
}
