//! Queue-length statistics per operation

use serde::Serialize;

use super::{mean, round2};
use crate::core::catalog::Catalog;
use crate::core::event::EventLog;

/// Waits shorter than this are treated as incidental, not queueing.
const QUEUE_THRESHOLD_MINUTES: f64 = 5.0;

/// Queueing pressure in front of one operation.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
    pub operation_id: String,
    pub operation_name: String,
    pub avg_wait_time: f64,
    pub max_wait_time: f64,

    /// Visits that waited longer than the queue threshold
    pub cases_with_wait: usize,

    /// Share of visits that waited longer than the threshold, percent
    pub pct_cases_waiting: f64,
}

/// Measure the queue in front of every operation in the sequence.
pub fn queue_lengths(log: &EventLog, catalog: &Catalog) -> Vec<QueueStats> {
    let mut stats = Vec::with_capacity(catalog.sequence.len());

    for op_id in &catalog.sequence {
        let Ok(stage) = catalog.stage(op_id) else {
            continue;
        };
        let waits: Vec<f64> = log
            .events()
            .iter()
            .filter(|e| &e.operation_id == op_id)
            .map(|e| e.wait_time_minutes)
            .collect();

        let cases_with_wait = waits
            .iter()
            .filter(|&&w| w > QUEUE_THRESHOLD_MINUTES)
            .count();
        let pct_cases_waiting = if waits.is_empty() {
            0.0
        } else {
            cases_with_wait as f64 / waits.len() as f64 * 100.0
        };

        stats.push(QueueStats {
            operation_id: op_id.clone(),
            operation_name: stage.name.clone(),
            avg_wait_time: round2(mean(&waits)),
            max_wait_time: round2(waits.iter().fold(0.0_f64, |a, &b| a.max(b))),
            cases_with_wait,
            pct_cases_waiting: round2(pct_cases_waiting),
        });
    }

    stats
}
