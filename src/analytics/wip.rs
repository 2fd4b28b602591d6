//! Work-in-progress snapshots over time

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::core::catalog::Catalog;
use crate::core::event::EventLog;

/// WIP counts at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct WipSnapshot {
    pub timestamp: DateTime<Utc>,

    /// In-progress case count per operation, in sequence order
    pub per_operation: Vec<(String, usize)>,

    pub total: usize,
}

/// Snapshot WIP at regular intervals from the first start to the last end.
///
/// A case counts as in progress at an operation when the snapshot instant
/// falls inside `[start, end)` of one of its events there.
pub fn wip_over_time(log: &EventLog, catalog: &Catalog, interval_minutes: u32) -> Vec<WipSnapshot> {
    let (Some(first), Some(last)) = (log.first_start(), log.last_end()) else {
        return Vec::new();
    };

    let step = Duration::minutes(interval_minutes.max(1) as i64);
    let mut snapshots = Vec::new();
    let mut at = first;

    while at <= last {
        let mut per_operation = Vec::with_capacity(catalog.sequence.len());
        let mut total = 0;

        for op_id in &catalog.sequence {
            let in_progress = log
                .events()
                .iter()
                .filter(|e| {
                    &e.operation_id == op_id && e.timestamp_start <= at && e.timestamp_end > at
                })
                .count();
            total += in_progress;
            per_operation.push((op_id.clone(), in_progress));
        }

        snapshots.push(WipSnapshot {
            timestamp: at,
            per_operation,
            total,
        });
        at = at + step;
    }

    snapshots
}
