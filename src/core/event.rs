//! Event log - the structured trace emitted by the simulator
//!
//! One event per stage visit, ordered by start instant then case id. The CSV
//! column set and order are a stable interface consumed by downstream
//! analytics and must not be reordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// A single stage visit by a case.
///
/// Field order doubles as the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Case identifier (e.g. "CASE-0042")
    pub case_id: String,

    /// Operation display name
    pub activity: String,

    /// Secondary (French) display name
    pub activity_fr: String,

    /// Operation identifier
    pub operation_id: String,

    /// Instant the operation started
    pub timestamp_start: DateTime<Utc>,

    /// Instant the operation ended
    pub timestamp_end: DateTime<Utc>,

    /// Workstation slot label (e.g. "OP3_WS1")
    pub resource: String,

    /// Whether this visit was a repeat caused by rework
    pub is_rework: bool,

    /// How many times this case has visited this operation, including now
    pub rework_count: u32,

    /// Minutes spent waiting for a free workstation
    pub wait_time_minutes: f64,

    /// Minutes of actual processing
    pub cycle_time_minutes: f64,

    /// Minutes of fixed setup
    pub setup_time_minutes: f64,

    /// Cycle plus setup, minutes
    pub total_time_minutes: f64,

    /// Whether inspection detected a latent defect during this visit
    pub defect_detected: bool,

    /// Elapsed minutes between start and end
    pub duration_minutes: f64,
}

/// Errors raised while exporting an event log.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// The ordered collection of all events produced by one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Build a log from raw events, sorting them into canonical order
    /// (start instant, then case id).
    pub fn from_events(mut events: Vec<Event>) -> Self {
        events.sort_by(|a, b| {
            a.timestamp_start
                .cmp(&b.timestamp_start)
                .then_with(|| a.case_id.cmp(&b.case_id))
        });
        Self { events }
    }

    /// All events in canonical order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of distinct cases in the log.
    pub fn case_count(&self) -> usize {
        self.events
            .iter()
            .map(|e| e.case_id.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len()
    }

    /// Events grouped by case id, each group in case-local (chronological)
    /// order.
    pub fn by_case(&self) -> BTreeMap<&str, Vec<&Event>> {
        let mut groups: BTreeMap<&str, Vec<&Event>> = BTreeMap::new();
        for event in &self.events {
            groups.entry(event.case_id.as_str()).or_default().push(event);
        }
        groups
    }

    /// Earliest start instant in the log.
    pub fn first_start(&self) -> Option<DateTime<Utc>> {
        self.events.iter().map(|e| e.timestamp_start).min()
    }

    /// Latest end instant in the log.
    pub fn last_end(&self) -> Option<DateTime<Utc>> {
        self.events.iter().map(|e| e.timestamp_end).max()
    }

    /// Write the log as CSV with the canonical column order.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for event in &self.events {
            wtr.serialize(event)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Export the log to a CSV file.
    pub fn export_csv(&self, path: &Path) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(case_id: &str, op: &str, start_min: i64, end_min: i64) -> Event {
        let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        Event {
            case_id: case_id.to_string(),
            activity: op.to_string(),
            activity_fr: op.to_string(),
            operation_id: op.to_string(),
            timestamp_start: epoch + chrono::Duration::minutes(start_min),
            timestamp_end: epoch + chrono::Duration::minutes(end_min),
            resource: format!("{}_WS1", op),
            is_rework: false,
            rework_count: 1,
            wait_time_minutes: 0.0,
            cycle_time_minutes: (end_min - start_min) as f64,
            setup_time_minutes: 0.0,
            total_time_minutes: (end_min - start_min) as f64,
            defect_detected: false,
            duration_minutes: (end_min - start_min) as f64,
        }
    }

    #[test]
    fn test_canonical_ordering() {
        let log = EventLog::from_events(vec![
            event("CASE-0002", "OP1", 10, 20),
            event("CASE-0001", "OP1", 0, 10),
            event("CASE-0001", "OP2", 10, 30),
        ]);

        let ids: Vec<_> = log
            .events()
            .iter()
            .map(|e| (e.case_id.as_str(), e.operation_id.as_str()))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("CASE-0001", "OP1"),
                ("CASE-0001", "OP2"),
                ("CASE-0002", "OP1"),
            ]
        );
    }

    #[test]
    fn test_tie_breaks_on_case_id() {
        let log = EventLog::from_events(vec![
            event("CASE-0002", "OP1", 0, 10),
            event("CASE-0001", "OP1", 0, 10),
        ]);
        assert_eq!(log.events()[0].case_id, "CASE-0001");
    }

    #[test]
    fn test_by_case_groups_in_order() {
        let log = EventLog::from_events(vec![
            event("CASE-0001", "OP2", 10, 30),
            event("CASE-0002", "OP1", 5, 15),
            event("CASE-0001", "OP1", 0, 10),
        ]);

        let groups = log.by_case();
        assert_eq!(groups.len(), 2);
        let first = &groups["CASE-0001"];
        assert_eq!(first[0].operation_id, "OP1");
        assert_eq!(first[1].operation_id, "OP2");
        assert_eq!(log.case_count(), 2);
    }

    #[test]
    fn test_csv_header_order() {
        let log = EventLog::from_events(vec![event("CASE-0001", "OP1", 0, 10)]);
        let mut buf = Vec::new();
        log.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "case_id,activity,activity_fr,operation_id,timestamp_start,timestamp_end,\
             resource,is_rework,rework_count,wait_time_minutes,cycle_time_minutes,\
             setup_time_minutes,total_time_minutes,defect_detected,duration_minutes"
        );
        // one header plus one row
        assert_eq!(text.lines().count(), 2);
    }
}
