//! Core module - catalog, simulator, event log, and aggregation

pub mod catalog;
pub mod config;
pub mod event;
pub mod leadtime;
pub mod sim;

pub use catalog::{Catalog, CatalogError, Stage};
pub use config::{default_start_date, SimulationConfig};
pub use event::{Event, EventLog, ExportError};
pub use leadtime::{case_lead_times, CaseSummary};
pub use sim::{SimulationError, Simulator};
