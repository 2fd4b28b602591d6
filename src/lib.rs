//! Flowtwin: process mining for manufacturing digital twins
//!
//! Simulates a multi-stage manufacturing line as a discrete-event digital
//! twin, then mines the resulting event log for real flow, bottlenecks, and
//! rework, producing an optimization report with projected KPIs.

pub mod analytics;
pub mod cli;
pub mod core;
