//! Analytics over the simulated event log
//!
//! Everything here is a pure reduction: the log and catalog come in,
//! tabular statistics come out. Nothing mutates simulator state.

pub mod bottleneck;
pub mod flow;
pub mod metrics;
pub mod queue;
pub mod recommend;
pub mod rework;
pub mod wip;

pub use bottleneck::{
    identify_bottlenecks, BottleneckAnalysis, BottleneckSeverity, OperationBottleneck,
};
pub use flow::{discover_flow, FlowDiscovery, OperationTimeStats, OperationVolume, ProcessVariant};
pub use metrics::{overall_metrics, OverallMetrics};
pub use queue::{queue_lengths, QueueStats};
pub use recommend::{
    estimate_gains, recommend, top_actions, Confidence, PotentialGains, Recommendation,
    RecommendationCategory, TopAction,
};
pub use rework::{identify_rework_sources, ReworkSource};
pub use wip::{wip_over_time, WipSnapshot};

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
