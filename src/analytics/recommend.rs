//! Rule-based optimization recommendations and projected gains
//!
//! Inference over the bottleneck, rework, flow, and overall metrics:
//! each rule names an issue, an action, and an estimated lead-time impact.

use serde::Serialize;
use std::fmt;

use crate::analytics::bottleneck::{BottleneckAnalysis, BottleneckSeverity};
use crate::analytics::flow::FlowDiscovery;
use crate::analytics::metrics::OverallMetrics;
use crate::analytics::rework::ReworkSource;
use crate::core::catalog::Catalog;

/// How firmly the rule's estimate is grounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        };
        write!(f, "{}", s)
    }
}

/// Which lever the recommendation pulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationCategory {
    Capacity,
    Process,
    Quality,
    Flow,
    Efficiency,
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecommendationCategory::Capacity => "Capacity",
            RecommendationCategory::Process => "Process",
            RecommendationCategory::Quality => "Quality",
            RecommendationCategory::Flow => "Flow",
            RecommendationCategory::Efficiency => "Efficiency",
        };
        write!(f, "{}", s)
    }
}

/// One actionable improvement opportunity.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    /// 1 is most urgent
    pub priority: u8,
    pub category: RecommendationCategory,

    /// Target operation display name, or "All"
    pub operation: String,

    pub issue: String,
    pub recommendation: String,
    pub estimated_wait_reduction_min: f64,
    pub estimated_lead_time_reduction_pct: f64,
    pub confidence: Confidence,
}

/// Aggregated improvement projection across all recommendations.
#[derive(Debug, Clone, Serialize)]
pub struct PotentialGains {
    pub current_avg_lead_time_hours: f64,
    pub estimated_new_lead_time_hours: f64,
    pub delta_lead_time_hours: f64,
    pub delta_lead_time_pct: f64,

    /// Little's law: WIP scales with lead time at constant throughput
    pub estimated_wip_reduction_pct: f64,

    pub theoretical_minimum_hours: f64,
    pub gap_to_theoretical_current_pct: f64,
    pub gap_to_theoretical_after_pct: f64,
}

/// One of the top-priority actions, ready for the KPI summary.
#[derive(Debug, Clone, Serialize)]
pub struct TopAction {
    pub rank: usize,
    pub action: String,
    pub category: RecommendationCategory,
    pub target_operation: String,
    pub expected_impact: String,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percentage of the average lead time that `wait_reduction_min` represents.
fn lead_time_reduction_pct(wait_reduction_min: f64, metrics: &OverallMetrics) -> f64 {
    if metrics.avg_lead_time_hours > 0.0 {
        round1(wait_reduction_min / (metrics.avg_lead_time_hours * 60.0) * 100.0)
    } else {
        0.0
    }
}

/// Generate optimization recommendations, sorted by priority.
pub fn recommend(
    bottlenecks: &BottleneckAnalysis,
    rework: &[ReworkSource],
    metrics: &OverallMetrics,
    flow: &FlowDiscovery,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    // Capacity: critical bottlenecks want another workstation
    for op in &bottlenecks.operations {
        if op.severity != BottleneckSeverity::Critical {
            continue;
        }
        let stations = op.workstation_count as f64;
        let new_util = op.utilization_pct * stations / (stations + 1.0);
        let wait_reduction = if op.utilization_pct > 0.0 {
            round1(op.avg_wait_time * (1.0 - new_util / op.utilization_pct))
        } else {
            0.0
        };

        recommendations.push(Recommendation {
            priority: 1,
            category: RecommendationCategory::Capacity,
            operation: op.operation_name.clone(),
            issue: format!(
                "Critical bottleneck with {:.0}% utilization",
                op.utilization_pct
            ),
            recommendation: format!("Add 1 additional workstation to {}", op.operation_name),
            estimated_wait_reduction_min: wait_reduction,
            estimated_lead_time_reduction_pct: lead_time_reduction_pct(wait_reduction, metrics),
            confidence: Confidence::High,
        });
    }

    // Process: high bottlenecks want scheduling and setup attention
    for op in &bottlenecks.operations {
        if op.severity != BottleneckSeverity::High {
            continue;
        }
        let wait_reduction = round1(op.avg_wait_time * 0.3);
        recommendations.push(Recommendation {
            priority: 2,
            category: RecommendationCategory::Process,
            operation: op.operation_name.clone(),
            issue: format!("High wait-to-cycle ratio ({:.2})", op.wait_cycle_ratio),
            recommendation: format!(
                "Optimize scheduling and reduce setup time at {}",
                op.operation_name
            ),
            estimated_wait_reduction_min: wait_reduction,
            estimated_lead_time_reduction_pct: lead_time_reduction_pct(wait_reduction, metrics),
            confidence: Confidence::Medium,
        });
    }

    // Quality: rework sources above 3% are worth error-proofing
    for source in rework {
        if source.actual_rework_rate_pct <= 3.0 || source.rework_time_hours <= 0.0 {
            continue;
        }
        let cases = metrics.total_cases.max(1) as f64;
        let wait_reduction = round1(source.rework_time_hours * 60.0 * 0.5 / cases);
        recommendations.push(Recommendation {
            priority: 2,
            category: RecommendationCategory::Quality,
            operation: source.operation_name.clone(),
            issue: format!(
                "High rework rate ({:.1}%) causing {:.1}h of waste",
                source.actual_rework_rate_pct, source.rework_time_hours
            ),
            recommendation: format!(
                "Implement error-proofing (poka-yoke) at {}",
                source.operation_name
            ),
            estimated_wait_reduction_min: wait_reduction,
            estimated_lead_time_reduction_pct: lead_time_reduction_pct(wait_reduction, metrics),
            confidence: Confidence::Medium,
        });
    }

    // Flow conformance
    if flow.standard_flow_percentage < 90.0 {
        recommendations.push(Recommendation {
            priority: 3,
            category: RecommendationCategory::Flow,
            operation: "All".to_string(),
            issue: format!(
                "Low process conformance ({:.1}% follow standard path)",
                flow.standard_flow_percentage
            ),
            recommendation: "Implement standardized work instructions and training".to_string(),
            estimated_wait_reduction_min: round1(metrics.avg_wait_per_case_minutes * 0.1),
            estimated_lead_time_reduction_pct: 2.0,
            confidence: Confidence::Low,
        });
    }

    // Overall efficiency
    if metrics.process_efficiency_pct < 60.0 {
        recommendations.push(Recommendation {
            priority: 3,
            category: RecommendationCategory::Efficiency,
            operation: "All".to_string(),
            issue: format!(
                "Low process efficiency ({:.1}%)",
                metrics.process_efficiency_pct
            ),
            recommendation: "Implement lean manufacturing principles (5S, SMED)".to_string(),
            estimated_wait_reduction_min: round1(metrics.avg_wait_per_case_minutes * 0.2),
            estimated_lead_time_reduction_pct: 5.0,
            confidence: Confidence::Medium,
        });
    }

    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

/// Project the combined effect of every recommendation.
pub fn estimate_gains(
    recommendations: &[Recommendation],
    metrics: &OverallMetrics,
    catalog: &Catalog,
) -> PotentialGains {
    let total_reduction_pct: f64 = recommendations
        .iter()
        .map(|r| r.estimated_lead_time_reduction_pct)
        .sum();

    let current = metrics.avg_lead_time_hours;
    let estimated_new = current * (1.0 - total_reduction_pct / 100.0);

    let theoretical_hours = catalog.theoretical_lead_time_minutes() / 60.0;
    let gap = |value: f64| {
        if theoretical_hours > 0.0 {
            round1((value - theoretical_hours) / theoretical_hours * 100.0)
        } else {
            0.0
        }
    };

    PotentialGains {
        current_avg_lead_time_hours: super::round2(current),
        estimated_new_lead_time_hours: super::round2(estimated_new),
        delta_lead_time_hours: super::round2(current - estimated_new),
        delta_lead_time_pct: round1(total_reduction_pct),
        estimated_wip_reduction_pct: round1(total_reduction_pct),
        theoretical_minimum_hours: super::round2(theoretical_hours),
        gap_to_theoretical_current_pct: gap(current),
        gap_to_theoretical_after_pct: gap(estimated_new),
    }
}

/// The three highest-priority actions.
pub fn top_actions(recommendations: &[Recommendation]) -> Vec<TopAction> {
    recommendations
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, rec)| TopAction {
            rank: i + 1,
            action: rec.recommendation.clone(),
            category: rec.category,
            target_operation: rec.operation.clone(),
            expected_impact: format!(
                "{:.1}% lead time reduction",
                rec.estimated_lead_time_reduction_pct
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::bottleneck::identify_bottlenecks;
    use crate::analytics::flow::discover_flow;
    use crate::analytics::metrics::overall_metrics;
    use crate::analytics::rework::identify_rework_sources;
    use crate::core::config::SimulationConfig;
    use crate::core::leadtime::case_lead_times;
    use crate::core::sim::Simulator;

    fn full_analysis(num_cases: usize) -> (Catalog, Vec<Recommendation>, OverallMetrics) {
        let catalog = Catalog::default();
        let config = SimulationConfig {
            num_cases,
            ..SimulationConfig::default()
        };
        let log = Simulator::new(&catalog, &config).run().unwrap();
        let summaries = case_lead_times(&log);
        let metrics = overall_metrics(&log, &summaries);
        let recs = recommend(
            &identify_bottlenecks(&log, &catalog),
            &identify_rework_sources(&log, &catalog),
            &metrics,
            &discover_flow(&log, &catalog),
        );
        (catalog, recs, metrics)
    }

    #[test]
    fn test_overloaded_line_yields_capacity_recommendation() {
        let (_, recs, _) = full_analysis(300);

        assert!(!recs.is_empty());
        // Heat treatment saturates under this load; the top recommendation
        // must be capacity at priority 1
        assert_eq!(recs[0].priority, 1);
        assert_eq!(recs[0].category, RecommendationCategory::Capacity);
        assert!(recs[0].recommendation.contains("Heat Treatment"));

        // sorted by priority
        for pair in recs.windows(2) {
            assert!(pair[0].priority <= pair[1].priority);
        }
    }

    #[test]
    fn test_gains_aggregate_reduction_percentages() {
        let (catalog, recs, metrics) = full_analysis(200);
        let gains = estimate_gains(&recs, &metrics, &catalog);

        let expected_pct: f64 = recs
            .iter()
            .map(|r| r.estimated_lead_time_reduction_pct)
            .sum();
        assert!((gains.delta_lead_time_pct - round1(expected_pct)).abs() < 0.1);
        assert_eq!(gains.estimated_wip_reduction_pct, gains.delta_lead_time_pct);
        assert!(gains.estimated_new_lead_time_hours <= gains.current_avg_lead_time_hours);
        assert_eq!(gains.theoretical_minimum_hours, 4.52);
        assert!(gains.gap_to_theoretical_after_pct <= gains.gap_to_theoretical_current_pct);
    }

    #[test]
    fn test_top_actions_capped_at_three() {
        let (_, recs, _) = full_analysis(300);
        let actions = top_actions(&recs);

        assert!(actions.len() <= 3);
        for (i, action) in actions.iter().enumerate() {
            assert_eq!(action.rank, i + 1);
            assert!(action.expected_impact.ends_with("lead time reduction"));
        }
    }
}
