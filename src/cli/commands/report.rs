//! Optimization report - KPIs, recommendations, and projected gains

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::analytics::{
    discover_flow, estimate_gains, identify_bottlenecks, identify_rework_sources, overall_metrics,
    recommend, top_actions,
};
use crate::cli::helpers::load_catalog;
use crate::cli::{GlobalOpts, SimArgs};
use crate::core::leadtime::case_lead_times;
use crate::core::sim::Simulator;

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub sim: SimArgs,
}

pub fn run(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = load_catalog(args.sim.catalog.as_deref())?;
    let config = args.sim.to_config(60);

    let log = Simulator::new(&catalog, &config).run().into_diagnostic()?;
    let summaries = case_lead_times(&log);
    let flow = discover_flow(&log, &catalog);
    let bottlenecks = identify_bottlenecks(&log, &catalog);
    let rework = identify_rework_sources(&log, &catalog);
    let metrics = overall_metrics(&log, &summaries);

    let recommendations = recommend(&bottlenecks, &rework, &metrics, &flow);
    let gains = estimate_gains(&recommendations, &metrics, &catalog);
    let actions = top_actions(&recommendations);

    if !global.quiet {
        println!(
            "{} {} cases, {} events analyzed",
            style("✓").green(),
            metrics.total_cases,
            metrics.total_events
        );
        println!();
    }

    // Success KPIs
    println!("{}", style("Success KPIs").bold());
    let mut builder = Builder::default();
    builder.push_record(["Indicator", "Value"]);
    builder.push_record([
        "Current lead time".to_string(),
        format!("{:.2} h", gains.current_avg_lead_time_hours),
    ]);
    builder.push_record([
        "Estimated lead time after".to_string(),
        format!("{:.2} h", gains.estimated_new_lead_time_hours),
    ]);
    builder.push_record([
        "ΔLead time".to_string(),
        format!(
            "-{:.1}% ({:.2} h)",
            gains.delta_lead_time_pct, gains.delta_lead_time_hours
        ),
    ]);
    builder.push_record([
        "ΔWIP".to_string(),
        format!("-{:.1}%", gains.estimated_wip_reduction_pct),
    ]);
    builder.push_record([
        "Theoretical minimum".to_string(),
        format!("{:.2} h", gains.theoretical_minimum_hours),
    ]);
    builder.push_record([
        "Gap to theoretical (before)".to_string(),
        format!("+{:.1}%", gains.gap_to_theoretical_current_pct),
    ]);
    builder.push_record([
        "Gap to theoretical (after)".to_string(),
        format!("+{:.1}%", gains.gap_to_theoretical_after_pct),
    ]);
    builder.push_record([
        "Process efficiency".to_string(),
        format!("{:.1}%", metrics.process_efficiency_pct),
    ]);
    builder.push_record([
        "Rework rate".to_string(),
        format!("{:.1}%", metrics.rework_rate_pct),
    ]);
    println!("{}", builder.build().with(Style::markdown()));
    println!();

    // Recommendations
    println!("{}", style("Optimization recommendations").bold());
    if recommendations.is_empty() {
        println!("No improvement opportunities found at the configured thresholds.");
    } else {
        let mut builder = Builder::default();
        builder.push_record([
            "Priority",
            "Category",
            "Operation",
            "Issue",
            "Recommendation",
            "Est. Impact",
            "Confidence",
        ]);
        for rec in &recommendations {
            builder.push_record([
                rec.priority.to_string(),
                rec.category.to_string(),
                rec.operation.clone(),
                rec.issue.clone(),
                rec.recommendation.clone(),
                format!("-{:.1}%", rec.estimated_lead_time_reduction_pct),
                rec.confidence.to_string(),
            ]);
        }
        println!("{}", builder.build().with(Style::markdown()));
    }
    println!();

    // Top 3 actions
    println!("{}", style("Top 3 priority actions").bold());
    for action in &actions {
        println!(
            "{} {}. {} [{}]: {}",
            style("🎯").cyan(),
            action.rank,
            action.action,
            action.category,
            action.expected_impact
        );
    }

    Ok(())
}
