//! Flow discovery, WIP, bottleneck, and rework analysis

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::analytics::{
    discover_flow, identify_bottlenecks, identify_rework_sources, overall_metrics, queue_lengths,
    wip_over_time,
};
use crate::cli::helpers::{load_catalog, truncate_str};
use crate::cli::{GlobalOpts, SimArgs};
use crate::core::leadtime::case_lead_times;
use crate::core::sim::Simulator;

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub sim: SimArgs,

    /// WIP snapshot interval, minutes
    #[arg(long, default_value_t = 60)]
    pub interval: u32,
}

pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = load_catalog(args.sim.catalog.as_deref())?;
    let config = args.sim.to_config(args.interval);

    let log = Simulator::new(&catalog, &config).run().into_diagnostic()?;
    let summaries = case_lead_times(&log);
    let flow = discover_flow(&log, &catalog);
    let queues = queue_lengths(&log, &catalog);
    let bottlenecks = identify_bottlenecks(&log, &catalog);
    let rework = identify_rework_sources(&log, &catalog);
    let metrics = overall_metrics(&log, &summaries);
    let wip = wip_over_time(&log, &catalog, config.wip_interval_minutes);

    if !global.quiet {
        println!(
            "{} Analyzed {} events across {} cases",
            style("✓").green(),
            log.len(),
            log.case_count()
        );
        println!();
    }

    // Volumes
    println!("{}", style("Volumes per operation").bold());
    let mut builder = Builder::default();
    builder.push_record(["Operation", "Events", "Cases", "Rework Events"]);
    for volume in &flow.volumes {
        builder.push_record([
            volume.operation_id.clone(),
            volume.total_events.to_string(),
            volume.unique_cases.to_string(),
            volume.rework_events.to_string(),
        ]);
    }
    println!("{}", builder.build().with(Style::markdown()));
    println!();

    // Time statistics
    println!("{}", style("Time statistics per operation (minutes)").bold());
    let mut builder = Builder::default();
    builder.push_record(["Operation", "Avg Cycle", "Avg Wait", "Median Wait", "Max Wait"]);
    for stats in &flow.time_stats {
        builder.push_record([
            stats.operation_id.clone(),
            format!("{:.1}", stats.avg_cycle_time),
            format!("{:.1}", stats.avg_wait_time),
            format!("{:.1}", stats.median_wait_time),
            format!("{:.1}", stats.max_wait_time),
        ]);
    }
    println!("{}", builder.build().with(Style::markdown()));
    println!();

    println!(
        "Standard flow conformance: {:.1}% ({} variants observed)",
        flow.standard_flow_percentage,
        flow.variants.len()
    );
    if global.verbose {
        for variant in flow.variants.iter().take(5) {
            println!(
                "  {:>5.1}%  {}",
                variant.percentage,
                truncate_str(&variant.trace, 90)
            );
        }
    }
    println!();

    // WIP
    let peak = wip.iter().map(|s| s.total).max().unwrap_or(0);
    let avg = if wip.is_empty() {
        0.0
    } else {
        wip.iter().map(|s| s.total).sum::<usize>() as f64 / wip.len() as f64
    };
    println!(
        "WIP ({}-minute snapshots): peak {}, average {:.1}",
        config.wip_interval_minutes, peak, avg
    );
    println!();

    // Queues
    println!("{}", style("Queue lengths").bold());
    let mut builder = Builder::default();
    builder.push_record(["Operation", "Avg Wait", "Max Wait", "Visits Queued", "% Queued"]);
    for queue in &queues {
        builder.push_record([
            queue.operation_name.clone(),
            format!("{:.1}", queue.avg_wait_time),
            format!("{:.1}", queue.max_wait_time),
            queue.cases_with_wait.to_string(),
            format!("{:.1}%", queue.pct_cases_waiting),
        ]);
    }
    println!("{}", builder.build().with(Style::markdown()));
    println!();

    // Bottlenecks
    println!("{}", style("Bottleneck analysis").bold());
    let mut builder = Builder::default();
    builder.push_record([
        "Operation",
        "Wait/Cycle",
        "Utilization",
        "Stations",
        "Severity",
        "Causes",
    ]);
    for op in &bottlenecks.operations {
        builder.push_record([
            op.operation_name.clone(),
            format!("{:.2}", op.wait_cycle_ratio),
            format!("{:.0}%", op.utilization_pct),
            op.workstation_count.to_string(),
            op.severity.to_string(),
            truncate_str(&op.reasons.join("; "), 60),
        ]);
    }
    println!("{}", builder.build().with(Style::markdown()));

    let critical = bottlenecks.critical_names();
    if !critical.is_empty() {
        println!(
            "{} Critical bottlenecks: {}",
            style("⚠").red(),
            critical.join(", ")
        );
    }
    let high = bottlenecks.high_names();
    if !high.is_empty() {
        println!(
            "{} High bottlenecks: {}",
            style("⚡").yellow(),
            high.join(", ")
        );
    }
    println!();

    // Rework sources
    println!("{}", style("Rework sources").bold());
    let mut builder = Builder::default();
    builder.push_record([
        "Operation",
        "Expected Defect Rate",
        "Actual Rework Rate",
        "Time Lost (h)",
    ]);
    for source in &rework {
        builder.push_record([
            source.operation_name.clone(),
            format!("{:.1}%", source.expected_defect_rate_pct),
            format!("{:.1}%", source.actual_rework_rate_pct),
            format!("{:.1}", source.rework_time_hours),
        ]);
    }
    println!("{}", builder.build().with(Style::markdown()));
    println!();

    // Overall metrics
    println!("{}", style("Overall metrics").bold());
    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value"]);
    builder.push_record([
        "Mean lead time".to_string(),
        format!("{:.2} h", metrics.avg_lead_time_hours),
    ]);
    builder.push_record([
        "Median lead time".to_string(),
        format!("{:.2} h", metrics.median_lead_time_hours),
    ]);
    builder.push_record([
        "Rework rate".to_string(),
        format!("{:.1}%", metrics.rework_rate_pct),
    ]);
    builder.push_record([
        "Total wait time".to_string(),
        format!("{:.1} h", metrics.total_wait_time_hours),
    ]);
    builder.push_record([
        "Process efficiency".to_string(),
        format!("{:.1}%", metrics.process_efficiency_pct),
    ]);
    println!("{}", builder.build().with(Style::markdown()));

    Ok(())
}
