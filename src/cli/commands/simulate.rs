//! Event log generation

use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::load_catalog;
use crate::cli::{GlobalOpts, SimArgs};
use crate::core::leadtime::case_lead_times;
use crate::core::sim::Simulator;

#[derive(clap::Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub sim: SimArgs,

    /// Write the event log CSV to this path
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: SimulateArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = load_catalog(args.sim.catalog.as_deref())?;
    let config = args.sim.to_config(60);

    let log = Simulator::new(&catalog, &config).run().into_diagnostic()?;
    let summaries = case_lead_times(&log);

    if !global.quiet {
        println!(
            "{} Generated {} events for {} cases",
            style("✓").green(),
            log.len(),
            log.case_count()
        );
        if let (Some(first), Some(last)) = (log.first_start(), log.last_end()) {
            println!("  Period: {} to {}", first, last);
        }
        println!();
    }

    let lead_hours: Vec<f64> = summaries.iter().map(|s| s.lead_time_hours).collect();
    let mean = lead_hours.iter().sum::<f64>() / lead_hours.len().max(1) as f64;
    let reworks: u32 = summaries.iter().map(|s| s.total_reworks).sum();

    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value"]);
    builder.push_record(["Cases".to_string(), summaries.len().to_string()]);
    builder.push_record(["Events".to_string(), log.len().to_string()]);
    builder.push_record(["Rework visits".to_string(), reworks.to_string()]);
    builder.push_record(["Mean lead time".to_string(), format!("{:.2} h", mean)]);
    println!("{}", builder.build().with(Style::markdown()));

    if let Some(path) = &args.output {
        log.export_csv(path).into_diagnostic()?;
        if !global.quiet {
            println!();
            println!(
                "{} Event log exported to {}",
                style("✓").green(),
                path.display()
            );
        }
    }

    Ok(())
}
