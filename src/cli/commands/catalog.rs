//! Operations chain listing

use std::path::PathBuf;

use console::style;
use miette::Result;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::load_catalog;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct CatalogArgs {
    /// Catalog YAML file (defaults to the built-in six-operation chain)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

pub fn run(args: CatalogArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;

    if !global.quiet {
        println!(
            "{} operations, standard sequence: {}",
            catalog.stages.len(),
            catalog.sequence.join(" → ")
        );
        println!();
    }

    let mut builder = Builder::default();
    builder.push_record([
        "ID",
        "Operation",
        "Duration (min)",
        "Setup (min)",
        "Defect Rate",
        "Workstations",
    ]);
    for stage in &catalog.stages {
        builder.push_record([
            stage.id.clone(),
            stage.name.clone(),
            format!(
                "{:.0} ± {:.0}",
                stage.avg_duration_minutes, stage.std_deviation_minutes
            ),
            format!("{:.0}", stage.setup_time_minutes),
            format!("{:.1}%", stage.defect_rate * 100.0),
            stage.workstation_count.to_string(),
        ]);
    }
    println!("{}", builder.build().with(Style::markdown()));

    println!();
    println!(
        "Inspection stage: {} (detection probability {:.0}%)",
        catalog.inspection_stage,
        catalog.detection_probability * 100.0
    );

    let theoretical = catalog.theoretical_lead_time_minutes();
    println!(
        "{} Theoretical minimum lead time: {:.1} minutes ({:.2} hours)",
        style("⏱").cyan(),
        theoretical,
        theoretical / 60.0
    );

    Ok(())
}
