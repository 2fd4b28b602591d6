//! Discrete-event simulator for the manufacturing digital twin
//!
//! Pushes N cases through the standard sequence, arbitrating shared
//! workstation capacity, drawing stochastic durations and defects, and
//! emitting one event per stage visit. All randomness flows from a single
//! seeded generator, so a fixed seed reproduces an identical event log.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::core::catalog::{Catalog, CatalogError};
use crate::core::config::SimulationConfig;
use crate::core::event::{Event, EventLog};

/// Floor for drawn cycle times; the normal tail must not produce a
/// non-physical duration.
const MIN_CYCLE_MINUTES: f64 = 5.0;

/// Errors raised before a run starts. Traversal itself is total: every
/// per-case decision is defined over its whole input domain.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Case count must be positive")]
    NoCases,

    #[error("Mean inter-arrival time must be positive (got {0})")]
    InvalidInterarrival(f64),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A latent defect carried by a case until inspection clears it.
struct LatentDefect {
    stage_index: usize,
    unresolved: bool,
}

/// Record a latent defect, re-arming a cleared entry in place so the
/// inspection scan keeps first-insertion order.
fn arm_latent(latent: &mut Vec<LatentDefect>, stage_index: usize) {
    match latent.iter_mut().find(|d| d.stage_index == stage_index) {
        Some(defect) => defect.unresolved = true,
        None => latent.push(LatentDefect {
            stage_index,
            unresolved: true,
        }),
    }
}

/// Index and availability of the earliest-free slot; lowest index wins ties.
fn earliest_slot(pool: &[f64]) -> (usize, f64) {
    let mut best = 0;
    for (i, &available) in pool.iter().enumerate() {
        if available < pool[best] {
            best = i;
        }
    }
    (best, pool[best])
}

/// Normal draw via the Box-Muller transform.
fn normal_draw(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    // 1 - u maps [0, 1) onto (0, 1]; keeps the log finite
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random();
    let z = (-2.0_f64 * u1.ln()).sqrt() * (2.0_f64 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// Exponential draw via inverse transform.
fn exponential_draw(rng: &mut StdRng, mean: f64) -> f64 {
    let u: f64 = 1.0 - rng.random::<f64>();
    -mean * u.ln()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Discrete-event simulator over a validated catalog and run configuration.
///
/// Cases are simulated strictly in arrival order, one case fully before the
/// next; the per-stage workstation pools are the only state shared between
/// cases.
pub struct Simulator<'a> {
    catalog: &'a Catalog,
    config: &'a SimulationConfig,
}

impl<'a> Simulator<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a SimulationConfig) -> Self {
        Self { catalog, config }
    }

    /// Run the simulation and produce the full event log.
    ///
    /// Configuration errors surface here, before any event is emitted.
    pub fn run(&self) -> Result<EventLog, SimulationError> {
        self.catalog.validate()?;
        if self.config.num_cases == 0 {
            return Err(SimulationError::NoCases);
        }
        if self.config.mean_interarrival_minutes <= 0.0 {
            return Err(SimulationError::InvalidInterarrival(
                self.config.mean_interarrival_minutes,
            ));
        }

        let catalog = self.catalog;

        // Resolve the sequence to stage indices once, up front.
        let mut sequence = Vec::with_capacity(catalog.sequence.len());
        for id in &catalog.sequence {
            let index = catalog
                .stages
                .iter()
                .position(|s| &s.id == id)
                .ok_or_else(|| CatalogError::UnknownSequenceStage { id: id.clone() })?;
            sequence.push(index);
        }

        // One pool per stage; each slot tracks its next-available instant as
        // a minute offset from the epoch.
        let mut pools: Vec<Vec<f64>> = catalog
            .stages
            .iter()
            .map(|s| vec![0.0; s.workstation_count])
            .collect();

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut events = Vec::new();
        let mut arrival = 0.0_f64;

        for case_num in 1..=self.config.num_cases {
            let case_id = format!("CASE-{:04}", case_num);

            // Poisson-like arrivals: exponential gap from the previous case
            arrival += exponential_draw(&mut rng, self.config.mean_interarrival_minutes);

            let mut clock = arrival;
            let mut visits = vec![0u32; catalog.stages.len()];
            let mut latent: Vec<LatentDefect> = Vec::new();
            let mut index = 0;

            while index < sequence.len() {
                let stage_index = sequence[index];
                let stage = &catalog.stages[stage_index];
                visits[stage_index] += 1;
                let rework_count = visits[stage_index];
                let is_rework = rework_count > 1;

                let (slot, available) = earliest_slot(&pools[stage_index]);
                let wait = (available - clock).max(0.0);
                let start = clock.max(available);

                let cycle = round2(
                    normal_draw(&mut rng, stage.avg_duration_minutes, stage.std_deviation_minutes)
                        .max(MIN_CYCLE_MINUTES),
                );
                let total = cycle + stage.setup_time_minutes;
                let end = start + total;

                // Exclusive occupancy: the slot is busy until this visit ends
                pools[stage_index][slot] = end;

                let mut defect_detected = false;
                let mut next_index = index + 1;

                if stage.id == catalog.inspection_stage {
                    for defect in latent.iter_mut() {
                        if !defect.unresolved {
                            continue;
                        }
                        if rng.random::<f64>() < catalog.detection_probability {
                            defect_detected = true;
                            defect.unresolved = false;
                            let origin = catalog.stages[defect.stage_index].id.as_str();
                            let target = catalog.rework_target(origin);
                            next_index = catalog.sequence_position(target).ok_or_else(|| {
                                CatalogError::ReworkTargetNotInSequence {
                                    id: target.to_string(),
                                }
                            })?;
                            // At most one redirect per inspection visit;
                            // remaining defects wait for the next pass
                            break;
                        }
                    }
                } else if rng.random::<f64>() < stage.defect_rate {
                    arm_latent(&mut latent, stage_index);
                }

                events.push(Event {
                    case_id: case_id.clone(),
                    activity: stage.name.clone(),
                    activity_fr: stage.name_fr.clone(),
                    operation_id: stage.id.clone(),
                    timestamp_start: self.instant(start),
                    timestamp_end: self.instant(end),
                    resource: format!("{}_WS{}", stage.id, slot + 1),
                    is_rework,
                    rework_count,
                    wait_time_minutes: round2(wait),
                    cycle_time_minutes: cycle,
                    setup_time_minutes: stage.setup_time_minutes,
                    total_time_minutes: total,
                    defect_detected,
                    duration_minutes: total,
                });

                clock = end;
                index = next_index;
            }
        }

        Ok(EventLog::from_events(events))
    }

    /// Convert a minute offset from the epoch into a concrete instant.
    fn instant(&self, minutes: f64) -> chrono::DateTime<chrono::Utc> {
        self.config.start_date + chrono::Duration::milliseconds((minutes * 60_000.0).round() as i64)
    }
}
