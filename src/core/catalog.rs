//! Operation catalog - stage definitions, standard sequence, and rework routing
//!
//! The catalog is the static configuration of the digital twin: the workshop
//! operations, the canonical order cases move through them, and where a case
//! is sent back to when inspection catches a latent defect.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// A single workshop operation in the manufacturing chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    /// Stage identifier (e.g. "OP3")
    pub id: String,

    /// Display name
    pub name: String,

    /// Secondary (French) display name
    #[serde(default)]
    pub name_fr: String,

    /// Mean processing duration in minutes
    pub avg_duration_minutes: f64,

    /// Standard deviation of the processing duration in minutes
    pub std_deviation_minutes: f64,

    /// Fixed setup duration added to every visit, in minutes
    #[serde(default)]
    pub setup_time_minutes: f64,

    /// Probability that one visit introduces a latent defect
    #[serde(default)]
    pub defect_rate: f64,

    /// Number of parallel workstations at this stage
    pub workstation_count: usize,
}

/// Errors raised while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Operation not found: {id}")]
    StageNotFound { id: String },

    #[error("Standard sequence references unknown operation '{id}'")]
    UnknownSequenceStage { id: String },

    #[error("Operation '{id}' appears more than once in the standard sequence")]
    DuplicateSequenceStage { id: String },

    #[error("Standard sequence is empty")]
    EmptySequence,

    #[error("Rework route {from} -> {to} references unknown operation '{id}'")]
    UnknownReworkStage {
        from: String,
        to: String,
        id: String,
    },

    #[error("Rework target '{id}' is not part of the standard sequence")]
    ReworkTargetNotInSequence { id: String },

    #[error("Inspection stage '{id}' is unknown or not in the standard sequence")]
    InvalidInspectionStage { id: String },

    #[error("Operation '{id}' has defect rate {rate}, expected a probability in [0, 1]")]
    InvalidDefectRate { id: String, rate: f64 },

    #[error("Detection probability {probability} is not in [0, 1]")]
    InvalidDetectionProbability { probability: f64 },

    #[error("Operation '{id}' must have at least one workstation")]
    NoWorkstations { id: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse catalog YAML: {message}")]
    YamlError { message: String },
}

fn default_detection_probability() -> f64 {
    0.8
}

/// The full process definition: stages, canonical order, rework routing, and
/// inspection behavior.
///
/// A catalog is plain data: it can be built in code, loaded from YAML, and
/// must pass [`Catalog::validate`] before a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// All workshop operations
    pub stages: Vec<Stage>,

    /// Canonical visiting order, by stage id
    pub sequence: Vec<String>,

    /// Defect origin -> stage to redo when the defect is caught
    #[serde(default)]
    pub rework_routes: BTreeMap<String, String>,

    /// Stage that detects latent defects instead of producing them
    pub inspection_stage: String,

    /// Probability that inspection catches one unresolved latent defect
    #[serde(default = "default_detection_probability")]
    pub detection_probability: f64,
}

impl Default for Catalog {
    /// The built-in six-operation workshop chain.
    fn default() -> Self {
        let stages = vec![
            Stage {
                id: "OP1".to_string(),
                name: "Raw Material Preparation".to_string(),
                name_fr: "Préparation Matière Première".to_string(),
                avg_duration_minutes: 15.0,
                std_deviation_minutes: 3.0,
                setup_time_minutes: 5.0,
                defect_rate: 0.02,
                workstation_count: 2,
            },
            Stage {
                id: "OP2".to_string(),
                name: "CNC Machining".to_string(),
                name_fr: "Usinage CNC".to_string(),
                avg_duration_minutes: 45.0,
                std_deviation_minutes: 8.0,
                setup_time_minutes: 10.0,
                defect_rate: 0.05,
                workstation_count: 3,
            },
            Stage {
                id: "OP3".to_string(),
                name: "Heat Treatment".to_string(),
                name_fr: "Traitement Thermique".to_string(),
                avg_duration_minutes: 90.0,
                std_deviation_minutes: 10.0,
                setup_time_minutes: 15.0,
                defect_rate: 0.03,
                workstation_count: 1,
            },
            Stage {
                id: "OP4".to_string(),
                name: "Surface Finishing".to_string(),
                name_fr: "Finition de Surface".to_string(),
                avg_duration_minutes: 30.0,
                std_deviation_minutes: 5.0,
                setup_time_minutes: 8.0,
                defect_rate: 0.04,
                workstation_count: 2,
            },
            Stage {
                id: "OP5".to_string(),
                name: "Quality Control".to_string(),
                name_fr: "Contrôle Qualité".to_string(),
                avg_duration_minutes: 20.0,
                std_deviation_minutes: 4.0,
                setup_time_minutes: 3.0,
                // Inspection detects defects, it does not produce them
                defect_rate: 0.0,
                workstation_count: 2,
            },
            Stage {
                id: "OP6".to_string(),
                name: "Assembly & Packaging".to_string(),
                name_fr: "Assemblage et Conditionnement".to_string(),
                avg_duration_minutes: 25.0,
                std_deviation_minutes: 5.0,
                setup_time_minutes: 5.0,
                defect_rate: 0.02,
                workstation_count: 2,
            },
        ];

        let sequence = stages.iter().map(|s| s.id.clone()).collect();

        let mut rework_routes = BTreeMap::new();
        rework_routes.insert("OP2".to_string(), "OP2".to_string());
        rework_routes.insert("OP3".to_string(), "OP3".to_string());
        rework_routes.insert("OP4".to_string(), "OP4".to_string());

        Self {
            stages,
            sequence,
            rework_routes,
            inspection_stage: "OP5".to_string(),
            detection_probability: default_detection_probability(),
        }
    }
}

impl Catalog {
    /// Look up a stage definition by id.
    pub fn stage(&self, id: &str) -> Result<&Stage, CatalogError> {
        self.stages
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CatalogError::StageNotFound { id: id.to_string() })
    }

    /// Position of a stage id in the standard sequence, if it appears there.
    pub fn sequence_position(&self, id: &str) -> Option<usize> {
        self.sequence.iter().position(|s| s == id)
    }

    /// Stage to re-enter when a defect produced at `id` is caught.
    ///
    /// Falls back to the defective stage itself when no route is configured.
    pub fn rework_target<'a>(&'a self, id: &'a str) -> &'a str {
        self.rework_routes.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Check every configuration invariant before simulation.
    ///
    /// Any failure here is fatal: the simulator refuses to start rather than
    /// discovering a broken reference mid-case.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.sequence.is_empty() {
            return Err(CatalogError::EmptySequence);
        }

        for stage in &self.stages {
            if !(0.0..=1.0).contains(&stage.defect_rate) {
                return Err(CatalogError::InvalidDefectRate {
                    id: stage.id.clone(),
                    rate: stage.defect_rate,
                });
            }
            if stage.workstation_count == 0 {
                return Err(CatalogError::NoWorkstations {
                    id: stage.id.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for id in &self.sequence {
            if self.stage(id).is_err() {
                return Err(CatalogError::UnknownSequenceStage { id: id.clone() });
            }
            if !seen.insert(id.as_str()) {
                return Err(CatalogError::DuplicateSequenceStage { id: id.clone() });
            }
        }

        for (from, to) in &self.rework_routes {
            for endpoint in [from.as_str(), to.as_str()] {
                if self.stage(endpoint).is_err() {
                    return Err(CatalogError::UnknownReworkStage {
                        from: from.clone(),
                        to: to.clone(),
                        id: endpoint.to_string(),
                    });
                }
            }
            if self.sequence_position(to).is_none() {
                return Err(CatalogError::ReworkTargetNotInSequence { id: to.clone() });
            }
        }

        if self.stage(&self.inspection_stage).is_err()
            || self.sequence_position(&self.inspection_stage).is_none()
        {
            return Err(CatalogError::InvalidInspectionStage {
                id: self.inspection_stage.clone(),
            });
        }
        if !(0.0..=1.0).contains(&self.detection_probability) {
            return Err(CatalogError::InvalidDetectionProbability {
                probability: self.detection_probability,
            });
        }

        Ok(())
    }

    /// Theoretical minimum lead time: sum of every stage's mean duration plus
    /// setup, with no queueing and no rework.
    pub fn theoretical_lead_time_minutes(&self) -> f64 {
        self.stages
            .iter()
            .map(|s| s.avg_duration_minutes + s.setup_time_minutes)
            .sum()
    }

    /// Parse a catalog from YAML.
    pub fn from_yaml_str(contents: &str) -> Result<Self, CatalogError> {
        serde_yml::from_str(contents).map_err(|e| CatalogError::YamlError {
            message: e.to_string(),
        })
    }

    /// Load a catalog from a YAML file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }
}
