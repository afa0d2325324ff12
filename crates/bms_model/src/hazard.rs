//! Hazard evaluators.
//!
//! An evaluator aggregates the hazard levels of a room's sensors into a single
//! 0-100 score. Evaluators refer to sensors by [`SensorKind`], which is unique
//! within a room, and resolve them against the room's sensors at evaluation
//! time.

use std::fmt;

use serde::Serialize;

use crate::error::{ModelError, ModelResult};
use crate::sensors::{Sensor, SensorKind};

/// Upper bound of any hazard level
pub const MAX_HAZARD_LEVEL: u32 = 100;

/// Required sum of all weightings in a weighting-based evaluator
pub const WEIGHT_TOTAL: i64 = 100;

/// Evaluator variants, as named in save files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HazardEvaluatorType {
    RuleBased,
    WeightingBased,
}

impl HazardEvaluatorType {
    pub fn tag(&self) -> &'static str {
        match self {
            HazardEvaluatorType::RuleBased => "RuleBased",
            HazardEvaluatorType::WeightingBased => "WeightingBased",
        }
    }

    /// Parse a save-file tag. Tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "RuleBased" => Some(HazardEvaluatorType::RuleBased),
            "WeightingBased" => Some(HazardEvaluatorType::WeightingBased),
            _ => None,
        }
    }
}

impl fmt::Display for HazardEvaluatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A sensor's share of a weighting-based evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorWeight {
    pub sensor: SensorKind,
    pub weight: u32,
}

/// Aggregates sensor hazard levels into a room hazard level
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum HazardEvaluator {
    /// Fixed rules over the listed sensors
    RuleBased { sensors: Vec<SensorKind> },
    /// Weighted average over the listed sensors; weights sum to 100
    WeightingBased { weights: Vec<SensorWeight> },
}

impl HazardEvaluator {
    pub fn rule_based(sensors: Vec<SensorKind>) -> Self {
        HazardEvaluator::RuleBased { sensors }
    }

    /// Every weight must be in `0..=100` and together they must sum to exactly 100.
    pub fn weighting_based(
        weights: impl IntoIterator<Item = (SensorKind, i64)>,
    ) -> ModelResult<Self> {
        let mut total = 0;
        let mut checked = Vec::new();
        for (sensor, weight) in weights {
            if !(0..=WEIGHT_TOTAL).contains(&weight) {
                return Err(ModelError::WeightOutOfRange(weight));
            }
            total += weight;
            checked.push(SensorWeight {
                sensor,
                weight: weight as u32,
            });
        }
        if total != WEIGHT_TOTAL {
            return Err(ModelError::WeightSumNot100(total));
        }
        Ok(HazardEvaluator::WeightingBased { weights: checked })
    }

    pub fn evaluator_type(&self) -> HazardEvaluatorType {
        match self {
            HazardEvaluator::RuleBased { .. } => HazardEvaluatorType::RuleBased,
            HazardEvaluator::WeightingBased { .. } => HazardEvaluatorType::WeightingBased,
        }
    }

    /// Sensor kinds this evaluator reads, in declaration order
    pub fn sensor_kinds(&self) -> Vec<SensorKind> {
        match self {
            HazardEvaluator::RuleBased { sensors } => sensors.clone(),
            HazardEvaluator::WeightingBased { weights } => {
                weights.iter().map(|w| w.sensor).collect()
            }
        }
    }

    /// Weighting for a sensor kind, if this is a weighting-based evaluator
    pub fn weight_of(&self, kind: SensorKind) -> Option<u32> {
        match self {
            HazardEvaluator::RuleBased { .. } => None,
            HazardEvaluator::WeightingBased { weights } => weights
                .iter()
                .find(|w| w.sensor == kind)
                .map(|w| w.weight),
        }
    }

    /// Check that every referenced sensor is present in `sensors`
    pub fn validate_against(&self, sensors: &[Sensor]) -> ModelResult<()> {
        for kind in self.sensor_kinds() {
            if find(sensors, kind).is_none() {
                return Err(ModelError::SensorNotInRoom(kind));
            }
        }
        Ok(())
    }

    /// Evaluate the hazard level against a room's sensors
    pub fn evaluate(&self, sensors: &[Sensor]) -> u32 {
        match self {
            HazardEvaluator::RuleBased { sensors: kinds } => {
                let resolved: Vec<&Sensor> =
                    kinds.iter().filter_map(|kind| find(sensors, *kind)).collect();
                evaluate_rules(&resolved)
            }
            HazardEvaluator::WeightingBased { weights } => {
                if weights.is_empty() {
                    return 0;
                }
                let total: f64 = weights
                    .iter()
                    .filter_map(|w| find(sensors, w.sensor).map(|s| (s, w.weight)))
                    .map(|(sensor, weight)| sensor.hazard_level() as f64 * weight as f64 / 100.0)
                    .sum();
                let level = (total / weights.len() as f64).floor();
                (level as u32).min(MAX_HAZARD_LEVEL)
            }
        }
    }
}

impl fmt::Display for HazardEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.evaluator_type().tag())
    }
}

fn find(sensors: &[Sensor], kind: SensorKind) -> Option<&Sensor> {
    sensors.iter().find(|sensor| sensor.kind() == kind)
}

fn evaluate_rules(sensors: &[&Sensor]) -> u32 {
    match sensors {
        [] => 0,
        [only] => only.hazard_level(),
        _ => {
            let (occupancy, others): (Vec<&Sensor>, Vec<&Sensor>) = sensors
                .iter()
                .copied()
                .partition(|sensor| sensor.kind() == SensorKind::Occupancy);

            if others
                .iter()
                .any(|sensor| sensor.hazard_level() >= MAX_HAZARD_LEVEL)
            {
                return MAX_HAZARD_LEVEL;
            }
            if others.is_empty() {
                return 0;
            }

            let mut level = others
                .iter()
                .map(|sensor| sensor.hazard_level() as f64)
                .sum::<f64>()
                / others.len() as f64;
            if let Some(occupancy) = occupancy.first() {
                level *= occupancy.hazard_level() as f64 / 100.0;
            }
            (level.floor() as u32).min(MAX_HAZARD_LEVEL)
        }
    }
}
