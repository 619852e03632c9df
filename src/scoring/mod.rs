// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Fault scoring for generated telemetry
//!
//! Scoring is a query-side concern: the simulator never depends on it. A
//! [`ScoringService`] without a loaded model answers `ModelNotReady`.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

use crate::error::{SimError, SimResult};
use crate::telemetry::{FieldProfile, ReferenceDataset, Telemetry};

/// |z| above which a single field marks the record anomalous
pub const ANOMALY_Z_THRESHOLD: f64 = 3.0;

/// Weights of the engineered health composite
const HEALTH_COMPONENTS: [(&str, f64); 3] = [
    ("Machine_Health_Index", 0.4),
    ("Real_Time_Performance_Index", 0.3),
    ("Component_Degradation_Index", 0.3),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    /// Probability of a fault, in [0, 1]
    pub fault_probability: f64,
    pub fault_prediction: bool,
    /// Mean absolute z-score over the profiled fields
    pub anomaly_score: f64,
    pub is_anomaly: bool,
}

pub trait FaultScorer: Send + Sync {
    fn score(&self, telemetry: &Telemetry) -> ScoreResult;
}

/// Scores telemetry against the reference profiles
pub struct ProfileScorer {
    profiles: BTreeMap<String, FieldProfile>,
    reference_health: Option<f64>,
}

impl ProfileScorer {
    pub fn new(profiles: BTreeMap<String, FieldProfile>) -> Self {
        let reference_health = health_composite(|field| profiles.get(field).map(|p| p.mean));
        Self {
            profiles,
            reference_health,
        }
    }

    pub fn from_dataset(dataset: &ReferenceDataset) -> Self {
        Self::new(dataset.profiles().clone())
    }

    fn z_scores<'a>(&'a self, telemetry: &'a Telemetry) -> impl Iterator<Item = f64> + 'a {
        telemetry.iter().filter_map(move |(field, value)| {
            let profile = self.profiles.get(field)?;
            if profile.std_dev > 0.0 {
                Some(((value - profile.mean) / profile.std_dev).abs())
            } else {
                None
            }
        })
    }

    /// Health points below the reference composite, in tens
    fn health_deficit(&self, telemetry: &Telemetry) -> f64 {
        let Some(reference) = self.reference_health else {
            return 0.0;
        };
        let current = health_composite(|field| {
            telemetry
                .get(field)
                .copied()
                .or_else(|| self.profiles.get(field).map(|p| p.mean))
        });
        current.map(|h| (reference - h) / 10.0).unwrap_or(0.0)
    }
}

impl FaultScorer for ProfileScorer {
    fn score(&self, telemetry: &Telemetry) -> ScoreResult {
        let (count, sum, max) = self
            .z_scores(telemetry)
            .fold((0usize, 0.0, 0.0f64), |(n, sum, max), z| (n + 1, sum + z, max.max(z)));
        let anomaly_score = if count == 0 { 0.0 } else { sum / count as f64 };

        let x = 1.5 * (anomaly_score - 1.0) + self.health_deficit(telemetry);
        let fault_probability = 1.0 / (1.0 + (-x).exp());

        ScoreResult {
            fault_probability,
            fault_prediction: fault_probability >= 0.5,
            anomaly_score,
            is_anomaly: max > ANOMALY_Z_THRESHOLD,
        }
    }
}

fn health_composite(lookup: impl Fn(&str) -> Option<f64>) -> Option<f64> {
    let health = lookup(HEALTH_COMPONENTS[0].0)?;
    let performance = lookup(HEALTH_COMPONENTS[1].0)?;
    let degradation = lookup(HEALTH_COMPONENTS[2].0)?;
    Some(
        health * HEALTH_COMPONENTS[0].1
            + performance * HEALTH_COMPONENTS[1].1
            + (100.0 - degradation) * HEALTH_COMPONENTS[2].1,
    )
}

/// Holder for the optional scoring model
#[derive(Clone, Default)]
pub struct ScoringService {
    model: Arc<RwLock<Option<Arc<dyn FaultScorer>>>>,
}

impl ScoringService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, model: Arc<dyn FaultScorer>) {
        *self.model.write() = Some(model);
        info!("Scoring model loaded");
    }

    pub fn is_ready(&self) -> bool {
        self.model.read().is_some()
    }

    pub fn score(&self, telemetry: &Telemetry) -> SimResult<ScoreResult> {
        let model = self.model.read().clone().ok_or(SimError::ModelNotReady)?;
        Ok(model.score(telemetry))
    }
}
