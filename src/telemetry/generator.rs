// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Synthetic telemetry generator seeded from historical profiles

use std::sync::Arc;

use rand::prelude::*;
use rand_distr::Normal;

use super::{FaultType, FieldProfile, ReferenceDataset, Telemetry};

/// Fields whose readings worsen as equipment degrades
pub const WEAR_SENSITIVE_FIELDS: [&str; 3] = [
    "Vibration_Level",
    "Tool_Wear_Rate",
    "Component_Degradation_Index",
];

/// Produces plausible field values: base + drift + noise + degradation, clamped
/// to the historical [min, max] envelope.
#[derive(Debug, Clone)]
pub struct TelemetryGenerator {
    dataset: Arc<ReferenceDataset>,
}

impl TelemetryGenerator {
    pub fn new(dataset: Arc<ReferenceDataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &ReferenceDataset {
        &self.dataset
    }

    /// Generate one value for `field` around `base`.
    pub fn generate_field<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        field: &str,
        profile: &FieldProfile,
        base: f64,
        time_factor: f64,
        degradation: f64,
    ) -> f64 {
        let std = profile.std_dev;

        let drift = (time_factor * 0.01).sin() * 0.1 * std;

        let noise = match Normal::new(0.0, 0.05 * std) {
            Ok(normal) => rng.sample(normal),
            Err(_) => 0.0,
        };

        let degradation_effect = if WEAR_SENSITIVE_FIELDS.contains(&field) {
            (degradation - 1.0) * 0.3 * std
        } else {
            0.0
        };

        profile.clamp(base + drift + noise + degradation_effect)
    }

    /// Generate a full telemetry record from a random historical sample
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        fault: Option<FaultType>,
        degradation: f64,
        time_factor: f64,
    ) -> Telemetry {
        let mut telemetry = Telemetry::new();
        if self.dataset.is_empty() {
            return telemetry;
        }

        let index = rng.gen_range(0..self.dataset.len());
        let Some(row) = self.dataset.row(index) else {
            return telemetry;
        };

        for (field, &raw) in self.dataset.fields().iter().zip(row) {
            let Some(profile) = self.dataset.profile(field) else {
                continue;
            };
            let base = match fault {
                Some(fault) => fault.apply(field, raw),
                None => raw,
            };
            let value = self.generate_field(rng, field, profile, base, time_factor, degradation);
            telemetry.insert(field.clone(), value);
        }

        telemetry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeMap;

    fn single_field(mean: f64, std_dev: f64, min: f64, max: f64) -> TelemetryGenerator {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "Vibration_Level".to_string(),
            FieldProfile { mean, std_dev, min, max },
        );
        TelemetryGenerator::new(Arc::new(ReferenceDataset::from_profiles(profiles)))
    }

    #[test]
    fn test_single_field_stays_in_envelope() {
        let generator = single_field(10.0, 2.0, 0.0, 20.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let telemetry = generator.sample(&mut rng, None, 1.0, 1.0);
        let value = telemetry["Vibration_Level"];
        assert!((0.0..=20.0).contains(&value));
    }

    #[test]
    fn test_clamp_holds_under_extreme_inputs() {
        let generator = single_field(10.0, 2.0, 0.0, 20.0);
        let profile = *generator.dataset().profile("Vibration_Level").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for step in 0..2000 {
            let base = if step % 2 == 0 { 1e6 } else { -1e6 };
            let t = step as f64;
            let v = generator.generate_field(&mut rng, "Vibration_Level", &profile, base, t, 2.0);
            assert!(profile.contains(v), "value {} escaped envelope", v);
        }
        for step in 0..2000 {
            let sample = generator.sample(&mut rng, Some(FaultType::Vibration), 2.0, step as f64);
            let v = sample["Vibration_Level"];
            assert!(profile.contains(v));
        }
    }

    #[test]
    fn test_degradation_raises_wear_fields_only() {
        let mut profiles = BTreeMap::new();
        let flat = FieldProfile { mean: 50.0, std_dev: 10.0, min: 0.0, max: 100.0 };
        profiles.insert("Tool_Wear_Rate".to_string(), flat);
        profiles.insert("Humidity".to_string(), flat);
        let dataset = ReferenceDataset::from_profiles(profiles);
        let generator = TelemetryGenerator::new(Arc::new(dataset));

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let n = 500;
        let (mut wear, mut humidity) = (0.0, 0.0);
        for _ in 0..n {
            // time_factor 0 removes drift
            let t = generator.sample(&mut rng, None, 2.0, 0.0);
            wear += t["Tool_Wear_Rate"];
            humidity += t["Humidity"];
        }
        // degradation 2.0 adds 0.3 * std = 3.0 to wear-sensitive fields
        assert!((wear / n as f64 - 53.0).abs() < 0.5);
        assert!((humidity / n as f64 - 50.0).abs() < 0.5);
    }

    #[test]
    fn test_wear_fault_doubles_base() {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "Tool_Wear_Rate".to_string(),
            FieldProfile { mean: 10.0, std_dev: 0.0, min: 0.0, max: 100.0 },
        );
        let dataset = ReferenceDataset::from_profiles(profiles);
        let generator = TelemetryGenerator::new(Arc::new(dataset));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let normal = generator.sample(&mut rng, None, 1.0, 5.0);
        let faulted = generator.sample(&mut rng, Some(FaultType::Wear), 1.0, 5.0);
        assert_eq!(normal["Tool_Wear_Rate"], 10.0);
        assert_eq!(faulted["Tool_Wear_Rate"], 20.0);
    }
}
