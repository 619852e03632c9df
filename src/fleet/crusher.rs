// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Crusher model

use rand::prelude::*;
use serde::Serialize;

use crate::telemetry::Telemetry;

/// Health below which a crusher becomes a maintenance candidate
pub const CRUSHER_CRITICAL_HEALTH: f64 = 70.0;

/// Liner wear (%) above which a crusher becomes a maintenance candidate
pub const CRUSHER_CRITICAL_WEAR: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrusherStatus {
    Running,
    Idle,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrusherType {
    Primary,
    Secondary,
    Tertiary,
}

/// One crusher
#[derive(Debug, Clone, Serialize)]
pub struct Crusher {
    pub id: String,
    #[serde(rename = "type")]
    pub crusher_type: CrusherType,
    pub status: CrusherStatus,
    /// Tons per hour
    pub throughput_capacity: f64,
    pub current_throughput: f64,
    /// kW
    pub power_consumption: f64,
    pub vibration_level: f64,
    pub temperature: f64,
    pub liner_wear: f64,
    pub oil_pressure: f64,
    /// mm
    pub feed_size: f64,
    pub product_size: f64,
    pub health_score: f64,
    pub availability: f64,
    pub sensors: Telemetry,
    #[serde(skip)]
    maintenance_ticks_left: u32,
}

impl Crusher {
    pub fn new<R: Rng + ?Sized>(number: usize, rng: &mut R, maintenance_ticks: u32) -> Self {
        let crusher_type = [CrusherType::Primary, CrusherType::Secondary, CrusherType::Tertiary]
            [rng.gen_range(0..3)];
        let status = [CrusherStatus::Running, CrusherStatus::Idle, CrusherStatus::Maintenance]
            [rng.gen_range(0..3)];

        Self {
            id: format!("CRUSHER_{}", number),
            crusher_type,
            status,
            throughput_capacity: rng.gen_range(800.0..1200.0),
            current_throughput: 0.0,
            power_consumption: rng.gen_range(2000.0..5000.0),
            vibration_level: rng.gen_range(0.1..2.0),
            temperature: rng.gen_range(40.0..80.0),
            liner_wear: rng.gen_range(10.0..80.0),
            oil_pressure: rng.gen_range(15.0..25.0),
            feed_size: rng.gen_range(800.0..1200.0),
            product_size: rng.gen_range(0.0..150.0),
            health_score: rng.gen_range(70.0..95.0),
            availability: rng.gen_range(85.0..98.0),
            sensors: Telemetry::new(),
            maintenance_ticks_left: if status == CrusherStatus::Maintenance {
                maintenance_ticks
            } else {
                0
            },
        }
    }

    /// Advance one tick: idle <-> running, with maintenance forced near critical wear
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R, maintenance_ticks: u32) {
        match self.status {
            CrusherStatus::Running => {
                self.current_throughput =
                    rng.gen_range(self.throughput_capacity * 0.7..=self.throughput_capacity);
                self.power_consumption = rng.gen_range(2500.0..4800.0);
                self.vibration_level = (self.vibration_level + rng.gen_range(-0.1..0.1)).max(0.0);
                self.temperature += rng.gen_range(-2.0..2.0);
                self.liner_wear = (self.liner_wear + rng.gen_range(0.0..0.1)).min(100.0);
                self.health_score = (self.health_score - rng.gen_range(0.0..0.05)).max(0.0);

                if rng.gen::<f64>() < 0.02 {
                    self.status = CrusherStatus::Idle;
                }
            }
            CrusherStatus::Idle => {
                self.current_throughput = 0.0;
                self.power_consumption = rng.gen_range(200.0..500.0);

                if rng.gen::<f64>() < 0.1 {
                    self.status = CrusherStatus::Running;
                }
            }
            CrusherStatus::Maintenance => {
                self.current_throughput = 0.0;
                self.power_consumption = rng.gen_range(200.0..500.0);
                self.maintenance_ticks_left = self.maintenance_ticks_left.saturating_sub(1);
                if self.maintenance_ticks_left == 0 {
                    self.status = CrusherStatus::Running;
                }
            }
        }

        let critical = self.health_score < CRUSHER_CRITICAL_HEALTH
            || self.liner_wear > CRUSHER_CRITICAL_WEAR;
        if self.status != CrusherStatus::Maintenance && critical && rng.gen::<f64>() < 0.05 {
            self.status = CrusherStatus::Maintenance;
            self.current_throughput = 0.0;
            self.health_score = 95.0;
            self.liner_wear = 5.0;
            self.maintenance_ticks_left = maintenance_ticks.max(1);
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == CrusherStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_worn_crusher_eventually_serviced() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut crusher = Crusher::new(1, &mut rng, 3);
        crusher.status = CrusherStatus::Idle;
        crusher.liner_wear = 90.0;

        let mut ticks = 0;
        while crusher.status != CrusherStatus::Maintenance && ticks < 10_000 {
            crusher.step(&mut rng, 3);
            ticks += 1;
        }
        assert_eq!(crusher.status, CrusherStatus::Maintenance);
        assert_eq!(crusher.health_score, 95.0);
        assert_eq!(crusher.liner_wear, 5.0);
    }

    #[test]
    fn test_maintenance_returns_to_running() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut crusher = Crusher::new(2, &mut rng, 3);
        crusher.status = CrusherStatus::Maintenance;
        crusher.maintenance_ticks_left = 3;
        crusher.health_score = 95.0;
        crusher.liner_wear = 5.0;

        crusher.step(&mut rng, 3);
        crusher.step(&mut rng, 3);
        assert_eq!(crusher.status, CrusherStatus::Maintenance);
        crusher.step(&mut rng, 3);
        assert_eq!(crusher.status, CrusherStatus::Running);
    }

    #[test]
    fn test_running_throughput_within_rating() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut crusher = Crusher::new(3, &mut rng, 3);
        crusher.health_score = 95.0;
        crusher.liner_wear = 10.0;

        for _ in 0..200 {
            crusher.status = CrusherStatus::Running;
            crusher.step(&mut rng, 3);
            assert!(crusher.current_throughput >= crusher.throughput_capacity * 0.7);
            assert!(crusher.current_throughput <= crusher.throughput_capacity);
            assert!(crusher.vibration_level >= 0.0);
        }
    }
}
