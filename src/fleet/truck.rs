// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Haul truck model and its load/haul/dump cycle

use chrono::{DateTime, Duration, Utc};
use rand::prelude::*;
use serde::Serialize;

use super::condition::MachineCondition;
use super::{MIN_TRUCK_HEALTH, SITE_LAT, SITE_LNG};
use crate::telemetry::Telemetry;

/// Truck cycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TruckStatus {
    Loading,
    Hauling,
    Dumping,
    Idle,
    Maintenance,
}

impl TruckStatus {
    /// States of the haul cycle a truck can start in
    pub const CYCLE: [TruckStatus; 4] = [
        TruckStatus::Loading,
        TruckStatus::Hauling,
        TruckStatus::Dumping,
        TruckStatus::Idle,
    ];

    /// Moving material
    pub fn is_active(&self) -> bool {
        matches!(self, TruckStatus::Loading | TruckStatus::Hauling | TruckStatus::Dumping)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GpsLocation {
    pub lat: f64,
    pub lng: f64,
    pub elevation: f64,
}

/// One haul truck
#[derive(Debug, Clone, Serialize)]
pub struct Truck {
    pub id: String,
    pub status: TruckStatus,
    /// Tons
    pub load_capacity: f64,
    pub current_load: f64,
    pub gps_location: GpsLocation,
    pub destination: Option<String>,
    /// Percent
    pub fuel_level: f64,
    pub engine_hours: f64,
    pub last_maintenance: DateTime<Utc>,
    pub health_score: f64,
    /// km/h
    pub speed: f64,
    pub heading: f64,
    #[serde(flatten)]
    pub condition: MachineCondition,
    pub sensors: Telemetry,
}

impl Truck {
    pub fn new<R: Rng + ?Sized>(number: usize, rng: &mut R) -> Self {
        let days_since_service = rng.gen_range(1..=30);
        let last_maintenance = Utc::now() - Duration::days(days_since_service);

        Self {
            id: format!("TRUCK_{:03}", number),
            status: TruckStatus::CYCLE[rng.gen_range(0..TruckStatus::CYCLE.len())],
            load_capacity: rng.gen_range(200.0..300.0),
            current_load: 0.0,
            gps_location: GpsLocation {
                lat: SITE_LAT + rng.gen_range(-0.01..0.01),
                lng: SITE_LNG + rng.gen_range(-0.01..0.01),
                elevation: rng.gen_range(1500.0..1600.0),
            },
            destination: None,
            fuel_level: rng.gen_range(30.0..100.0),
            engine_hours: rng.gen_range(1000.0..8000.0),
            last_maintenance,
            health_score: rng.gen_range(75.0..95.0),
            speed: 0.0,
            heading: rng.gen_range(0.0..360.0),
            condition: MachineCondition::new(days_since_service as f64 * 24.0),
            sensors: Telemetry::new(),
        }
    }

    /// Advance the haul cycle by one tick.
    ///
    /// Returns the destination stockpile and tonnage dumped this tick, if any.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        stockpile_ids: &[String],
        hours: f64,
    ) -> Option<(String, f64)> {
        let mut dumped = None;

        if self.condition.mode.is_maintenance() {
            self.status = TruckStatus::Maintenance;
            self.speed = 0.0;
        } else {
            match self.status {
                TruckStatus::Hauling => {
                    self.speed = rng.gen_range(20.0..45.0);
                    self.gps_location.lat += rng.gen_range(-0.0001..0.0001);
                    self.gps_location.lng += rng.gen_range(-0.0001..0.0001);

                    // Arrival is a coin flip, not a function of distance travelled
                    if rng.gen::<f64>() < 0.1 {
                        self.status = TruckStatus::Dumping;
                    }
                }
                TruckStatus::Loading => {
                    self.speed = 0.0;
                    if self.current_load < self.load_capacity {
                        let scoop = rng.gen_range(5.0..15.0);
                        self.current_load = (self.current_load + scoop).min(self.load_capacity);
                    } else {
                        self.status = TruckStatus::Hauling;
                        self.destination = stockpile_ids.choose(rng).cloned();
                    }
                }
                TruckStatus::Dumping => {
                    self.speed = 0.0;
                    if self.current_load > 0.0 {
                        let amount = self.current_load.min(rng.gen_range(10.0..20.0));
                        self.current_load = (self.current_load - amount).max(0.0);
                        dumped = self.destination.clone().map(|dest| (dest, amount));
                    } else {
                        self.status = TruckStatus::Idle;
                        self.destination = None;
                    }
                }
                TruckStatus::Idle => {
                    self.speed = 0.0;
                    if rng.gen::<f64>() < 0.2 {
                        self.status = TruckStatus::Loading;
                    }
                }
                TruckStatus::Maintenance => {
                    self.status = TruckStatus::Idle;
                }
            }
        }

        if matches!(self.status, TruckStatus::Hauling | TruckStatus::Loading) {
            self.fuel_level = (self.fuel_level - rng.gen_range(0.1..0.5)).max(0.0);
        }
        if self.status.is_active() {
            self.engine_hours += hours;
        }

        self.health_score = (self.health_score - rng.gen_range(0.0..0.1)).max(MIN_TRUCK_HEALTH);

        dumped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    fn stockpiles() -> Vec<String> {
        vec!["STOCKPILE_ROM".to_string()]
    }

    #[test]
    fn test_load_bounded_over_long_run() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let ids = stockpiles();
        let mut truck = Truck::new(1, &mut rng);

        for _ in 0..5000 {
            truck.step(&mut rng, &ids, 5.0 / 3600.0);
            assert!(truck.current_load >= 0.0);
            assert!(truck.current_load <= truck.load_capacity);
            assert!(truck.health_score >= MIN_TRUCK_HEALTH);
            assert!(truck.fuel_level >= 0.0);
        }
    }

    #[test]
    fn test_full_truck_starts_hauling() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let ids = stockpiles();
        let mut truck = Truck::new(2, &mut rng);
        truck.status = TruckStatus::Loading;
        truck.current_load = truck.load_capacity;

        truck.step(&mut rng, &ids, 0.0);
        assert_eq!(truck.status, TruckStatus::Hauling);
        assert_eq!(truck.destination.as_deref(), Some("STOCKPILE_ROM"));
    }

    #[test]
    fn test_dumping_reports_tonnage_then_idles() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let ids = stockpiles();
        let mut truck = Truck::new(3, &mut rng);
        truck.status = TruckStatus::Dumping;
        truck.current_load = 12.0;
        truck.destination = Some("STOCKPILE_ROM".to_string());

        let mut total = 0.0;
        while truck.status == TruckStatus::Dumping {
            if let Some((dest, tons)) = truck.step(&mut rng, &ids, 0.0) {
                assert_eq!(dest, "STOCKPILE_ROM");
                total += tons;
            }
        }
        assert!((total - 12.0).abs() < 1e-9);
        assert_eq!(truck.status, TruckStatus::Idle);
        assert!(truck.destination.is_none());
    }

    #[test]
    fn test_hauling_can_reach_dumping_without_travel() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let ids = stockpiles();
        let mut truck = Truck::new(4, &mut rng);
        truck.status = TruckStatus::Hauling;

        let mut ticks = 0;
        while truck.status == TruckStatus::Hauling && ticks < 1000 {
            truck.step(&mut rng, &ids, 0.0);
            ticks += 1;
        }
        assert_eq!(truck.status, TruckStatus::Dumping);
    }
}
