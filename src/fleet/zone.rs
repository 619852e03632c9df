// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Mining zones. Static for the duration of a run.

use rand::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ZoneType {
    #[serde(rename = "Open_Pit")]
    OpenPit,
    Underground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneStatus {
    Active,
    Planned,
    Depleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct Zone {
    pub id: String,
    pub zone_type: ZoneType,
    pub status: ZoneStatus,
    /// Tons
    pub ore_reserve: f64,
    /// g/t
    pub grade: f64,
    pub strip_ratio: f64,
    /// Tons per day
    pub production_target: f64,
    pub current_production: f64,
    pub active_benches: u32,
    pub blast_schedule: Option<String>,
    pub equipment_assigned: Vec<String>,
}

impl Zone {
    pub fn new<R: Rng + ?Sized>(number: usize, rng: &mut R) -> Self {
        Self {
            id: format!("ZONE_{}", number),
            zone_type: if rng.gen_bool(0.5) { ZoneType::OpenPit } else { ZoneType::Underground },
            status: [ZoneStatus::Active, ZoneStatus::Planned, ZoneStatus::Depleted]
                [rng.gen_range(0..3)],
            ore_reserve: rng.gen_range(10000.0..100000.0),
            grade: rng.gen_range(0.8..4.2),
            strip_ratio: rng.gen_range(2.5..8.0),
            production_target: rng.gen_range(500.0..2000.0),
            current_production: 0.0,
            active_benches: rng.gen_range(1..=5),
            blast_schedule: None,
            equipment_assigned: Vec::new(),
        }
    }
}
