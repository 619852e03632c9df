// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Stockpile inventory model

use rand::prelude::*;
use serde::Serialize;

use super::{SITE_LAT, SITE_LNG};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Material {
    #[serde(rename = "ROM")]
    Rom,
    #[serde(rename = "Crushed_Ore")]
    CrushedOre,
    #[serde(rename = "Fine_Ore")]
    FineOre,
    #[serde(rename = "Waste_Rock")]
    WasteRock,
}

impl Material {
    pub const ALL: [Material; 4] = [
        Material::Rom,
        Material::CrushedOre,
        Material::FineOre,
        Material::WasteRock,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Material::Rom => "ROM",
            Material::CrushedOre => "Crushed_Ore",
            Material::FineOre => "Fine_Ore",
            Material::WasteRock => "Waste_Rock",
        }
    }

    pub fn is_ore(&self) -> bool {
        matches!(self, Material::CrushedOre | Material::FineOre)
    }

    /// Whether crushers draw feed from piles of this material
    pub fn feeds_crushers(&self) -> bool {
        matches!(self, Material::Rom | Material::CrushedOre)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// Material stockpile. Volume is kept within [0, max_capacity].
#[derive(Debug, Clone, Serialize)]
pub struct Stockpile {
    pub id: String,
    pub material_type: Material,
    /// Tons
    pub current_volume: f64,
    pub max_capacity: f64,
    pub min_threshold: f64,
    pub max_threshold: f64,
    /// Tons per hour
    pub fill_rate: f64,
    pub discharge_rate: f64,
    pub location: Location,
    pub grade: f64,
    pub moisture_content: f64,
}

impl Stockpile {
    pub fn new<R: Rng + ?Sized>(material: Material, rng: &mut R) -> Self {
        Self {
            id: format!("STOCKPILE_{}", material.name()),
            material_type: material,
            current_volume: rng.gen_range(5000.0..50000.0),
            max_capacity: rng.gen_range(60000.0..100000.0),
            min_threshold: rng.gen_range(2000.0..5000.0),
            max_threshold: rng.gen_range(80000.0..95000.0),
            fill_rate: 0.0,
            discharge_rate: 0.0,
            location: Location {
                lat: SITE_LAT + rng.gen_range(-0.005..0.005),
                lng: SITE_LNG + rng.gen_range(-0.005..0.005),
            },
            grade: if material.is_ore() { rng.gen_range(0.5..3.5) } else { 0.0 },
            moisture_content: rng.gen_range(2.0..8.0),
        }
    }

    /// Add dumped tonnage
    pub fn receive(&mut self, tons: f64) {
        self.current_volume = self.clamp_volume(self.current_volume + tons);
    }

    /// Apply this tick's fill/discharge balance
    pub fn apply_rates(&mut self, fill_rate: f64, discharge_rate: f64) {
        self.fill_rate = fill_rate;
        self.discharge_rate = discharge_rate;
        let net_change = (fill_rate - discharge_rate) / 60.0;
        self.current_volume = self.clamp_volume(self.current_volume + net_change);
    }

    /// Percent of max capacity
    pub fn utilization(&self) -> f64 {
        if self.max_capacity > 0.0 {
            self.current_volume / self.max_capacity * 100.0
        } else {
            0.0
        }
    }

    fn clamp_volume(&self, volume: f64) -> f64 {
        volume.max(0.0).min(self.max_capacity.max(0.0))
    }
}
