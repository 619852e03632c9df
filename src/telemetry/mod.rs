// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Telemetry module - reference profiles and the synthetic sensor generator

mod profile;
mod generator;

pub use profile::{FieldProfile, ReferenceDataset};
pub use generator::{TelemetryGenerator, WEAR_SENSITIVE_FIELDS};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One generated telemetry record, keyed by reference field name
pub type Telemetry = BTreeMap<String, f64>;

/// Fault kinds the simulator can inject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultType {
    Vibration,
    Temperature,
    Pressure,
    Wear,
}

impl FaultType {
    /// Every fault kind, in injection order
    pub const ALL: [FaultType; 4] = [
        FaultType::Vibration,
        FaultType::Temperature,
        FaultType::Pressure,
        FaultType::Wear,
    ];

    /// Reference field distorted by this fault
    pub fn field(&self) -> &'static str {
        match self {
            FaultType::Vibration => "Vibration_Level",
            FaultType::Temperature => "Temperature_Readings",
            FaultType::Pressure => "Pressure_Data",
            FaultType::Wear => "Tool_Wear_Rate",
        }
    }

    /// Multiplier applied to the base value of the distorted field
    pub fn factor(&self) -> f64 {
        match self {
            FaultType::Vibration => 3.0,
            FaultType::Temperature => 1.5,
            FaultType::Pressure => 0.5,
            FaultType::Wear => 2.0,
        }
    }

    /// Scale `base` if `field` is the one this fault distorts
    pub fn apply(&self, field: &str, base: f64) -> f64 {
        if field == self.field() {
            base * self.factor()
        } else {
            base
        }
    }

    /// Pick a fault kind uniformly
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FaultType::Vibration => "vibration",
            FaultType::Temperature => "temperature",
            FaultType::Pressure => "pressure",
            FaultType::Wear => "wear",
        }
    }
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaultType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vibration" => Ok(FaultType::Vibration),
            "temperature" => Ok(FaultType::Temperature),
            "pressure" => Ok(FaultType::Pressure),
            "wear" => Ok(FaultType::Wear),
            other => Err(format!("unknown fault type '{}'", other)),
        }
    }
}
