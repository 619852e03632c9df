// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Machine condition: operating mode, degradation and fault probability

use std::fmt;

use serde::{Serialize, Serializer};

use crate::telemetry::FaultType;

/// Upper bound of the degradation factor
pub const MAX_DEGRADATION: f64 = 2.0;

/// Upper bound of the derived fault probability
pub const MAX_FAULT_PROBABILITY: f64 = 0.95;

/// Operating mode of a machine or of the whole site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatingMode {
    #[default]
    Normal,
    Fault(FaultType),
    Maintenance,
}

impl OperatingMode {
    pub fn fault(&self) -> Option<FaultType> {
        match self {
            OperatingMode::Fault(fault) => Some(*fault),
            _ => None,
        }
    }

    pub fn is_maintenance(&self) -> bool {
        matches!(self, OperatingMode::Maintenance)
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingMode::Normal => f.write_str("normal"),
            OperatingMode::Fault(fault) => write!(f, "fault_{}", fault),
            OperatingMode::Maintenance => f.write_str("maintenance"),
        }
    }
}

impl Serialize for OperatingMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Wear state shared by trucks and the site-level machine
#[derive(Debug, Clone, Serialize)]
pub struct MachineCondition {
    pub mode: OperatingMode,
    pub degradation_factor: f64,
    pub fault_probability: f64,
    #[serde(skip)]
    hours_since_maintenance: f64,
    #[serde(skip)]
    token: u64,
}

impl Default for MachineCondition {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl MachineCondition {
    pub fn new(hours_since_maintenance: f64) -> Self {
        let mut condition = Self {
            mode: OperatingMode::Normal,
            degradation_factor: 1.0,
            fault_probability: 0.0,
            hours_since_maintenance: hours_since_maintenance.max(0.0),
            token: 0,
        };
        condition.recompute();
        condition
    }

    /// Accrue wear for one tick. Wear does not accrue while under maintenance.
    pub fn advance(&mut self, hours: f64) {
        if !self.mode.is_maintenance() {
            self.hours_since_maintenance += hours;
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.degradation_factor = (1.0 + self.hours_since_maintenance * 0.001).min(MAX_DEGRADATION);
        self.fault_probability = ((self.degradation_factor - 1.0) * 0.5).min(MAX_FAULT_PROBABILITY);
    }

    pub fn enter_fault(&mut self, fault: FaultType, token: u64) {
        self.mode = OperatingMode::Fault(fault);
        self.token = token;
    }

    pub fn enter_maintenance(&mut self, token: u64) {
        self.mode = OperatingMode::Maintenance;
        self.degradation_factor = 1.0;
        self.fault_probability = 0.0;
        self.hours_since_maintenance = 0.0;
        self.token = token;
    }

    /// Return to normal if `token` still identifies the current mode.
    /// A newer fault or maintenance carries a newer token and is left alone.
    pub fn revert(&mut self, token: u64) -> bool {
        if self.token != token || self.mode == OperatingMode::Normal {
            return false;
        }
        self.mode = OperatingMode::Normal;
        true
    }

    pub fn hours_since_maintenance(&self) -> f64 {
        self.hours_since_maintenance
    }
}
