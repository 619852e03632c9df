// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Derived key performance indicators

use std::collections::BTreeMap;

use serde::Serialize;

use crate::fleet::FleetView;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActiveEquipment {
    pub trucks: usize,
    pub crushers: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Kpis {
    /// Percent of trucks loading, hauling or dumping
    pub truck_utilization: f64,
    /// Percent of crushers running
    pub crusher_availability: f64,
    /// Sum of crusher throughput, t/h
    pub total_throughput: f64,
    pub stockpile_utilization: BTreeMap<String, f64>,
    pub active_equipment: ActiveEquipment,
}

impl Kpis {
    pub fn compute(view: &FleetView) -> Self {
        let active_trucks = view.trucks.values().filter(|t| t.status.is_active()).count();
        let running_crushers = view.crushers.values().filter(|c| c.is_running()).count();

        Self {
            truck_utilization: percent(active_trucks, view.trucks.len()),
            crusher_availability: percent(running_crushers, view.crushers.len()),
            total_throughput: view.crushers.values().map(|c| c.current_throughput).sum(),
            stockpile_utilization: view
                .stockpiles
                .iter()
                .map(|(id, s)| (id.clone(), s.utilization()))
                .collect(),
            active_equipment: ActiveEquipment {
                trucks: active_trucks,
                crushers: running_crushers,
            },
        }
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
