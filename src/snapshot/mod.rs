// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Snapshot assembly
//!
//! Turns a consistent [`FleetView`] into the immutable document streamed to
//! subscribers: entity maps, KPIs, alerts, recommendations and synthetic
//! site context.

mod alerts;
mod context;
mod kpi;

pub use alerts::{
    evaluate_alerts, evaluate_recommendations, Alert, AlertType, Priority, Recommendation,
    RecommendationType, Severity,
};
pub use context::{Shift, ShiftInfo, Weather};
pub use kpi::{ActiveEquipment, Kpis};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::fleet::{Crusher, FleetView, MachineCondition, Stockpile, Truck, Zone};

/// Alert and recommendation thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Fuel percent below which `fuel_low` fires
    pub fuel_low: f64,
    /// Health score below which `maintenance_required` fires
    pub health_low: f64,
    /// Stockpile utilization percent above which `stockpile_full` fires
    pub stockpile_high: f64,
    /// Stockpile utilization percent below which `stockpile_low` fires
    pub stockpile_low: f64,
    /// Idle truck count above which dispatch is recommended
    pub idle_trucks: usize,
    /// Stockpile utilization percent below which replenishment is recommended
    pub stockpile_replenish: f64,
    /// Crusher throughput percent of capacity below which optimization is recommended
    pub crusher_underperformance: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            fuel_low: 20.0,
            health_low: 70.0,
            stockpile_high: 90.0,
            stockpile_low: 10.0,
            idle_trucks: 3,
            stockpile_replenish: 20.0,
            crusher_underperformance: 80.0,
        }
    }
}

/// Driver-level values that are not part of fleet state
#[derive(Debug, Clone)]
pub struct SnapshotContext {
    pub mine_id: String,
    pub speed_multiplier: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationStatus {
    pub tick: u64,
    pub speed_multiplier: f64,
    #[serde(flatten)]
    pub condition: MachineCondition,
}

/// One tick of the whole site. Every key is always present.
#[derive(Debug, Clone, Serialize)]
pub struct TickSnapshot {
    pub timestamp: DateTime<Utc>,
    pub mine_id: String,
    pub trucks: BTreeMap<String, Truck>,
    pub crushers: BTreeMap<String, Crusher>,
    pub stockpiles: BTreeMap<String, Stockpile>,
    pub mine_zones: BTreeMap<String, Zone>,
    pub kpis: Kpis,
    pub weather: Weather,
    pub shift_info: ShiftInfo,
    pub alerts: Vec<Alert>,
    pub ai_recommendations: Vec<Recommendation>,
    pub simulation: SimulationStatus,
}

impl TickSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Build the snapshot for `view`
pub fn assemble<R: Rng + ?Sized>(
    view: FleetView,
    context: &SnapshotContext,
    thresholds: &AlertThresholds,
    rng: &mut R,
    now: DateTime<Utc>,
) -> TickSnapshot {
    let kpis = Kpis::compute(&view);
    let alerts = evaluate_alerts(&view, thresholds, now);
    let ai_recommendations = evaluate_recommendations(&view, thresholds);

    TickSnapshot {
        timestamp: now,
        mine_id: context.mine_id.clone(),
        kpis,
        weather: Weather::synthetic(rng),
        shift_info: ShiftInfo::at(now, rng),
        alerts,
        ai_recommendations,
        simulation: SimulationStatus {
            tick: view.tick,
            speed_multiplier: context.speed_multiplier,
            condition: view.system,
        },
        trucks: view.trucks,
        crushers: view.crushers,
        stockpiles: view.stockpiles,
        mine_zones: view.zones,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::fleet::FleetState;
    use rand_chacha::ChaCha8Rng;

    const KEYS: [&str; 12] = [
        "timestamp",
        "mine_id",
        "trucks",
        "crushers",
        "stockpiles",
        "mine_zones",
        "kpis",
        "weather",
        "shift_info",
        "alerts",
        "ai_recommendations",
        "simulation",
    ];

    fn context() -> SnapshotContext {
        SnapshotContext {
            mine_id: "SMARTMINE_001".to_string(),
            speed_multiplier: 1.0,
        }
    }

    #[test]
    fn test_empty_fleet_keeps_every_key() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let snapshot = assemble(
            FleetView::default(),
            &context(),
            &AlertThresholds::default(),
            &mut rng,
            Utc::now(),
        );
        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

        for key in KEYS {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["trucks"], serde_json::json!({}));
        assert_eq!(json["alerts"], serde_json::json!([]));
        assert_eq!(json["kpis"]["truck_utilization"], 0.0);
        assert_eq!(json["simulation"]["mode"], "normal");
    }

    #[test]
    fn test_wire_shape_of_populated_fleet() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let state = FleetState::initialize(&SimulationConfig::default(), &mut rng);
        let snapshot = assemble(
            state.view(),
            &context(),
            &AlertThresholds::default(),
            &mut rng,
            Utc::now(),
        );
        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

        let truck = &json["trucks"]["TRUCK_001"];
        assert_eq!(truck["id"], "TRUCK_001");
        assert_eq!(truck["mode"], "normal");
        assert!(truck["gps_location"]["lat"].is_number());
        assert!(truck.get("degradation_factor").is_some());

        assert!(json["crushers"]["CRUSHER_1"]["type"].is_string());
        assert_eq!(json["stockpiles"]["STOCKPILE_ROM"]["material_type"], "ROM");
        assert_eq!(json["mine_zones"].as_object().unwrap().len(), 5);
        assert_eq!(json["mine_id"], "SMARTMINE_001");
    }
}
