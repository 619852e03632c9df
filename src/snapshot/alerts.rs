// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Threshold alerts and dispatch recommendations

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AlertThresholds;
use crate::fleet::{FleetView, TruckStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    FuelLow,
    MaintenanceRequired,
    StockpileFull,
    StockpileLow,
    EquipmentFault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Urgent,
}

/// One alert. Alerts are re-evaluated every tick and never carried over.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    pub equipment: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    fn new(
        alert_type: AlertType,
        severity: Severity,
        equipment: &str,
        message: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            alert_type,
            severity,
            equipment: equipment.to_string(),
            message,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    TruckDispatch,
    StockpileManagement,
    CrusherOptimization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub estimated_impact: String,
}

/// Evaluate every alert predicate against the current fleet
pub fn evaluate_alerts(
    view: &FleetView,
    thresholds: &AlertThresholds,
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if view.system.mode.fault().is_some() {
        alerts.push(Alert::new(
            AlertType::EquipmentFault,
            Severity::Urgent,
            "SYSTEM",
            format!("Site-wide fault active: {}", view.system.mode),
            now,
        ));
    }

    for (id, truck) in &view.trucks {
        if truck.fuel_level < thresholds.fuel_low {
            alerts.push(Alert::new(
                AlertType::FuelLow,
                Severity::Warning,
                id,
                format!("{} fuel level low: {:.1}%", id, truck.fuel_level),
                now,
            ));
        }

        if truck.health_score < thresholds.health_low {
            alerts.push(Alert::new(
                AlertType::MaintenanceRequired,
                Severity::Urgent,
                id,
                format!("{} requires maintenance - health score: {:.1}%", id, truck.health_score),
                now,
            ));
        }

        if let Some(fault) = truck.condition.mode.fault() {
            alerts.push(Alert::new(
                AlertType::EquipmentFault,
                Severity::Urgent,
                id,
                format!("{} {} fault detected", id, fault),
                now,
            ));
        }
    }

    for (id, pile) in &view.stockpiles {
        let utilization = pile.utilization();
        if utilization > thresholds.stockpile_high {
            alerts.push(Alert::new(
                AlertType::StockpileFull,
                Severity::Warning,
                id,
                format!("{} near capacity: {:.1}%", id, utilization),
                now,
            ));
        } else if utilization < thresholds.stockpile_low {
            alerts.push(Alert::new(
                AlertType::StockpileLow,
                Severity::Urgent,
                id,
                format!("{} critically low: {:.1}%", id, utilization),
                now,
            ));
        }
    }

    alerts
}

/// Evaluate the dispatch heuristics
pub fn evaluate_recommendations(
    view: &FleetView,
    thresholds: &AlertThresholds,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let idle_trucks = view.trucks.values().filter(|t| t.status == TruckStatus::Idle).count();
    if idle_trucks > thresholds.idle_trucks {
        recommendations.push(Recommendation {
            kind: RecommendationType::TruckDispatch,
            priority: Priority::Medium,
            title: "Optimize Truck Allocation".to_string(),
            description: format!(
                "{} trucks are idle. Consider redistributing to active zones.",
                idle_trucks
            ),
            estimated_impact: "Increase throughput by 12-18%".to_string(),
        });
    }

    let low_stockpiles = view
        .stockpiles
        .values()
        .filter(|s| s.utilization() < thresholds.stockpile_replenish)
        .count();
    if low_stockpiles > 0 {
        recommendations.push(Recommendation {
            kind: RecommendationType::StockpileManagement,
            priority: Priority::High,
            title: "Replenish Low Stockpiles".to_string(),
            description: format!(
                "{} stockpiles below {:.0}% capacity",
                low_stockpiles, thresholds.stockpile_replenish
            ),
            estimated_impact: "Prevent production disruptions".to_string(),
        });
    }

    let ratio = thresholds.crusher_underperformance / 100.0;
    let underperforming = view
        .crushers
        .values()
        .filter(|c| c.is_running() && c.current_throughput < c.throughput_capacity * ratio)
        .count();
    if underperforming > 0 {
        recommendations.push(Recommendation {
            kind: RecommendationType::CrusherOptimization,
            priority: Priority::Medium,
            title: "Optimize Crusher Performance".to_string(),
            description: format!(
                "{} crushers operating below {:.0}% capacity",
                underperforming, thresholds.crusher_underperformance
            ),
            estimated_impact: "Increase processing efficiency by 15%".to_string(),
        });
    }

    recommendations
}
