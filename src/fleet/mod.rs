// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Fleet state store - owns every simulated entity and advances it tick by tick

mod condition;
mod truck;
mod crusher;
mod stockpile;
mod zone;

pub use condition::{MachineCondition, OperatingMode, MAX_DEGRADATION, MAX_FAULT_PROBABILITY};
pub use truck::{GpsLocation, Truck, TruckStatus};
pub use crusher::{
    Crusher, CrusherStatus, CrusherType, CRUSHER_CRITICAL_HEALTH, CRUSHER_CRITICAL_WEAR,
};
pub use stockpile::{Location, Material, Stockpile};
pub use zone::{Zone, ZoneStatus, ZoneType};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rand::prelude::*;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};
use crate::telemetry::{FaultType, TelemetryGenerator};

/// Reference latitude of the simulated site
pub const SITE_LAT: f64 = -26.2041;
/// Reference longitude of the simulated site
pub const SITE_LNG: f64 = 28.0473;

/// Maximum equipment health score
pub const MAX_HEALTH: f64 = 100.0;
/// Truck health never decays below this
pub const MIN_TRUCK_HEALTH: f64 = 50.0;

/// Target of a fault or maintenance command
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    System,
    Truck(String),
}

impl Scope {
    /// `None`, `system` and `all` address the whole site
    pub fn from_target(target: Option<&str>) -> Self {
        match target {
            None => Scope::System,
            Some(t) if t.eq_ignore_ascii_case("system") || t.eq_ignore_ascii_case("all") => {
                Scope::System
            }
            Some(t) => Scope::Truck(t.to_ascii_uppercase()),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::System => f.write_str("system"),
            Scope::Truck(id) => f.write_str(id),
        }
    }
}

/// Consistent copy of the fleet, taken under a single read lock
#[derive(Debug, Clone, Default)]
pub struct FleetView {
    pub tick: u64,
    pub trucks: BTreeMap<String, Truck>,
    pub crushers: BTreeMap<String, Crusher>,
    pub stockpiles: BTreeMap<String, Stockpile>,
    pub zones: BTreeMap<String, Zone>,
    pub system: MachineCondition,
}

/// Authoritative entity collections
#[derive(Debug, Clone)]
pub struct FleetState {
    tick: u64,
    trucks: BTreeMap<String, Truck>,
    crushers: BTreeMap<String, Crusher>,
    stockpiles: BTreeMap<String, Stockpile>,
    zones: BTreeMap<String, Zone>,
    system: MachineCondition,
    next_token: u64,
    tick_secs: f64,
    crusher_maintenance_ticks: u32,
}

impl FleetState {
    /// Create the fleet with randomized, bounded initial values
    pub fn initialize<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Self {
        let trucks = (1..=config.truck_count)
            .map(|n| Truck::new(n, rng))
            .map(|t| (t.id.clone(), t))
            .collect();
        let crushers = (1..=config.crusher_count)
            .map(|n| Crusher::new(n, rng, config.crusher_maintenance_ticks))
            .map(|c| (c.id.clone(), c))
            .collect();
        let stockpiles = Material::ALL
            .iter()
            .map(|&m| Stockpile::new(m, rng))
            .map(|s| (s.id.clone(), s))
            .collect();
        let zones = (1..=config.zone_count)
            .map(|n| Zone::new(n, rng))
            .map(|z| (z.id.clone(), z))
            .collect();

        let state = Self {
            tick: 0,
            trucks,
            crushers,
            stockpiles,
            zones,
            system: MachineCondition::default(),
            next_token: 0,
            tick_secs: config.tick_interval_secs.max(0.0),
            crusher_maintenance_ticks: config.crusher_maintenance_ticks,
        };

        info!(
            "Fleet initialized: {} trucks, {} crushers, {} stockpiles, {} zones",
            state.trucks.len(),
            state.crushers.len(),
            state.stockpiles.len(),
            state.zones.len()
        );
        state
    }

    /// Apply exactly one state-transition step to every entity
    pub fn advance_tick<R: Rng + ?Sized>(&mut self, generator: &TelemetryGenerator, rng: &mut R) {
        self.tick += 1;
        let hours = self.tick_secs / 3600.0;
        let time_factor = self.tick as f64 * self.tick_secs;

        self.system.advance(hours);
        let system_fault = self.system.mode.fault();
        let system_degradation = self.system.degradation_factor;

        let stockpile_ids: Vec<String> = self.stockpiles.keys().cloned().collect();

        for truck in self.trucks.values_mut() {
            truck.condition.advance(hours);
            if let Some((dest, tons)) = truck.step(rng, &stockpile_ids, hours) {
                if let Some(pile) = self.stockpiles.get_mut(&dest) {
                    pile.receive(tons);
                }
            }

            let fault = truck.condition.mode.fault().or(system_fault);
            let degradation = truck.condition.degradation_factor.max(system_degradation);
            truck.sensors = generator.sample(rng, fault, degradation, time_factor);
        }

        for crusher in self.crushers.values_mut() {
            crusher.step(rng, self.crusher_maintenance_ticks);
            crusher.sensors = generator.sample(rng, system_fault, system_degradation, time_factor);
        }

        let running_crushers = self.crushers.values().filter(|c| c.is_running()).count();
        for (id, pile) in self.stockpiles.iter_mut() {
            let mut fill_rate = 0.0;
            for truck in self.trucks.values() {
                if truck.status == TruckStatus::Dumping
                    && truck.destination.as_deref() == Some(id.as_str())
                {
                    fill_rate += rng.gen_range(50.0..100.0);
                }
            }

            let mut discharge_rate = 0.0;
            if pile.material_type.feeds_crushers() {
                for _ in 0..running_crushers {
                    discharge_rate += rng.gen_range(30.0..80.0);
                }
            }

            pile.apply_rates(fill_rate, discharge_rate);
        }

        debug!("Fleet advanced to tick {}", self.tick);
    }

    /// Force `scope` into a transient fault. Returns the token for its reversion.
    pub fn inject_fault(&mut self, scope: &Scope, fault: FaultType) -> SimResult<u64> {
        let token = self.issue_token();
        self.condition_mut(scope)?.enter_fault(fault, token);
        info!("Fault injected on {}: {}", scope, fault);
        Ok(token)
    }

    /// Reset wear for `scope` and hold it in maintenance. Returns the reversion token.
    pub fn perform_maintenance(&mut self, scope: &Scope) -> SimResult<u64> {
        let token = self.issue_token();
        match scope {
            Scope::System => self.system.enter_maintenance(token),
            Scope::Truck(id) => {
                let truck = self
                    .trucks
                    .get_mut(id)
                    .ok_or_else(|| SimError::UnknownEquipment(id.clone()))?;
                truck.condition.enter_maintenance(token);
                truck.health_score = MAX_HEALTH;
                truck.last_maintenance = Utc::now();
                truck.status = TruckStatus::Maintenance;
                truck.speed = 0.0;
            }
        }
        info!("Maintenance performed on {}", scope);
        Ok(token)
    }

    /// Return `scope` to normal if `token` still identifies its current mode
    pub fn revert(&mut self, scope: &Scope, token: u64) -> bool {
        let reverted = match self.condition_mut(scope) {
            Ok(condition) => condition.revert(token),
            Err(_) => false,
        };
        if reverted {
            if let Scope::Truck(id) = scope {
                if let Some(truck) = self.trucks.get_mut(id) {
                    if truck.status == TruckStatus::Maintenance {
                        truck.status = TruckStatus::Idle;
                    }
                }
            }
            info!("{} back to normal", scope);
        }
        reverted
    }

    /// Copy of all collections for snapshot assembly
    pub fn view(&self) -> FleetView {
        FleetView {
            tick: self.tick,
            trucks: self.trucks.clone(),
            crushers: self.crushers.clone(),
            stockpiles: self.stockpiles.clone(),
            zones: self.zones.clone(),
            system: self.system.clone(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn trucks(&self) -> &BTreeMap<String, Truck> {
        &self.trucks
    }

    pub fn crushers(&self) -> &BTreeMap<String, Crusher> {
        &self.crushers
    }

    pub fn stockpiles(&self) -> &BTreeMap<String, Stockpile> {
        &self.stockpiles
    }

    pub fn zones(&self) -> &BTreeMap<String, Zone> {
        &self.zones
    }

    pub fn system(&self) -> &MachineCondition {
        &self.system
    }

    pub fn truck(&self, id: &str) -> Option<&Truck> {
        self.trucks.get(id)
    }

    fn condition_mut(&mut self, scope: &Scope) -> SimResult<&mut MachineCondition> {
        match scope {
            Scope::System => Ok(&mut self.system),
            Scope::Truck(id) => self
                .trucks
                .get_mut(id)
                .map(|t| &mut t.condition)
                .ok_or_else(|| SimError::UnknownEquipment(id.clone())),
        }
    }

    fn issue_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }
}

/// Shared handle to the fleet. A tick holds the write lock for its whole step,
/// so readers see either the pre-tick or the post-tick state, never a mix.
#[derive(Clone)]
pub struct FleetStore {
    inner: Arc<RwLock<FleetState>>,
}

impl FleetStore {
    pub fn new(state: FleetState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, FleetState> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, FleetState> {
        self.inner.write()
    }

    pub fn read_snapshot_inputs(&self) -> FleetView {
        self.inner.read().view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{FieldProfile, ReferenceDataset};
    use rand_chacha::ChaCha8Rng;

    fn generator() -> TelemetryGenerator {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "Tool_Wear_Rate".to_string(),
            FieldProfile { mean: 10.0, std_dev: 0.0, min: 0.0, max: 100.0 },
        );
        profiles.insert(
            "Vibration_Level".to_string(),
            FieldProfile { mean: 1.0, std_dev: 0.5, min: 0.0, max: 5.0 },
        );
        TelemetryGenerator::new(Arc::new(ReferenceDataset::from_profiles(profiles)))
    }

    fn fleet(rng: &mut ChaCha8Rng) -> FleetState {
        FleetState::initialize(&SimulationConfig::default(), rng)
    }

    #[test]
    fn test_initial_population() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let state = fleet(&mut rng);
        assert_eq!(state.trucks().len(), 15);
        assert_eq!(state.crushers().len(), 3);
        assert_eq!(state.stockpiles().len(), 4);
        assert_eq!(state.zones().len(), 5);
        assert!(state.truck("TRUCK_001").is_some());
        assert!(state.truck("TRUCK_015").is_some());
        assert!(state.stockpiles().contains_key("STOCKPILE_Crushed_Ore"));
    }

    #[test]
    fn test_invariants_hold_over_many_ticks() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let generator = generator();
        let mut state = fleet(&mut rng);

        for _ in 0..2000 {
            state.advance_tick(&generator, &mut rng);
            for truck in state.trucks().values() {
                assert!(truck.current_load >= 0.0 && truck.current_load <= truck.load_capacity);
                assert!(truck.health_score >= MIN_TRUCK_HEALTH);
                for (field, value) in &truck.sensors {
                    let profile = generator.dataset().profile(field).unwrap();
                    assert!(profile.contains(*value));
                }
            }
            for pile in state.stockpiles().values() {
                assert!(pile.current_volume >= 0.0 && pile.current_volume <= pile.max_capacity);
            }
        }
        assert_eq!(state.tick(), 2000);
    }

    #[test]
    fn test_wear_fault_scales_truck_telemetry() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let generator = generator();
        let mut state = fleet(&mut rng);
        let scope = Scope::Truck("TRUCK_002".to_string());

        state.inject_fault(&scope, FaultType::Wear).unwrap();
        state.advance_tick(&generator, &mut rng);

        assert_eq!(state.truck("TRUCK_002").unwrap().sensors["Tool_Wear_Rate"], 20.0);
        assert_eq!(state.truck("TRUCK_003").unwrap().sensors["Tool_Wear_Rate"], 10.0);
        assert_eq!(
            state.truck("TRUCK_002").unwrap().condition.mode,
            OperatingMode::Fault(FaultType::Wear)
        );
    }

    #[test]
    fn test_system_fault_reaches_every_machine() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let generator = generator();
        let mut state = fleet(&mut rng);

        let token = state.inject_fault(&Scope::System, FaultType::Wear).unwrap();
        state.advance_tick(&generator, &mut rng);
        assert!(state.trucks().values().all(|t| t.sensors["Tool_Wear_Rate"] == 20.0));
        assert!(state.crushers().values().all(|c| c.sensors["Tool_Wear_Rate"] == 20.0));

        assert!(state.revert(&Scope::System, token));
        state.advance_tick(&generator, &mut rng);
        assert!(state.trucks().values().all(|t| t.sensors["Tool_Wear_Rate"] == 10.0));
    }

    #[test]
    fn test_maintenance_is_idempotent_on_health() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut state = fleet(&mut rng);
        let scope = Scope::Truck("TRUCK_001".to_string());

        state.perform_maintenance(&scope).unwrap();
        assert_eq!(state.truck("TRUCK_001").unwrap().health_score, MAX_HEALTH);
        state.perform_maintenance(&scope).unwrap();
        assert_eq!(state.truck("TRUCK_001").unwrap().health_score, MAX_HEALTH);

        let truck = state.truck("TRUCK_001").unwrap();
        assert_eq!(truck.condition.degradation_factor, 1.0);
        assert_eq!(truck.condition.fault_probability, 0.0);
        assert_eq!(truck.status, TruckStatus::Maintenance);
    }

    #[test]
    fn test_maintenance_reverts_to_idle() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let generator = generator();
        let mut state = fleet(&mut rng);
        let scope = Scope::Truck("TRUCK_004".to_string());

        let token = state.perform_maintenance(&scope).unwrap();
        state.advance_tick(&generator, &mut rng);
        let truck = state.truck("TRUCK_004").unwrap();
        assert_eq!(truck.status, TruckStatus::Maintenance);
        assert_eq!(truck.condition.degradation_factor, 1.0);

        assert!(state.revert(&scope, token));
        let truck = state.truck("TRUCK_004").unwrap();
        assert_eq!(truck.status, TruckStatus::Idle);
        assert_eq!(truck.condition.mode, OperatingMode::Normal);
    }

    #[test]
    fn test_unknown_truck_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut state = fleet(&mut rng);
        let scope = Scope::Truck("TRUCK_999".to_string());

        assert!(matches!(
            state.inject_fault(&scope, FaultType::Wear),
            Err(SimError::UnknownEquipment(_))
        ));
        assert!(state.perform_maintenance(&scope).is_err());
        assert!(!state.revert(&scope, 1));
    }

    #[test]
    fn test_concurrent_readers_see_whole_ticks() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let store = FleetStore::new(fleet(&mut rng));
        let initial = store.read_snapshot_inputs();
        let hours = SimulationConfig::default().tick_interval_secs / 3600.0;
        const TICKS: u64 = 500;

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                let generator = generator();
                for _ in 0..TICKS {
                    store.write().advance_tick(&generator, &mut rng);
                }
            })
        };

        let mut tick = 0;
        while tick < TICKS {
            let view = store.read_snapshot_inputs();
            let elapsed = view.tick as f64 * hours;
            assert!((view.system.hours_since_maintenance() - elapsed).abs() < 1e-9);
            for (id, truck) in &view.trucks {
                let start = initial.trucks[id].condition.hours_since_maintenance();
                let accrued = truck.condition.hours_since_maintenance() - start;
                assert!((accrued - elapsed).abs() < 1e-9, "{} at tick {}", id, view.tick);
                assert_eq!(truck.sensors.is_empty(), view.tick == 0);
            }
            for crusher in view.crushers.values() {
                assert_eq!(crusher.sensors.is_empty(), view.tick == 0);
            }
            tick = view.tick;
        }

        writer.join().unwrap();
    }

    #[test]
    fn test_scope_from_target() {
        assert_eq!(Scope::from_target(None), Scope::System);
        assert_eq!(Scope::from_target(Some("ALL")), Scope::System);
        assert_eq!(Scope::from_target(Some("truck_007")), Scope::Truck("TRUCK_007".into()));
    }
}
