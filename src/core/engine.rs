// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Simulation driver - owns the tick loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::Scheduler;
use crate::config::{Config, SimulationConfig};
use crate::control::{clamp_speed, ControlCommand, ControlHandle};
use crate::error::{SimError, SimResult};
use crate::fleet::{FleetState, FleetStore, OperatingMode, Scope};
use crate::scoring::{ScoreResult, ScoringService};
use crate::snapshot::{assemble, AlertThresholds, SnapshotContext, TickSnapshot};
use crate::streaming::Broadcaster;
use crate::telemetry::{FaultType, ReferenceDataset, TelemetryGenerator};

type Latest = Option<Arc<TickSnapshot>>;

/// Streaming status as reported to operators
#[derive(Debug, Clone, Serialize)]
pub struct StreamingStatus {
    pub active: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub tick: u64,
    pub trucks: usize,
    pub crushers: usize,
    pub stockpiles: usize,
    pub subscribers: usize,
}

/// The simulation driver. Sole writer of fleet state.
pub struct Simulator {
    config: SimulationConfig,
    thresholds: AlertThresholds,
    fleet: FleetStore,
    generator: TelemetryGenerator,
    broadcaster: Broadcaster,
    scheduler: Scheduler,
    scoring: ScoringService,
    rng: ChaCha8Rng,
    speed: f64,
    control: ControlHandle,
    control_rx: mpsc::Receiver<ControlCommand>,
    latest: watch::Sender<Latest>,
    running: Arc<AtomicBool>,
}

impl Simulator {
    pub fn new(config: &Config, dataset: Arc<ReferenceDataset>) -> Self {
        let mut simulation = config.simulation.clone();
        let interval = simulation.bounded_tick_interval();
        if interval != simulation.tick_interval_secs {
            warn!(
                "Tick interval {}s out of range, using {}s",
                simulation.tick_interval_secs, interval
            );
            simulation.tick_interval_secs = interval;
        }

        let mut rng = match simulation.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let fleet = FleetStore::new(FleetState::initialize(&simulation, &mut rng));
        let (control, control_rx) = ControlHandle::channel(32);
        let (latest, _) = watch::channel(None);

        Self {
            speed: clamp_speed(simulation.speed_multiplier),
            config: simulation,
            thresholds: config.alerts.clone(),
            fleet,
            generator: TelemetryGenerator::new(dataset),
            broadcaster: Broadcaster::new(config.streaming.subscriber_buffer),
            scheduler: Scheduler::new(),
            scoring: ScoringService::new(),
            rng,
            control,
            control_rx,
            latest,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> SimulatorHandle {
        SimulatorHandle {
            latest: self.latest.subscribe(),
            control: self.control.clone(),
            broadcaster: self.broadcaster.clone(),
            scoring: self.scoring.clone(),
            fleet: self.fleet.clone(),
            running: self.running.clone(),
        }
    }

    pub fn broadcaster(&self) -> Broadcaster {
        self.broadcaster.clone()
    }

    pub fn scoring(&self) -> &ScoringService {
        &self.scoring
    }

    /// Wall-clock time between ticks at the current speed
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(self.config.tick_interval_secs / self.speed)
    }

    /// Drive ticks until a stop command or `shutdown`
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        self.running.store(true, Ordering::SeqCst);
        info!(
            "Simulation started: tick interval {}s, speed {}x",
            self.config.tick_interval_secs, self.speed
        );

        let mut last_tick: Option<Instant> = None;

        loop {
            let deadline = match last_tick {
                Some(t) => t + self.period(),
                None => Instant::now(),
            };

            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    let now = Instant::now();
                    last_tick = Some(now);
                    self.tick(now);
                }
                Some(command) = self.control_rx.recv() => {
                    if !self.apply(command) {
                        break;
                    }
                }
                _ = shutdown.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!("Simulation stopped");
    }

    /// One full tick. Returns the published snapshot.
    pub fn tick(&mut self, now: Instant) -> Arc<TickSnapshot> {
        for reversion in self.scheduler.drain_due(now) {
            self.fleet.write().revert(&reversion.scope, reversion.token);
        }

        self.maybe_random_fault(now);

        self.fleet.write().advance_tick(&self.generator, &mut self.rng);
        // sole writer, so this is exactly the post-tick state
        let view = self.fleet.read_snapshot_inputs();

        let context = SnapshotContext {
            mine_id: self.config.mine_id.clone(),
            speed_multiplier: self.speed,
        };
        let snapshot = Arc::new(assemble(
            view,
            &context,
            &self.thresholds,
            &mut self.rng,
            Utc::now(),
        ));
        self.latest.send_replace(Some(snapshot.clone()));

        match snapshot.to_json() {
            Ok(json) => {
                let report = self.broadcaster.broadcast(Arc::from(json));
                debug!(
                    "Tick {} broadcast: {} delivered, {} lagged, {} pruned",
                    snapshot.simulation.tick, report.delivered, report.lagged, report.pruned
                );
            }
            Err(e) => error!("Failed to serialize snapshot: {}", e),
        }

        snapshot
    }

    /// Apply one operator command. Returns false on stop.
    pub fn apply(&mut self, command: ControlCommand) -> bool {
        let now = Instant::now();
        match command {
            ControlCommand::InjectFault { fault_type, target } => {
                let fault = fault_type.unwrap_or_else(|| FaultType::random(&mut self.rng));
                let scope = Scope::from_target(target.as_deref());
                let duration = Duration::from_secs(self.config.fault_duration_secs);
                self.apply_scoped(now + duration, scope, |fleet, scope| {
                    fleet.inject_fault(scope, fault)
                });
            }
            ControlCommand::PerformMaintenance { target } => {
                let scope = Scope::from_target(target.as_deref());
                let duration = Duration::from_secs(self.config.maintenance_duration_secs);
                self.apply_scoped(now + duration, scope, |fleet, scope| {
                    fleet.perform_maintenance(scope)
                });
            }
            ControlCommand::SetSpeed(multiplier) => {
                self.speed = clamp_speed(multiplier);
                info!("Simulation speed set to {}x", self.speed);
            }
            ControlCommand::Stop => {
                info!("Stop requested");
                return false;
            }
        }
        true
    }

    fn apply_scoped<F>(&mut self, revert_at: Instant, scope: Scope, mutate: F)
    where
        F: FnOnce(&mut FleetState, &Scope) -> SimResult<u64>,
    {
        let result = {
            let mut fleet = self.fleet.write();
            mutate(&mut *fleet, &scope)
        };
        match result {
            Ok(token) => self.scheduler.schedule(revert_at, scope, token),
            Err(e) => warn!("Command rejected: {}", e),
        }
    }

    fn maybe_random_fault(&mut self, now: Instant) {
        let p = self.config.random_fault_probability.clamp(0.0, 1.0);
        if self.fleet.read().system().mode != OperatingMode::Normal || !self.rng.gen_bool(p) {
            return;
        }
        let fault = FaultType::random(&mut self.rng);
        info!("Random {} fault occurred", fault);
        let duration = Duration::from_secs(self.config.fault_duration_secs);
        self.apply_scoped(now + duration, Scope::System, |fleet, scope| {
            fleet.inject_fault(scope, fault)
        });
    }
}

/// Cloneable query and control surface for a running [`Simulator`]
#[derive(Clone)]
pub struct SimulatorHandle {
    latest: watch::Receiver<Latest>,
    control: ControlHandle,
    broadcaster: Broadcaster,
    scoring: ScoringService,
    fleet: FleetStore,
    running: Arc<AtomicBool>,
}

impl SimulatorHandle {
    /// Most recent snapshot
    pub fn current(&self) -> SimResult<Arc<TickSnapshot>> {
        self.latest.borrow().clone().ok_or(SimError::NoData)
    }

    /// Receiver that wakes on every published snapshot
    pub fn updates(&self) -> watch::Receiver<Latest> {
        self.latest.clone()
    }

    pub fn status(&self) -> StreamingStatus {
        let latest = self.latest.borrow().clone();
        let fleet = self.fleet.read();
        StreamingStatus {
            active: self.running.load(Ordering::SeqCst),
            last_update: latest.as_ref().map(|s| s.timestamp),
            tick: fleet.tick(),
            trucks: fleet.trucks().len(),
            crushers: fleet.crushers().len(),
            stockpiles: fleet.stockpiles().len(),
            subscribers: self.broadcaster.subscriber_count(),
        }
    }

    /// Score the latest telemetry of one truck
    pub fn score(&self, truck_id: &str) -> SimResult<ScoreResult> {
        if !self.scoring.is_ready() {
            return Err(SimError::ModelNotReady);
        }
        let snapshot = self.current()?;
        let id = truck_id.to_ascii_uppercase();
        let truck = snapshot
            .trucks
            .get(&id)
            .ok_or(SimError::UnknownEquipment(id.clone()))?;
        self.scoring.score(&truck.sensors)
    }

    pub async fn send(&self, command: ControlCommand) -> SimResult<()> {
        self.control.send(command).await
    }
}
