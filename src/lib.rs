// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! SmartMine - Mining Operations Digital Twin
//!
//! A synthetic simulator for an open-pit mining site with:
//! - Haul trucks, crushers, stockpiles and mining zones advanced tick by tick
//! - Sensor telemetry sampled from a historical reference dataset
//! - Transient fault injection and maintenance with timed reversion
//! - Derived KPIs, threshold alerts and dispatch recommendations
//! - Real-time snapshot streaming over WebSocket
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Simulator                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌────────────┐   ┌──────────┐               │
//! │  │ Telemetry │ → │   Fleet    │ → │ Snapshot │ → Broadcaster │
//! │  │ Generator │   │   State    │   │ Assembler│       ↓       │
//! │  └───────────┘   └────────────┘   └──────────┘   WebSocket   │
//! │                        ↑                                     │
//! │  ┌───────────┐   ┌────────────┐   ┌──────────┐               │
//! │  │  Console  │ → │  Control   │ → │Reversion │               │
//! │  │           │   │  Channel   │   │  Queue   │               │
//! │  └───────────┘   └────────────┘   └──────────┘               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![allow(dead_code)]

pub mod core;
pub mod telemetry;
pub mod fleet;
pub mod snapshot;
pub mod streaming;
pub mod control;
pub mod scoring;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use config::Config;
pub use core::{Simulator, SimulatorHandle, StreamingStatus};
pub use control::{ControlCommand, ControlHandle};
pub use error::{DatasetError, SimError, SimResult};
pub use fleet::{FleetState, FleetStore, Scope};
pub use scoring::{FaultScorer, ProfileScorer, ScoreResult, ScoringService};
pub use snapshot::TickSnapshot;
pub use streaming::{Broadcaster, WebSocketServer};
pub use telemetry::{FaultType, ReferenceDataset, TelemetryGenerator};

/// SmartMine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// SmartMine name
pub const NAME: &str = "SmartMine";
