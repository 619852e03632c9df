// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Core module - the simulation driver and its reversion queue

mod engine;
mod scheduler;

pub use engine::{Simulator, SimulatorHandle, StreamingStatus};
pub use scheduler::{Reversion, Scheduler};
