// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Control surface - operator commands and the console reader

mod console;

pub use console::{run_console, ConsoleInput, HELP};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::error::{SimError, SimResult};
use crate::telemetry::FaultType;

pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 100.0;

/// Clamp a requested multiplier into [`MIN_SPEED`, `MAX_SPEED`]. Zero, negative
/// and NaN requests become the minimum.
pub fn clamp_speed(multiplier: f64) -> f64 {
    if multiplier > MIN_SPEED {
        multiplier.min(MAX_SPEED)
    } else {
        MIN_SPEED
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// Missing type means a random one; missing target means the whole system
    InjectFault {
        fault_type: Option<FaultType>,
        target: Option<String>,
    },
    PerformMaintenance {
        target: Option<String>,
    },
    SetSpeed(f64),
    Stop,
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::InjectFault { fault_type, target } => {
                f.write_str("fault")?;
                if let Some(t) = fault_type {
                    write!(f, " {}", t)?;
                }
                if let Some(t) = target {
                    write!(f, " {}", t)?;
                }
                Ok(())
            }
            ControlCommand::PerformMaintenance { target: Some(t) } => {
                write!(f, "maintenance {}", t)
            }
            ControlCommand::PerformMaintenance { target: None } => f.write_str("maintenance"),
            ControlCommand::SetSpeed(x) => write!(f, "speed {}", x),
            ControlCommand::Stop => f.write_str("stop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("invalid speed multiplier '{0}'")]
    InvalidSpeed(String),
}

impl FromStr for ControlCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        let command = match verb.as_str() {
            "fault" => {
                let mut args = args.iter();
                let mut fault_type = None;
                let mut target = None;
                if let Some(first) = args.next() {
                    match first.parse::<FaultType>() {
                        Ok(t) => fault_type = Some(t),
                        Err(_) => target = Some(first.to_string()),
                    }
                }
                if target.is_none() {
                    target = args.next().map(|t| t.to_string());
                }
                if let Some(extra) = args.next() {
                    return Err(CommandError::UnexpectedArgument(extra.to_string()));
                }
                ControlCommand::InjectFault { fault_type, target }
            }
            "maintenance" => {
                if let Some(extra) = args.get(1) {
                    return Err(CommandError::UnexpectedArgument(extra.to_string()));
                }
                ControlCommand::PerformMaintenance {
                    target: args.first().map(|t| t.to_string()),
                }
            }
            "speed" => {
                let raw = args.first().ok_or(CommandError::MissingArgument("speed"))?;
                if let Some(extra) = args.get(1) {
                    return Err(CommandError::UnexpectedArgument(extra.to_string()));
                }
                let value: f64 = raw
                    .parse()
                    .map_err(|_| CommandError::InvalidSpeed(raw.to_string()))?;
                if !value.is_finite() {
                    return Err(CommandError::InvalidSpeed(raw.to_string()));
                }
                ControlCommand::SetSpeed(clamp_speed(value))
            }
            "stop" | "quit" => {
                if let Some(extra) = args.first() {
                    return Err(CommandError::UnexpectedArgument(extra.to_string()));
                }
                ControlCommand::Stop
            }
            _ => return Err(CommandError::Unknown(verb)),
        };

        Ok(command)
    }
}

/// Sending side of the driver's command channel
#[derive(Clone)]
pub struct ControlHandle {
    tx: mpsc::Sender<ControlCommand>,
}

impl ControlHandle {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ControlCommand>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub async fn send(&self, command: ControlCommand) -> SimResult<()> {
        self.tx.send(command).await.map_err(|_| SimError::Stopped)
    }
}
