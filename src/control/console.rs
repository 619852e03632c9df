// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Interactive operator console on stdin

use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::{CommandError, ControlCommand};
use crate::core::SimulatorHandle;

pub const HELP: &str = "\
Commands:
  fault [vibration|temperature|pressure|wear] [TRUCK_ID]  inject a transient fault
  maintenance [TRUCK_ID]                                   reset wear and hold in maintenance
  speed <multiplier>                                       set simulation speed (0.1 - 100)
  status                                                   show streaming status
  score <TRUCK_ID>                                         score a truck's latest telemetry
  stop | quit                                              stop the simulation
  help                                                     show this text";

/// One console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Command(ControlCommand),
    Status,
    Score(String),
    Help,
}

impl FromStr for ConsoleInput {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        match words.next().map(|w| w.to_ascii_lowercase()).as_deref() {
            Some("status") => Ok(ConsoleInput::Status),
            Some("help") | Some("?") => Ok(ConsoleInput::Help),
            Some("score") => {
                let id = words.next().ok_or(CommandError::MissingArgument("score"))?;
                if let Some(extra) = words.next() {
                    return Err(CommandError::UnexpectedArgument(extra.to_string()));
                }
                Ok(ConsoleInput::Score(id.to_string()))
            }
            _ => s.parse().map(ConsoleInput::Command),
        }
    }
}

/// Read commands from stdin until EOF, `stop` or `shutdown`
pub async fn run_console(handle: SimulatorHandle, mut shutdown: broadcast::Receiver<()>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("Console ready, type 'help' for commands");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = shutdown.recv() => break,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Console read error: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<ConsoleInput>() {
            Ok(ConsoleInput::Help) => println!("{}", HELP),
            Ok(ConsoleInput::Status) => match serde_json::to_string_pretty(&handle.status()) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!("Failed to render status: {}", e),
            },
            Ok(ConsoleInput::Score(id)) => match handle.score(&id) {
                Ok(result) => println!(
                    "{}: fault probability {:.3} (predicted: {}), \
                     anomaly score {:.3} (anomaly: {})",
                    id.to_ascii_uppercase(),
                    result.fault_probability,
                    result.fault_prediction,
                    result.anomaly_score,
                    result.is_anomaly
                ),
                Err(e) => println!("{}", e),
            },
            Ok(ConsoleInput::Command(command)) => {
                let stop = command == ControlCommand::Stop;
                if let Err(e) = handle.send(command).await {
                    warn!("{}", e);
                    break;
                }
                if stop {
                    break;
                }
            }
            Err(e) => println!("{} (type 'help' for commands)", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::FaultType;

    #[test]
    fn test_console_input() {
        assert_eq!("status".parse::<ConsoleInput>().unwrap(), ConsoleInput::Status);
        assert_eq!("HELP".parse::<ConsoleInput>().unwrap(), ConsoleInput::Help);
        assert_eq!(
            "score truck_001".parse::<ConsoleInput>().unwrap(),
            ConsoleInput::Score("truck_001".into())
        );
        assert_eq!("score".parse::<ConsoleInput>(), Err(CommandError::MissingArgument("score")));
        assert_eq!(
            "fault temperature".parse::<ConsoleInput>().unwrap(),
            ConsoleInput::Command(ControlCommand::InjectFault {
                fault_type: Some(FaultType::Temperature),
                target: None,
            })
        );
        assert!("launch".parse::<ConsoleInput>().is_err());
    }
}
