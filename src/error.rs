// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Error types shared across the simulator

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the simulator and its query surface
#[derive(Debug, Error)]
pub enum SimError {
    /// No tick has completed yet
    #[error("No current data available")]
    NoData,

    /// The scoring model has not been loaded
    #[error("ML model not loaded")]
    ModelNotReady,

    /// A command referenced an id that does not exist
    #[error("Unknown equipment: {0}")]
    UnknownEquipment(String),

    /// The driver loop is no longer accepting commands
    #[error("Simulator is not running")]
    Stopped,

    /// Reference dataset could not be used
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Reference dataset failures. All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read reference dataset {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid CSV in reference dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("Reference dataset has no header row")]
    MissingHeader,

    #[error("Reference dataset has no data rows")]
    NoRows,

    #[error("Reference dataset has no numeric columns")]
    NoNumericColumns,

    #[error("Row {line} has {found} fields, expected {expected}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Malformed value {value:?} in column {column} at line {line}")]
    Malformed {
        line: usize,
        column: String,
        value: String,
    },
}

/// Result alias for simulator operations
pub type SimResult<T> = Result<T, SimError>;
