// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Reference dataset loading and per-field statistical profiles

use std::collections::BTreeMap;
use std::path::Path;

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::info;

use crate::error::DatasetError;

/// Historical statistics for one measured field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldProfile {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl FieldProfile {
    /// Summarize a non-empty column of samples
    pub fn from_samples(samples: &[f64]) -> Self {
        let mean = samples.iter().mean();
        // Sample std dev is undefined for a single observation
        let std_dev = if samples.len() > 1 {
            samples.iter().std_dev()
        } else {
            0.0
        };
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self { mean, std_dev, min, max }
    }

    /// Clamp a generated value into the observed envelope
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Historical sensor records used to seed the telemetry generator
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    fields: Vec<String>,
    rows: Vec<Vec<f64>>,
    profiles: BTreeMap<String, FieldProfile>,
}

impl ReferenceDataset {
    /// Load a CSV reference dataset. Any failure here is fatal for the simulator.
    pub fn load(path: &Path, label_columns: &[String]) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::parse(&content, label_columns)?;
        info!(
            "Loaded reference dataset from {:?}: {} rows, {} fields",
            path,
            dataset.len(),
            dataset.fields.len()
        );
        Ok(dataset)
    }

    /// Parse CSV text with a header row.
    ///
    /// A column whose first value is not numeric (timestamps, labels) is skipped;
    /// a numeric column that later contains a non-numeric cell is malformed.
    pub fn parse(text: &str, label_columns: &[String]) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.is_empty() {
            return Err(DatasetError::MissingHeader);
        }

        let mut records: Vec<(usize, StringRecord)> = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            records.push((line, record));
        }

        let (_, first) = records.first().ok_or(DatasetError::NoRows)?;

        let mut numeric = Vec::new();
        for (idx, column) in columns.iter().enumerate() {
            if label_columns.iter().any(|l| l == column) {
                continue;
            }
            if first.get(idx).map_or(false, |v| v.parse::<f64>().is_ok()) {
                numeric.push(idx);
            }
        }
        if numeric.is_empty() {
            return Err(DatasetError::NoNumericColumns);
        }

        let mut rows = Vec::with_capacity(records.len());
        for (line, record) in &records {
            if record.len() != columns.len() {
                return Err(DatasetError::RowLength {
                    line: *line,
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            let mut row = Vec::with_capacity(numeric.len());
            for &idx in &numeric {
                let raw = &record[idx];
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| DatasetError::Malformed {
                        line: *line,
                        column: columns[idx].clone(),
                        value: raw.to_string(),
                    })?;
                row.push(value);
            }
            rows.push(row);
        }

        let fields: Vec<String> = numeric.iter().map(|&i| columns[i].clone()).collect();
        let profiles = fields
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let samples: Vec<f64> = rows.iter().map(|r| r[col]).collect();
                (name.clone(), FieldProfile::from_samples(&samples))
            })
            .collect();

        Ok(Self { fields, rows, profiles })
    }

    /// Build a dataset directly from profiles, with the means as the only base row
    pub fn from_profiles(profiles: BTreeMap<String, FieldProfile>) -> Self {
        let fields: Vec<String> = profiles.keys().cloned().collect();
        let row = fields.iter().map(|f| profiles[f].mean).collect();
        Self {
            fields,
            rows: vec![row],
            profiles,
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn profile(&self, field: &str) -> Option<&FieldProfile> {
        self.profiles.get(field)
    }

    pub fn profiles(&self) -> &BTreeMap<String, FieldProfile> {
        &self.profiles
    }

    /// Numeric values of one record, in `fields()` order
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
