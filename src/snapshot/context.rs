// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Synthetic site context. Weather and crew values are randomly generated
//! placeholders, not measurements.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use rand::prelude::*;
use serde::Serialize;

pub const DAY_SHIFT_START_HOUR: u32 = 6;
pub const NIGHT_SHIFT_START_HOUR: u32 = 18;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Weather {
    /// Celsius
    pub temperature: f64,
    /// Percent
    pub humidity: f64,
    /// km/h
    pub wind_speed: f64,
    /// km
    pub visibility: f64,
}

impl Weather {
    pub fn synthetic<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            temperature: rng.gen_range(15.0..35.0),
            humidity: rng.gen_range(20.0..80.0),
            wind_speed: rng.gen_range(0.0..25.0),
            visibility: rng.gen_range(5.0..15.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Shift {
    #[default]
    Day,
    Night,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShiftInfo {
    pub current_shift: Shift,
    pub shift_start: DateTime<Utc>,
    pub crew_count: u32,
}

impl ShiftInfo {
    /// Shift in effect at `now`. Day runs 06:00-18:00, night covers the rest.
    pub fn at<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let hour = now.hour();
        let day = DAY_SHIFT_START_HOUR..NIGHT_SHIFT_START_HOUR;
        let (current_shift, start_hour, day_offset) = if day.contains(&hour) {
            (Shift::Day, DAY_SHIFT_START_HOUR, 0)
        } else if hour >= NIGHT_SHIFT_START_HOUR {
            (Shift::Night, NIGHT_SHIFT_START_HOUR, 0)
        } else {
            (Shift::Night, NIGHT_SHIFT_START_HOUR, 1)
        };

        let shift_start = (now.date_naive() - Duration::days(day_offset))
            .and_hms_opt(start_hour, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or(now);

        Self {
            current_shift,
            shift_start,
            crew_count: rng.gen_range(25..=45),
        }
    }
}
