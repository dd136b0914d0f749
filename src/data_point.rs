// ABOUTME: Workout-relative data points converted from raw health samples
// ABOUTME: Tagged union of instant readings and duration-weighted ranged readings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use crate::kinds::{ELEVATION_ASCENDED_KEY, ELEVATION_DESCENDED_KEY};
use crate::models::{seconds_between, RawSample};
use crate::units::Unit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A measurement positioned in seconds since the workout started.
///
/// A ranged reading whose start equals its end is always represented as
/// `Instant`; use [`DataPoint::ranged`] to get that normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataPoint {
    /// Reading taken at a single instant
    Instant {
        /// Seconds since workout start
        timestamp: f64,
        /// Value in `unit`
        value: f64,
        /// Unit of `value`
        unit: Unit,
        /// Side-channel metadata (elevation deltas in meters)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, f64>>,
    },
    /// Reading valid over `[start, end)`
    Ranged {
        /// Seconds since workout start
        start: f64,
        /// Seconds since workout start, strictly greater than `start`
        end: f64,
        /// Value in `unit` for the whole range
        value: f64,
        /// Unit of `value`
        unit: Unit,
        /// Side-channel metadata (elevation deltas in meters)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, f64>>,
    },
}

impl DataPoint {
    /// Instant reading
    #[must_use]
    pub const fn instant(timestamp: f64, value: f64, unit: Unit) -> Self {
        Self::Instant {
            timestamp,
            value,
            unit,
            metadata: None,
        }
    }

    /// Ranged reading, collapsed to an instant when `start == end`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `end < start` or either bound is not finite
    pub fn ranged(start: f64, end: f64, value: f64, unit: Unit) -> AppResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(AppError::invalid_input(format!(
                "data point bounds must be finite, got [{start}, {end}]"
            )));
        }
        if end < start {
            return Err(AppError::invalid_input(format!(
                "data point ends before it starts: [{start}, {end}]"
            )));
        }
        if end > start {
            Ok(Self::Ranged {
                start,
                end,
                value,
                unit,
                metadata: None,
            })
        } else {
            Ok(Self::instant(start, value, unit))
        }
    }

    /// Convert a raw sample into a data point relative to `workout_start`,
    /// expressing its value in `unit`.
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleUnits` when the sample's unit cannot be converted to
    /// `unit`, or `InvalidInput` when the sample ends before it starts
    pub fn from_sample(
        sample: &RawSample,
        workout_start: DateTime<Utc>,
        unit: Unit,
    ) -> AppResult<Self> {
        let value = sample.quantity.value_in(unit)?;
        let start = seconds_between(workout_start, sample.start);
        let end = seconds_between(workout_start, sample.end);
        let point = Self::ranged(start, end, value, unit)?;
        Ok(match sample.metadata.clone() {
            Some(metadata) => point.with_metadata(metadata),
            None => point,
        })
    }

    /// Replace the metadata map
    #[must_use]
    pub fn with_metadata(mut self, map: HashMap<String, f64>) -> Self {
        match &mut self {
            Self::Instant { metadata, .. } | Self::Ranged { metadata, .. } => {
                *metadata = Some(map);
            }
        }
        self
    }

    /// Attach elevation deltas in meters
    #[must_use]
    pub fn with_elevation(self, ascended: f64, descended: f64) -> Self {
        let mut map = self.metadata().cloned().unwrap_or_default();
        map.insert(ELEVATION_ASCENDED_KEY.to_owned(), ascended);
        map.insert(ELEVATION_DESCENDED_KEY.to_owned(), descended);
        self.with_metadata(map)
    }

    /// Start of the reading
    #[must_use]
    pub const fn start(&self) -> f64 {
        match self {
            Self::Instant { timestamp, .. } => *timestamp,
            Self::Ranged { start, .. } => *start,
        }
    }

    /// End of the reading (equal to start for instants)
    #[must_use]
    pub const fn end(&self) -> f64 {
        match self {
            Self::Instant { timestamp, .. } => *timestamp,
            Self::Ranged { end, .. } => *end,
        }
    }

    /// Length of the reading, zero for instants
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end() - self.start()
    }

    /// Value in [`DataPoint::unit`]
    #[must_use]
    pub const fn value(&self) -> f64 {
        match self {
            Self::Instant { value, .. } | Self::Ranged { value, .. } => *value,
        }
    }

    /// Unit of the value
    #[must_use]
    pub const fn unit(&self) -> Unit {
        match self {
            Self::Instant { unit, .. } | Self::Ranged { unit, .. } => *unit,
        }
    }

    /// Whether this is an instant reading
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        matches!(self, Self::Instant { .. })
    }

    /// Metadata map, if any
    #[must_use]
    pub const fn metadata(&self) -> Option<&HashMap<String, f64>> {
        match self {
            Self::Instant { metadata, .. } | Self::Ranged { metadata, .. } => metadata.as_ref(),
        }
    }

    /// Meters ascended and descended, zero when not recorded
    #[must_use]
    pub fn elevation(&self) -> (f64, f64) {
        self.metadata().map_or((0.0, 0.0), |meta| {
            (
                meta.get(ELEVATION_ASCENDED_KEY).copied().unwrap_or(0.0),
                meta.get(ELEVATION_DESCENDED_KEY).copied().unwrap_or(0.0),
            )
        })
    }
}
