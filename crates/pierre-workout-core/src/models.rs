// ABOUTME: Raw sample, activity type, and pause/resume event models
// ABOUTME: Derives a workout's active intervals from its recorded pause and resume events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::pace::{
    CYCLING_MAX_SECONDS_PER_KM, RUNNING_MAX_SECONDS_PER_KM, SKIING_MAX_SECONDS_PER_KM,
    SWIMMING_MAX_SECONDS_PER_KM, WALKING_MAX_SECONDS_PER_KM, WHEELCHAIR_MAX_SECONDS_PER_KM,
};
use crate::kinds::{QuantityKind, ELEVATION_ASCENDED_KEY, ELEVATION_DESCENDED_KEY};
use crate::units::Quantity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// One measurement as delivered by a health-data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Start of the measurement
    pub start: DateTime<Utc>,
    /// End of the measurement (equal to `start` for instant readings)
    pub end: DateTime<Utc>,
    /// Measured value with its unit
    pub quantity: Quantity,
    /// Side-channel numeric metadata such as elevation deltas in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, f64>>,
    /// Identifier of the device or app that recorded the sample
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl RawSample {
    /// Sample taken at a single instant
    #[must_use]
    pub const fn instant(at: DateTime<Utc>, quantity: Quantity) -> Self {
        Self {
            start: at,
            end: at,
            quantity,
            metadata: None,
            source: None,
        }
    }

    /// Sample valid over `[start, end)`
    #[must_use]
    pub const fn ranged(start: DateTime<Utc>, end: DateTime<Utc>, quantity: Quantity) -> Self {
        Self {
            start,
            end,
            quantity,
            metadata: None,
            source: None,
        }
    }

    /// Attach one metadata entry
    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: f64) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.to_owned(), value);
        self
    }

    /// Attach the recording source identifier
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Meters ascended and descended recorded in metadata, zero when absent
    #[must_use]
    pub fn elevation(&self) -> (f64, f64) {
        self.metadata.as_ref().map_or((0.0, 0.0), |meta| {
            (
                meta.get(ELEVATION_ASCENDED_KEY).copied().unwrap_or(0.0),
                meta.get(ELEVATION_DESCENDED_KEY).copied().unwrap_or(0.0),
            )
        })
    }
}

/// Activity performed during a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// Outdoor or treadmill running
    Running,
    /// Walking
    Walking,
    /// Hiking
    Hiking,
    /// Cycling
    Cycling,
    /// Pool or open-water swimming
    Swimming,
    /// Wheelchair pushing
    Wheelchair,
    /// Downhill skiing or snowboarding
    DownhillSkiing,
    /// Any other activity (no distance kind)
    Other,
}

impl ActivityType {
    /// Distance kind recorded for this activity
    #[must_use]
    pub const fn distance_kind(self) -> Option<QuantityKind> {
        match self {
            Self::Running | Self::Walking | Self::Hiking => {
                Some(QuantityKind::DistanceWalkingRunning)
            }
            Self::Cycling => Some(QuantityKind::DistanceCycling),
            Self::Swimming => Some(QuantityKind::DistanceSwimming),
            Self::Wheelchair => Some(QuantityKind::DistanceWheelchair),
            Self::DownhillSkiing => Some(QuantityKind::DistanceDownhillSnowSports),
            Self::Other => None,
        }
    }

    /// Stable identifier used in logs and exports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Walking => "walking",
            Self::Hiking => "hiking",
            Self::Cycling => "cycling",
            Self::Swimming => "swimming",
            Self::Wheelchair => "wheelchair",
            Self::DownhillSkiing => "downhill_skiing",
            Self::Other => "other",
        }
    }

    /// Slowest pace, in seconds per kilometer, still considered moving
    #[must_use]
    pub const fn max_pace_seconds_per_km(self) -> Option<f64> {
        match self {
            Self::Running => Some(RUNNING_MAX_SECONDS_PER_KM),
            Self::Walking | Self::Hiking => Some(WALKING_MAX_SECONDS_PER_KM),
            Self::Cycling => Some(CYCLING_MAX_SECONDS_PER_KM),
            Self::Swimming => Some(SWIMMING_MAX_SECONDS_PER_KM),
            Self::Wheelchair => Some(WHEELCHAIR_MAX_SECONDS_PER_KM),
            Self::DownhillSkiing => Some(SKIING_MAX_SECONDS_PER_KM),
            Self::Other => None,
        }
    }
}

/// Pause or resume marker recorded during a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkoutEvent {
    /// Activity paused at `at`
    Pause {
        /// Event time
        at: DateTime<Utc>,
    },
    /// Activity resumed at `at`
    Resume {
        /// Event time
        at: DateTime<Utc>,
    },
}

impl WorkoutEvent {
    /// Event time
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Pause { at } | Self::Resume { at } => *at,
        }
    }
}

/// A continuous stretch of activity with no detected pause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveInterval {
    /// Interval start
    pub start: DateTime<Utc>,
    /// Interval end
    pub end: DateTime<Utc>,
}

impl ActiveInterval {
    /// Create an interval
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Interval length in seconds
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        seconds_between(self.start, self.end)
    }
}

/// Seconds from `from` to `to` with millisecond precision
#[must_use]
#[allow(clippy::cast_precision_loss)] // Safe: workout spans are far below 2^52 ms
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

/// Derive active intervals from pause/resume events.
///
/// A pause closes the current interval and a resume opens the next one.
/// Repeated pauses or resumes are ignored, events are clamped to the workout
/// span, an interval still open at the end closes at `end`, and zero-length
/// intervals are dropped.
#[must_use]
pub fn active_intervals(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    events: &[WorkoutEvent],
) -> Vec<ActiveInterval> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(WorkoutEvent::at);

    let mut intervals = Vec::new();
    let mut open = Some(start);
    for event in sorted {
        let at = event.at().clamp(start, end);
        match event {
            WorkoutEvent::Pause { .. } => match open.take() {
                Some(opened) if at > opened => intervals.push(ActiveInterval::new(opened, at)),
                Some(_) => {}
                None => debug!(at = %at, "Ignoring pause while already paused"),
            },
            WorkoutEvent::Resume { .. } => {
                if open.is_none() {
                    open = Some(at);
                } else {
                    debug!(at = %at, "Ignoring resume while already active");
                }
            }
        }
    }
    if let Some(opened) = open {
        if end > opened {
            intervals.push(ActiveInterval::new(opened, end));
        }
    }
    intervals
}
