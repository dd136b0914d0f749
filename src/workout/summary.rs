// ABOUTME: Read-only views of a loaded workout: whole-workout summary and per-minute rows
// ABOUTME: Converts accumulated values into display units, leaving absent values as None
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::kinds::QuantityKind;
use crate::minute::MinuteBucket;
use crate::models::ActivityType;
use crate::units::{Pace, Quantity, Speed, Unit, UnitSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pace in seconds per `per`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaceReading {
    /// Seconds needed per length unit
    pub seconds: f64,
    /// Length unit
    pub per: Unit,
}

/// Speed in `length` per `time`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedReading {
    /// Length covered per time unit
    pub value: f64,
    /// Length unit
    pub length: Unit,
    /// Time unit
    pub time: Unit,
}

/// Seconds spent in one heart-rate zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneTime {
    /// Zone number, 0 for the lowest
    pub zone: usize,
    /// Zone lower bound in percent of maximum heart rate
    pub lower_percent: f64,
    /// Seconds attributed to the zone
    pub seconds: f64,
}

/// Whole-workout statistics
///
/// Totals, averages and maxima cover every sample in the workout window,
/// pauses included, so they can exceed the sum of the minute rows. Pace and
/// speed divide by active time only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    /// Workout identifier
    pub id: Uuid,
    /// Activity type
    pub activity: ActivityType,
    /// Workout start
    pub start: DateTime<Utc>,
    /// Workout end
    pub end: DateTime<Utc>,
    /// Seconds from start to end, pauses included
    pub elapsed_seconds: f64,
    /// Seconds spent in active segments
    pub active_seconds: f64,
    /// Distance in display units
    pub distance: Option<Quantity>,
    /// Mean heart rate
    pub average_heart_rate: Option<Quantity>,
    /// Highest heart rate
    pub max_heart_rate: Option<Quantity>,
    /// Pace over active time
    pub pace: Option<PaceReading>,
    /// Speed over active time
    pub speed: Option<SpeedReading>,
    /// Active energy, only reported alongside a total
    pub active_energy: Option<Quantity>,
    /// Active plus resting energy
    pub total_energy: Option<Quantity>,
    /// Meters climbed
    pub elevation_ascended: Option<Quantity>,
    /// Meters descended
    pub elevation_descended: Option<Quantity>,
    /// Steps taken
    pub step_count: Option<f64>,
    /// Swimming strokes
    pub stroke_count: Option<f64>,
    /// Time per heart-rate zone, when zones are attached and a max heart rate is known
    pub zones: Option<Vec<ZoneTime>>,
    /// Whether any quantity kind failed to load
    pub has_error: bool,
}

/// One minute bucket in display units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinuteRow {
    /// Absolute minute number
    pub minute: u64,
    /// Segment the minute belongs to
    pub segment: usize,
    /// Seconds since workout start
    pub start_offset: f64,
    /// Seconds since workout start
    pub end_offset: f64,
    /// Bucket length in seconds
    pub duration_seconds: f64,
    /// Mean heart rate in bpm
    pub heart_rate: Option<f64>,
    /// Distance in the display distance unit
    pub distance: Option<f64>,
    /// Seconds per display pace length unit
    pub pace: Option<f64>,
    /// Display speed units
    pub speed: Option<f64>,
    /// Active energy in the display energy unit
    pub active_energy: Option<f64>,
    /// Resting energy in the display energy unit
    pub resting_energy: Option<f64>,
    /// Steps
    pub step_count: Option<f64>,
    /// Strokes
    pub stroke_count: Option<f64>,
    /// Meters climbed
    pub elevation_ascended: Option<f64>,
    /// Meters descended
    pub elevation_descended: Option<f64>,
}

impl MinuteRow {
    /// Project a bucket into display units
    #[must_use]
    pub fn from_bucket(
        bucket: &MinuteBucket,
        segment: usize,
        units: &UnitSet,
        max_pace: Option<Pace>,
    ) -> Self {
        let energy = |kind| {
            bucket
                .total(kind)
                .and_then(|total| units.energy_value(&total))
        };
        let count = |kind| bucket.total(kind).map(|total| total.value);

        Self {
            minute: bucket.index(),
            segment,
            start_offset: bucket.start_offset(),
            end_offset: bucket.end_offset(),
            duration_seconds: bucket.duration(),
            heart_rate: bucket
                .average(QuantityKind::HeartRate)
                .map(|average| average.value),
            distance: bucket
                .distance()
                .and_then(|distance| units.distance_value(&distance)),
            pace: bucket.pace(max_pace).map(|pace| units.pace_value(&pace)),
            speed: bucket.speed().map(|speed| units.speed_value(&speed)),
            active_energy: energy(QuantityKind::ActiveEnergy),
            resting_energy: energy(QuantityKind::RestingEnergy),
            step_count: count(QuantityKind::StepCount),
            stroke_count: count(QuantityKind::SwimmingStrokeCount),
            elevation_ascended: bucket.elevation_ascended().map(|q| q.value),
            elevation_descended: bucket.elevation_descended().map(|q| q.value),
        }
    }
}

/// A row of the minute-by-minute breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Row {
    /// One minute of activity
    Minute(MinuteRow),
    /// Pause between two segments
    Pause {
        /// Pause length in seconds
        duration_seconds: f64,
    },
}

/// Immutable result of a finished load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutReport {
    /// Whole-workout statistics
    pub summary: WorkoutSummary,
    /// Units every row value is expressed in
    pub units: UnitSet,
    /// Minute rows and pause markers, `None` after a quick load
    pub rows: Option<Vec<Row>>,
}

impl WorkoutReport {
    /// Whether any quantity kind failed to load
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.summary.has_error
    }

    /// Number of rows, zero after a quick load
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }

    /// Row at absolute `index`
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.as_ref()?.get(index)
    }

    /// All rows, `None` after a quick load
    #[must_use]
    pub fn rows(&self) -> Option<&[Row]> {
        self.rows.as_deref()
    }
}

pub(super) fn pace_reading(pace: Pace, units: &UnitSet) -> PaceReading {
    PaceReading {
        seconds: units.pace_value(&pace),
        per: units.pace_length(),
    }
}

pub(super) fn speed_reading(speed: Speed, units: &UnitSet) -> SpeedReading {
    SpeedReading {
        value: units.speed_value(&speed),
        length: units.speed_length(),
        time: units.speed_time(),
    }
}
