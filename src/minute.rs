// ABOUTME: Minute bucket accumulating every sample whose window intersects one 60-second slot
// ABOUTME: Exposes per-kind sums and averages plus derived distance, pace, speed, and elevation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Minute Buckets
//!
//! A bucket covers `[start_offset, end_offset)` seconds since workout start,
//! never longer than one minute. Kinds must be registered before values are
//! added for them. Totals and averages built from zero samples are reported as
//! absent rather than zero.

use crate::constants::buckets::{BOUNDARY_EPSILON_SECONDS, MIN_RATE_WINDOW_SECONDS};
use crate::constants::time::SECONDS_PER_MINUTE;
use crate::data_point::DataPoint;
use crate::errors::{AppError, AppResult};
use crate::kinds::{AggregationStyle, QuantityKind};
use crate::units::{Pace, Quantity, Speed, Unit};
use std::collections::BTreeMap;

/// Running sum for one kind
#[derive(Debug, Clone, Copy, PartialEq)]
struct Accumulator {
    unit: Unit,
    sum: f64,
    count: u32,
}

/// Where a data point sits relative to a bucket after [`MinuteBucket::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The point lies entirely before this bucket and was not added
    Before,
    /// The point was added and nothing of it remains for later buckets
    Absorbed,
    /// Part of the point was added; the rest belongs to later buckets
    Continues,
    /// The point starts at or after this bucket's end and was not added
    After,
}

/// Accumulator for one minute (or shorter final) window of a segment
#[derive(Debug, Clone, PartialEq)]
pub struct MinuteBucket {
    index: u64,
    start_offset: f64,
    end_offset: f64,
    accumulators: BTreeMap<QuantityKind, Accumulator>,
    elevation_ascended: f64,
    elevation_descended: f64,
}

impl MinuteBucket {
    /// Create a bucket for `[start_offset, end_offset)`
    ///
    /// # Errors
    ///
    /// Returns `InvalidSegment` when the window is negative or longer than a minute
    pub fn new(index: u64, start_offset: f64, end_offset: f64) -> AppResult<Self> {
        let length = end_offset - start_offset;
        if !(0.0..=SECONDS_PER_MINUTE + BOUNDARY_EPSILON_SECONDS).contains(&length) {
            return Err(AppError::invalid_segment(format!(
                "minute {index} spans {length}s, expected 0..=60s"
            )));
        }
        Ok(Self {
            index,
            start_offset,
            end_offset,
            accumulators: BTreeMap::new(),
            elevation_ascended: 0.0,
            elevation_descended: 0.0,
        })
    }

    /// Absolute minute number across the whole workout
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Window start in seconds since workout start
    #[must_use]
    pub const fn start_offset(&self) -> f64 {
        self.start_offset
    }

    /// Window end in seconds since workout start
    #[must_use]
    pub const fn end_offset(&self) -> f64 {
        self.end_offset
    }

    /// Window length in seconds
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_offset - self.start_offset
    }

    /// Declare a kind this bucket accepts. A second call for the same kind
    /// keeps the existing storage and any values already added.
    pub fn register(&mut self, kind: QuantityKind, unit: Unit) {
        self.accumulators.entry(kind).or_insert(Accumulator {
            unit,
            sum: 0.0,
            count: 0,
        });
    }

    /// Whether `kind` has been registered
    #[must_use]
    pub fn is_registered(&self, kind: QuantityKind) -> bool {
        self.accumulators.contains_key(&kind)
    }

    /// Add a value, expressed in the registered unit, for `kind`
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredKind` when `kind` was never registered
    pub fn add_value(&mut self, kind: QuantityKind, value: f64) -> AppResult<()> {
        let index = self.index;
        let accumulator = self.accumulators.get_mut(&kind).ok_or_else(|| {
            AppError::unregistered_kind(format!("{kind} is not registered on minute {index}"))
        })?;
        accumulator.sum += value;
        accumulator.count += 1;
        Ok(())
    }

    /// Number of values added for `kind`
    #[must_use]
    pub fn count(&self, kind: QuantityKind) -> u32 {
        self.accumulators.get(&kind).map_or(0, |acc| acc.count)
    }

    /// Mean of the values added for `kind`, absent when none were added
    #[must_use]
    pub fn average(&self, kind: QuantityKind) -> Option<Quantity> {
        self.accumulators
            .get(&kind)
            .filter(|acc| acc.count > 0)
            .map(|acc| Quantity::new(acc.sum / f64::from(acc.count), acc.unit))
    }

    /// Sum of the values added for `kind`, absent when none were added
    #[must_use]
    pub fn total(&self, kind: QuantityKind) -> Option<Quantity> {
        self.accumulators
            .get(&kind)
            .filter(|acc| acc.count > 0)
            .map(|acc| Quantity::new(acc.sum, acc.unit))
    }

    /// First non-zero distance total, in [`QuantityKind::DISTANCE_PREFERENCE`] order
    #[must_use]
    pub fn distance(&self) -> Option<Quantity> {
        QuantityKind::DISTANCE_PREFERENCE
            .iter()
            .filter_map(|kind| self.total(*kind))
            .find(|total| total.value != 0.0)
    }

    /// Time per distance over this bucket, absent when there is no distance,
    /// when the window is too short, or when slower than `max_pace`
    #[must_use]
    pub fn pace(&self, max_pace: Option<Pace>) -> Option<Pace> {
        let duration = self.duration();
        if duration < MIN_RATE_WINDOW_SECONDS {
            return None;
        }
        let meters = self.distance()?.value_in(Unit::Meter).ok()?;
        let pace = Pace::from_duration_and_distance(duration, meters)?;
        match max_pace {
            Some(limit) if pace.is_slower_than(limit) => None,
            _ => Some(pace),
        }
    }

    /// Distance per time over this bucket
    #[must_use]
    pub fn speed(&self) -> Option<Speed> {
        let duration = self.duration();
        if duration < MIN_RATE_WINDOW_SECONDS {
            return None;
        }
        let meters = self.distance()?.value_in(Unit::Meter).ok()?;
        Speed::from_distance_and_duration(meters, duration)
    }

    /// Attribute `fraction` of a sample's elevation deltas to this bucket
    pub fn add_elevation(&mut self, ascended: f64, descended: f64, fraction: f64) {
        self.elevation_ascended += ascended * fraction;
        self.elevation_descended += descended * fraction;
    }

    /// Meters climbed, present once an elevation-bearing kind is registered
    #[must_use]
    pub fn elevation_ascended(&self) -> Option<Quantity> {
        self.tracks_elevation()
            .then(|| Quantity::new(self.elevation_ascended, Unit::Meter))
    }

    /// Meters descended, present once an elevation-bearing kind is registered
    #[must_use]
    pub fn elevation_descended(&self) -> Option<Quantity> {
        self.tracks_elevation()
            .then(|| Quantity::new(self.elevation_descended, Unit::Meter))
    }

    fn tracks_elevation(&self) -> bool {
        self.accumulators.keys().any(|kind| kind.carries_elevation())
    }

    /// Attribute the part of `point` that overlaps this bucket.
    ///
    /// Instants are added when `start_offset <= t < end_offset`. Ranged points
    /// contribute `value * overlap / duration` for cumulative kinds and their
    /// full value for discrete kinds; elevation deltas scale by the same
    /// overlap fraction.
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredKind` when the point overlaps this bucket but
    /// `kind` was never registered
    pub fn add(&mut self, point: &DataPoint, kind: QuantityKind) -> AppResult<Placement> {
        match point {
            DataPoint::Instant {
                timestamp, value, ..
            } => {
                if *timestamp >= self.end_offset {
                    return Ok(Placement::After);
                }
                if *timestamp < self.start_offset {
                    return Ok(Placement::Before);
                }
                self.add_value(kind, *value)?;
                if kind.carries_elevation() {
                    let (ascended, descended) = point.elevation();
                    self.add_elevation(ascended, descended, 1.0);
                }
                Ok(Placement::Absorbed)
            }
            DataPoint::Ranged {
                start, end, value, ..
            } => {
                if *start >= self.end_offset {
                    return Ok(Placement::After);
                }
                if *end <= self.start_offset {
                    return Ok(Placement::Before);
                }
                let overlap = self.end_offset.min(*end) - self.start_offset.max(*start);
                let fraction = (overlap / (end - start)).clamp(0.0, 1.0);
                let contribution = match kind.aggregation_style() {
                    AggregationStyle::Cumulative => value * fraction,
                    AggregationStyle::Discrete => *value,
                };
                self.add_value(kind, contribution)?;
                if kind.carries_elevation() {
                    let (ascended, descended) = point.elevation();
                    self.add_elevation(ascended, descended, fraction);
                }
                if *end > self.end_offset {
                    Ok(Placement::Continues)
                } else {
                    Ok(Placement::Absorbed)
                }
            }
        }
    }
}
