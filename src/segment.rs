// ABOUTME: Active segment made of contiguous minute buckets covering one uninterrupted interval
// ABOUTME: Distributes data points across buckets by overlap and hands leftovers to the next segment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Segments
//!
//! A workout is split into one [`Segment`] per active interval. Each segment
//! partitions its interval into minute buckets whose indexes continue from the
//! previous segment, so minute numbers stay monotonic across pauses.
//!
//! [`Segment::process`] walks time-ordered data points through the buckets with
//! a cursor. Points extending past the segment's last bucket are returned whole
//! so the next segment can attribute the part that overlaps it.

use crate::constants::buckets::BOUNDARY_EPSILON_SECONDS;
use crate::constants::time::SECONDS_PER_MINUTE;
use crate::data_point::DataPoint;
use crate::errors::{AppError, AppResult};
use crate::kinds::QuantityKind;
use crate::minute::{MinuteBucket, Placement};
use crate::models::{seconds_between, RawSample};
use crate::units::Unit;
use chrono::{DateTime, Utc};
use tracing::debug;

/// One continuous interval of activity and its minute buckets
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    start_offset: f64,
    end_offset: f64,
    first_index: u64,
    pause_after: Option<f64>,
    buckets: Vec<MinuteBucket>,
}

impl Segment {
    /// Build a segment for `[start, end)` with buckets numbered from `first_index`.
    ///
    /// Offsets are measured from `workout_start`. The last bucket is shorter
    /// than a minute when the interval is not a whole number of minutes; a
    /// zero-length trailing bucket is never created.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSegment` when `end < start` or when the segment starts
    /// before the workout
    pub fn new(
        workout_start: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        first_index: u64,
    ) -> AppResult<Self> {
        if end < start {
            return Err(AppError::invalid_segment(format!(
                "segment ends at {end} before it starts at {start}"
            )));
        }
        if start < workout_start {
            return Err(AppError::invalid_segment(format!(
                "segment starts at {start} before the workout at {workout_start}"
            )));
        }

        let start_offset = seconds_between(workout_start, start);
        let end_offset = seconds_between(workout_start, end);
        let buckets = partition(start_offset, end_offset, first_index)?;

        Ok(Self {
            start,
            end,
            start_offset,
            end_offset,
            first_index,
            pause_after: None,
            buckets,
        })
    }

    /// Interval start
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Interval end
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Start in seconds since workout start
    #[must_use]
    pub const fn start_offset(&self) -> f64 {
        self.start_offset
    }

    /// End in seconds since workout start
    #[must_use]
    pub const fn end_offset(&self) -> f64 {
        self.end_offset
    }

    /// Active seconds covered by this segment
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.end_offset - self.start_offset
    }

    /// Seconds paused before the next segment, `None` for the last segment
    #[must_use]
    pub const fn pause_after(&self) -> Option<f64> {
        self.pause_after
    }

    /// Record the pause separating this segment from the next one
    pub fn set_pause_after(&mut self, seconds: Option<f64>) {
        self.pause_after = seconds;
    }

    /// Minute buckets in time order
    #[must_use]
    pub fn buckets(&self) -> &[MinuteBucket] {
        &self.buckets
    }

    /// Index the first bucket of the following segment should use
    #[must_use]
    pub fn next_index(&self) -> u64 {
        self.first_index + self.buckets.len() as u64
    }

    /// Register `kind` on every bucket
    pub fn register(&mut self, kind: QuantityKind, unit: Unit) {
        for bucket in &mut self.buckets {
            bucket.register(kind, unit);
        }
    }

    /// Convert raw samples relative to `workout_start` and distribute them.
    ///
    /// # Errors
    ///
    /// Propagates conversion failures and the errors of [`Segment::process`]
    pub fn process_samples(
        &mut self,
        samples: &[RawSample],
        workout_start: DateTime<Utc>,
        kind: QuantityKind,
        unit: Unit,
    ) -> AppResult<Vec<DataPoint>> {
        let points = samples
            .iter()
            .map(|sample| DataPoint::from_sample(sample, workout_start, unit))
            .collect::<AppResult<Vec<_>>>()?;
        self.process(&points, kind)
    }

    /// Distribute time-ordered points across the buckets.
    ///
    /// Returns the points that still have value beyond this segment's last
    /// bucket. Points lying wholly before the bucket under the cursor are
    /// dropped; this is how samples recorded during a pause disappear. When a
    /// point starts before the previous point ended the cursor rewinds to the
    /// first bucket.
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredKind` when `kind` was not registered on the buckets
    pub fn process(
        &mut self,
        points: &[DataPoint],
        kind: QuantityKind,
    ) -> AppResult<Vec<DataPoint>> {
        let mut leftovers = Vec::new();
        let mut cursor = 0;
        let mut previous_end: Option<f64> = None;
        let mut rescans = 0_usize;

        for point in points {
            if previous_end.is_some_and(|end| end > point.start()) {
                cursor = 0;
                rescans += 1;
            }
            previous_end = Some(point.end());

            let mut position = cursor;
            loop {
                let Some(bucket) = self.buckets.get_mut(position) else {
                    leftovers.push(point.clone());
                    break;
                };
                match bucket.add(point, kind)? {
                    Placement::Before | Placement::Absorbed => break,
                    Placement::Continues => position += 1,
                    Placement::After => {
                        position += 1;
                        cursor = position;
                    }
                }
            }
        }

        debug!(
            quantity.kind = %kind,
            segment.start = self.start_offset,
            points = points.len(),
            leftovers = leftovers.len(),
            rescans,
            "Distributed data points across segment"
        );
        Ok(leftovers)
    }
}

#[allow(clippy::cast_precision_loss)] // Safe: minute counts stay far below 2^52
fn partition(
    start_offset: f64,
    end_offset: f64,
    first_index: u64,
) -> AppResult<Vec<MinuteBucket>> {
    let mut buckets = Vec::new();
    let mut minute = 0_u64;
    loop {
        let bucket_start = start_offset + minute as f64 * SECONDS_PER_MINUTE;
        if end_offset - bucket_start <= BOUNDARY_EPSILON_SECONDS {
            break;
        }
        let mut bucket_end = bucket_start + SECONDS_PER_MINUTE;
        if end_offset - bucket_end <= BOUNDARY_EPSILON_SECONDS {
            bucket_end = end_offset;
        }
        buckets.push(MinuteBucket::new(
            first_index + minute,
            bucket_start,
            bucket_end,
        )?);
        minute += 1;
    }
    Ok(buckets)
}
