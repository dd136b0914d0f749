// ABOUTME: Heart-rate zone time accumulation with linear interpolation at zone boundaries
// ABOUTME: Recomputes per-zone seconds over the full sample series using rayon fold/reduce
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Heart-Rate Zones
//!
//! Zone `i` covers `[threshold_i, threshold_{i+1})` percent of maximum heart
//! rate and the top zone is open-ended. Time between two consecutive samples
//! is attributed to zones as follows:
//!
//! - both samples in the same zone: the whole interval goes to that zone
//! - samples in adjacent zones: the crossing instant is interpolated linearly
//!   and the interval is split at it
//! - samples further apart than the maximum gap, more than one zone apart, or
//!   below the lowest threshold: nothing is attributed
//!
//! Results are recomputed from scratch whenever samples or configuration
//! change. Without a maximum heart rate there is no result.

use crate::constants::zones::{
    DEFAULT_MAX_GAP_SECONDS, DEFAULT_THRESHOLDS_PERCENT, MAX_THRESHOLD_PERCENT,
};
use crate::data_point::DataPoint;
use crate::errors::{AppError, AppResult};
use rayon::prelude::*;
use tracing::debug;

/// Heart rate at a point in time, in seconds since workout start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartRateSample {
    /// Seconds since workout start
    pub offset: f64,
    /// Beats per minute
    pub bpm: f64,
}

impl HeartRateSample {
    /// Create a sample
    #[must_use]
    pub const fn new(offset: f64, bpm: f64) -> Self {
        Self { offset, bpm }
    }
}

/// What one consecutive sample pair contributes
#[derive(Debug, Clone, Copy, PartialEq)]
enum PairContribution {
    Whole { zone: usize, seconds: f64 },
    Split {
        earlier: usize,
        earlier_seconds: f64,
        later: usize,
        later_seconds: f64,
    },
    Gap,
    Inconsistent,
    Nothing,
}

#[derive(Debug, Clone, Default)]
struct Tally {
    seconds: Vec<f64>,
    gaps: usize,
    inconsistent: usize,
}

impl Tally {
    fn zeroed(zones: usize) -> Self {
        Self {
            seconds: vec![0.0; zones],
            gaps: 0,
            inconsistent: 0,
        }
    }

    fn record(mut self, contribution: PairContribution) -> Self {
        match contribution {
            PairContribution::Whole { zone, seconds } => self.seconds[zone] += seconds,
            PairContribution::Split {
                earlier,
                earlier_seconds,
                later,
                later_seconds,
            } => {
                self.seconds[earlier] += earlier_seconds;
                self.seconds[later] += later_seconds;
            }
            PairContribution::Gap => self.gaps += 1,
            PairContribution::Inconsistent => self.inconsistent += 1,
            PairContribution::Nothing => {}
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        for (mine, theirs) in self.seconds.iter_mut().zip(other.seconds) {
            *mine += theirs;
        }
        self.gaps += other.gaps;
        self.inconsistent += other.inconsistent;
        self
    }
}

/// Streaming consumer of the heart-rate series computing seconds per zone
#[derive(Debug, Clone)]
pub struct HeartRateZoneAccumulator {
    /// Zone lower bounds as fractions of maximum heart rate
    thresholds: Vec<f64>,
    max_heart_rate: Option<f64>,
    max_gap_seconds: f64,
    samples: Vec<HeartRateSample>,
    zone_times: Option<Vec<f64>>,
}

impl Default for HeartRateZoneAccumulator {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS_PERCENT
                .iter()
                .map(|percent| percent / 100.0)
                .collect(),
            max_heart_rate: None,
            max_gap_seconds: DEFAULT_MAX_GAP_SECONDS,
            samples: Vec::new(),
            zone_times: None,
        }
    }
}

impl HeartRateZoneAccumulator {
    /// Create an accumulator with thresholds given in percent of max heart rate
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the thresholds are empty, unsorted, or
    /// outside `[0, 100)`, or when the max heart rate is not positive
    pub fn new(thresholds_percent: &[f64], max_heart_rate: Option<f64>) -> AppResult<Self> {
        let mut accumulator = Self {
            thresholds: validate_thresholds(thresholds_percent)?,
            max_heart_rate: validate_max_heart_rate(max_heart_rate)?,
            ..Self::default()
        };
        accumulator.recompute();
        Ok(accumulator)
    }

    /// Override the longest interval between samples that is still interpolated
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `seconds` is not positive
    pub fn with_max_gap(mut self, seconds: f64) -> AppResult<Self> {
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(AppError::invalid_input(format!(
                "maximum heart-rate gap must be positive, got {seconds}"
            )));
        }
        self.max_gap_seconds = seconds;
        self.recompute();
        Ok(self)
    }

    /// Zone lower bounds in percent of maximum heart rate
    #[must_use]
    pub fn thresholds_percent(&self) -> Vec<f64> {
        self.thresholds.iter().map(|t| t * 100.0).collect()
    }

    /// Number of zones
    #[must_use]
    pub fn zone_count(&self) -> usize {
        self.thresholds.len()
    }

    /// Maximum heart rate used to turn beats per minute into percentages
    #[must_use]
    pub const fn max_heart_rate(&self) -> Option<f64> {
        self.max_heart_rate
    }

    /// Longest interval between samples that is still interpolated
    #[must_use]
    pub const fn max_gap_seconds(&self) -> f64 {
        self.max_gap_seconds
    }

    /// Replace the zone thresholds and recompute
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for invalid thresholds; the previous ones are kept
    pub fn set_thresholds(&mut self, thresholds_percent: &[f64]) -> AppResult<()> {
        self.thresholds = validate_thresholds(thresholds_percent)?;
        self.recompute();
        Ok(())
    }

    /// Replace the maximum heart rate and recompute
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the value is not positive
    pub fn set_max_heart_rate(&mut self, max_heart_rate: Option<f64>) -> AppResult<()> {
        self.max_heart_rate = validate_max_heart_rate(max_heart_rate)?;
        self.recompute();
        Ok(())
    }

    /// Append a batch of samples and recompute
    pub fn add_samples(&mut self, samples: impl IntoIterator<Item = HeartRateSample>) {
        self.samples.extend(samples);
        self.samples.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        self.recompute();
    }

    /// Append heart-rate data points (start time and value in bpm) and recompute
    pub fn add_points(&mut self, points: &[DataPoint]) {
        self.add_samples(
            points
                .iter()
                .map(|point| HeartRateSample::new(point.start(), point.value())),
        );
    }

    /// Samples seen so far in time order
    #[must_use]
    pub fn samples(&self) -> &[HeartRateSample] {
        &self.samples
    }

    /// Seconds spent in each zone, `None` without a maximum heart rate
    #[must_use]
    pub fn zone_times(&self) -> Option<&[f64]> {
        self.zone_times.as_deref()
    }

    /// Sum of all zone times
    #[must_use]
    pub fn total_seconds(&self) -> Option<f64> {
        self.zone_times().map(|times| times.iter().sum())
    }

    /// Zone containing `fraction` of max heart rate, `None` below the lowest threshold
    #[must_use]
    pub fn zone_of(&self, fraction: f64) -> Option<usize> {
        self.thresholds
            .iter()
            .rposition(|threshold| *threshold <= fraction)
    }

    fn recompute(&mut self) {
        let Some(max_heart_rate) = self.max_heart_rate else {
            self.zone_times = None;
            return;
        };

        let zones = self.thresholds.len();
        let tally = self
            .samples
            .par_windows(2)
            .fold(
                || Tally::zeroed(zones),
                |tally, pair| tally.record(self.attribute(pair[0], pair[1], max_heart_rate)),
            )
            .reduce(|| Tally::zeroed(zones), Tally::merge);

        debug!(
            samples = self.samples.len(),
            gaps = tally.gaps,
            inconsistent = tally.inconsistent,
            "Recomputed heart-rate zone times"
        );
        self.zone_times = Some(tally.seconds);
    }

    fn attribute(
        &self,
        prev: HeartRateSample,
        cur: HeartRateSample,
        max_heart_rate: f64,
    ) -> PairContribution {
        let elapsed = cur.offset - prev.offset;
        if elapsed > self.max_gap_seconds {
            return PairContribution::Gap;
        }
        if elapsed <= 0.0 {
            return PairContribution::Nothing;
        }

        let prev_fraction = prev.bpm / max_heart_rate;
        let cur_fraction = cur.bpm / max_heart_rate;
        let (Some(prev_zone), Some(cur_zone)) =
            (self.zone_of(prev_fraction), self.zone_of(cur_fraction))
        else {
            return PairContribution::Nothing;
        };

        if prev_zone == cur_zone {
            return PairContribution::Whole {
                zone: prev_zone,
                seconds: elapsed,
            };
        }
        if prev_zone.abs_diff(cur_zone) != 1 {
            return PairContribution::Nothing;
        }

        let threshold = self.thresholds[prev_zone.max(cur_zone)];
        let between = (prev_fraction.min(cur_fraction)..=prev_fraction.max(cur_fraction))
            .contains(&threshold);
        let slope = (cur_fraction - prev_fraction) / elapsed;
        if !between || slope == 0.0 {
            return PairContribution::Inconsistent;
        }

        let change = (threshold - prev_fraction) / slope;
        PairContribution::Split {
            earlier: prev_zone,
            earlier_seconds: change,
            later: cur_zone,
            later_seconds: elapsed - change,
        }
    }
}

fn validate_thresholds(thresholds_percent: &[f64]) -> AppResult<Vec<f64>> {
    if thresholds_percent.is_empty() {
        return Err(AppError::invalid_input("at least one zone threshold is required"));
    }
    if thresholds_percent
        .iter()
        .any(|t| !(0.0..MAX_THRESHOLD_PERCENT).contains(t))
    {
        return Err(AppError::invalid_input(format!(
            "zone thresholds must lie in [0, 100), got {thresholds_percent:?}"
        )));
    }
    if thresholds_percent.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(AppError::invalid_input(format!(
            "zone thresholds must be strictly ascending, got {thresholds_percent:?}"
        )));
    }
    Ok(thresholds_percent.iter().map(|t| t / 100.0).collect())
}

fn validate_max_heart_rate(max_heart_rate: Option<f64>) -> AppResult<Option<f64>> {
    match max_heart_rate {
        Some(bpm) if !(bpm.is_finite() && bpm > 0.0) => Err(AppError::invalid_input(format!(
            "maximum heart rate must be positive, got {bpm}"
        ))),
        other => Ok(other),
    }
}
