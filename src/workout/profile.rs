// ABOUTME: Per-activity workout configuration selected from the activity type
// ABOUTME: Chooses display units, max pace, queried quantity kinds, and heart-rate zone settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::time::METERS_PER_KILOMETER;
use crate::constants::zones::{DEFAULT_MAX_GAP_SECONDS, DEFAULT_THRESHOLDS_PERCENT};
use crate::errors::AppResult;
use crate::heart_zones::HeartRateZoneAccumulator;
use crate::kinds::QuantityKind;
use crate::models::ActivityType;
use crate::units::{Pace, UnitSet};
use serde::{Deserialize, Serialize};

/// Heart-rate zone configuration attached to a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSettings {
    /// Zone lower bounds in percent of maximum heart rate, ascending
    pub thresholds_percent: Vec<f64>,
    /// Maximum heart rate in bpm; zone times are absent without it
    pub max_heart_rate: Option<f64>,
    /// Longest interval between samples that is still interpolated
    pub max_gap_seconds: f64,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            thresholds_percent: DEFAULT_THRESHOLDS_PERCENT.to_vec(),
            max_heart_rate: None,
            max_gap_seconds: DEFAULT_MAX_GAP_SECONDS,
        }
    }
}

impl ZoneSettings {
    /// Build an empty accumulator for these settings
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the thresholds, max heart rate, or gap are invalid
    pub fn accumulator(&self) -> AppResult<HeartRateZoneAccumulator> {
        HeartRateZoneAccumulator::new(&self.thresholds_percent, self.max_heart_rate)?
            .with_max_gap(self.max_gap_seconds)
    }
}

/// Everything that varies between activity types
///
/// Built by [`WorkoutConfig::for_activity`]; fields are public so callers and
/// environment overrides can adjust them before loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutConfig {
    /// Activity this configuration was built for
    pub activity: ActivityType,
    /// Display units for summaries, rows, and exports
    pub units: UnitSet,
    /// Slower paces are reported as absent
    pub max_pace: Option<Pace>,
    /// Kinds queried on every load
    pub essential_kinds: Vec<QuantityKind>,
    /// Kinds queried only on a full load
    pub detail_kinds: Vec<QuantityKind>,
    /// Heart-rate zone tracking, `None` when not attached
    pub zones: Option<ZoneSettings>,
}

impl WorkoutConfig {
    /// Defaults for `activity`
    #[must_use]
    pub fn for_activity(activity: ActivityType) -> Self {
        let mut essential_kinds = vec![
            QuantityKind::HeartRate,
            QuantityKind::ActiveEnergy,
            QuantityKind::RestingEnergy,
        ];
        essential_kinds.extend(activity.distance_kind());

        let detail_kinds = match activity {
            ActivityType::Running | ActivityType::Walking | ActivityType::Hiking => {
                vec![QuantityKind::StepCount]
            }
            ActivityType::Swimming => vec![QuantityKind::SwimmingStrokeCount],
            _ => Vec::new(),
        };

        let units = match activity {
            ActivityType::Swimming => UnitSet::swimming(),
            _ => UnitSet::metric(),
        };

        let zones = match activity {
            ActivityType::Swimming | ActivityType::Other => None,
            _ => Some(ZoneSettings::default()),
        };

        Self {
            activity,
            units,
            max_pace: activity.max_pace_seconds_per_km().and_then(|seconds| {
                Pace::from_duration_and_distance(seconds, METERS_PER_KILOMETER)
            }),
            essential_kinds,
            detail_kinds,
            zones,
        }
    }

    /// Kinds to query; a quick load skips the detail kinds
    #[must_use]
    pub fn kinds(&self, quick: bool) -> Vec<QuantityKind> {
        let mut kinds = self.essential_kinds.clone();
        if !quick {
            kinds.extend(self.detail_kinds.iter().copied());
        }
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }

    /// Replace the display units
    #[must_use]
    pub const fn with_units(mut self, units: UnitSet) -> Self {
        self.units = units;
        self
    }

    /// Set the maximum heart rate used for zones, attaching default zones if none are
    #[must_use]
    pub fn with_max_heart_rate(mut self, max_heart_rate: f64) -> Self {
        self.zones
            .get_or_insert_with(ZoneSettings::default)
            .max_heart_rate = Some(max_heart_rate);
        self
    }
}
