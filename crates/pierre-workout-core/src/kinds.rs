// ABOUTME: Quantity kinds a health-data source can be queried for
// ABOUTME: Defines default units, sum-vs-average semantics, and elevation-bearing distance kinds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::units::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata key for meters ascended during a distance sample
pub const ELEVATION_ASCENDED_KEY: &str = "elevation_ascended";
/// Metadata key for meters descended during a distance sample
pub const ELEVATION_DESCENDED_KEY: &str = "elevation_descended";

/// How samples of a kind combine inside a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationStyle {
    /// Values are averaged (heart rate); ranged samples are not split
    Discrete,
    /// Values are summed (distance, energy, steps); ranged samples are split by overlap
    Cumulative,
}

/// How a query selects samples in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSearch {
    /// Samples overlapping the workout's activity window
    ActivityWindow,
    /// Samples inside the recording source's declared window, falling back to
    /// the activity window when that yields nothing
    SourceWindowWithFallback,
}

/// A measurable quantity recorded during a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    /// Heart rate
    HeartRate,
    /// Active energy burned
    ActiveEnergy,
    /// Resting (basal) energy burned
    RestingEnergy,
    /// Distance on foot
    DistanceWalkingRunning,
    /// Distance on a bike
    DistanceCycling,
    /// Distance in the water
    DistanceSwimming,
    /// Distance pushed in a wheelchair
    DistanceWheelchair,
    /// Distance skied or snowboarded
    DistanceDownhillSnowSports,
    /// Steps taken
    StepCount,
    /// Swimming strokes
    SwimmingStrokeCount,
}

impl QuantityKind {
    /// Distance kinds in the order a bucket prefers them
    pub const DISTANCE_PREFERENCE: [Self; 5] = [
        Self::DistanceWalkingRunning,
        Self::DistanceSwimming,
        Self::DistanceCycling,
        Self::DistanceWheelchair,
        Self::DistanceDownhillSnowSports,
    ];

    /// Unit samples of this kind are accumulated in
    #[must_use]
    pub const fn default_unit(self) -> Unit {
        match self {
            Self::HeartRate => Unit::CountPerMinute,
            Self::ActiveEnergy | Self::RestingEnergy => Unit::Kilocalorie,
            Self::DistanceWalkingRunning
            | Self::DistanceCycling
            | Self::DistanceSwimming
            | Self::DistanceWheelchair
            | Self::DistanceDownhillSnowSports => Unit::Meter,
            Self::StepCount | Self::SwimmingStrokeCount => Unit::Count,
        }
    }

    /// Sum or average semantics
    #[must_use]
    pub const fn aggregation_style(self) -> AggregationStyle {
        match self {
            Self::HeartRate => AggregationStyle::Discrete,
            _ => AggregationStyle::Cumulative,
        }
    }

    /// Whether this kind measures distance
    #[must_use]
    pub const fn is_distance(self) -> bool {
        matches!(
            self,
            Self::DistanceWalkingRunning
                | Self::DistanceCycling
                | Self::DistanceSwimming
                | Self::DistanceWheelchair
                | Self::DistanceDownhillSnowSports
        )
    }

    /// Whether samples of this kind may carry elevation deltas in their metadata
    #[must_use]
    pub const fn carries_elevation(self) -> bool {
        matches!(
            self,
            Self::DistanceWalkingRunning | Self::DistanceCycling | Self::DistanceDownhillSnowSports
        )
    }

    /// Default time-search strategy for queries of this kind
    #[must_use]
    pub const fn default_search(self) -> TimeSearch {
        match self {
            Self::HeartRate | Self::ActiveEnergy | Self::RestingEnergy => {
                TimeSearch::ActivityWindow
            }
            _ => TimeSearch::SourceWindowWithFallback,
        }
    }

    /// Stable identifier used in logs and exports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HeartRate => "heart_rate",
            Self::ActiveEnergy => "active_energy",
            Self::RestingEnergy => "resting_energy",
            Self::DistanceWalkingRunning => "distance_walking_running",
            Self::DistanceCycling => "distance_cycling",
            Self::DistanceSwimming => "distance_swimming",
            Self::DistanceWheelchair => "distance_wheelchair",
            Self::DistanceDownhillSnowSports => "distance_downhill_snow_sports",
            Self::StepCount => "step_count",
            Self::SwimmingStrokeCount => "swimming_stroke_count",
        }
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
