// ABOUTME: Engine constants organized by domain
// ABOUTME: Time units, heart-rate zone defaults, and per-activity pace limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Pure data constants grouped by domain rather than kept in one flat list.

/// Time constants
pub mod time {
    /// Seconds in one minute bucket
    pub const SECONDS_PER_MINUTE: f64 = 60.0;
    /// Seconds in one hour
    pub const SECONDS_PER_HOUR: f64 = 3600.0;
    /// Meters in one kilometer
    pub const METERS_PER_KILOMETER: f64 = 1000.0;
}

/// Minute bucket constants
pub mod buckets {
    /// Buckets shorter than this do not expose pace or speed
    pub const MIN_RATE_WINDOW_SECONDS: f64 = 1.0;
    /// Bucket boundaries closer than this to the segment end snap onto it
    pub const BOUNDARY_EPSILON_SECONDS: f64 = 1e-6;
}

/// Heart-rate zone defaults
pub mod zones {
    /// Default zone lower bounds, as percentages of maximum heart rate
    pub const DEFAULT_THRESHOLDS_PERCENT: [f64; 5] = [50.0, 60.0, 70.0, 80.0, 90.0];
    /// Consecutive heart-rate samples further apart than this are not interpolated
    pub const DEFAULT_MAX_GAP_SECONDS: f64 = 60.0;
    /// Upper bound (exclusive) for a zone threshold percentage
    pub const MAX_THRESHOLD_PERCENT: f64 = 100.0;
}

/// Maximum acceptable pace per activity, in seconds per kilometer.
/// Slower computed paces are reported as absent.
pub mod pace {
    /// Running: 30 min/km
    pub const RUNNING_MAX_SECONDS_PER_KM: f64 = 1800.0;
    /// Walking and hiking: 60 min/km
    pub const WALKING_MAX_SECONDS_PER_KM: f64 = 3600.0;
    /// Cycling: 10 min/km
    pub const CYCLING_MAX_SECONDS_PER_KM: f64 = 600.0;
    /// Swimming: 5 min/100m
    pub const SWIMMING_MAX_SECONDS_PER_KM: f64 = 3000.0;
    /// Wheelchair: 30 min/km
    pub const WHEELCHAIR_MAX_SECONDS_PER_KM: f64 = 1800.0;
    /// Downhill snow sports: 20 min/km
    pub const SKIING_MAX_SECONDS_PER_KM: f64 = 1200.0;
}
