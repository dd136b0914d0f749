// ABOUTME: Engine-wide settings for heart-rate zones and pace filtering
// ABOUTME: Loaded from WORKOUT_* environment variables and overlaid onto per-activity defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::error::ConfigError;
use crate::constants::time::METERS_PER_KILOMETER;
use crate::constants::zones::{
    DEFAULT_MAX_GAP_SECONDS, DEFAULT_THRESHOLDS_PERCENT, MAX_THRESHOLD_PERCENT,
};
use crate::units::Pace;
use crate::workout::WorkoutConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;

/// Comma-separated zone lower bounds in percent of max heart rate
pub const ENV_ZONE_THRESHOLDS: &str = "WORKOUT_HR_ZONE_THRESHOLDS";
/// Maximum heart rate in bpm
pub const ENV_MAX_HEART_RATE: &str = "WORKOUT_MAX_HEART_RATE";
/// Longest heart-rate sample gap that is still interpolated, in seconds
pub const ENV_MAX_HR_GAP_SECONDS: &str = "WORKOUT_MAX_HR_GAP_SECONDS";
/// Slowest pace still reported, in seconds per kilometer
pub const ENV_MAX_PACE_SECONDS_PER_KM: &str = "WORKOUT_MAX_PACE_SECONDS_PER_KM";

/// Engine-wide overrides applied on top of per-activity defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Zone lower bounds in percent of max heart rate
    pub zone_thresholds: Vec<f64>,
    /// Maximum heart rate in bpm
    pub max_heart_rate: Option<f64>,
    /// Longest gap between heart-rate samples that is still interpolated
    pub max_valid_heart_rate_gap_seconds: f64,
    /// Slowest pace still reported; `None` keeps the activity default
    pub max_pace_seconds_per_km: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zone_thresholds: DEFAULT_THRESHOLDS_PERCENT.to_vec(),
            max_heart_rate: None,
            max_valid_heart_rate_gap_seconds: DEFAULT_MAX_GAP_SECONDS,
            max_pace_seconds_per_km: None,
        }
    }
}

impl EngineConfig {
    /// Load from environment variables, falling back to defaults for any
    /// value that is missing or invalid
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            zone_thresholds: lenient(ENV_ZONE_THRESHOLDS, parse_thresholds_var())
                .unwrap_or(defaults.zone_thresholds),
            max_heart_rate: lenient(ENV_MAX_HEART_RATE, parse_var(ENV_MAX_HEART_RATE)),
            max_valid_heart_rate_gap_seconds: lenient(
                ENV_MAX_HR_GAP_SECONDS,
                parse_var(ENV_MAX_HR_GAP_SECONDS),
            )
            .unwrap_or(defaults.max_valid_heart_rate_gap_seconds),
            max_pace_seconds_per_km: lenient(
                ENV_MAX_PACE_SECONDS_PER_KM,
                parse_var(ENV_MAX_PACE_SECONDS_PER_KM),
            ),
        };

        match config.validate() {
            Ok(()) => config,
            Err(err) => {
                warn!(error = %err, "Invalid workout engine configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Load from environment variables, failing on the first invalid value
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for unparseable values and the errors of
    /// [`EngineConfig::validate`]
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            zone_thresholds: parse_thresholds_var()?.unwrap_or(defaults.zone_thresholds),
            max_heart_rate: parse_var(ENV_MAX_HEART_RATE)?,
            max_valid_heart_rate_gap_seconds: parse_var(ENV_MAX_HR_GAP_SECONDS)?
                .unwrap_or(defaults.max_valid_heart_rate_gap_seconds),
            max_pace_seconds_per_km: parse_var(ENV_MAX_PACE_SECONDS_PER_KM)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidThresholds` for empty, unsorted, or
    /// out-of-range thresholds and `ConfigError::InvalidRange` for
    /// non-positive or non-finite heart rate, gap, or pace
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zone_thresholds.is_empty() {
            return Err(ConfigError::InvalidThresholds(
                "at least one threshold is required".into(),
            ));
        }
        if let Some(bad) = self
            .zone_thresholds
            .iter()
            .find(|t| !t.is_finite() || !(0.0..MAX_THRESHOLD_PERCENT).contains(*t))
        {
            return Err(ConfigError::InvalidThresholds(format!(
                "{bad} is outside [0, 100)"
            )));
        }
        if self.zone_thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::InvalidThresholds(format!(
                "{:?} is not strictly ascending",
                self.zone_thresholds
            )));
        }
        if self.max_heart_rate.is_some_and(|bpm| !is_positive(bpm)) {
            return Err(ConfigError::InvalidRange(
                "max heart rate must be positive and finite",
            ));
        }
        if !is_positive(self.max_valid_heart_rate_gap_seconds) {
            return Err(ConfigError::InvalidRange(
                "max heart-rate gap must be positive and finite",
            ));
        }
        if self.max_pace_seconds_per_km.is_some_and(|pace| !is_positive(pace)) {
            return Err(ConfigError::InvalidRange(
                "max pace must be positive and finite",
            ));
        }
        Ok(())
    }

    /// Overlay these settings onto a per-activity configuration.
    ///
    /// Zone settings only change workouts that track zones; the max heart rate
    /// and max pace only replace the activity defaults when set.
    pub fn apply_to(&self, config: &mut WorkoutConfig) {
        if let Some(zones) = config.zones.as_mut() {
            zones.thresholds_percent.clone_from(&self.zone_thresholds);
            zones.max_gap_seconds = self.max_valid_heart_rate_gap_seconds;
            if self.max_heart_rate.is_some() {
                zones.max_heart_rate = self.max_heart_rate;
            }
        }
        if let Some(seconds) = self.max_pace_seconds_per_km {
            config.max_pace = Pace::from_duration_and_distance(seconds, METERS_PER_KILOMETER);
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Parse(format!("{name}={raw}"))),
        Err(_) => Ok(None),
    }
}

fn parse_thresholds_var() -> Result<Option<Vec<f64>>, ConfigError> {
    let Ok(raw) = env::var(ENV_ZONE_THRESHOLDS) else {
        return Ok(None);
    };
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::Parse(format!("{ENV_ZONE_THRESHOLDS}={raw}")))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn lenient<T>(name: &str, parsed: Result<Option<T>, ConfigError>) -> Option<T> {
    parsed.unwrap_or_else(|err| {
        warn!(variable = name, error = %err, "Ignoring invalid environment value");
        None
    })
}
