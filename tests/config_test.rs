// ABOUTME: Tests for environment-driven engine configuration and per-activity defaults
// ABOUTME: Validates parsing, lenient fallback, strict validation, and overlay onto workout configs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use pierre_workout::config::engine::{
    ENV_MAX_HEART_RATE, ENV_MAX_HR_GAP_SECONDS, ENV_MAX_PACE_SECONDS_PER_KM, ENV_ZONE_THRESHOLDS,
};
use pierre_workout::config::{ConfigError, EngineConfig};
use pierre_workout::errors::{AppError, ErrorCode};
use pierre_workout::kinds::QuantityKind;
use pierre_workout::models::ActivityType;
use pierre_workout::units::{Unit, UnitSet};
use pierre_workout::workout::WorkoutConfig;
use serial_test::serial;
use std::env;

fn clear_env() {
    for name in [
        ENV_ZONE_THRESHOLDS,
        ENV_MAX_HEART_RATE,
        ENV_MAX_HR_GAP_SECONDS,
        ENV_MAX_PACE_SECONDS_PER_KM,
    ] {
        env::remove_var(name);
    }
}

// ============================================================================
// Environment loading
// ============================================================================

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();
    let config = EngineConfig::from_env();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.zone_thresholds, vec![50.0, 60.0, 70.0, 80.0, 90.0]);
    assert!(config.max_heart_rate.is_none());
    assert!(EngineConfig::try_from_env().is_ok());
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    env::set_var(ENV_ZONE_THRESHOLDS, "55, 65,75");
    env::set_var(ENV_MAX_HEART_RATE, "188");
    env::set_var(ENV_MAX_HR_GAP_SECONDS, "30");
    env::set_var(ENV_MAX_PACE_SECONDS_PER_KM, "900");

    let config = EngineConfig::try_from_env().unwrap();
    assert_eq!(config.zone_thresholds, vec![55.0, 65.0, 75.0]);
    assert_eq!(config.max_heart_rate, Some(188.0));
    assert!((config.max_valid_heart_rate_gap_seconds - 30.0).abs() < f64::EPSILON);
    assert_eq!(config.max_pace_seconds_per_km, Some(900.0));
    assert_eq!(EngineConfig::from_env(), config);
    clear_env();
}

#[test]
#[serial]
fn test_unparseable_value_is_ignored_leniently() {
    clear_env();
    env::set_var(ENV_MAX_HEART_RATE, "fast");
    env::set_var(ENV_MAX_HR_GAP_SECONDS, "45");

    let config = EngineConfig::from_env();
    assert!(config.max_heart_rate.is_none());
    assert!((config.max_valid_heart_rate_gap_seconds - 45.0).abs() < f64::EPSILON);

    let err = EngineConfig::try_from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    clear_env();
}

#[test]
#[serial]
fn test_invalid_thresholds_fall_back_to_defaults() {
    clear_env();
    env::set_var(ENV_ZONE_THRESHOLDS, "70,60");

    assert_eq!(EngineConfig::from_env(), EngineConfig::default());
    let err = EngineConfig::try_from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidThresholds(_)));

    let app: AppError = err.into();
    assert_eq!(app.code, ErrorCode::ConfigInvalid);
    clear_env();
}

#[test]
#[serial]
fn test_non_finite_values_fall_back_to_defaults() {
    clear_env();
    env::set_var(ENV_MAX_HEART_RATE, "NaN");
    env::set_var(ENV_MAX_HR_GAP_SECONDS, "NaN");

    let config = EngineConfig::from_env();
    assert_eq!(config, EngineConfig::default());
    assert!(matches!(
        EngineConfig::try_from_env(),
        Err(ConfigError::InvalidRange(_))
    ));

    let mut running = WorkoutConfig::for_activity(ActivityType::Running);
    config.apply_to(&mut running);
    assert!(running.zones.as_ref().unwrap().accumulator().is_ok());

    env::set_var(ENV_MAX_HEART_RATE, "inf");
    env::remove_var(ENV_MAX_HR_GAP_SECONDS);
    env::set_var(ENV_MAX_PACE_SECONDS_PER_KM, "inf");
    assert_eq!(EngineConfig::from_env(), EngineConfig::default());
    assert!(EngineConfig::try_from_env().is_err());

    clear_env();
    env::set_var(ENV_ZONE_THRESHOLDS, "50,NaN");
    assert_eq!(EngineConfig::from_env(), EngineConfig::default());
    assert!(matches!(
        EngineConfig::try_from_env(),
        Err(ConfigError::InvalidThresholds(_))
    ));
    clear_env();
}

#[test]
fn test_validation_rules() {
    let mut config = EngineConfig::default();
    assert!(config.validate().is_ok());

    config.zone_thresholds = vec![];
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidThresholds(_))
    ));

    config.zone_thresholds = vec![50.0, 100.0];
    assert!(config.validate().is_err());

    config = EngineConfig {
        max_heart_rate: Some(-1.0),
        ..EngineConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidRange(_))));

    config = EngineConfig {
        max_valid_heart_rate_gap_seconds: 0.0,
        ..EngineConfig::default()
    };
    assert!(config.validate().is_err());
    config = EngineConfig {
        max_valid_heart_rate_gap_seconds: f64::INFINITY,
        max_pace_seconds_per_km: Some(f64::NAN),
        ..EngineConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidRange(_))));
}

// ============================================================================
// Per-activity defaults and overlay
// ============================================================================

#[test]
fn test_activity_defaults() {
    let running = WorkoutConfig::for_activity(ActivityType::Running);
    assert_eq!(running.units, UnitSet::metric());
    assert!(running.zones.is_some());
    assert_eq!(
        running.kinds(true),
        vec![
            QuantityKind::HeartRate,
            QuantityKind::ActiveEnergy,
            QuantityKind::RestingEnergy,
            QuantityKind::DistanceWalkingRunning,
        ]
    );
    assert!(running.kinds(false).contains(&QuantityKind::StepCount));
    let limit = running.max_pace.unwrap().seconds_per(Unit::Kilometer).unwrap();
    assert!((limit - 1800.0).abs() < 1e-9);

    let swimming = WorkoutConfig::for_activity(ActivityType::Swimming);
    assert_eq!(swimming.units, UnitSet::swimming());
    assert!(swimming.zones.is_none());
    assert!(swimming
        .kinds(false)
        .contains(&QuantityKind::SwimmingStrokeCount));

    let other = WorkoutConfig::for_activity(ActivityType::Other);
    assert!(other.max_pace.is_none());
    assert_eq!(other.kinds(false).len(), 3);
}

#[test]
fn test_overlay_onto_workout_config() {
    let engine = EngineConfig {
        zone_thresholds: vec![60.0, 75.0],
        max_heart_rate: Some(185.0),
        max_valid_heart_rate_gap_seconds: 20.0,
        max_pace_seconds_per_km: Some(420.0),
    };

    let mut running = WorkoutConfig::for_activity(ActivityType::Running);
    engine.apply_to(&mut running);
    let zones = running.zones.as_ref().unwrap();
    assert_eq!(zones.thresholds_percent, vec![60.0, 75.0]);
    assert_eq!(zones.max_heart_rate, Some(185.0));
    let limit = running.max_pace.unwrap().seconds_per(Unit::Kilometer).unwrap();
    assert!((limit - 420.0).abs() < 1e-9);
    assert_eq!(zones.accumulator().unwrap().zone_count(), 2);

    let mut swimming = WorkoutConfig::for_activity(ActivityType::Swimming);
    engine.apply_to(&mut swimming);
    assert!(swimming.zones.is_none());

    let keep_max = EngineConfig::default();
    let mut cycling = WorkoutConfig::for_activity(ActivityType::Cycling).with_max_heart_rate(192.0);
    keep_max.apply_to(&mut cycling);
    assert_eq!(cycling.zones.unwrap().max_heart_rate, Some(192.0));
}
