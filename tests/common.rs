// ABOUTME: Shared test utilities and sample builders for integration tests
// ABOUTME: Provides quiet logging setup, fixed workout clocks, and raw sample constructors
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation
)]
//! Shared test utilities for `pierre_workout`
//!
//! Every workout in the tests starts at the same instant so offsets in
//! assertions read as plain seconds.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pierre_workout::kinds::QuantityKind;
use pierre_workout::models::{ActivityType, RawSample, WorkoutEvent};
use pierre_workout::synthetic::SyntheticSource;
use pierre_workout::units::{Quantity, Unit};
use pierre_workout::workout::WorkoutDefinition;
use std::env;
use std::sync::Once;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Start of every test workout
pub fn origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 7, 0, 0).unwrap()
}

/// Instant `seconds` after [`origin`], millisecond precision
pub fn at(seconds: f64) -> DateTime<Utc> {
    origin() + Duration::milliseconds((seconds * 1000.0).round() as i64)
}

/// Assert two floats agree to within a micro-unit
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// Heart-rate reading at `seconds`
pub fn heart_rate(seconds: f64, bpm: f64) -> RawSample {
    RawSample::instant(at(seconds), Quantity::new(bpm, Unit::CountPerMinute))
}

/// Distance covered over `[start, end)` in meters
pub fn distance(start: f64, end: f64, meters: f64) -> RawSample {
    RawSample::ranged(at(start), at(end), Quantity::new(meters, Unit::Meter))
}

/// Energy burned over `[start, end)` in kilocalories
pub fn energy(start: f64, end: f64, kcal: f64) -> RawSample {
    RawSample::ranged(at(start), at(end), Quantity::new(kcal, Unit::Kilocalorie))
}

/// Steps taken over `[start, end)`
pub fn steps(start: f64, end: f64, count: f64) -> RawSample {
    RawSample::ranged(at(start), at(end), Quantity::new(count, Unit::Count))
}

/// Workout of `seconds` length starting at [`origin`]
pub fn definition(activity: ActivityType, seconds: f64) -> WorkoutDefinition {
    WorkoutDefinition::new(activity, origin(), at(seconds))
}

/// Running workout paused over `[pause, resume)`
pub fn paused_run(seconds: f64, pause: f64, resume: f64) -> WorkoutDefinition {
    definition(ActivityType::Running, seconds).with_events(vec![
        WorkoutEvent::Pause { at: at(pause) },
        WorkoutEvent::Resume { at: at(resume) },
    ])
}

/// Source holding a steady run: 1 Hz heart rate at `bpm`, 10 s distance
/// samples at `meters_per_second`, and per-minute energy and steps
pub fn steady_run_source(seconds: u32, bpm: f64, meters_per_second: f64) -> SyntheticSource {
    let source = SyntheticSource::new();
    let seconds_f = f64::from(seconds);

    let heart = (0..seconds).map(|s| heart_rate(f64::from(s), bpm)).collect();
    let distances = (0..seconds / 10)
        .map(|i| {
            let start = f64::from(i * 10);
            distance(start, start + 10.0, meters_per_second * 10.0)
        })
        .collect();
    let minutes = (seconds_f / 60.0).ceil() as u32;
    let windows = || {
        (0..minutes).map(move |m| {
            let start = f64::from(m * 60);
            (start, (start + 60.0).min(seconds_f))
        })
    };

    source.insert_samples(QuantityKind::HeartRate, heart).unwrap();
    source
        .insert_samples(QuantityKind::DistanceWalkingRunning, distances)
        .unwrap();
    source
        .insert_samples(
            QuantityKind::ActiveEnergy,
            windows().map(|(s, e)| energy(s, e, 10.0)).collect(),
        )
        .unwrap();
    source
        .insert_samples(
            QuantityKind::RestingEnergy,
            windows().map(|(s, e)| energy(s, e, 1.5)).collect(),
        )
        .unwrap();
    source
        .insert_samples(
            QuantityKind::StepCount,
            windows().map(|(s, e)| steps(s, e, 170.0)).collect(),
        )
        .unwrap();
    source
}
