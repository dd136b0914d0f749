// ABOUTME: Unit tests for data points and minute buckets
// ABOUTME: Validates overlap attribution, absent-value semantics, and derived pace and speed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{assert_close, at, distance, origin};
use pierre_workout::data_point::DataPoint;
use pierre_workout::errors::ErrorCode;
use pierre_workout::kinds::{QuantityKind, ELEVATION_ASCENDED_KEY};
use pierre_workout::minute::{MinuteBucket, Placement};
use pierre_workout::models::RawSample;
use pierre_workout::units::{Pace, Quantity, Unit};

const DISTANCE: QuantityKind = QuantityKind::DistanceWalkingRunning;

fn bucket(start: f64, end: f64) -> MinuteBucket {
    let mut bucket = MinuteBucket::new(0, start, end).unwrap();
    bucket.register(DISTANCE, Unit::Meter);
    bucket.register(QuantityKind::HeartRate, Unit::CountPerMinute);
    bucket
}

fn meters(start: f64, end: f64, value: f64) -> DataPoint {
    DataPoint::ranged(start, end, value, Unit::Meter).unwrap()
}

// ============================================================================
// Data points
// ============================================================================

#[test]
fn test_ranged_with_equal_bounds_becomes_instant() {
    let point = DataPoint::ranged(12.0, 12.0, 3.0, Unit::Meter).unwrap();
    assert!(point.is_instant());
    assert_close(point.duration(), 0.0);
}

#[test]
fn test_ranged_rejects_inverted_bounds() {
    let err = DataPoint::ranged(20.0, 10.0, 3.0, Unit::Meter).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[test]
fn test_from_sample_converts_offsets_and_units() {
    let sample = RawSample::ranged(at(30.0), at(90.0), Quantity::new(0.25, Unit::Mile))
        .with_metadata(ELEVATION_ASCENDED_KEY, 4.0);

    let point = DataPoint::from_sample(&sample, origin(), Unit::Meter).unwrap();
    assert_close(point.start(), 30.0);
    assert_close(point.end(), 90.0);
    assert_close(point.value(), 402.336);
    assert_eq!(point.elevation(), (4.0, 0.0));

    let err = DataPoint::from_sample(&sample, origin(), Unit::Kilocalorie).unwrap_err();
    assert_eq!(err.code, ErrorCode::IncompatibleUnits);
}

// ============================================================================
// Registration and absent values
// ============================================================================

#[test]
fn test_zero_count_reports_absent_not_zero() {
    let bucket = bucket(0.0, 60.0);
    assert_eq!(bucket.count(DISTANCE), 0);
    assert!(bucket.total(DISTANCE).is_none());
    assert!(bucket.average(QuantityKind::HeartRate).is_none());
    assert!(bucket.distance().is_none());
    assert!(bucket.pace(None).is_none());
    assert!(bucket.speed().is_none());
}

#[test]
fn test_register_is_idempotent() {
    let mut bucket = bucket(0.0, 60.0);
    bucket.add_value(DISTANCE, 42.0).unwrap();
    bucket.register(DISTANCE, Unit::Meter);
    assert_eq!(bucket.count(DISTANCE), 1);
    assert_close(bucket.total(DISTANCE).unwrap().value, 42.0);
}

#[test]
fn test_unregistered_kind_is_rejected() {
    let mut bucket = bucket(0.0, 60.0);
    let err = bucket.add_value(QuantityKind::StepCount, 10.0).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnregisteredKind);
    assert!(err.is_precondition_violation());

    let point = DataPoint::ranged(0.0, 30.0, 80.0, Unit::Count).unwrap();
    assert!(bucket.add(&point, QuantityKind::StepCount).is_err());
}

#[test]
fn test_bucket_longer_than_a_minute_is_rejected() {
    let err = MinuteBucket::new(0, 0.0, 61.0).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidSegment);
}

// ============================================================================
// Overlap attribution
// ============================================================================

#[test]
fn test_ranged_sample_inside_bucket_counts_fully() {
    let mut bucket = bucket(0.0, 60.0);
    let placement = bucket.add(&meters(10.0, 40.0, 300.0), DISTANCE).unwrap();
    assert_eq!(placement, Placement::Absorbed);
    assert_close(bucket.distance().unwrap().value, 300.0);
}

#[test]
fn test_ranged_sample_split_at_bucket_boundary() {
    let mut first = bucket(0.0, 60.0);
    let mut second = bucket(60.0, 120.0);
    let point = meters(50.0, 80.0, 300.0);

    assert_eq!(first.add(&point, DISTANCE).unwrap(), Placement::Continues);
    assert_eq!(second.add(&point, DISTANCE).unwrap(), Placement::Absorbed);
    assert_close(first.total(DISTANCE).unwrap().value, 100.0);
    assert_close(second.total(DISTANCE).unwrap().value, 200.0);
}

#[test]
fn test_placement_outside_bucket() {
    let mut bucket = bucket(60.0, 120.0);
    assert_eq!(
        bucket.add(&meters(0.0, 60.0, 5.0), DISTANCE).unwrap(),
        Placement::Before
    );
    assert_eq!(
        bucket.add(&meters(120.0, 130.0, 5.0), DISTANCE).unwrap(),
        Placement::After
    );
    let instant = DataPoint::instant(120.0, 150.0, Unit::CountPerMinute);
    assert_eq!(
        bucket.add(&instant, QuantityKind::HeartRate).unwrap(),
        Placement::After
    );
    assert_eq!(bucket.count(DISTANCE), 0);
}

#[test]
fn test_discrete_ranged_value_is_not_split() {
    let mut first = bucket(0.0, 60.0);
    let mut second = bucket(60.0, 120.0);
    let point = DataPoint::ranged(30.0, 90.0, 140.0, Unit::CountPerMinute).unwrap();

    first.add(&point, QuantityKind::HeartRate).unwrap();
    second.add(&point, QuantityKind::HeartRate).unwrap();
    assert_close(first.average(QuantityKind::HeartRate).unwrap().value, 140.0);
    assert_close(second.average(QuantityKind::HeartRate).unwrap().value, 140.0);
}

#[test]
fn test_heart_rate_is_averaged() {
    let mut bucket = bucket(0.0, 60.0);
    for (t, bpm) in [(0.0, 120.0), (20.0, 130.0), (40.0, 140.0)] {
        let point = DataPoint::instant(t, bpm, Unit::CountPerMinute);
        bucket.add(&point, QuantityKind::HeartRate).unwrap();
    }
    assert_eq!(bucket.count(QuantityKind::HeartRate), 3);
    assert_close(bucket.average(QuantityKind::HeartRate).unwrap().value, 130.0);
}

#[test]
fn test_elevation_scaled_by_overlap() {
    let mut first = bucket(0.0, 60.0);
    let point = meters(30.0, 90.0, 120.0).with_elevation(6.0, 2.0);
    first.add(&point, DISTANCE).unwrap();
    assert_close(first.elevation_ascended().unwrap().value, 3.0);
    assert_close(first.elevation_descended().unwrap().value, 1.0);

    let mut untracked = MinuteBucket::new(1, 0.0, 60.0).unwrap();
    untracked.register(QuantityKind::DistanceSwimming, Unit::Meter);
    assert!(untracked.elevation_ascended().is_none());
}

// ============================================================================
// Derived rates
// ============================================================================

#[test]
fn test_pace_filtered_when_slower_than_limit() {
    let limit = Pace::from_seconds_per(600.0, Unit::Kilometer).unwrap();

    // 60 s over 92.3 m is roughly 650 s/km
    let mut slow = bucket(0.0, 60.0);
    slow.add(&meters(0.0, 60.0, 60.0 / 0.65), DISTANCE).unwrap();
    assert!(slow.pace(None).is_some());
    assert!(slow.pace(Some(limit)).is_none());

    let mut fast = bucket(0.0, 60.0);
    fast.add(&meters(0.0, 60.0, 200.0), DISTANCE).unwrap();
    let pace = fast.pace(Some(limit)).unwrap();
    assert_close(pace.seconds_per(Unit::Kilometer).unwrap(), 300.0);
    assert_close(fast.speed().unwrap().meters_per_second(), 200.0 / 60.0);
}

#[test]
fn test_rates_absent_for_sub_second_bucket() {
    let mut short = bucket(0.0, 0.5);
    short.add(&meters(0.0, 0.5, 2.0), DISTANCE).unwrap();
    assert!(short.distance().is_some());
    assert!(short.pace(None).is_none());
    assert!(short.speed().is_none());
}

#[test]
fn test_distance_prefers_walking_running() {
    let mut bucket = bucket(0.0, 60.0);
    bucket.register(QuantityKind::DistanceCycling, Unit::Meter);
    bucket.add_value(QuantityKind::DistanceCycling, 500.0).unwrap();
    assert_close(bucket.distance().unwrap().value, 500.0);

    bucket.add_value(DISTANCE, 0.0).unwrap();
    assert_close(bucket.distance().unwrap().value, 500.0);

    bucket.add_value(DISTANCE, 150.0).unwrap();
    assert_close(bucket.distance().unwrap().value, 150.0);
}

#[test]
fn test_instant_distance_sample() {
    let mut bucket = bucket(0.0, 60.0);
    let sample = distance(15.0, 15.0, 12.0);
    let point = DataPoint::from_sample(&sample, origin(), Unit::Meter).unwrap();
    assert_eq!(bucket.add(&point, DISTANCE).unwrap(), Placement::Absorbed);
    assert_close(bucket.total(DISTANCE).unwrap().value, 12.0);
}
