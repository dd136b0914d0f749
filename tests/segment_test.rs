// ABOUTME: Unit tests for active segments and the overlap distribution walk
// ABOUTME: Validates bucket partitioning, cursor rewinds, and leftovers handed across pauses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{assert_close, at, distance, init_test_logging, origin};
use pierre_workout::data_point::DataPoint;
use pierre_workout::errors::ErrorCode;
use pierre_workout::kinds::QuantityKind;
use pierre_workout::segment::Segment;
use pierre_workout::units::Unit;

const DISTANCE: QuantityKind = QuantityKind::DistanceWalkingRunning;

fn segment(start: f64, end: f64, first_index: u64) -> Segment {
    let mut segment = Segment::new(origin(), at(start), at(end), first_index).unwrap();
    segment.register(DISTANCE, Unit::Meter);
    segment
}

fn meters(start: f64, end: f64, value: f64) -> DataPoint {
    DataPoint::ranged(start, end, value, Unit::Meter).unwrap()
}

fn totals(segment: &Segment) -> Vec<Option<f64>> {
    segment
        .buckets()
        .iter()
        .map(|bucket| bucket.total(DISTANCE).map(|q| q.value))
        .collect()
}

// ============================================================================
// Partitioning
// ============================================================================

#[test]
fn test_partition_covers_segment_without_gaps() {
    let segment = segment(30.0, 180.0, 4);
    let buckets = segment.buckets();

    assert_eq!(buckets.len(), 3);
    assert_close(buckets[0].start_offset(), 30.0);
    for pair in buckets.windows(2) {
        assert_close(pair[0].end_offset(), pair[1].start_offset());
        assert_eq!(pair[0].index() + 1, pair[1].index());
    }
    assert_close(buckets[2].end_offset(), 180.0);
    assert_close(buckets[2].duration(), 30.0);
    assert_eq!(buckets[0].index(), 4);
    assert_eq!(segment.next_index(), 7);
}

#[test]
fn test_whole_minutes_leave_no_trailing_bucket() {
    let segment = segment(0.3, 180.3, 0);
    assert_eq!(segment.buckets().len(), 3);
    assert!(segment
        .buckets()
        .iter()
        .all(|bucket| (bucket.duration() - 60.0).abs() < 1e-6));
}

#[test]
fn test_sub_second_trailing_bucket_is_kept() {
    let segment = segment(0.0, 60.5, 0);
    assert_eq!(segment.buckets().len(), 2);
    assert_close(segment.buckets()[1].duration(), 0.5);
}

#[test]
fn test_zero_length_segment_has_no_buckets() {
    let mut segment = segment(90.0, 90.0, 2);
    assert!(segment.buckets().is_empty());
    assert_eq!(segment.next_index(), 2);

    let points = vec![meters(80.0, 100.0, 20.0)];
    let leftovers = segment.process(&points, DISTANCE).unwrap();
    assert_eq!(leftovers, points);
}

#[test]
fn test_inverted_segment_is_rejected() {
    let err = Segment::new(origin(), at(120.0), at(60.0), 0).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidSegment);

    let err = Segment::new(at(10.0), at(0.0), at(60.0), 0).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidSegment);
}

// ============================================================================
// Distribution
// ============================================================================

#[test]
fn test_cross_bucket_sample_is_split_by_overlap() {
    init_test_logging();
    let mut segment = segment(0.0, 120.0, 0);
    let leftovers = segment
        .process(&[meters(50.0, 80.0, 300.0)], DISTANCE)
        .unwrap();

    assert!(leftovers.is_empty());
    let totals = totals(&segment);
    assert_close(totals[0].unwrap(), 100.0);
    assert_close(totals[1].unwrap(), 200.0);
}

#[test]
fn test_sample_spanning_many_buckets() {
    let mut segment = segment(0.0, 180.0, 0);
    segment
        .process(&[meters(30.0, 150.0, 1200.0)], DISTANCE)
        .unwrap();

    let totals = totals(&segment);
    assert_close(totals[0].unwrap(), 300.0);
    assert_close(totals[1].unwrap(), 600.0);
    assert_close(totals[2].unwrap(), 300.0);
}

#[test]
fn test_cumulative_values_are_conserved() {
    let mut segment = segment(0.0, 600.0, 0);
    let points: Vec<DataPoint> = (0..60)
        .map(|i| {
            let start = f64::from(i) * 9.7;
            meters(start, start + 13.0, 25.0)
        })
        .collect();
    let leftovers = segment.process(&points, DISTANCE).unwrap();
    assert!(leftovers.is_empty());

    let sum: f64 = totals(&segment).into_iter().flatten().sum();
    assert_close(sum, 60.0 * 25.0);
}

#[test]
fn test_out_of_order_point_rewinds_cursor() {
    let mut segment = segment(0.0, 120.0, 0);
    let points = [meters(70.0, 80.0, 10.0), meters(10.0, 20.0, 5.0)];
    segment.process(&points, DISTANCE).unwrap();

    let totals = totals(&segment);
    assert_close(totals[0].unwrap(), 5.0);
    assert_close(totals[1].unwrap(), 10.0);
}

#[test]
fn test_overlapping_points_are_both_counted() {
    let mut segment = segment(0.0, 120.0, 0);
    let points = [meters(0.0, 100.0, 100.0), meters(50.0, 70.0, 20.0)];
    segment.process(&points, DISTANCE).unwrap();

    let totals = totals(&segment);
    assert_close(totals[0].unwrap(), 60.0 + 10.0);
    assert_close(totals[1].unwrap(), 40.0 + 10.0);
}

#[test]
fn test_instant_at_bucket_boundary_goes_to_later_bucket() {
    let mut segment = segment(0.0, 120.0, 0);
    let point = DataPoint::instant(60.0, 7.0, Unit::Meter);
    segment.process(&[point], DISTANCE).unwrap();

    let totals = totals(&segment);
    assert!(totals[0].is_none());
    assert_close(totals[1].unwrap(), 7.0);
}

#[test]
fn test_leftovers_cross_a_pause() {
    let mut first = segment(0.0, 90.0, 0);
    let mut second = segment(150.0, 240.0, first.next_index());
    let points = [
        meters(80.0, 100.0, 20.0),
        meters(100.0, 140.0, 50.0),
        meters(140.0, 160.0, 20.0),
    ];

    let leftovers = first.process(&points, DISTANCE).unwrap();
    assert_eq!(leftovers.len(), 3);
    assert_close(totals(&first)[1].unwrap(), 10.0);

    let remaining = second.process(&leftovers, DISTANCE).unwrap();
    assert!(remaining.is_empty());
    assert_close(totals(&second)[0].unwrap(), 10.0);
    assert!(totals(&second)[1].is_none());
    assert_eq!(second.buckets()[0].index(), 2);
}

#[test]
fn test_points_past_segment_end_are_returned() {
    let mut segment = segment(0.0, 60.0, 0);
    let at_end = DataPoint::instant(60.0, 7.0, Unit::Meter);
    let points = [
        meters(30.0, 90.0, 60.0),
        at_end.clone(),
        meters(100.0, 110.0, 5.0),
    ];
    let leftovers = segment.process(&points, DISTANCE).unwrap();

    assert_eq!(leftovers.len(), 3);
    assert_eq!(leftovers[1], at_end);
    assert_close(totals(&segment)[0].unwrap(), 30.0);
}

#[test]
fn test_process_samples_converts_raw_samples() {
    let mut segment = segment(0.0, 120.0, 0);
    let samples = [distance(50.0, 80.0, 300.0)];
    let leftovers = segment
        .process_samples(&samples, origin(), DISTANCE, Unit::Meter)
        .unwrap();

    assert!(leftovers.is_empty());
    assert_close(totals(&segment)[0].unwrap(), 100.0);
}

#[test]
fn test_unregistered_kind_fails_processing() {
    let mut segment = segment(0.0, 120.0, 0);
    let point = DataPoint::instant(10.0, 150.0, Unit::CountPerMinute);
    let err = segment
        .process(&[point], QuantityKind::HeartRate)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnregisteredKind);
}
