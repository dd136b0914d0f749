// ABOUTME: CSV export of loaded workouts: minute rows with pause markers and a one-line summary
// ABOUTME: Refuses export for errored, unavailable, or unloaded workouts (all-or-nothing policy)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # CSV Export
//!
//! Numbers are written as raw doubles in the report's display units and
//! durations as total seconds. Absent values are empty cells. A pause row only
//! fills the `pause_s` column.

use crate::errors::{AppError, AppResult};
use crate::units::{Quantity, UnitSet};
use crate::workout::{LoadState, Row, WorkoutAggregator, WorkoutReport};
use std::io::Write;
use tracing::debug;

fn cell(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

fn csv_error(err: csv::Error) -> AppError {
    AppError::serialization(format!("CSV write failed: {err}"))
}

/// Header of the minute-row export for `units`
#[must_use]
pub fn row_header(units: &UnitSet) -> Vec<String> {
    let distance = units.distance().symbol();
    let pace = units.pace_length().symbol();
    let energy = units.energy().symbol();
    vec![
        "minute".into(),
        "segment".into(),
        "start_offset_s".into(),
        "end_offset_s".into(),
        "duration_s".into(),
        "heart_rate_bpm".into(),
        format!("distance_{distance}"),
        format!("pace_s_per_{pace}"),
        format!(
            "speed_{}_per_{}",
            units.speed_length().symbol(),
            units.speed_time().symbol()
        ),
        format!("active_energy_{energy}"),
        format!("resting_energy_{energy}"),
        "steps".into(),
        "strokes".into(),
        "elevation_ascended_m".into(),
        "elevation_descended_m".into(),
        "pause_s".into(),
    ]
}

fn row_record(row: &Row, columns: usize) -> Vec<String> {
    match row {
        Row::Minute(minute) => vec![
            minute.minute.to_string(),
            minute.segment.to_string(),
            minute.start_offset.to_string(),
            minute.end_offset.to_string(),
            minute.duration_seconds.to_string(),
            cell(minute.heart_rate),
            cell(minute.distance),
            cell(minute.pace),
            cell(minute.speed),
            cell(minute.active_energy),
            cell(minute.resting_energy),
            cell(minute.step_count),
            cell(minute.stroke_count),
            cell(minute.elevation_ascended),
            cell(minute.elevation_descended),
            String::new(),
        ],
        Row::Pause { duration_seconds } => {
            let mut record = vec![String::new(); columns];
            if let Some(last) = record.last_mut() {
                *last = duration_seconds.to_string();
            }
            record
        }
    }
}

fn ensure_exportable(report: &WorkoutReport) -> AppResult<()> {
    if report.has_error() {
        return Err(AppError::export_refused(format!(
            "workout {} has missing data and cannot be exported",
            report.summary.id
        )));
    }
    Ok(())
}

/// Write the minute rows and pause markers of `report` as CSV
///
/// # Errors
///
/// Returns `ExportRefused` when the workout has an error, `NotLoaded` when it
/// was quick-loaded without rows, and `SerializationError` when writing fails
pub fn write_csv<W: Write>(report: &WorkoutReport, writer: W) -> AppResult<()> {
    ensure_exportable(report)?;
    let rows = report.rows().ok_or_else(|| {
        AppError::not_loaded(format!(
            "workout {} was loaded without minute rows",
            report.summary.id
        ))
    })?;

    let header = row_header(&report.units);
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&header).map_err(csv_error)?;
    for row in rows {
        csv.write_record(row_record(row, header.len()))
            .map_err(csv_error)?;
    }
    csv.flush()
        .map_err(|err| AppError::serialization(format!("CSV flush failed: {err}")))?;

    debug!(workout.id = %report.summary.id, rows = rows.len(), "Exported workout rows");
    Ok(())
}

/// Write the whole-workout summary of `report` as a header and one record
///
/// # Errors
///
/// Returns `ExportRefused` when the workout has an error and
/// `SerializationError` when writing fails
pub fn write_summary_csv<W: Write>(report: &WorkoutReport, writer: W) -> AppResult<()> {
    ensure_exportable(report)?;
    let summary = &report.summary;
    let quantity = |q: Option<Quantity>| cell(q.map(|q| q.value));

    let mut header = vec![
        "id".to_owned(),
        "activity".to_owned(),
        "start".to_owned(),
        "end".to_owned(),
        "elapsed_s".to_owned(),
        "active_s".to_owned(),
        "distance".to_owned(),
        "average_heart_rate_bpm".to_owned(),
        "max_heart_rate_bpm".to_owned(),
        "pace_s".to_owned(),
        "speed".to_owned(),
        "active_energy".to_owned(),
        "total_energy".to_owned(),
        "elevation_ascended_m".to_owned(),
        "elevation_descended_m".to_owned(),
        "steps".to_owned(),
        "strokes".to_owned(),
    ];
    let mut record = vec![
        summary.id.to_string(),
        summary.activity.name().to_owned(),
        summary.start.to_rfc3339(),
        summary.end.to_rfc3339(),
        summary.elapsed_seconds.to_string(),
        summary.active_seconds.to_string(),
        quantity(summary.distance),
        quantity(summary.average_heart_rate),
        quantity(summary.max_heart_rate),
        cell(summary.pace.map(|pace| pace.seconds)),
        cell(summary.speed.map(|speed| speed.value)),
        quantity(summary.active_energy),
        quantity(summary.total_energy),
        quantity(summary.elevation_ascended),
        quantity(summary.elevation_descended),
        cell(summary.step_count),
        cell(summary.stroke_count),
    ];
    for zone in summary.zones.iter().flatten() {
        header.push(format!("zone{}_s", zone.zone + 1));
        record.push(zone.seconds.to_string());
    }

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&header).map_err(csv_error)?;
    csv.write_record(&record).map_err(csv_error)?;
    csv.flush()
        .map_err(|err| AppError::serialization(format!("CSV flush failed: {err}")))?;
    Ok(())
}

/// Export a workout's minute rows once it has finished loading
///
/// # Errors
///
/// Returns `NotLoaded` before loading finishes, `ExportRefused` when the
/// source was unavailable or any kind failed, and the errors of [`write_csv`]
pub async fn export_workout<W: Write>(aggregator: &WorkoutAggregator, writer: W) -> AppResult<()> {
    match aggregator.load_state().await {
        LoadState::Loaded => {}
        LoadState::Unavailable => {
            return Err(AppError::export_refused(format!(
                "workout {} has no data to export",
                aggregator.definition().id
            )))
        }
        LoadState::NotLoaded | LoadState::Loading => {
            return Err(AppError::not_loaded(format!(
                "workout {} is not loaded",
                aggregator.definition().id
            )))
        }
    }
    let report = aggregator.report().await?;
    write_csv(&report, writer)
}
