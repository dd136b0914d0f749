// ABOUTME: Workout aggregator orchestrating concurrent per-kind sample loading
// ABOUTME: Routes samples to whole-workout totals, minute segments, and heart-rate zones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Workout Aggregation
//!
//! [`WorkoutAggregator`] owns the segments built from a workout's active
//! intervals plus the whole-workout running totals. Loading issues one query
//! per quantity kind on its own tokio task. Every completion is applied under a
//! single async mutex, which also guards the outstanding-kind counter; the last
//! completion flips the state to [`LoadState::Loaded`] and wakes waiters.
//!
//! Once loaded the state is never mutated again, so [`WorkoutAggregator::report`]
//! can hand out an immutable [`WorkoutReport`].
//!
//! ```text
//! NotLoaded ──load()──▶ Loading ──last kind done──▶ Loaded
//!     │
//!     └──source unavailable──▶ Unavailable
//! ```

mod profile;
mod summary;

pub use profile::{WorkoutConfig, ZoneSettings};
pub use summary::{
    MinuteRow, PaceReading, Row, SpeedReading, WorkoutReport, WorkoutSummary, ZoneTime,
};

use crate::data_point::DataPoint;
use crate::errors::{AppError, AppResult};
use crate::heart_zones::HeartRateZoneAccumulator;
use crate::kinds::{QuantityKind, TimeSearch};
use crate::models::{
    active_intervals, seconds_between, ActiveInterval, ActivityType, RawSample, WorkoutEvent,
};
use crate::segment::Segment;
use crate::source::{HealthDataSource, SampleFilter, SampleQuery};
use crate::units::{Pace, Quantity, Speed, Unit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Identity and timing of one recorded workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDefinition {
    /// Workout identifier
    pub id: Uuid,
    /// Activity performed
    pub activity: ActivityType,
    /// Workout start
    pub start: DateTime<Utc>,
    /// Workout end
    pub end: DateTime<Utc>,
    /// Pause and resume markers
    #[serde(default)]
    pub events: Vec<WorkoutEvent>,
    /// Name of the device or app that recorded the workout
    #[serde(default)]
    pub source_name: Option<String>,
    /// Window the recording source declared for its own samples
    #[serde(default)]
    pub source_window: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl WorkoutDefinition {
    /// Workout without pauses and with a fresh identifier
    #[must_use]
    pub fn new(activity: ActivityType, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            activity,
            start,
            end,
            events: Vec::new(),
            source_name: None,
            source_window: None,
        }
    }

    /// Attach pause and resume markers
    #[must_use]
    pub fn with_events(mut self, events: Vec<WorkoutEvent>) -> Self {
        self.events = events;
        self
    }

    /// Attach the recording source and the window it declared
    #[must_use]
    pub fn with_source(
        mut self,
        name: impl Into<String>,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Self {
        self.source_name = Some(name.into());
        self.source_window = window;
        self
    }
}

/// Lifecycle of a workout's data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// `load` has not been called
    NotLoaded,
    /// Queries are in flight
    Loading,
    /// Every requested kind has reported back
    Loaded,
    /// The data source could not be queried; no data is available
    Unavailable,
}

impl LoadState {
    /// Whether the state is terminal
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Loaded | Self::Unavailable)
    }
}

/// What a call to [`WorkoutAggregator::load`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Queries were issued for this many kinds
    Started {
        /// Number of kinds queried
        kinds: usize,
    },
    /// No kinds applied, so the workout became loaded immediately
    Completed,
    /// The source reported itself unavailable
    Unavailable,
    /// Loading had already started; nothing was done
    AlreadyStarted,
}

/// Whole-workout running totals kept independently of minute buckets
///
/// Every returned sample counts here, including samples recorded during a
/// pause, while minute buckets only see samples inside active segments.
#[derive(Debug, Clone, Default)]
struct Totals {
    heart_rate_sum: f64,
    heart_rate_count: u32,
    heart_rate_max: Option<f64>,
    active_energy: Option<f64>,
    resting_energy: Option<f64>,
    distances: BTreeMap<QuantityKind, f64>,
    elevation: Option<(f64, f64)>,
    steps: Option<f64>,
    strokes: Option<f64>,
}

impl Totals {
    fn record(&mut self, kind: QuantityKind, points: &[DataPoint]) {
        match kind {
            QuantityKind::HeartRate => {
                for point in points {
                    let bpm = point.value();
                    self.heart_rate_sum += bpm;
                    self.heart_rate_count += 1;
                    self.heart_rate_max =
                        Some(self.heart_rate_max.map_or(bpm, |max| max.max(bpm)));
                }
            }
            QuantityKind::ActiveEnergy => accumulate(&mut self.active_energy, points),
            QuantityKind::RestingEnergy => accumulate(&mut self.resting_energy, points),
            QuantityKind::StepCount => accumulate(&mut self.steps, points),
            QuantityKind::SwimmingStrokeCount => accumulate(&mut self.strokes, points),
            QuantityKind::DistanceWalkingRunning
            | QuantityKind::DistanceCycling
            | QuantityKind::DistanceSwimming
            | QuantityKind::DistanceWheelchair
            | QuantityKind::DistanceDownhillSnowSports => {
                *self.distances.entry(kind).or_insert(0.0) +=
                    points.iter().map(DataPoint::value).sum::<f64>();
                if kind.carries_elevation() {
                    let elevation = self.elevation.get_or_insert((0.0, 0.0));
                    for point in points {
                        let (ascended, descended) = point.elevation();
                        elevation.0 += ascended;
                        elevation.1 += descended;
                    }
                }
            }
        }
    }

    fn distance_meters(&self) -> Option<f64> {
        QuantityKind::DISTANCE_PREFERENCE
            .iter()
            .filter_map(|kind| self.distances.get(kind).copied())
            .find(|meters| *meters != 0.0)
    }

    /// Active plus resting energy, absent unless the sum is positive
    fn total_energy(&self) -> Option<f64> {
        if self.active_energy.is_none() && self.resting_energy.is_none() {
            return None;
        }
        let total = self.active_energy.unwrap_or(0.0) + self.resting_energy.unwrap_or(0.0);
        (total > 0.0).then_some(total)
    }
}

fn accumulate(slot: &mut Option<f64>, points: &[DataPoint]) {
    if points.is_empty() {
        return;
    }
    *slot.get_or_insert(0.0) += points.iter().map(DataPoint::value).sum::<f64>();
}

/// Configuration fixed at construction and shared with query tasks
#[derive(Debug)]
struct WorkoutContext {
    definition: WorkoutDefinition,
    config: WorkoutConfig,
    intervals: Vec<ActiveInterval>,
}

/// Mutable per-workout state, only touched under the aggregator's mutex
#[derive(Debug)]
struct WorkoutState {
    load_state: LoadState,
    quick: bool,
    outstanding: usize,
    has_error: bool,
    segments: Vec<Segment>,
    totals: Totals,
    zones: Option<HeartRateZoneAccumulator>,
    loaded_kinds: BTreeSet<QuantityKind>,
    failed_kinds: BTreeSet<QuantityKind>,
}

impl WorkoutState {
    fn complete(
        &mut self,
        kind: QuantityKind,
        result: AppResult<Vec<RawSample>>,
        context: &WorkoutContext,
    ) {
        let id = context.definition.id;
        match result.and_then(|samples| self.apply(kind, &samples, context)) {
            Ok(()) => {
                self.loaded_kinds.insert(kind);
            }
            Err(err) => {
                if err.is_precondition_violation() {
                    error!(
                        workout.id = %id,
                        quantity.kind = %kind,
                        error = %err,
                        "Workout wiring error while applying samples"
                    );
                } else {
                    warn!(
                        workout.id = %id,
                        quantity.kind = %kind,
                        error = %err,
                        "Quantity kind failed to load"
                    );
                }
                self.has_error = true;
                self.failed_kinds.insert(kind);
            }
        }
        self.outstanding = self.outstanding.saturating_sub(1);
        debug!(
            workout.id = %id,
            quantity.kind = %kind,
            outstanding = self.outstanding,
            "Quantity kind completed"
        );
    }

    fn apply(
        &mut self,
        kind: QuantityKind,
        samples: &[RawSample],
        context: &WorkoutContext,
    ) -> AppResult<()> {
        let unit = kind.default_unit();
        let workout_start = context.definition.start;
        let points = samples
            .iter()
            .map(|sample| DataPoint::from_sample(sample, workout_start, unit))
            .collect::<AppResult<Vec<_>>>()?;

        self.totals.record(kind, &points);
        if kind == QuantityKind::HeartRate {
            if let Some(zones) = self.zones.as_mut() {
                zones.add_points(&points);
            }
        }
        if self.quick {
            return Ok(());
        }

        for segment in &mut self.segments {
            segment.register(kind, unit);
        }
        let mut pending = points;
        for segment in &mut self.segments {
            if pending.is_empty() {
                break;
            }
            pending = segment.process(&pending, kind)?;
        }
        if !pending.is_empty() {
            debug!(
                workout.id = %context.definition.id,
                quantity.kind = %kind,
                discarded = pending.len(),
                "Samples extend past the last segment"
            );
        }
        Ok(())
    }

    fn report(&self, context: &WorkoutContext) -> WorkoutReport {
        let definition = &context.definition;
        let config = &context.config;
        let units = config.units;
        let totals = &self.totals;

        let active_seconds: f64 = context
            .intervals
            .iter()
            .map(ActiveInterval::duration_seconds)
            .sum();
        let meters = totals.distance_meters();
        let pace = meters
            .and_then(|m| Pace::from_duration_and_distance(active_seconds, m))
            .filter(|pace| config.max_pace.is_none_or(|limit| !pace.is_slower_than(limit)));
        let speed = meters.and_then(|m| Speed::from_distance_and_duration(m, active_seconds));

        let total_energy = totals.total_energy();
        let energy = |kcal: f64| Quantity::new(kcal, Unit::Kilocalorie).to(units.energy()).ok();
        let heart_rate = |bpm: f64| Quantity::new(bpm, Unit::CountPerMinute);

        let zones = self.zones.as_ref().and_then(|accumulator| {
            let thresholds = accumulator.thresholds_percent();
            accumulator.zone_times().map(|times| {
                times
                    .iter()
                    .zip(thresholds)
                    .enumerate()
                    .map(|(zone, (seconds, lower_percent))| ZoneTime {
                        zone,
                        lower_percent,
                        seconds: *seconds,
                    })
                    .collect()
            })
        });

        let summary = WorkoutSummary {
            id: definition.id,
            activity: definition.activity,
            start: definition.start,
            end: definition.end,
            elapsed_seconds: seconds_between(definition.start, definition.end),
            active_seconds,
            distance: meters.and_then(|m| Quantity::new(m, Unit::Meter).to(units.distance()).ok()),
            average_heart_rate: (totals.heart_rate_count > 0).then(|| {
                heart_rate(totals.heart_rate_sum / f64::from(totals.heart_rate_count))
            }),
            max_heart_rate: totals.heart_rate_max.map(heart_rate),
            pace: pace.map(|pace| summary::pace_reading(pace, &units)),
            speed: speed.map(|speed| summary::speed_reading(speed, &units)),
            active_energy: total_energy.and(totals.active_energy).and_then(energy),
            total_energy: total_energy.and_then(energy),
            elevation_ascended: totals
                .elevation
                .map(|(ascended, _)| Quantity::new(ascended, Unit::Meter)),
            elevation_descended: totals
                .elevation
                .map(|(_, descended)| Quantity::new(descended, Unit::Meter)),
            step_count: totals.steps,
            stroke_count: totals.strokes,
            zones,
            has_error: self.has_error,
        };

        let rows = (!self.quick).then(|| self.rows(config));
        WorkoutReport {
            summary,
            units,
            rows,
        }
    }

    fn rows(&self, config: &WorkoutConfig) -> Vec<Row> {
        let mut rows = Vec::new();
        for (index, segment) in self.segments.iter().enumerate() {
            rows.extend(segment.buckets().iter().map(|bucket| {
                Row::Minute(MinuteRow::from_bucket(
                    bucket,
                    index,
                    &config.units,
                    config.max_pace,
                ))
            }));
            if let Some(duration_seconds) = segment.pause_after() {
                rows.push(Row::Pause { duration_seconds });
            }
        }
        rows
    }
}

/// Aggregates one workout's samples into a summary and minute rows
pub struct WorkoutAggregator {
    context: Arc<WorkoutContext>,
    source: Arc<dyn HealthDataSource>,
    state: Arc<Mutex<WorkoutState>>,
    loaded: Arc<Notify>,
}

impl WorkoutAggregator {
    /// Build the aggregator and its segments from the workout's active intervals
    ///
    /// # Errors
    ///
    /// Returns `InvalidSegment` when the workout ends before it starts and
    /// `InvalidInput` when the zone settings are invalid
    pub fn new(
        definition: WorkoutDefinition,
        config: WorkoutConfig,
        source: Arc<dyn HealthDataSource>,
    ) -> AppResult<Self> {
        if definition.end < definition.start {
            return Err(AppError::invalid_segment(format!(
                "workout {} ends at {} before it starts at {}",
                definition.id, definition.end, definition.start
            )));
        }

        let intervals = active_intervals(definition.start, definition.end, &definition.events);
        let segments = build_segments(definition.start, &intervals)?;
        let zones = config
            .zones
            .as_ref()
            .map(ZoneSettings::accumulator)
            .transpose()?;

        debug!(
            workout.id = %definition.id,
            activity = ?definition.activity,
            segments = segments.len(),
            "Built workout segments"
        );

        Ok(Self {
            context: Arc::new(WorkoutContext {
                definition,
                config,
                intervals,
            }),
            source,
            state: Arc::new(Mutex::new(WorkoutState {
                load_state: LoadState::NotLoaded,
                quick: false,
                outstanding: 0,
                has_error: false,
                segments,
                totals: Totals::default(),
                zones,
                loaded_kinds: BTreeSet::new(),
                failed_kinds: BTreeSet::new(),
            })),
            loaded: Arc::new(Notify::new()),
        })
    }

    /// Build with the default configuration for the workout's activity
    ///
    /// # Errors
    ///
    /// See [`WorkoutAggregator::new`]
    pub fn for_activity(
        definition: WorkoutDefinition,
        source: Arc<dyn HealthDataSource>,
    ) -> AppResult<Self> {
        let config = WorkoutConfig::for_activity(definition.activity);
        Self::new(definition, config, source)
    }

    /// Workout identity and timing
    #[must_use]
    pub fn definition(&self) -> &WorkoutDefinition {
        &self.context.definition
    }

    /// Per-activity configuration
    #[must_use]
    pub fn config(&self) -> &WorkoutConfig {
        &self.context.config
    }

    /// Active intervals the segments were built from
    #[must_use]
    pub fn active_intervals(&self) -> &[ActiveInterval] {
        &self.context.intervals
    }

    /// Start loading. Only the first call has an effect.
    ///
    /// Issues one query per kind; a quick load skips the detail kinds and the
    /// minute-by-minute distribution. Returns once the queries are issued; use
    /// [`WorkoutAggregator::wait_until_loaded`] to wait for completion.
    pub async fn load(&self, quick: bool) -> LoadOutcome {
        let id = self.context.definition.id;
        let kinds = self.context.config.kinds(quick);

        let mut state = self.state.lock().await;
        if state.load_state != LoadState::NotLoaded {
            debug!(workout.id = %id, state = ?state.load_state, "Load ignored, already started");
            return LoadOutcome::AlreadyStarted;
        }

        if !self.source.is_available() {
            state.load_state = LoadState::Unavailable;
            state.has_error = true;
            drop(state);
            warn!(workout.id = %id, source = self.source.name(), "Health data source unavailable");
            self.loaded.notify_waiters();
            return LoadOutcome::Unavailable;
        }

        state.quick = quick;
        if kinds.is_empty() {
            state.load_state = LoadState::Loaded;
            info!(workout.id = %id, "Workout loaded with no quantity kinds to query");
            return LoadOutcome::Completed;
        }

        state.load_state = LoadState::Loading;
        state.outstanding = kinds.len();
        drop(state);

        info!(
            workout.id = %id,
            source = self.source.name(),
            kinds = kinds.len(),
            quick,
            "Loading workout"
        );
        for kind in &kinds {
            self.spawn_query(*kind);
        }
        LoadOutcome::Started { kinds: kinds.len() }
    }

    /// Load and wait for every kind to report back
    pub async fn load_and_wait(&self, quick: bool) -> LoadState {
        self.load(quick).await;
        self.wait_until_loaded().await
    }

    /// Wait until the workout is loaded or unavailable
    pub async fn wait_until_loaded(&self) -> LoadState {
        loop {
            let notified = self.loaded.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let state = self.state.lock().await.load_state;
            if state.is_finished() {
                return state;
            }
            notified.await;
        }
    }

    /// Current lifecycle state
    pub async fn load_state(&self) -> LoadState {
        self.state.lock().await.load_state
    }

    /// Whether any kind failed or the source was unavailable
    pub async fn has_error(&self) -> bool {
        self.state.lock().await.has_error
    }

    /// Kinds whose query or processing failed
    pub async fn failed_kinds(&self) -> Vec<QuantityKind> {
        self.state.lock().await.failed_kinds.iter().copied().collect()
    }

    /// Kinds applied successfully
    pub async fn loaded_kinds(&self) -> Vec<QuantityKind> {
        self.state.lock().await.loaded_kinds.iter().copied().collect()
    }

    /// Immutable view of the loaded workout
    ///
    /// # Errors
    ///
    /// Returns `NotLoaded` before loading finishes and `SourceUnavailable`
    /// when the source could not be queried
    pub async fn report(&self) -> AppResult<WorkoutReport> {
        let state = self.state.lock().await;
        match state.load_state {
            LoadState::Loaded => Ok(state.report(&self.context)),
            LoadState::Unavailable => Err(AppError::source_unavailable(format!(
                "workout {} has no data: source {} is unavailable",
                self.context.definition.id,
                self.source.name()
            ))),
            LoadState::NotLoaded | LoadState::Loading => Err(AppError::not_loaded(format!(
                "workout {} is not loaded",
                self.context.definition.id
            ))),
        }
    }

    /// Whole-workout statistics
    ///
    /// # Errors
    ///
    /// See [`WorkoutAggregator::report`]
    pub async fn summary(&self) -> AppResult<WorkoutSummary> {
        Ok(self.report().await?.summary)
    }

    /// Number of minute and pause rows, zero after a quick load
    ///
    /// # Errors
    ///
    /// See [`WorkoutAggregator::report`]
    pub async fn row_count(&self) -> AppResult<usize> {
        Ok(self.report().await?.row_count())
    }

    /// Row at absolute `index`
    ///
    /// # Errors
    ///
    /// See [`WorkoutAggregator::report`]
    pub async fn row(&self, index: usize) -> AppResult<Option<Row>> {
        Ok(self.report().await?.row(index).cloned())
    }

    fn spawn_query(&self, kind: QuantityKind) {
        let query = self.query_for(kind);
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let context = Arc::clone(&self.context);
        let loaded = Arc::clone(&self.loaded);

        tokio::spawn(async move {
            let result = source.query(&query).await;
            let mut state = state.lock().await;
            state.complete(kind, result, &context);
            if state.outstanding == 0 {
                state.load_state = LoadState::Loaded;
                info!(
                    workout.id = %context.definition.id,
                    has_error = state.has_error,
                    "Workout loaded"
                );
                drop(state);
                loaded.notify_waiters();
            }
        });
    }

    fn query_for(&self, kind: QuantityKind) -> SampleQuery {
        let definition = &self.context.definition;
        let mut query =
            SampleQuery::new(kind, kind.default_unit(), definition.start, definition.end);
        if query.search == TimeSearch::SourceWindowWithFallback {
            if let Some((start, end)) = definition.source_window {
                query = query.with_source_window(start, end);
            }
            if let Some(name) = &definition.source_name {
                query = query.with_filter(SampleFilter::recorded_by(name.clone()));
            }
        }
        query
    }
}

fn build_segments(
    workout_start: DateTime<Utc>,
    intervals: &[ActiveInterval],
) -> AppResult<Vec<Segment>> {
    let mut segments: Vec<Segment> = Vec::with_capacity(intervals.len());
    let mut next_index = 0;
    for interval in intervals {
        let segment = Segment::new(workout_start, interval.start, interval.end, next_index)?;
        next_index = segment.next_index();
        segments.push(segment);
    }
    for (segment, next) in segments.iter_mut().zip(intervals.iter().skip(1)) {
        let pause = seconds_between(segment.end(), next.start);
        segment.set_pause_after(Some(pause));
    }
    Ok(segments)
}
