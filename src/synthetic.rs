// ABOUTME: In-memory health-data source for tests, benchmarks, and the CLI
// ABOUTME: Serves stored samples per kind with configurable failures, delays, and availability
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Synthetic Health-Data Source
//!
//! [`SyntheticSource`] answers [`SampleQuery`]s from samples held in memory.
//! All state is protected by `RwLock`s so a shared source can be mutated while
//! queries run on other tasks. Poisoned locks surface as `InternalError`.
//!
//! [`WorkoutFixture`] is the JSON document the CLI reads: the workout
//! definition plus its samples keyed by quantity kind.

use crate::errors::{AppError, AppResult};
use crate::kinds::{QuantityKind, TimeSearch};
use crate::models::{ActivityType, RawSample, WorkoutEvent};
use crate::source::{HealthDataSource, SampleQuery};
use crate::workout::WorkoutDefinition;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use uuid::Uuid;

/// Workout and samples stored as a JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutFixture {
    /// Workout identifier, generated when absent
    #[serde(default = "Uuid::new_v4")]
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
    /// Recording device or app
    #[serde(default)]
    pub source_name: Option<String>,
    /// Window the recording source declared
    #[serde(default)]
    pub source_window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Maximum heart rate for zone times
    #[serde(default)]
    pub max_heart_rate: Option<f64>,
    /// Samples per kind
    #[serde(default)]
    pub samples: BTreeMap<QuantityKind, Vec<RawSample>>,
}

impl WorkoutFixture {
    /// Parse a fixture from JSON text
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` when the JSON is malformed
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a fixture file
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the file cannot be read and
    /// `SerializationError` when its JSON is malformed
    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| {
            AppError::invalid_input(format!("cannot read fixture {}: {err}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Workout definition described by this fixture
    #[must_use]
    pub fn definition(&self) -> WorkoutDefinition {
        WorkoutDefinition {
            id: self.id,
            activity: self.activity,
            start: self.start,
            end: self.end,
            events: self.events.clone(),
            source_name: self.source_name.clone(),
            source_window: self.source_window,
        }
    }
}

/// In-memory [`HealthDataSource`]
#[derive(Debug)]
pub struct SyntheticSource {
    name: String,
    available: AtomicBool,
    samples: RwLock<HashMap<QuantityKind, Vec<RawSample>>>,
    failing: RwLock<HashSet<QuantityKind>>,
    delays: RwLock<HashMap<QuantityKind, Duration>>,
    queried: RwLock<Vec<QuantityKind>>,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticSource {
    /// Empty, available source
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("synthetic")
    }

    /// Empty, available source with a custom name
    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            available: AtomicBool::new(true),
            samples: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            delays: RwLock::new(HashMap::new()),
            queried: RwLock::new(Vec::new()),
        }
    }

    /// Source holding a fixture's samples
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if an internal lock is poisoned
    pub fn from_fixture(fixture: &WorkoutFixture) -> AppResult<Self> {
        let source = Self::new();
        for (kind, samples) in &fixture.samples {
            source.insert_samples(*kind, samples.clone())?;
        }
        Ok(source)
    }

    /// Append samples for `kind`
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the samples lock is poisoned
    pub fn insert_samples(&self, kind: QuantityKind, samples: Vec<RawSample>) -> AppResult<()> {
        self.samples
            .write()
            .map_err(|_| AppError::internal("RwLock poisoned: samples lock"))?
            .entry(kind)
            .or_default()
            .extend(samples);
        Ok(())
    }

    /// Make every query for `kind` fail
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the failing lock is poisoned
    pub fn fail_kind(&self, kind: QuantityKind) -> AppResult<()> {
        self.failing
            .write()
            .map_err(|_| AppError::internal("RwLock poisoned: failing lock"))?
            .insert(kind);
        Ok(())
    }

    /// Delay answers for `kind`
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the delays lock is poisoned
    pub fn delay_kind(&self, kind: QuantityKind, delay: Duration) -> AppResult<()> {
        self.delays
            .write()
            .map_err(|_| AppError::internal("RwLock poisoned: delays lock"))?
            .insert(kind, delay);
        Ok(())
    }

    /// Toggle availability
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Kinds queried so far, in query order
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the query log lock is poisoned
    pub fn queried_kinds(&self) -> AppResult<Vec<QuantityKind>> {
        Ok(self
            .queried
            .read()
            .map_err(|_| AppError::internal("RwLock poisoned: queried lock"))?
            .clone())
    }

    fn select(&self, query: &SampleQuery) -> AppResult<Vec<RawSample>> {
        let samples = self
            .samples
            .read()
            .map_err(|_| AppError::internal("RwLock poisoned: samples lock"))?;
        let stored = samples.get(&query.kind).map_or(&[][..], Vec::as_slice);

        let within = |start: DateTime<Utc>, end: DateTime<Utc>| -> Vec<RawSample> {
            stored
                .iter()
                .filter(|sample| SampleQuery::overlaps(sample, start, end))
                .filter(|sample| query.accepts(sample))
                .cloned()
                .collect()
        };

        let mut selected = match (query.search, query.source_window) {
            (TimeSearch::SourceWindowWithFallback, Some((start, end))) => {
                let by_source = within(start, end);
                if by_source.is_empty() {
                    within(query.window_start, query.window_end)
                } else {
                    by_source
                }
            }
            _ => within(query.window_start, query.window_end),
        };
        drop(samples);

        for sample in &mut selected {
            sample.quantity = sample.quantity.to(query.unit)?;
        }
        selected.sort_by_key(|sample| sample.start);
        Ok(selected)
    }
}

#[async_trait]
impl HealthDataSource for SyntheticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn query(&self, query: &SampleQuery) -> AppResult<Vec<RawSample>> {
        self.queried
            .write()
            .map_err(|_| AppError::internal("RwLock poisoned: queried lock"))?
            .push(query.kind);

        let delay = self
            .delays
            .read()
            .map_err(|_| AppError::internal("RwLock poisoned: delays lock"))?
            .get(&query.kind)
            .copied();
        if let Some(delay) = delay {
            sleep(delay).await;
        }

        if !self.is_available() {
            return Err(AppError::source_unavailable(format!(
                "{} is unavailable",
                self.name
            )));
        }
        let failing = self
            .failing
            .read()
            .map_err(|_| AppError::internal("RwLock poisoned: failing lock"))?
            .contains(&query.kind);
        if failing {
            return Err(AppError::query_failed(format!(
                "{} query failed for {}",
                self.name, query.kind
            )));
        }

        let samples = self.select(query)?;
        debug!(
            source = %self.name,
            quantity.kind = %query.kind,
            samples = samples.len(),
            "Answered sample query"
        );
        Ok(samples)
    }
}
