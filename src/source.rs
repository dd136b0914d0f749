// ABOUTME: Health-data source trait consumed by the workout aggregator
// ABOUTME: Defines sample queries, time-search strategies, and optional filter predicates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Health-Data Sources
//!
//! The aggregator never talks to a platform store directly. It issues one
//! [`SampleQuery`] per quantity kind through the [`HealthDataSource`] trait and
//! receives the complete, start-ordered sample set for that kind in a single
//! response. Implementations decide how samples are fetched; the engine only
//! cares about what happens to them afterwards.

use crate::errors::AppResult;
use crate::kinds::QuantityKind;
use crate::models::RawSample;
use crate::units::Unit;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

pub use crate::kinds::TimeSearch;

/// Extra predicate a sample must satisfy to be returned
#[derive(Clone)]
pub struct SampleFilter(Arc<dyn Fn(&RawSample) -> bool + Send + Sync>);

impl SampleFilter {
    /// Wrap a predicate
    pub fn new(predicate: impl Fn(&RawSample) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Keep only samples recorded by `source`
    #[must_use]
    pub fn recorded_by(source: impl Into<String>) -> Self {
        let source = source.into();
        Self::new(move |sample| sample.source.as_deref() == Some(source.as_str()))
    }

    /// Whether `sample` passes the predicate
    #[must_use]
    pub fn matches(&self, sample: &RawSample) -> bool {
        (self.0)(sample)
    }
}

impl fmt::Debug for SampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SampleFilter(..)")
    }
}

/// One request for all samples of a kind during a workout
#[derive(Debug, Clone)]
pub struct SampleQuery {
    /// Quantity kind requested
    pub kind: QuantityKind,
    /// Unit the caller accumulates in
    pub unit: Unit,
    /// Activity window start
    pub window_start: DateTime<Utc>,
    /// Activity window end
    pub window_end: DateTime<Utc>,
    /// How samples are selected in time
    pub search: TimeSearch,
    /// Window declared by the recording source, used by
    /// [`TimeSearch::SourceWindowWithFallback`]
    pub source_window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Optional extra predicate
    pub filter: Option<SampleFilter>,
}

impl SampleQuery {
    /// Query `kind` over the activity window using the kind's default strategy
    #[must_use]
    pub const fn new(
        kind: QuantityKind,
        unit: Unit,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            unit,
            window_start,
            window_end,
            search: kind.default_search(),
            source_window: None,
            filter: None,
        }
    }

    /// Override the time-search strategy
    #[must_use]
    pub const fn with_search(mut self, search: TimeSearch) -> Self {
        self.search = search;
        self
    }

    /// Attach the recording source's declared window
    #[must_use]
    pub const fn with_source_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.source_window = Some((start, end));
        self
    }

    /// Attach a filter predicate
    #[must_use]
    pub fn with_filter(mut self, filter: SampleFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Whether `sample` overlaps `[start, end]`
    #[must_use]
    pub fn overlaps(sample: &RawSample, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        sample.start <= end && sample.end >= start
    }

    /// Whether `sample` passes the filter predicate, if any
    #[must_use]
    pub fn accepts(&self, sample: &RawSample) -> bool {
        self.filter
            .as_ref()
            .is_none_or(|filter| filter.matches(sample))
    }
}

/// Source of raw health samples
///
/// Implementations must answer every query exactly once, with the full sample
/// set for the kind ordered by start time, or with an error.
#[async_trait]
pub trait HealthDataSource: Send + Sync {
    /// Source name for logs
    fn name(&self) -> &str;

    /// Whether the source can be queried at all
    fn is_available(&self) -> bool;

    /// Fetch all samples matching `query`
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` when the kind cannot be fetched or
    /// `SourceUnavailable` when the source went away
    async fn query(&self, query: &SampleQuery) -> AppResult<Vec<RawSample>>;
}
