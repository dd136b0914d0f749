// ABOUTME: Main library entry point for the Pierre workout aggregation engine
// ABOUTME: Turns irregular workout samples into whole-workout summaries and minute-by-minute rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Workout
//!
//! Time-windowed aggregation of heart rate, energy, distance, step, and
//! elevation samples recorded during a workout.
//!
//! ## Architecture
//!
//! - **`data_point`**: samples positioned in seconds since workout start
//! - **`minute`**: one-minute accumulation buckets
//! - **`segment`**: contiguous buckets for one active interval and the
//!   overlap distribution algorithm
//! - **`workout`**: the aggregator that loads every quantity kind concurrently
//!   and exposes the summary and rows
//! - **`heart_zones`**: time in heart-rate zones with boundary interpolation
//! - **`source`**: the health-data source seam; **`synthetic`** is an
//!   in-memory implementation
//! - **`export`**: CSV output
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pierre_workout::errors::AppResult;
//! use pierre_workout::synthetic::{SyntheticSource, WorkoutFixture};
//! use pierre_workout::workout::WorkoutAggregator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let fixture = WorkoutFixture::from_path("run.json")?;
//!     let source = Arc::new(SyntheticSource::from_fixture(&fixture)?);
//!     let workout = WorkoutAggregator::for_activity(fixture.definition(), source)?;
//!
//!     workout.load_and_wait(false).await;
//!     let summary = workout.summary().await?;
//!     println!("distance: {:?}", summary.distance);
//!     Ok(())
//! }
//! ```

pub use pierre_workout_core::{constants, errors, kinds, models, units};

/// Environment-driven engine configuration
pub mod config;

/// Workout-relative instant and ranged data points
pub mod data_point;

/// CSV export of loaded workouts
pub mod export;

/// Heart-rate zone time accumulation
pub mod heart_zones;

/// Logging configuration and subscriber setup
pub mod logging;

/// Minute buckets
pub mod minute;

/// Active segments and overlap distribution
pub mod segment;

/// Health-data source trait and queries
pub mod source;

/// In-memory health-data source and JSON fixtures
pub mod synthetic;

/// Workout aggregator, per-activity configuration, and loaded views
pub mod workout;

pub use errors::{AppError, AppResult, ErrorCode};
