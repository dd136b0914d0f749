// ABOUTME: Core types for the Pierre workout aggregation engine
// ABOUTME: Foundation crate with units, quantity kinds, raw samples, errors, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Workout Core
//!
//! Foundation crate shared by the workout aggregation engine. It holds the
//! types that change rarely so that the engine crate recompiles quickly:
//!
//! - **units**: physical units, dimension checks, and `Quantity`/`Pace`/`Speed`
//! - **kinds**: the quantity kinds a health-data source can be queried for
//! - **models**: raw samples, activity types, and pause/resume events
//! - **errors**: `ErrorCode`, `AppError`, and `AppResult`
//! - **constants**: time, zone, and pace defaults

/// Application constants organized by domain
pub mod constants;

/// Unified error handling with stable error codes
pub mod errors;

/// Quantity kinds and their aggregation semantics
pub mod kinds;

/// Raw samples, activity types, and workout events
pub mod models;

/// Physical units, conversion, and unit-carrying quantities
pub mod units;

pub use errors::{AppError, AppResult, ErrorCode};
pub use kinds::{AggregationStyle, QuantityKind, TimeSearch};
pub use models::{
    active_intervals, seconds_between, ActiveInterval, ActivityType, RawSample, WorkoutEvent,
};
pub use units::{Dimension, Pace, Quantity, Speed, Unit, UnitSet};
