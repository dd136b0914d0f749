// ABOUTME: Unified error types for the workout aggregation engine
// ABOUTME: Defines stable error codes, AppError, and the AppResult alias
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! Every fallible operation in the engine returns `AppResult<T>`. Errors carry a
//! stable `ErrorCode` so callers can tell runtime data conditions (a failed
//! query, an unavailable source) apart from wiring bugs (a value added for a
//! kind that was never registered, a segment that ends before it starts).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Data source (1000-1999)
    /// The health-data source cannot be queried at all
    #[serde(rename = "SOURCE_UNAVAILABLE")]
    SourceUnavailable = 1000,
    /// A single quantity kind's query failed
    #[serde(rename = "QUERY_FAILED")]
    QueryFailed = 1001,

    // Precondition violations (2000-2999)
    /// A value was added for a kind the bucket never registered
    #[serde(rename = "UNREGISTERED_KIND")]
    UnregisteredKind = 2000,
    /// A segment was built with `end < start`
    #[serde(rename = "INVALID_SEGMENT")]
    InvalidSegment = 2001,
    /// Units of different dimensions were combined
    #[serde(rename = "INCOMPATIBLE_UNITS")]
    IncompatibleUnits = 2002,

    // Validation (3000-3999)
    /// Caller supplied an invalid value
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// Configuration is invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 3001,

    // Export (4000-4999)
    /// Export refused because the workout carries an error
    #[serde(rename = "EXPORT_REFUSED")]
    ExportRefused = 4000,
    /// Results requested before loading finished
    #[serde(rename = "NOT_LOADED")]
    NotLoaded = 4001,

    // Internal (9000-9999)
    /// Data serialization/deserialization failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9000,
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9001,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::SourceUnavailable => "The health data source is unavailable",
            Self::QueryFailed => "Fetching samples for a quantity failed",
            Self::UnregisteredKind => "A value was added for an unregistered quantity kind",
            Self::InvalidSegment => "A workout segment ends before it starts",
            Self::IncompatibleUnits => "Units of different dimensions cannot be combined",
            Self::InvalidInput => "The provided input is invalid",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::ExportRefused => "The workout cannot be exported because loading failed",
            Self::NotLoaded => "The workout has not finished loading",
            Self::SerializationError => "Data serialization/deserialization failed",
            Self::InternalError => "An internal error occurred",
        }
    }

    /// Whether this code marks a programmer or configuration error rather than
    /// a runtime data condition. These are never retried.
    #[must_use]
    pub const fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Self::UnregisteredKind | Self::InvalidSegment | Self::IncompatibleUnits
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Unified error type for the engine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code:?}: {message}")]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl AppError {
    /// Create a new error with a code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The health-data source cannot be queried
    #[must_use]
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SourceUnavailable, message)
    }

    /// One kind's query failed
    #[must_use]
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::QueryFailed, message)
    }

    /// A value arrived for a kind that was never registered
    #[must_use]
    pub fn unregistered_kind(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnregisteredKind, message)
    }

    /// A segment was constructed with an inverted range
    #[must_use]
    pub fn invalid_segment(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSegment, message)
    }

    /// Units of different dimensions were combined
    #[must_use]
    pub fn incompatible_units(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IncompatibleUnits, message)
    }

    /// Invalid caller input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Invalid configuration
    #[must_use]
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Export refused
    #[must_use]
    pub fn export_refused(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExportRefused, message)
    }

    /// Results requested before loading finished
    #[must_use]
    pub fn not_loaded(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotLoaded, message)
    }

    /// Serialization failure
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }

    /// Unexpected internal failure
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Whether this error is a wiring bug rather than a data condition
    #[must_use]
    pub const fn is_precondition_violation(&self) -> bool {
        self.code.is_precondition_violation()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string())
    }
}

/// Result alias used across the engine
pub type AppResult<T> = Result<T, AppError>;
