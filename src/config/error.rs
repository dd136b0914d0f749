// ABOUTME: Configuration error types for workout engine environment settings
// ABOUTME: Defines error variants for out-of-range values, parse failures, and bad zone thresholds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Value outside acceptable range (e.g., a non-positive heart rate)
    #[error("Invalid range: {0}")]
    InvalidRange(&'static str),

    /// Failed to parse an environment value
    #[error("Parse error: {0}")]
    Parse(String),

    /// Zone thresholds are empty, unsorted, or outside [0, 100)
    #[error("Invalid zone thresholds: {0}")]
    InvalidThresholds(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::config_invalid(err.to_string())
    }
}
