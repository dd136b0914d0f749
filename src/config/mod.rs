// ABOUTME: Configuration module for the workout aggregation engine
// ABOUTME: Environment-driven engine settings and their validation errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Engine settings read from the environment
pub mod engine;

/// Configuration validation errors
pub mod error;

pub use engine::EngineConfig;
pub use error::ConfigError;
