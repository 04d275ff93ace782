// ABOUTME: Configuration module for the nutriscan-health crate
// ABOUTME: Re-exports scoring configuration and its validation error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Configuration validation errors
pub mod error;

/// Remark penalties and condition-agnostic baseline scoring
pub mod scoring;

pub use error::ConfigError;
pub use scoring::{BaselineConfig, ScoringConfig};
