// ABOUTME: Configuration module for the scanning service
// ABOUTME: Environment-driven scanner settings plus the scoring types they embed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration for the scanning service.
//!
//! - **Scanner**: source confidences, resolver, external APIs, AI, history, storage
//! - **Scoring**: remark penalties and the baseline heuristic (from `nutriscan-health`)

/// Scanner configuration loaded from the environment
pub mod scanner;

pub use nutriscan_health::config::{BaselineConfig, ConfigError, ScoringConfig};
pub use scanner::{
    AiConfig, DatabaseConfig, ExternalDbConfig, HistoryConfig, ResolverConfig, ScannerConfig,
    SourceConfidenceConfig, UsdaApiConfig,
};
