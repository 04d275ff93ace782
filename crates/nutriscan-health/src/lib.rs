// ABOUTME: Health condition catalog and rule engine for the nutriscan scanning engine
// ABOUTME: Evaluates nutrition profiles against dietary restrictions and nutritional targets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutriscan Health
//!
//! Holds the catalog of health conditions (built-in plus user-defined) and the
//! rule engine that turns a nutrition profile into explainable remarks and a
//! 0-10 score.

/// Scoring configuration
pub mod config;

/// Built-in condition definitions
pub mod builtin;

/// Condition catalog with copy-on-write snapshots
pub mod catalog;

/// Condition-agnostic baseline score
pub mod baseline;

/// Rule engine
pub mod engine;

pub use catalog::{CatalogSnapshot, ConditionCatalog, ConditionDefinition};
pub use config::ScoringConfig;
pub use engine::{
    ConditionScore, EvaluationError, HealthAssessment, HealthRuleEngine, ScoreBasis,
};
