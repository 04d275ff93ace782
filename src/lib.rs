// ABOUTME: Main library entry point for the nutriscan food scanning engine
// ABOUTME: Resolves nutrition across ranked sources and scores it against health conditions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutriscan
//!
//! A user submits a food reference (photo, barcode or free-text name) and
//! receives a nutrition profile annotated with personalized health guidance.
//!
//! ## Architecture
//!
//! Data flows one way:
//!
//! ```text
//! FoodReference -> NutritionResolver -> NutritionProfile -> HealthRuleEngine -> ScanResult
//! ```
//!
//! - **Sources**: local food store, external food databases, AI estimator
//! - **Resolver**: ranked fallback over sources, serving normalization, learning
//! - **Health engine** (`nutriscan-health`): condition catalog and rule evaluation
//! - **Scan orchestrator**: the single entry point tying both together
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use nutriscan::config::ScannerConfig;
//! use nutriscan::database::InMemoryFoodStore;
//! use nutriscan::scan::ScanOrchestrator;
//! use nutriscan_core::models::FoodReference;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ScannerConfig::from_env()?;
//!     let store = Arc::new(InMemoryFoodStore::seeded(config.confidence.database));
//!     let orchestrator = ScanOrchestrator::from_config(&config, store);
//!
//!     let result = orchestrator
//!         .scan(&FoodReference::ByName("apple".to_owned()), &["Diabetes"], "1 cup")
//!         .await?;
//!     println!("{}: {:.1}/10", result.food_name(), result.overall_health_score());
//!     Ok(())
//! }
//! ```

/// Scanner configuration
pub mod config;

/// Local food store (in-memory and `SQLite`)
pub mod database;

/// Error types re-exported from `nutriscan-core`
pub mod errors;

/// External food database clients
pub mod external;

/// Recent scan log
pub mod history;

/// LLM provider abstraction and prompts
pub mod llm;

/// Logging setup and structured scan events
pub mod logging;

/// Ranked nutrition resolution
pub mod resolver;

/// Scan orchestrator
pub mod scan;

/// Nutrition sources
pub mod sources;

pub use nutriscan_core::models::{FoodReference, NutritionProfile};
pub use nutriscan_core::ServingSize;
pub use resolver::NutritionResolver;
pub use scan::{ScanOrchestrator, ScanResult};
