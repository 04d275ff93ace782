// ABOUTME: Core types for the nutriscan food scanning engine
// ABOUTME: Foundation crate with error handling, nutrient catalog, references and serving sizes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutriscan Core
//!
//! Foundation crate shared by the health engine and the scanning service. It
//! changes rarely, so downstream crates compile incrementally.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, and the scan-domain `ScanError` / `ProviderError`
//! - **models**: nutrients, nutrition profiles, food references, conditions and remarks
//! - **serving**: free-text serving size parsing

/// Unified error handling with standard error codes
pub mod errors;

/// Core domain models
pub mod models;

/// Serving size parsing
pub mod serving;

pub use serving::ServingSize;
