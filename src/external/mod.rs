// ABOUTME: External food database clients (Open Food Facts, USDA FoodData Central)
// ABOUTME: Shared TTL caching and rate limiting for outbound nutrition API calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! External food database clients.

/// Bounded TTL cache and rate limiter
pub mod cache;
/// Open Food Facts barcode lookups
pub mod open_food_facts;
/// USDA `FoodData` Central name lookups
pub mod usda_client;

pub use open_food_facts::{OffProduct, OpenFoodFactsClient};
pub use usda_client::{FoodDetails, FoodNutrient, FoodSearchResult, UsdaClient};
