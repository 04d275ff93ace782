// ABOUTME: USDA FoodData Central API client for nutrition lookups by food name
// ABOUTME: Implements food search, detail retrieval, caching, rate limiting and nutrient mapping

// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! USDA `FoodData` Central API Client
//!
//! Used by the external food source for name references. The API needs a free
//! key; without one the source skips name lookups entirely.
//!
//! # Features
//! - Food search and detail retrieval
//! - TTL caching to minimize API calls
//! - Rate limiting (30 requests per minute by default)
//! - Mapping of USDA nutrient ids onto the nutrient catalog
//!
//! # API Reference
//! USDA `FoodData` Central API: <https://fdc.nal.usda.gov/api-guide.html>

use super::cache::{RateLimiter, TtlCache};
use crate::config::UsdaApiConfig;
use nutriscan_core::errors::ProviderError;
use nutriscan_core::models::{FoodIdentity, Nutrient, NutrientValues};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Source name used in provider errors and logs
pub const USDA_SOURCE: &str = "USDA FoodData Central";

/// USDA nutrient ids and the catalog nutrient each maps to
pub const USDA_NUTRIENT_IDS: &[(u32, Nutrient)] = &[
    (1008, Nutrient::Calories),
    (1003, Nutrient::ProteinG),
    (1005, Nutrient::CarbohydratesG),
    (1004, Nutrient::FatG),
    (1079, Nutrient::FiberG),
    (2000, Nutrient::SugarG),
    (1093, Nutrient::SodiumMg),
    (1253, Nutrient::CholesterolMg),
    (1258, Nutrient::SaturatedFatG),
    (1257, Nutrient::TransFatG),
    (1092, Nutrient::PotassiumMg),
    (1087, Nutrient::CalciumMg),
    (1089, Nutrient::IronMg),
    (1162, Nutrient::VitaminCMg),
    (1090, Nutrient::MagnesiumMg),
    (1091, Nutrient::PhosphorusMg),
    (1095, Nutrient::ZincMg),
    (1110, Nutrient::VitaminDIu),
    (1177, Nutrient::FolateMcg),
    (1185, Nutrient::VitaminKMcg),
    (1104, Nutrient::VitaminAIu),
];

/// Catalog nutrient for a USDA nutrient id
#[must_use]
pub fn nutrient_for_id(id: u32) -> Option<Nutrient> {
    USDA_NUTRIENT_IDS
        .iter()
        .find(|(usda_id, _)| *usda_id == id)
        .map(|(_, nutrient)| *nutrient)
}

/// USDA Food Search Result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSearchResult {
    /// `FoodData` Central ID
    pub fdc_id: u64,
    /// Food description
    pub description: String,
    /// Data type (e.g., "Survey (FNDDS)", "Foundation", "SR Legacy")
    #[serde(default)]
    pub data_type: String,
    /// Brand owner (for branded foods)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_owner: Option<String>,
}

/// USDA Food Nutrient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodNutrient {
    /// Nutrient ID
    pub nutrient_id: u32,
    /// Nutrient name (e.g., "Protein", "Energy")
    pub nutrient_name: String,
    /// Nutrient unit (e.g., "g", "kcal", "mg")
    pub unit_name: String,
    /// Amount per 100g
    pub amount: f64,
}

/// Detailed USDA Food Information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodDetails {
    /// `FoodData` Central ID
    pub fdc_id: u64,
    /// Food description
    pub description: String,
    /// Data type
    pub data_type: String,
    /// Brand owner (for branded foods)
    pub brand_owner: Option<String>,
    /// Ingredient statement (for branded foods)
    pub ingredients: Option<String>,
    /// List of nutrients with amounts per 100 g
    pub food_nutrients: Vec<FoodNutrient>,
}

impl FoodDetails {
    /// Food identity for this record
    #[must_use]
    pub fn identity(&self) -> FoodIdentity {
        FoodIdentity {
            name: self.description.clone(),
            brand: self.brand_owner.clone(),
            barcode: None,
            ingredients: self.ingredients.clone(),
            category: Some(self.data_type.clone()).filter(|c| !c.is_empty()),
        }
    }

    /// Per-100g values for the mapped nutrients.
    ///
    /// Returns `None` when energy is missing, since such records are usually
    /// incomplete survey stubs.
    #[must_use]
    pub fn nutrient_values(&self) -> Option<NutrientValues> {
        let mut values = NutrientValues::default();
        let mut has_energy = false;
        for item in &self.food_nutrients {
            let Some(nutrient) = nutrient_for_id(item.nutrient_id) else {
                continue;
            };
            if !item.amount.is_finite() || item.amount < 0.0 {
                continue;
            }
            has_energy |= nutrient == Nutrient::Calories;
            values.set(nutrient, item.amount);
        }
        has_energy.then_some(values)
    }
}

/// USDA API search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<FoodSearchResult>,
}

/// USDA API food details response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodDetailsResponse {
    fdc_id: u64,
    description: String,
    #[serde(default)]
    data_type: String,
    brand_owner: Option<String>,
    ingredients: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<FoodNutrientResponse>,
}

#[derive(Debug, Deserialize)]
struct FoodNutrientResponse {
    nutrient: Option<NutrientInfo>,
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NutrientInfo {
    id: u32,
    name: String,
    #[serde(rename = "unitName", default)]
    unit_name: String,
}

impl From<FoodDetailsResponse> for FoodDetails {
    fn from(response: FoodDetailsResponse) -> Self {
        let food_nutrients = response
            .food_nutrients
            .into_iter()
            .filter_map(|n| {
                let nutrient = n.nutrient?;
                Some(FoodNutrient {
                    nutrient_id: nutrient.id,
                    nutrient_name: nutrient.name,
                    unit_name: nutrient.unit_name,
                    amount: n.amount.unwrap_or(0.0),
                })
            })
            .collect();

        Self {
            fdc_id: response.fdc_id,
            description: response.description,
            data_type: response.data_type,
            brand_owner: response.brand_owner,
            ingredients: response.ingredients,
            food_nutrients,
        }
    }
}

/// USDA `FoodData` Central API Client
pub struct UsdaClient {
    config: UsdaApiConfig,
    api_key: String,
    http_client: Client,
    search_cache: TtlCache<String, Vec<FoodSearchResult>>,
    details_cache: TtlCache<u64, FoodDetails>,
    rate_limiter: RateLimiter,
}

impl UsdaClient {
    /// Create a client; `None` when no API key is configured
    #[must_use]
    pub fn from_config(config: &UsdaApiConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self::new(config.clone(), api_key))
    }

    /// Create a new USDA API client
    #[must_use]
    pub fn new(config: UsdaApiConfig, api_key: impl Into<String>) -> Self {
        let ttl = Duration::from_secs(config.cache_ttl_secs);
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            search_cache: TtlCache::new(config.max_cache_items, ttl),
            details_cache: TtlCache::new(config.max_cache_items, ttl),
            rate_limiter: RateLimiter::per_minute(config.rate_limit_per_minute),
            api_key: api_key.into(),
            http_client,
            config,
        }
    }

    /// Search for foods by query string
    ///
    /// # Errors
    /// Returns error if the API request fails, the response cannot be parsed or
    /// the rate limit is exhausted
    #[instrument(skip(self))]
    pub async fn search_foods(
        &self,
        query: &str,
        page_size: u32,
    ) -> Result<Vec<FoodSearchResult>, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let page_size = page_size.clamp(1, 200);

        let cache_key = format!("{}:{page_size}", query.to_lowercase());
        if let Some(cached) = self.search_cache.get(&cache_key).await {
            debug!("USDA search cache hit");
            return Ok(cached);
        }

        if !self.rate_limiter.try_acquire().await {
            return Err(ProviderError::rate_limited(USDA_SOURCE));
        }

        let url = format!("{}/foods/search", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", query),
                ("pageSize", &page_size.to_string()),
                ("api_key", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::new(USDA_SOURCE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::new(USDA_SOURCE, format!("HTTP {status}")));
        }

        let search_response: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(USDA_SOURCE, format!("JSON parse error: {e}")))?;

        self.search_cache
            .insert(cache_key, search_response.foods.clone())
            .await;

        Ok(search_response.foods)
    }

    /// Get detailed information for a specific food by FDC ID
    ///
    /// # Errors
    /// Returns error if the API request fails, the response cannot be parsed or
    /// the rate limit is exhausted
    #[instrument(skip(self))]
    pub async fn get_food_details(&self, fdc_id: u64) -> Result<FoodDetails, ProviderError> {
        if let Some(cached) = self.details_cache.get(&fdc_id).await {
            debug!("USDA details cache hit");
            return Ok(cached);
        }

        if !self.rate_limiter.try_acquire().await {
            return Err(ProviderError::rate_limited(USDA_SOURCE));
        }

        let url = format!("{}/food/{fdc_id}", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await
            .map_err(|e| ProviderError::new(USDA_SOURCE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::new(USDA_SOURCE, format!("HTTP {status}")));
        }

        let details_response: FoodDetailsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(USDA_SOURCE, format!("JSON parse error: {e}")))?;

        let food_details = FoodDetails::from(details_response);
        self.details_cache
            .insert(fdc_id, food_details.clone())
            .await;

        Ok(food_details)
    }

    /// Best match for a food name: first search hit with usable nutrients
    ///
    /// # Errors
    /// Returns error on transport or parse failures
    pub async fn find_by_name(&self, name: &str) -> Result<Option<FoodDetails>, ProviderError> {
        let results = self.search_foods(name, 5).await?;
        let Some(best) = results.first() else {
            return Ok(None);
        };
        let details = self.get_food_details(best.fdc_id).await?;
        Ok(details.nutrient_values().is_some().then_some(details))
    }

    /// Cache sizes as (search, details)
    pub async fn cache_stats(&self) -> (usize, usize) {
        (self.search_cache.len().await, self.details_cache.len().await)
    }
}
