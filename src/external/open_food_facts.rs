// ABOUTME: Open Food Facts product API client for nutrition lookups by barcode
// ABOUTME: Parses per-100g nutriments with unit fallbacks, caches products and rate limits calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Open Food Facts client.
//!
//! `GET {base}/api/v0/product/{barcode}.json` answers `status: 1` with a
//! `product` object when the barcode is known and `status: 0` otherwise. Both
//! outcomes are cached, so repeated scans of an unknown product stay local.

use super::cache::{RateLimiter, TtlCache};
use crate::config::ExternalDbConfig;
use nutriscan_core::errors::ProviderError;
use nutriscan_core::models::{FoodIdentity, NutriScore, Nutrient, NutrientValues};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, instrument};

/// Source name used in provider errors and logs
pub const OPEN_FOOD_FACTS_SOURCE: &str = "Open Food Facts";

/// Kilojoules per kilocalorie
const KJ_PER_KCAL: f64 = 4.184;

/// Grams of salt per gram of sodium
const SALT_PER_SODIUM: f64 = 2.5;

/// Per-100g nutriment keys read directly, with the unit factor into the catalog unit
const NUTRIMENT_KEYS: &[(&str, Nutrient, f64)] = &[
    ("proteins_100g", Nutrient::ProteinG, 1.0),
    ("carbohydrates_100g", Nutrient::CarbohydratesG, 1.0),
    ("fat_100g", Nutrient::FatG, 1.0),
    ("fiber_100g", Nutrient::FiberG, 1.0),
    ("sugars_100g", Nutrient::SugarG, 1.0),
    ("saturated-fat_100g", Nutrient::SaturatedFatG, 1.0),
    ("trans-fat_100g", Nutrient::TransFatG, 1.0),
    ("cholesterol_100g", Nutrient::CholesterolMg, 1000.0),
    ("potassium_100g", Nutrient::PotassiumMg, 1000.0),
    ("calcium_100g", Nutrient::CalciumMg, 1000.0),
    ("iron_100g", Nutrient::IronMg, 1000.0),
];

/// Product record from Open Food Facts
#[derive(Debug, Clone, PartialEq)]
pub struct OffProduct {
    /// Food identity
    pub identity: FoodIdentity,
    /// Per-100g values
    pub values: NutrientValues,
    /// Nutri-Score grade printed on the pack
    pub nutri_score: Option<NutriScore>,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    product_name: Option<String>,
    product_name_en: Option<String>,
    generic_name: Option<String>,
    brands: Option<String>,
    categories: Option<String>,
    ingredients_text: Option<String>,
    nutriscore_grade: Option<String>,
    #[serde(default)]
    nutriments: Map<String, Value>,
}

/// Numbers arrive as JSON numbers or numeric strings
fn number(nutriments: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match nutriments.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Convert a product API body into a product record.
///
/// Returns `Ok(None)` when the barcode is unknown or the product carries no
/// energy value.
///
/// # Errors
///
/// Returns [`ProviderError`] when the body is not valid JSON.
pub fn parse_product(barcode: &str, body: &str) -> Result<Option<OffProduct>, ProviderError> {
    let response: ProductResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::new(OPEN_FOOD_FACTS_SOURCE, format!("JSON parse error: {e}"))
    })?;

    let Some(raw) = response.product.filter(|_| response.status == 1) else {
        return Ok(None);
    };

    let nutriments = &raw.nutriments;
    let calories = number(nutriments, "energy-kcal_100g")
        .or_else(|| number(nutriments, "energy_100g").map(|kj| kj / KJ_PER_KCAL));
    let Some(calories) = calories else {
        debug!(barcode, "Open Food Facts product has no energy value");
        return Ok(None);
    };

    let mut values = NutrientValues {
        calories,
        ..NutrientValues::default()
    };
    for (key, nutrient, factor) in NUTRIMENT_KEYS {
        if let Some(amount) = number(nutriments, key) {
            values.set(*nutrient, amount * factor);
        }
    }
    let sodium_g = number(nutriments, "sodium_100g")
        .or_else(|| number(nutriments, "salt_100g").map(|salt| salt / SALT_PER_SODIUM));
    if let Some(sodium_g) = sodium_g {
        values.sodium_mg = Some(sodium_g * 1000.0);
    }

    let name = non_empty(raw.product_name)
        .or_else(|| non_empty(raw.product_name_en))
        .or_else(|| non_empty(raw.generic_name))
        .unwrap_or_else(|| format!("Product {barcode}"));

    Ok(Some(OffProduct {
        identity: FoodIdentity {
            name,
            brand: non_empty(raw.brands),
            barcode: Some(barcode.to_owned()),
            ingredients: non_empty(raw.ingredients_text),
            category: non_empty(raw.categories),
        },
        values,
        nutri_score: raw.nutriscore_grade.as_deref().and_then(NutriScore::parse),
    }))
}

/// Open Food Facts API client
pub struct OpenFoodFactsClient {
    config: ExternalDbConfig,
    http_client: Client,
    cache: TtlCache<String, Option<OffProduct>>,
    rate_limiter: RateLimiter,
}

impl OpenFoodFactsClient {
    /// Create a client
    #[must_use]
    pub fn new(config: ExternalDbConfig) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            cache: TtlCache::new(
                config.max_cache_items,
                Duration::from_secs(config.cache_ttl_secs),
            ),
            rate_limiter: RateLimiter::per_minute(config.rate_limit_per_minute),
            http_client,
            config,
        }
    }

    /// Look up a product by barcode
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failures, unexpected statuses,
    /// unparseable bodies or an exhausted rate limit.
    #[instrument(skip(self))]
    pub async fn product(&self, barcode: &str) -> Result<Option<OffProduct>, ProviderError> {
        if let Some(cached) = self.cache.get(&barcode.to_owned()).await {
            debug!("Open Food Facts cache hit");
            return Ok(cached);
        }

        if !self.rate_limiter.try_acquire().await {
            return Err(ProviderError::rate_limited(OPEN_FOOD_FACTS_SOURCE));
        }

        let url = format!(
            "{}/api/v0/product/{barcode}.json",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .http_client
            .get(&url)
            .header(header::USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(|e| ProviderError::new(OPEN_FOOD_FACTS_SOURCE, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            self.cache.insert(barcode.to_owned(), None).await;
            return Ok(None);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::rate_limited(OPEN_FOOD_FACTS_SOURCE));
        }
        if !status.is_success() {
            return Err(ProviderError::new(
                OPEN_FOOD_FACTS_SOURCE,
                format!("HTTP {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::new(OPEN_FOOD_FACTS_SOURCE, e.to_string()))?;
        let product = parse_product(barcode, &body)?;
        self.cache.insert(barcode.to_owned(), product.clone()).await;
        Ok(product)
    }
}
