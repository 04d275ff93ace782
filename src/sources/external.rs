// ABOUTME: External food database source combining Open Food Facts and USDA FoodData Central
// ABOUTME: Barcodes go to Open Food Facts, free-text names go to USDA
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{NutritionSource, SourceCapabilities};
use crate::config::{ScannerConfig, SourceConfidenceConfig};
use crate::external::{OpenFoodFactsClient, UsdaClient};
use async_trait::async_trait;
use nutriscan_core::errors::ProviderError;
use nutriscan_core::models::{FoodRating, FoodReference, NutritionCandidate, SourceKind};
use tracing::debug;

/// External food databases as one nutrition source
pub struct ExternalFoodSource {
    open_food_facts: Option<OpenFoodFactsClient>,
    usda: Option<UsdaClient>,
    confidence: f64,
}

impl ExternalFoodSource {
    /// Source with explicit clients; either may be absent
    #[must_use]
    pub fn new(
        open_food_facts: Option<OpenFoodFactsClient>,
        usda: Option<UsdaClient>,
        confidence: &SourceConfidenceConfig,
    ) -> Self {
        Self {
            open_food_facts,
            usda,
            confidence: confidence.for_source(SourceKind::ExternalDb),
        }
    }

    /// Build clients from configuration.
    ///
    /// Open Food Facts is used when enabled. USDA is used when an API key is
    /// configured.
    #[must_use]
    pub fn from_config(config: &ScannerConfig) -> Self {
        let open_food_facts = config
            .external_db
            .enabled
            .then(|| OpenFoodFactsClient::new(config.external_db.clone()));
        Self::new(
            open_food_facts,
            UsdaClient::from_config(&config.usda),
            &config.confidence,
        )
    }

    /// Whether any client is configured
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.open_food_facts.is_some() || self.usda.is_some()
    }
}

#[async_trait]
impl NutritionSource for ExternalFoodSource {
    fn name(&self) -> &'static str {
        "external food database"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::ExternalDb
    }

    fn capabilities(&self) -> SourceCapabilities {
        let mut caps = SourceCapabilities::empty();
        if self.open_food_facts.is_some() {
            caps |= SourceCapabilities::BARCODE;
        }
        if self.usda.is_some() {
            caps |= SourceCapabilities::NAME;
        }
        caps
    }

    async fn resolve(
        &self,
        reference: &FoodReference,
    ) -> Result<Option<NutritionCandidate>, ProviderError> {
        match reference {
            FoodReference::ByBarcode(code) => {
                let Some(client) = &self.open_food_facts else {
                    return Ok(None);
                };
                let product = client.product(code.trim()).await?;
                Ok(product.map(|p| {
                    NutritionCandidate::per_100g(
                        p.identity,
                        p.values,
                        self.confidence,
                        SourceKind::ExternalDb,
                    )
                    .with_rating(FoodRating {
                        nutri_score: p.nutri_score,
                        glycemic_load_index: None,
                    })
                }))
            }
            FoodReference::ByName(name) => {
                let Some(client) = &self.usda else {
                    return Ok(None);
                };
                let Some(details) = client.find_by_name(name.trim()).await? else {
                    return Ok(None);
                };
                let Some(values) = details.nutrient_values() else {
                    debug!(fdc_id = details.fdc_id, "USDA food has no energy value");
                    return Ok(None);
                };
                Ok(Some(NutritionCandidate::per_100g(
                    details.identity(),
                    values,
                    self.confidence,
                    SourceKind::ExternalDb,
                )))
            }
            FoodReference::ByImage(_) => Ok(None),
        }
    }
}
