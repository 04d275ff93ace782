// ABOUTME: Local food store exposed as the highest-priority nutrition source
// ABOUTME: Curated records carry database confidence, learned records keep their own
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{NutritionSource, SourceCapabilities};
use crate::config::SourceConfidenceConfig;
use crate::database::{FoodRecord, SharedFoodStore};
use async_trait::async_trait;
use nutriscan_core::errors::ProviderError;
use nutriscan_core::models::{FoodReference, NutritionCandidate, SourceKind};
use tracing::debug;

const LOCAL_SOURCE: &str = "local database";

/// Nutrition lookups against the local food store
pub struct LocalDatabaseSource {
    store: SharedFoodStore,
    confidence: f64,
}

impl LocalDatabaseSource {
    /// Wrap a store
    #[must_use]
    pub fn new(store: SharedFoodStore, confidence: &SourceConfidenceConfig) -> Self {
        Self {
            store,
            confidence: confidence.for_source(SourceKind::Database),
        }
    }

    fn candidate(&self, record: FoodRecord) -> NutritionCandidate {
        // Learned AI estimates must not inherit curated trust
        let confidence = if record.learned {
            record.confidence.min(self.confidence)
        } else {
            self.confidence
        };
        NutritionCandidate::per_100g(
            record.identity,
            record.per_100g,
            confidence,
            SourceKind::Database,
        )
    }
}

#[async_trait]
impl NutritionSource for LocalDatabaseSource {
    fn name(&self) -> &'static str {
        LOCAL_SOURCE
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Database
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::NAME | SourceCapabilities::BARCODE
    }

    async fn resolve(
        &self,
        reference: &FoodReference,
    ) -> Result<Option<NutritionCandidate>, ProviderError> {
        let found = match reference {
            FoodReference::ByName(name) => self.store.find_by_name(name.trim()).await,
            FoodReference::ByBarcode(code) => self.store.find_by_barcode(code.trim()).await,
            FoodReference::ByImage(_) => return Ok(None),
        }
        .map_err(|e| ProviderError::new(LOCAL_SOURCE, e.to_string()))?;

        if let Some(record) = &found {
            debug!(
                backend = self.store.backend_name(),
                food = %record.identity.name,
                learned = record.learned,
                "Local database hit"
            );
        }
        Ok(found.map(|record| self.candidate(record)))
    }
}
