// ABOUTME: In-memory food store backed by a concurrent map with a barcode index
// ABOUTME: Default backend for the CLI and tests when no database URL is configured
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{match_by_name, normalize_food_name, seed_records, FoodRecord, FoodStore};
use crate::errors::AppResult;
use async_trait::async_trait;
use dashmap::DashMap;
use nutriscan_core::models::NutritionProfile;
use tracing::debug;
use uuid::Uuid;

/// Food store held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryFoodStore {
    records: DashMap<Uuid, FoodRecord>,
    barcodes: DashMap<String, Uuid>,
}

impl InMemoryFoodStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the curated seed foods
    #[must_use]
    pub fn seeded(confidence: f64) -> Self {
        Self::with_records(seed_records(confidence))
    }

    /// Store preloaded with the given records
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = FoodRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    fn insert(&self, record: FoodRecord) {
        if let Some(previous) = self.records.get(&record.id) {
            if let Some(barcode) = &previous.identity.barcode {
                self.barcodes.remove(barcode);
            }
        }
        if let Some(barcode) = &record.identity.barcode {
            self.barcodes.insert(barcode.clone(), record.id);
        }
        self.records.insert(record.id, record);
    }

    fn snapshot(&self) -> Vec<FoodRecord> {
        self.records.iter().map(|entry| entry.value().clone()).collect()
    }
}

#[async_trait]
impl FoodStore for InMemoryFoodStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<FoodRecord>> {
        let records = self.snapshot();
        Ok(match_by_name(&records, name).cloned())
    }

    async fn find_by_barcode(&self, barcode: &str) -> AppResult<Option<FoodRecord>> {
        let Some(id) = self.barcodes.get(barcode).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, record: FoodRecord) -> AppResult<()> {
        self.insert(record);
        Ok(())
    }

    async fn save_learned_profile(
        &self,
        profile: &NutritionProfile,
        confidence: f64,
    ) -> AppResult<Option<FoodRecord>> {
        let key = normalize_food_name(profile.food_name());
        let name_taken = self
            .records
            .iter()
            .any(|entry| entry.value().name_key() == key);
        let barcode_taken = profile
            .food()
            .barcode
            .as_deref()
            .is_some_and(|barcode| self.barcodes.contains_key(barcode));
        if key.is_empty() || name_taken || barcode_taken {
            debug!(food = %profile.food_name(), "Skipping learned record, food already stored");
            return Ok(None);
        }

        let record = FoodRecord::learned(profile, confidence);
        self.insert(record.clone());
        Ok(Some(record))
    }

    async fn list(&self, limit: usize) -> AppResult<Vec<FoodRecord>> {
        let mut records = self.snapshot();
        records.sort_by(|a, b| a.identity.name.cmp(&b.identity.name));
        records.truncate(limit);
        Ok(records)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutriscan_core::models::{FoodIdentity, NutrientValues};

    #[tokio::test]
    async fn test_seeded_store_lookups() {
        let store = InMemoryFoodStore::seeded(0.95);
        assert_eq!(store.count().await.unwrap(), 6);

        let apple = store.find_by_name("apple").await.unwrap().unwrap();
        assert_eq!(apple.identity.name, "Apple");

        let bread = store.find_by_barcode("1234567890123").await.unwrap().unwrap();
        assert_eq!(bread.identity.name, "Whole Wheat Bread");
        assert!(store.find_by_barcode("0000000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_barcode_index() {
        let store = InMemoryFoodStore::new();
        let mut record = FoodRecord::curated(
            FoodIdentity {
                barcode: Some("11111111".to_owned()),
                ..FoodIdentity::named("Oat Bar")
            },
            NutrientValues::default(),
            0.9,
        );
        store.upsert(record.clone()).await.unwrap();

        record.identity.barcode = Some("22222222".to_owned());
        store.upsert(record).await.unwrap();

        assert!(store.find_by_barcode("11111111").await.unwrap().is_none());
        assert!(store.find_by_barcode("22222222").await.unwrap().is_some());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_limited() {
        let store = InMemoryFoodStore::seeded(0.95);
        let names: Vec<String> = store
            .list(3)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.identity.name)
            .collect();
        assert_eq!(names, vec!["Apple", "Banana", "Chicken Breast"]);
    }
}
