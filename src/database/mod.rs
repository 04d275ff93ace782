// ABOUTME: Local food store abstraction with in-memory and SQLite backends
// ABOUTME: Stores curated and learned per-100g food records with name and barcode lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Food Store
//!
//! The local database is the highest-trust nutrition source. It holds curated
//! records seeded at startup and records learned from AI estimates.
//!
//! Name lookup runs in three passes, stopping at the first hit:
//!
//! 1. case-insensitive exact match
//! 2. record name containing the query
//! 3. record name containing a variation of the query (see [`name_variations`])

mod memory;
mod seed;
mod sqlite;

pub use memory::InMemoryFoodStore;
pub use seed::seed_records;
pub use sqlite::SqliteFoodStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nutriscan_core::errors::AppResult;
use nutriscan_core::models::{FoodIdentity, NutrientValues, NutritionProfile, SourceKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Preparation and marketing words dropped when generating name variations
const FILLER_WORDS: &[&str] = &[
    "fresh", "organic", "raw", "cooked", "grilled", "fried", "baked",
];

/// Words shorter than this are not used as standalone variations
const MIN_VARIATION_WORD_LEN: usize = 3;

/// One food in the local store, values per 100 g
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    /// Record id
    pub id: Uuid,
    /// Food identity
    pub identity: FoodIdentity,
    /// Values per 100 g
    pub per_100g: NutrientValues,
    /// Confidence stored with the record
    pub confidence: f64,
    /// Where the values originally came from
    pub origin: SourceKind,
    /// Written back from an AI estimate
    pub learned: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl FoodRecord {
    /// Curated record
    #[must_use]
    pub fn curated(identity: FoodIdentity, per_100g: NutrientValues, confidence: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            per_100g,
            confidence,
            origin: SourceKind::Database,
            learned: false,
            created_at: Utc::now(),
        }
    }

    /// Record learned from a resolved profile
    #[must_use]
    pub fn learned(profile: &NutritionProfile, confidence: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity: profile.food().clone(),
            per_100g: profile.per_100g().clone(),
            confidence: confidence.clamp(0.0, 1.0),
            origin: profile.source(),
            learned: true,
            created_at: Utc::now(),
        }
    }

    /// Normalized name used for matching
    #[must_use]
    pub fn name_key(&self) -> String {
        normalize_food_name(&self.identity.name)
    }
}

/// Storage for food records
#[async_trait]
pub trait FoodStore: Send + Sync {
    /// Backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Best record for a food name, following the three lookup passes
    async fn find_by_name(&self, name: &str) -> AppResult<Option<FoodRecord>>;

    /// Record with exactly this barcode
    async fn find_by_barcode(&self, barcode: &str) -> AppResult<Option<FoodRecord>>;

    /// Insert or replace a record (matched by id)
    async fn upsert(&self, record: FoodRecord) -> AppResult<()>;

    /// Persist an AI-derived profile as a low-confidence record.
    ///
    /// Returns `None` when a record with the same name or barcode already
    /// exists; learning never overwrites data.
    async fn save_learned_profile(
        &self,
        profile: &NutritionProfile,
        confidence: f64,
    ) -> AppResult<Option<FoodRecord>>;

    /// Records ordered by name
    async fn list(&self, limit: usize) -> AppResult<Vec<FoodRecord>>;

    /// Number of records
    async fn count(&self) -> AppResult<usize>;
}

/// Shared handle to a store
pub type SharedFoodStore = Arc<dyn FoodStore>;

/// Lowercase, trimmed, single-spaced
#[must_use]
pub fn normalize_food_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Alternative spellings tried when exact and contains matching fail.
///
/// Filler words are removed, a plural or singular form is added, and every
/// word of a multi-word name is tried on its own. The normalized name itself
/// is never included.
#[must_use]
pub fn name_variations(name: &str) -> Vec<String> {
    let normalized = normalize_food_name(name);
    let words: Vec<&str> = normalized.split(' ').filter(|w| !w.is_empty()).collect();
    let mut variations: Vec<String> = Vec::new();
    let mut push = |candidate: String| {
        if !candidate.is_empty() && candidate != normalized && !variations.contains(&candidate) {
            variations.push(candidate);
        }
    };

    if words.iter().any(|w| FILLER_WORDS.contains(w)) {
        push(
            words
                .iter()
                .filter(|w| !FILLER_WORDS.contains(w))
                .copied()
                .collect::<Vec<_>>()
                .join(" "),
        );
    }

    match normalized.strip_suffix('s') {
        Some(singular) => push(singular.to_owned()),
        None => push(format!("{normalized}s")),
    }

    if words.len() > 1 {
        for word in &words {
            if word.len() >= MIN_VARIATION_WORD_LEN && !FILLER_WORDS.contains(word) {
                push((*word).to_owned());
            }
        }
    }

    variations
}

/// Three-pass name match over in-memory records.
///
/// Among several contains-matches the shortest name wins, then alphabetical
/// order, so results do not depend on storage iteration order.
pub fn match_by_name<'a, I>(records: I, name: &str) -> Option<&'a FoodRecord>
where
    I: IntoIterator<Item = &'a FoodRecord> + Clone,
{
    let query = normalize_food_name(name);
    if query.is_empty() {
        return None;
    }

    let contains = |term: &str| {
        records
            .clone()
            .into_iter()
            .filter(|r| r.name_key().contains(term))
            .min_by(|a, b| {
                a.identity
                    .name
                    .len()
                    .cmp(&b.identity.name.len())
                    .then_with(|| a.identity.name.cmp(&b.identity.name))
            })
    };

    records
        .clone()
        .into_iter()
        .find(|r| r.name_key() == query)
        .or_else(|| contains(&query))
        .or_else(|| {
            name_variations(&query)
                .iter()
                .find_map(|variation| contains(variation.as_str()))
        })
}
