// ABOUTME: Nutrition profile, nutrient value sets, source provenance and raw source candidates
// ABOUTME: Normalizes native serving values into per-100g and per-serving representations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrition Profiles
//!
//! A [`NutritionCandidate`] is what a single source returns: values measured at
//! the source's native serving weight. The resolver turns the winning candidate
//! into an immutable [`NutritionProfile`] carrying both per-100g and
//! per-requested-serving values, with confidence and provenance attached.

use super::nutrient::Nutrient;
use crate::errors::ScanError;
use crate::serving::ServingSize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Grams in the canonical reference quantity
pub const REFERENCE_GRAMS: f64 = 100.0;

/// Where a nutrition profile came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Curated or learned local food store
    Database,
    /// External food database (Open Food Facts, USDA)
    ExternalDb,
    /// Generated by the AI estimator
    AiEstimate,
}

impl SourceKind {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::ExternalDb => "external_db",
            Self::AiEstimate => "ai_estimate",
        }
    }

    /// Parse from wire name
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "database" => Some(Self::Database),
            "external_db" => Some(Self::ExternalDb),
            "ai_estimate" => Some(Self::AiEstimate),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of nutrient amounts for one quantity of food
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientValues {
    /// Energy (kcal)
    pub calories: f64,
    /// Protein (g)
    pub protein_g: f64,
    /// Carbohydrates (g)
    pub carbohydrates_g: f64,
    /// Fat (g)
    pub fat_g: f64,
    /// Fiber (g)
    pub fiber_g: Option<f64>,
    /// Sugar (g)
    pub sugar_g: Option<f64>,
    /// Sodium (mg)
    pub sodium_mg: Option<f64>,
    /// Remaining nutrients keyed by catalog name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub micronutrients: BTreeMap<Nutrient, f64>,
}

impl NutrientValues {
    /// Amount of one nutrient, `None` when the source did not report it
    #[must_use]
    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Calories => Some(self.calories),
            Nutrient::ProteinG => Some(self.protein_g),
            Nutrient::CarbohydratesG => Some(self.carbohydrates_g),
            Nutrient::FatG => Some(self.fat_g),
            Nutrient::FiberG => self.fiber_g,
            Nutrient::SugarG => self.sugar_g,
            Nutrient::SodiumMg => self.sodium_mg,
            other => self.micronutrients.get(&other).copied(),
        }
    }

    /// Set one nutrient, routing core nutrients to their fixed fields
    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        match nutrient {
            Nutrient::Calories => self.calories = value,
            Nutrient::ProteinG => self.protein_g = value,
            Nutrient::CarbohydratesG => self.carbohydrates_g = value,
            Nutrient::FatG => self.fat_g = value,
            Nutrient::FiberG => self.fiber_g = Some(value),
            Nutrient::SugarG => self.sugar_g = Some(value),
            Nutrient::SodiumMg => self.sodium_mg = Some(value),
            other => {
                self.micronutrients.insert(other, value);
            }
        }
    }

    /// Builder-style `set`
    #[must_use]
    pub fn with(mut self, nutrient: Nutrient, value: f64) -> Self {
        self.set(nutrient, value);
        self
    }

    /// Linearly scale every amount by `factor`
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein_g: self.protein_g * factor,
            carbohydrates_g: self.carbohydrates_g * factor,
            fat_g: self.fat_g * factor,
            fiber_g: self.fiber_g.map(|v| v * factor),
            sugar_g: self.sugar_g.map(|v| v * factor),
            sodium_mg: self.sodium_mg.map(|v| v * factor),
            micronutrients: self
                .micronutrients
                .iter()
                .map(|(k, v)| (*k, v * factor))
                .collect(),
        }
    }

    /// Every reported amount with its nutrient, in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        Nutrient::ALL
            .into_iter()
            .filter_map(|n| self.get(n).map(|v| (n, v)))
    }

    /// First reported amount that is NaN or infinite
    #[must_use]
    pub fn first_non_finite(&self) -> Option<Nutrient> {
        self.iter().find(|(_, v)| !v.is_finite()).map(|(n, _)| n)
    }
}

/// Identity of a food as reported by a source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodIdentity {
    /// Display name
    pub name: String,
    /// Brand, for packaged foods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Barcode (EAN/UPC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    /// Free-text ingredient list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    /// Food category (fruit, dairy, snack, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl FoodIdentity {
    /// Identity with only a name
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Nutri-Score letter grade, A best to E worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NutriScore {
    /// Best
    A,
    /// Good
    B,
    /// Average
    C,
    /// Poor
    D,
    /// Worst
    E,
}

impl NutriScore {
    /// Parse a grade letter in either case; anything else is `None`
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "E" => Some(Self::E),
            _ => None,
        }
    }

    /// Upper-case letter
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }
}

impl fmt::Display for NutriScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Food quality indicators some sources report alongside nutrients
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodRating {
    /// Nutri-Score grade
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutri_score: Option<NutriScore>,
    /// Glycemic load index as reported by the source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glycemic_load_index: Option<f64>,
}

impl FoodRating {
    /// No indicator reported
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nutri_score.is_none() && self.glycemic_load_index.is_none()
    }
}

/// Raw result from a single nutrition source, at the source's native serving
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionCandidate {
    /// Food identity
    pub identity: FoodIdentity,
    /// Values measured at `native_grams`
    pub values: NutrientValues,
    /// Weight the values refer to
    pub native_grams: f64,
    /// Confidence assigned by the source
    pub confidence: f64,
    /// Provenance
    pub source: SourceKind,
    /// Set when the AI estimator could not produce a real estimate
    pub is_fallback: bool,
    /// Quality indicators, when the source reports them
    pub rating: FoodRating,
}

impl NutritionCandidate {
    /// Candidate whose values are already per 100 g
    #[must_use]
    pub fn per_100g(
        identity: FoodIdentity,
        values: NutrientValues,
        confidence: f64,
        source: SourceKind,
    ) -> Self {
        Self {
            identity,
            values,
            native_grams: REFERENCE_GRAMS,
            confidence,
            source,
            is_fallback: false,
            rating: FoodRating::default(),
        }
    }

    /// Attach quality indicators
    #[must_use]
    pub const fn with_rating(mut self, rating: FoodRating) -> Self {
        self.rating = rating;
        self
    }
}

/// Canonical nutrition record for one resolved food.
///
/// Immutable: fields are only readable, and a new resolution always builds a
/// new profile through [`NutritionProfile::normalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionProfile {
    food: FoodIdentity,
    serving_size: ServingSize,
    #[serde(flatten)]
    per_serving: NutrientValues,
    per_100g: NutrientValues,
    confidence: f64,
    source: SourceKind,
    #[serde(default, skip_serializing_if = "FoodRating::is_empty")]
    rating: FoodRating,
}

impl NutritionProfile {
    /// Build a profile from a source candidate using linear scaling.
    ///
    /// Per-serving amounts are `value * requested_grams / native_grams`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidServingSize`] when either weight is not a
    /// positive finite number.
    pub fn normalize(
        candidate: &NutritionCandidate,
        requested: &ServingSize,
    ) -> Result<Self, ScanError> {
        let native = candidate.native_grams;
        if !native.is_finite() || native <= 0.0 {
            return Err(ScanError::invalid_serving(
                format!("{native}g"),
                format!(
                    "source serving weight for '{}' must be greater than zero",
                    candidate.identity.name
                ),
            ));
        }
        let grams = requested.grams();
        if !grams.is_finite() || grams <= 0.0 {
            return Err(ScanError::invalid_serving(
                requested.description(),
                "serving weight must be greater than zero",
            ));
        }

        Ok(Self {
            food: candidate.identity.clone(),
            serving_size: requested.clone(),
            per_serving: candidate.values.scaled(grams / native),
            per_100g: candidate.values.scaled(REFERENCE_GRAMS / native),
            confidence: candidate.confidence.clamp(0.0, 1.0),
            source: candidate.source,
            rating: candidate.rating,
        })
    }

    /// Food identity
    #[must_use]
    pub const fn food(&self) -> &FoodIdentity {
        &self.food
    }

    /// Food display name
    #[must_use]
    pub fn food_name(&self) -> &str {
        &self.food.name
    }

    /// Requested serving
    #[must_use]
    pub const fn serving_size(&self) -> &ServingSize {
        &self.serving_size
    }

    /// Values for the requested serving
    #[must_use]
    pub const fn per_serving(&self) -> &NutrientValues {
        &self.per_serving
    }

    /// Values per 100 g
    #[must_use]
    pub const fn per_100g(&self) -> &NutrientValues {
        &self.per_100g
    }

    /// Confidence in [0, 1]
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Provenance
    #[must_use]
    pub const fn source(&self) -> SourceKind {
        self.source
    }

    /// Quality indicators carried over from the source
    #[must_use]
    pub const fn rating(&self) -> FoodRating {
        self.rating
    }

    /// Per-serving amount of one nutrient
    #[must_use]
    pub fn value(&self, nutrient: Nutrient) -> Option<f64> {
        self.per_serving.get(nutrient)
    }

    /// Text searched by ingredient-avoidance checks: ingredient list plus food name
    #[must_use]
    pub fn ingredient_text(&self) -> String {
        match &self.food.ingredients {
            Some(ingredients) => format!("{} {}", self.food.name, ingredients),
            None => self.food.name.clone(),
        }
    }
}
