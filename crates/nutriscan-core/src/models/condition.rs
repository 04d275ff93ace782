// ABOUTME: Health condition model with typed nutrient thresholds and ingredient avoidance
// ABOUTME: Thresholds are keyed by the closed nutrient catalog and validated before use
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::nutrient::{Bound, LimitKey, Nutrient};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How serious a condition is in general
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConditionSeverity {
    /// Mild
    Mild,
    /// Moderate
    #[default]
    Moderate,
    /// Severe
    Severe,
}

impl ConditionSeverity {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }

    /// Parse from wire name (case-insensitive)
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mild" => Some(Self::Mild),
            "moderate" => Some(Self::Moderate),
            "severe" => Some(Self::Severe),
            _ => None,
        }
    }
}

impl fmt::Display for ConditionSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper and lower nutrient thresholds, serialized as `max_<nutrient>` / `min_<nutrient>` keys
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(into = "BTreeMap<String, f64>")]
pub struct NutrientLimits {
    maxima: BTreeMap<Nutrient, f64>,
    minima: BTreeMap<Nutrient, f64>,
}

impl NutrientLimits {
    /// Set a threshold, replacing any previous value for the same key
    pub fn insert(&mut self, key: LimitKey, threshold: f64) {
        match key.bound {
            Bound::Max => self.maxima.insert(key.nutrient, threshold),
            Bound::Min => self.minima.insert(key.nutrient, threshold),
        };
    }

    /// Upper threshold for a nutrient
    #[must_use]
    pub fn max(&self, nutrient: Nutrient) -> Option<f64> {
        self.maxima.get(&nutrient).copied()
    }

    /// Lower threshold for a nutrient
    #[must_use]
    pub fn min(&self, nutrient: Nutrient) -> Option<f64> {
        self.minima.get(&nutrient).copied()
    }

    /// Upper thresholds in catalog order
    pub fn maxima(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        self.maxima.iter().map(|(n, v)| (*n, *v))
    }

    /// Lower thresholds in catalog order
    pub fn minima(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        self.minima.iter().map(|(n, v)| (*n, *v))
    }

    /// Whether no threshold is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maxima.is_empty() && self.minima.is_empty()
    }
}

impl From<NutrientLimits> for BTreeMap<String, f64> {
    fn from(limits: NutrientLimits) -> Self {
        let maxima = limits.maxima.into_iter().map(|(nutrient, v)| {
            (
                LimitKey {
                    bound: Bound::Max,
                    nutrient,
                }
                .as_key(),
                v,
            )
        });
        let minima = limits.minima.into_iter().map(|(nutrient, v)| {
            (
                LimitKey {
                    bound: Bound::Min,
                    nutrient,
                }
                .as_key(),
                v,
            )
        });
        maxima.chain(minima).collect()
    }
}

/// Restrictions a condition places on food
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DietaryRestrictions {
    /// Numeric thresholds
    #[serde(flatten)]
    pub limits: NutrientLimits,
    /// Ingredients to avoid, lowercase
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub avoid_ingredients: Vec<String>,
}

/// A health condition the engine can evaluate food against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthCondition {
    /// Display name, unique case-insensitively
    pub name: String,
    /// Free-text description
    pub description: String,
    /// General severity
    pub severity: ConditionSeverity,
    /// Restrictions (thresholds plus ingredient avoidance)
    pub dietary_restrictions: DietaryRestrictions,
    /// Nutritional targets
    pub nutritional_targets: NutrientLimits,
    /// Warning message template, `{nutrient}` is substituted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_template: Option<String>,
    /// Recommendation template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_template: Option<String>,
    /// Seeded at startup and read-only
    pub is_builtin: bool,
}

impl HealthCondition {
    /// Catalog key: trimmed, lowercased name
    #[must_use]
    pub fn key(&self) -> String {
        normalize_condition_name(&self.name)
    }

    /// Effective upper limits: restrictions and targets merged, the lower value winning
    #[must_use]
    pub fn effective_maxima(&self) -> BTreeMap<Nutrient, f64> {
        let mut merged: BTreeMap<Nutrient, f64> =
            self.dietary_restrictions.limits.maxima().collect();
        for (nutrient, limit) in self.nutritional_targets.maxima() {
            merged
                .entry(nutrient)
                .and_modify(|existing| *existing = existing.min(limit))
                .or_insert(limit);
        }
        merged
    }

    /// Effective lower targets: restrictions and targets merged, the higher value winning
    #[must_use]
    pub fn effective_minima(&self) -> BTreeMap<Nutrient, f64> {
        let mut merged: BTreeMap<Nutrient, f64> =
            self.dietary_restrictions.limits.minima().collect();
        for (nutrient, target) in self.nutritional_targets.minima() {
            merged
                .entry(nutrient)
                .and_modify(|existing| *existing = existing.max(target))
                .or_insert(target);
        }
        merged
    }
}

/// Catalog key for a condition name
#[must_use]
pub fn normalize_condition_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> LimitKey {
        LimitKey::parse(raw).unwrap()
    }

    #[test]
    fn test_stricter_limit_wins() {
        let mut restrictions = DietaryRestrictions::default();
        restrictions.limits.insert(key("max_sodium_mg"), 2000.0);
        let mut targets = NutrientLimits::default();
        targets.insert(key("max_sodium_mg"), 1500.0);
        targets.insert(key("min_fiber_g"), 6.0);

        let condition = HealthCondition {
            name: " Hypertension ".to_owned(),
            description: String::new(),
            severity: ConditionSeverity::Moderate,
            dietary_restrictions: restrictions,
            nutritional_targets: targets,
            warning_template: None,
            recommendation_template: None,
            is_builtin: false,
        };

        assert_eq!(condition.key(), "hypertension");
        assert_eq!(
            condition.effective_maxima().get(&Nutrient::SodiumMg),
            Some(&1500.0)
        );
        assert_eq!(condition.effective_minima().get(&Nutrient::FiberG), Some(&6.0));
    }

    #[test]
    fn test_limits_serialize_as_prefixed_keys() {
        let mut limits = NutrientLimits::default();
        limits.insert(key("max_sugar_g"), 25.0);
        limits.insert(key("min_protein_g"), 15.0);
        let json = serde_json::to_value(&limits).unwrap();
        assert_eq!(json["max_sugar_g"], 25.0);
        assert_eq!(json["min_protein_g"], 15.0);
    }
}
