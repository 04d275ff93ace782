// ABOUTME: Health condition catalog seeded with built-ins and extended at runtime
// ABOUTME: Copy-on-write snapshots give readers a consistent view while conditions are added
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Condition Catalog
//!
//! Conditions are looked up case-insensitively. The catalog stores an
//! `Arc`'d map behind a lock; adding a condition builds a new map and swaps it
//! in, so a [`CatalogSnapshot`] taken by an in-flight evaluation never sees a
//! partially inserted condition and never blocks writers.
//!
//! Condition definitions arrive as free-form JSON objects and are validated
//! here, once, into typed [`HealthCondition`] values.

use crate::builtin::builtin_definitions;
use nutriscan_core::errors::ScanError;
use nutriscan_core::models::{
    normalize_condition_name, ConditionSeverity, DietaryRestrictions, HealthCondition, LimitKey,
    NutrientLimits,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::{debug, error, info};

/// Key holding the ingredient avoidance list inside `dietary_restrictions`
pub const AVOID_INGREDIENTS_KEY: &str = "avoid_ingredients";

/// Longest accepted condition name
pub const MAX_CONDITION_NAME_LEN: usize = 100;

/// Condition as submitted by a caller, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionDefinition {
    /// Display name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// General severity
    #[serde(default)]
    pub severity: ConditionSeverity,
    /// `max_<nutrient>` / `min_<nutrient>` thresholds plus `avoid_ingredients`
    #[serde(default)]
    pub dietary_restrictions: Map<String, Value>,
    /// `max_<nutrient>` / `min_<nutrient>` thresholds
    #[serde(default)]
    pub nutritional_targets: Map<String, Value>,
    /// Warning template
    #[serde(default)]
    pub warning_template: Option<String>,
    /// Recommendation template
    #[serde(default)]
    pub recommendation_template: Option<String>,
}

impl ConditionDefinition {
    /// Validate into a typed condition.
    ///
    /// Keys that are not thresholds on a known nutrient are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidCondition`] for an empty or overlong name, a
    /// threshold that is not a finite non-negative number, or an avoid list
    /// that is not an array of strings.
    pub fn into_condition(self, is_builtin: bool) -> Result<HealthCondition, ScanError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(ScanError::invalid_condition(
                self.name,
                "name must not be empty",
            ));
        }
        if name.chars().count() > MAX_CONDITION_NAME_LEN {
            return Err(ScanError::invalid_condition(
                name,
                format!("name must be at most {MAX_CONDITION_NAME_LEN} characters"),
            ));
        }

        let limits = parse_thresholds(&name, "dietary_restrictions", &self.dietary_restrictions)?;
        let avoid_ingredients = match self.dietary_restrictions.get(AVOID_INGREDIENTS_KEY) {
            Some(value) => parse_avoid_list(&name, value)?,
            None => Vec::new(),
        };
        let nutritional_targets =
            parse_thresholds(&name, "nutritional_targets", &self.nutritional_targets)?;

        Ok(HealthCondition {
            name,
            description: self.description.trim().to_owned(),
            severity: self.severity,
            dietary_restrictions: DietaryRestrictions {
                limits,
                avoid_ingredients,
            },
            nutritional_targets,
            warning_template: non_empty(self.warning_template),
            recommendation_template: non_empty(self.recommendation_template),
            is_builtin,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn parse_thresholds(
    name: &str,
    section: &str,
    raw: &Map<String, Value>,
) -> Result<NutrientLimits, ScanError> {
    let mut limits = NutrientLimits::default();
    for (key, value) in raw {
        if key == AVOID_INGREDIENTS_KEY {
            continue;
        }
        let Some(limit_key) = LimitKey::parse(key) else {
            debug!(condition = %name, section, key = %key, "Ignoring non-threshold condition key");
            continue;
        };
        let threshold = value.as_f64().ok_or_else(|| {
            ScanError::invalid_condition(name, format!("{section}.{key} must be a number"))
        })?;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ScanError::invalid_condition(
                name,
                format!("{section}.{key} must be a finite non-negative number"),
            ));
        }
        limits.insert(limit_key, threshold);
    }
    Ok(limits)
}

fn parse_avoid_list(name: &str, value: &Value) -> Result<Vec<String>, ScanError> {
    let Value::Array(items) = value else {
        return Err(ScanError::invalid_condition(
            name,
            "avoid_ingredients must be an array of strings",
        ));
    };
    let mut ingredients: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let ingredient = item.as_str().ok_or_else(|| {
            ScanError::invalid_condition(name, "avoid_ingredients must be an array of strings")
        })?;
        let ingredient = ingredient.trim().to_lowercase();
        if !ingredient.is_empty() && !ingredients.contains(&ingredient) {
            ingredients.push(ingredient);
        }
    }
    Ok(ingredients)
}

type ConditionMap = BTreeMap<String, Arc<HealthCondition>>;

/// Immutable view of the catalog at one point in time
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    conditions: Arc<ConditionMap>,
}

impl CatalogSnapshot {
    /// Case-insensitive lookup
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<HealthCondition>> {
        self.conditions.get(&normalize_condition_name(name))
    }

    /// Conditions ordered by normalized name
    pub fn iter(&self) -> impl Iterator<Item = &Arc<HealthCondition>> {
        self.conditions.values()
    }

    /// Number of conditions
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether the snapshot has no conditions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Process-wide catalog of health conditions
#[derive(Debug)]
pub struct ConditionCatalog {
    conditions: RwLock<Arc<ConditionMap>>,
}

static GLOBAL_CATALOG: OnceLock<Arc<ConditionCatalog>> = OnceLock::new();

impl ConditionCatalog {
    /// Catalog without any condition
    #[must_use]
    pub fn empty() -> Self {
        Self {
            conditions: RwLock::new(Arc::new(BTreeMap::new())),
        }
    }

    /// Catalog seeded with the built-in conditions
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut map = ConditionMap::new();
        for definition in builtin_definitions() {
            match definition.into_condition(true) {
                Ok(condition) => {
                    map.insert(condition.key(), Arc::new(condition));
                }
                Err(e) => error!(error = %e, "Skipping invalid built-in condition"),
            }
        }
        debug!(count = map.len(), "Seeded built-in health conditions");
        Self {
            conditions: RwLock::new(Arc::new(map)),
        }
    }

    /// Shared catalog, seeded with built-ins on first access
    #[must_use]
    pub fn global() -> Arc<Self> {
        GLOBAL_CATALOG
            .get_or_init(|| Arc::new(Self::with_builtins()))
            .clone()
    }

    /// Consistent view for one evaluation
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        let guard = self
            .conditions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        CatalogSnapshot {
            conditions: Arc::clone(&guard),
        }
    }

    /// Case-insensitive lookup
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<HealthCondition>> {
        self.snapshot().get(name).cloned()
    }

    /// All conditions, ordered by normalized name
    #[must_use]
    pub fn list_conditions(&self) -> Vec<Arc<HealthCondition>> {
        self.snapshot().iter().cloned().collect()
    }

    /// Number of conditions
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether the catalog has no conditions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Validate and add a user-defined condition.
    ///
    /// Validation happens before the write lock is taken; the duplicate check
    /// and the swap happen under it.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidCondition`] if the definition is invalid and
    /// [`ScanError::DuplicateCondition`] if a condition with the same
    /// case-insensitive name exists.
    pub fn add_condition(
        &self,
        definition: ConditionDefinition,
    ) -> Result<Arc<HealthCondition>, ScanError> {
        let condition = Arc::new(definition.into_condition(false)?);
        let key = condition.key();

        let mut guard = self
            .conditions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if guard.contains_key(&key) {
            return Err(ScanError::duplicate_condition(condition.name.clone()));
        }
        let mut next = ConditionMap::clone(&guard);
        next.insert(key, Arc::clone(&condition));
        *guard = Arc::new(next);
        drop(guard);

        info!(
            condition = %condition.name,
            severity = %condition.severity,
            "Added health condition"
        );
        Ok(condition)
    }
}

impl Default for ConditionCatalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}
