// ABOUTME: Health rule engine evaluating nutrition profiles against selected conditions
// ABOUTME: Emits ordered per-condition remarks and a severity-weighted 0-10 score
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Health Rule Engine
//!
//! For each requested condition, in request order, the engine emits:
//!
//! 1. one `danger` remark if any avoided ingredient appears in the food's
//!    ingredient text or name
//! 2. one remark per exceeded upper limit (`danger` above the danger ratio,
//!    otherwise `warning`)
//! 3. one `info` remark per missed lower target
//! 4. a single `info` compliance remark when none of the above fired
//!
//! Per-serving values are compared. A nutrient the profile does not report is
//! skipped rather than treated as zero. The score always derives from the
//! remark set; with no known condition it falls back to the baseline heuristic.
//!
//! Once any condition is violated the score never exceeds that baseline, so
//! naming a violated condition can only lower a score, never raise it. A food
//! that complies with every named condition scores the maximum.

use crate::baseline::baseline_score;
use crate::catalog::{CatalogSnapshot, ConditionCatalog};
use crate::config::ScoringConfig;
use nutriscan_core::models::{
    normalize_condition_name, HealthCondition, HealthRemark, Nutrient, NutritionProfile,
    RemarkKind, RemarkSeverity,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Recommendation used when nothing more specific applies
pub const DEFAULT_RECOMMENDATION: &str = "Consult healthcare provider for guidance";

/// Evaluation failed on malformed data
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum EvaluationError {
    /// A profile amount is NaN or infinite
    #[error("nutrition profile has a non-finite {nutrient} value")]
    NonFiniteNutrient {
        /// Offending nutrient
        nutrient: Nutrient,
    },
    /// A condition threshold is negative, NaN or infinite
    #[error("condition '{condition}' has an invalid {nutrient} threshold")]
    InvalidThreshold {
        /// Condition name
        condition: String,
        /// Offending nutrient
        nutrient: Nutrient,
    },
}

/// How the overall score was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBasis {
    /// Penalties from condition remarks
    Conditions,
    /// Nutrient-balance heuristic, no known condition supplied
    Baseline,
}

/// Score for one evaluated condition, from that condition's remarks alone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionScore {
    /// Condition display name
    pub condition: String,
    /// Score in `[0, max_score]`
    pub score: f64,
}

/// Remarks and the score computed from them.
///
/// Only the engine constructs this type, so the score is always derived from
/// the remarks (or the baseline when there are none to derive from).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthAssessment {
    remarks: Vec<HealthRemark>,
    overall_score: f64,
    basis: ScoreBasis,
    evaluated_conditions: Vec<String>,
    condition_scores: Vec<ConditionScore>,
}

impl HealthAssessment {
    /// Remarks in condition order
    #[must_use]
    pub fn remarks(&self) -> &[HealthRemark] {
        &self.remarks
    }

    /// Score in `[0, 10]`
    ///
    /// Starts at 10 and subtracts each remark's penalty, but once any condition
    /// is violated the result is also capped at the nutrient-balance baseline,
    /// so it may sit below `10 - penalty`.
    #[must_use]
    pub const fn overall_score(&self) -> f64 {
        self.overall_score
    }

    /// How the score was obtained
    #[must_use]
    pub const fn basis(&self) -> ScoreBasis {
        self.basis
    }

    /// Display names of the conditions that were evaluated
    #[must_use]
    pub fn evaluated_conditions(&self) -> &[String] {
        &self.evaluated_conditions
    }

    /// Per-condition scores in evaluation order; empty on the baseline
    #[must_use]
    pub fn condition_scores(&self) -> &[ConditionScore] {
        &self.condition_scores
    }

    /// Take the remarks, dropping the rest
    #[must_use]
    pub fn into_parts(self) -> (Vec<HealthRemark>, f64) {
        (self.remarks, self.overall_score)
    }
}

/// Evaluates profiles against conditions from a catalog
#[derive(Debug, Clone)]
pub struct HealthRuleEngine {
    catalog: Arc<ConditionCatalog>,
    scoring: ScoringConfig,
}

impl HealthRuleEngine {
    /// Create an engine over a catalog
    #[must_use]
    pub const fn new(catalog: Arc<ConditionCatalog>, scoring: ScoringConfig) -> Self {
        Self { catalog, scoring }
    }

    /// Catalog this engine reads
    #[must_use]
    pub const fn catalog(&self) -> &Arc<ConditionCatalog> {
        &self.catalog
    }

    /// Scoring configuration
    #[must_use]
    pub const fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Evaluate against a fresh catalog snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] when the profile or a condition holds
    /// non-finite numbers.
    pub fn evaluate<S: AsRef<str>>(
        &self,
        profile: &NutritionProfile,
        condition_names: &[S],
    ) -> Result<HealthAssessment, EvaluationError> {
        self.evaluate_with(&self.catalog.snapshot(), profile, condition_names)
    }

    /// Evaluate against a given snapshot.
    ///
    /// Unknown names are skipped. Names repeated case-insensitively are
    /// evaluated once, at their first position.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] when the profile or a condition holds
    /// non-finite numbers.
    pub fn evaluate_with<S: AsRef<str>>(
        &self,
        snapshot: &CatalogSnapshot,
        profile: &NutritionProfile,
        condition_names: &[S],
    ) -> Result<HealthAssessment, EvaluationError> {
        if let Some(nutrient) = profile.per_serving().first_non_finite() {
            return Err(EvaluationError::NonFiniteNutrient { nutrient });
        }

        let mut seen = HashSet::new();
        let mut conditions: Vec<&Arc<HealthCondition>> = Vec::new();
        for name in condition_names {
            let name = name.as_ref();
            if !seen.insert(normalize_condition_name(name)) {
                continue;
            }
            match snapshot.get(name) {
                Some(condition) => conditions.push(condition),
                None => debug!(condition = %name, "Skipping unknown health condition"),
            }
        }

        if conditions.is_empty() {
            return Ok(self.baseline(profile));
        }

        let max_score = self.scoring.max_score;
        let haystack = profile.ingredient_text().to_lowercase();
        let mut remarks = Vec::new();
        let mut condition_scores = Vec::with_capacity(conditions.len());
        for condition in &conditions {
            let condition_remarks = self.evaluate_condition(condition, profile, &haystack)?;
            let penalty: f64 = condition_remarks.iter().map(|r| self.penalty(r)).sum();
            condition_scores.push(ConditionScore {
                condition: condition.name.clone(),
                score: (max_score - penalty).clamp(0.0, max_score),
            });
            remarks.extend(condition_remarks);
        }

        let penalty: f64 = remarks.iter().map(|r| self.penalty(r)).sum();
        let mut overall_score = max_score - penalty;
        if remarks.iter().any(|r| r.kind != RemarkKind::Compliant) {
            overall_score = overall_score.min(baseline_score(profile.per_100g(), &self.scoring));
        }

        Ok(HealthAssessment {
            remarks,
            overall_score: overall_score.clamp(0.0, max_score),
            basis: ScoreBasis::Conditions,
            evaluated_conditions: conditions.iter().map(|c| c.name.clone()).collect(),
            condition_scores,
        })
    }

    /// Condition-agnostic assessment: no remarks, baseline score
    #[must_use]
    pub fn baseline(&self, profile: &NutritionProfile) -> HealthAssessment {
        HealthAssessment {
            remarks: Vec::new(),
            overall_score: baseline_score(profile.per_100g(), &self.scoring),
            basis: ScoreBasis::Baseline,
            evaluated_conditions: Vec::new(),
            condition_scores: Vec::new(),
        }
    }

    /// Score deduction for one remark
    #[must_use]
    pub fn penalty(&self, remark: &HealthRemark) -> f64 {
        match (remark.severity, remark.kind) {
            (RemarkSeverity::Danger, _) => self.scoring.danger_penalty,
            (RemarkSeverity::Warning, _) => self.scoring.warning_penalty,
            (RemarkSeverity::Info, RemarkKind::Compliant) => 0.0,
            (RemarkSeverity::Info, _) => self.scoring.shortfall_penalty,
        }
    }

    fn evaluate_condition(
        &self,
        condition: &HealthCondition,
        profile: &NutritionProfile,
        haystack: &str,
    ) -> Result<Vec<HealthRemark>, EvaluationError> {
        let mut remarks = Vec::new();

        if let Some(remark) = avoid_ingredient_remark(condition, haystack) {
            remarks.push(remark);
        }

        for (nutrient, limit) in condition.effective_maxima() {
            check_threshold(condition, nutrient, limit)?;
            let Some(actual) = profile.value(nutrient) else {
                continue;
            };
            if actual <= limit {
                continue;
            }
            let severity = if limit == 0.0 || actual / limit > self.scoring.danger_ratio {
                RemarkSeverity::Danger
            } else {
                RemarkSeverity::Warning
            };
            remarks.push(HealthRemark {
                condition: condition.name.clone(),
                severity,
                kind: RemarkKind::ExceedsLimit,
                message: format!(
                    "High {} content ({actual:.1}) may not be suitable for {} (limit: {limit})",
                    nutrient.display_name(),
                    condition.name
                ),
                recommendation: Some(limit_recommendation(condition, nutrient)),
                nutrient: Some(nutrient),
                actual: Some(actual),
                limit: Some(limit),
            });
        }

        for (nutrient, target) in condition.effective_minima() {
            check_threshold(condition, nutrient, target)?;
            let Some(actual) = profile.value(nutrient) else {
                continue;
            };
            if actual >= target {
                continue;
            }
            remarks.push(HealthRemark {
                condition: condition.name.clone(),
                severity: RemarkSeverity::Info,
                kind: RemarkKind::BelowTarget,
                message: format!(
                    "Low {} content ({actual:.1}) may not meet {} requirements (minimum: {target})",
                    nutrient.display_name(),
                    condition.name
                ),
                recommendation: Some(format!(
                    "Pair with foods rich in {} to help reach your target",
                    nutrient.display_name()
                )),
                nutrient: Some(nutrient),
                actual: Some(actual),
                limit: Some(target),
            });
        }

        if remarks.is_empty() {
            remarks.push(HealthRemark {
                condition: condition.name.clone(),
                severity: RemarkSeverity::Info,
                kind: RemarkKind::Compliant,
                message: format!("Good choice for {}", condition.name),
                recommendation: Some("Continue monitoring portion sizes".to_owned()),
                nutrient: None,
                actual: None,
                limit: None,
            });
        }

        Ok(remarks)
    }
}

fn check_threshold(
    condition: &HealthCondition,
    nutrient: Nutrient,
    value: f64,
) -> Result<(), EvaluationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EvaluationError::InvalidThreshold {
            condition: condition.name.clone(),
            nutrient,
        })
    }
}

fn avoid_ingredient_remark(condition: &HealthCondition, haystack: &str) -> Option<HealthRemark> {
    let matched: Vec<&str> = condition
        .dietary_restrictions
        .avoid_ingredients
        .iter()
        .map(String::as_str)
        .filter(|ingredient| haystack.contains(ingredient))
        .collect();
    let first = matched.first()?;

    let mut message = format!(
        "Contains {} which should be avoided with {}",
        matched.join(", "),
        condition.name
    );
    if let Some(template) = &condition.warning_template {
        message.push_str(". ");
        message.push_str(&template.replace("{nutrient}", first));
    }
    let recommendation = condition
        .recommendation_template
        .clone()
        .unwrap_or_else(|| format!("Choose an alternative without {first}"));

    Some(HealthRemark {
        condition: condition.name.clone(),
        severity: RemarkSeverity::Danger,
        kind: RemarkKind::AvoidIngredient,
        message,
        recommendation: Some(recommendation),
        nutrient: None,
        actual: None,
        limit: None,
    })
}

fn limit_recommendation(condition: &HealthCondition, nutrient: Nutrient) -> String {
    let specific = match nutrient {
        Nutrient::SugarG | Nutrient::AddedSugarG => Some("Choose foods with less added sugar"),
        Nutrient::CarbohydratesG => Some("Consider portion control for carbohydrates"),
        Nutrient::SodiumMg => Some("Look for low-sodium alternatives"),
        Nutrient::SaturatedFatG | Nutrient::TransFatG => {
            Some("Choose lean proteins and healthy fats")
        }
        _ => None,
    };
    specific.map_or_else(
        || {
            condition
                .recommendation_template
                .clone()
                .unwrap_or_else(|| DEFAULT_RECOMMENDATION.to_owned())
        },
        str::to_owned,
    )
}
