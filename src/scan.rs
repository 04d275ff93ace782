// ABOUTME: Scan orchestrator sequencing nutrition resolution and health evaluation per request
// ABOUTME: Degrades to nutrition-only results when health evaluation fails
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Scan Orchestrator
//!
//! Single entry point of the engine. A scan fails only when the reference,
//! the serving size or the resolution fails. A health evaluation error never
//! fails a scan: the result keeps its nutrition data, carries no remarks,
//! takes the baseline score and sets `evaluation_degraded`.

use crate::config::ScannerConfig;
use crate::database::SharedFoodStore;
use crate::logging::ScanLogger;
use crate::resolver::NutritionResolver;
use chrono::{DateTime, Utc};
use nutriscan_core::errors::ScanError;
use nutriscan_core::models::{
    FoodReference, HealthCondition, HealthRemark, NutriScore, NutritionProfile,
};
use nutriscan_core::models::{ReferenceKind, ReferenceSummary};
use nutriscan_core::ServingSize;
use nutriscan_health::{
    ConditionCatalog, ConditionDefinition, ConditionScore, HealthRuleEngine, ScoreBasis,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant as StdInstant;
use tokio::time::Instant;
use uuid::Uuid;

/// Outcome of one scan. Built only by [`ScanOrchestrator`].
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    scan_id: Uuid,
    reference: ReferenceSummary,
    food_name: String,
    nutrition: NutritionProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    nutri_score: Option<NutriScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    glycemic_load_index: Option<f64>,
    health_remarks: Vec<HealthRemark>,
    overall_health_score: f64,
    score_basis: ScoreBasis,
    evaluated_conditions: Vec<String>,
    condition_scores: Vec<ConditionScore>,
    evaluation_degraded: bool,
    scanned_at: DateTime<Utc>,
    processing_time_ms: u64,
}

impl ScanResult {
    /// Scan id
    #[must_use]
    pub const fn scan_id(&self) -> Uuid {
        self.scan_id
    }

    /// What was scanned
    #[must_use]
    pub const fn reference(&self) -> &ReferenceSummary {
        &self.reference
    }

    /// Reference kind
    #[must_use]
    pub const fn kind(&self) -> ReferenceKind {
        self.reference.kind
    }

    /// Resolved food name
    #[must_use]
    pub fn food_name(&self) -> &str {
        &self.food_name
    }

    /// Resolved nutrition
    #[must_use]
    pub const fn nutrition(&self) -> &NutritionProfile {
        &self.nutrition
    }

    /// Nutri-Score grade reported by the source, if any
    #[must_use]
    pub const fn nutri_score(&self) -> Option<NutriScore> {
        self.nutri_score
    }

    /// Glycemic load index reported by the source, if any
    #[must_use]
    pub const fn glycemic_load_index(&self) -> Option<f64> {
        self.glycemic_load_index
    }

    /// Remarks in condition order
    #[must_use]
    pub fn health_remarks(&self) -> &[HealthRemark] {
        &self.health_remarks
    }

    /// Score in `[0, 10]`
    #[must_use]
    pub const fn overall_health_score(&self) -> f64 {
        self.overall_health_score
    }

    /// How the score was obtained
    #[must_use]
    pub const fn score_basis(&self) -> ScoreBasis {
        self.score_basis
    }

    /// Conditions that were found in the catalog and evaluated
    #[must_use]
    pub fn evaluated_conditions(&self) -> &[String] {
        &self.evaluated_conditions
    }

    /// Score of each evaluated condition on its own
    #[must_use]
    pub fn condition_scores(&self) -> &[ConditionScore] {
        &self.condition_scores
    }

    /// Health evaluation failed and was skipped
    #[must_use]
    pub const fn evaluation_degraded(&self) -> bool {
        self.evaluation_degraded
    }

    /// When the scan finished
    #[must_use]
    pub const fn scanned_at(&self) -> DateTime<Utc> {
        self.scanned_at
    }

    /// Wall time spent on the scan
    #[must_use]
    pub const fn processing_time_ms(&self) -> u64 {
        self.processing_time_ms
    }
}

struct Evaluation {
    remarks: Vec<HealthRemark>,
    score: f64,
    basis: ScoreBasis,
    conditions: Vec<String>,
    condition_scores: Vec<ConditionScore>,
    degraded: bool,
}

fn elapsed_ms(started: StdInstant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Resolver plus rule engine
pub struct ScanOrchestrator {
    resolver: NutritionResolver,
    engine: HealthRuleEngine,
}

impl ScanOrchestrator {
    /// Combine a resolver and an engine
    #[must_use]
    pub const fn new(resolver: NutritionResolver, engine: HealthRuleEngine) -> Self {
        Self { resolver, engine }
    }

    /// Standard wiring over the global condition catalog
    #[must_use]
    pub fn from_config(config: &ScannerConfig, store: SharedFoodStore) -> Self {
        Self::with_catalog(config, store, ConditionCatalog::global())
    }

    /// Standard wiring over a given catalog
    #[must_use]
    pub fn with_catalog(
        config: &ScannerConfig,
        store: SharedFoodStore,
        catalog: Arc<ConditionCatalog>,
    ) -> Self {
        Self::new(
            NutritionResolver::from_config(config, store),
            HealthRuleEngine::new(catalog, config.scoring.clone()),
        )
    }

    /// Resolver in use
    #[must_use]
    pub const fn resolver(&self) -> &NutritionResolver {
        &self.resolver
    }

    /// Rule engine in use
    #[must_use]
    pub const fn engine(&self) -> &HealthRuleEngine {
        &self.engine
    }

    /// Scan a food for the given conditions and serving size
    ///
    /// # Errors
    ///
    /// - [`ScanError::MalformedReference`] for an invalid reference
    /// - [`ScanError::InvalidServingSize`] for an unusable serving size
    /// - [`ScanError::UnresolvedFood`] when no source knows the food
    pub async fn scan<S: AsRef<str>>(
        &self,
        reference: &FoodReference,
        condition_names: &[S],
        serving_size: &str,
    ) -> Result<ScanResult, ScanError> {
        self.run(reference, condition_names, serving_size, None).await
    }

    /// [`Self::scan`] with every source call bounded by `deadline`
    ///
    /// # Errors
    ///
    /// Same as [`Self::scan`].
    pub async fn scan_with_deadline<S: AsRef<str>>(
        &self,
        reference: &FoodReference,
        condition_names: &[S],
        serving_size: &str,
        deadline: Instant,
    ) -> Result<ScanResult, ScanError> {
        self.run(reference, condition_names, serving_size, Some(deadline))
            .await
    }

    async fn run<S: AsRef<str>>(
        &self,
        reference: &FoodReference,
        condition_names: &[S],
        serving_size: &str,
        deadline: Option<Instant>,
    ) -> Result<ScanResult, ScanError> {
        let started = StdInstant::now();
        let scan_id = Uuid::new_v4();
        let scan_key = scan_id.to_string();
        ScanLogger::log_scan_started(&scan_key, reference.kind(), condition_names.len());

        let outcome = self
            .resolve_and_evaluate(&scan_key, reference, condition_names, serving_size, deadline)
            .await;
        let processing_time_ms = elapsed_ms(started);

        match outcome {
            Ok((nutrition, evaluation)) => {
                ScanLogger::log_scan_completed(
                    &scan_key,
                    nutrition.food_name(),
                    nutrition.source(),
                    nutrition.confidence(),
                    evaluation.score,
                    processing_time_ms,
                );
                let rating = nutrition.rating();
                Ok(ScanResult {
                    scan_id,
                    reference: reference.summary(),
                    food_name: nutrition.food_name().to_owned(),
                    nutri_score: rating.nutri_score,
                    glycemic_load_index: rating.glycemic_load_index,
                    nutrition,
                    health_remarks: evaluation.remarks,
                    overall_health_score: evaluation.score,
                    score_basis: evaluation.basis,
                    evaluated_conditions: evaluation.conditions,
                    condition_scores: evaluation.condition_scores,
                    evaluation_degraded: evaluation.degraded,
                    scanned_at: Utc::now(),
                    processing_time_ms,
                })
            }
            Err(e) => {
                ScanLogger::log_scan_failed(&scan_key, &e.to_string(), processing_time_ms);
                Err(e)
            }
        }
    }

    async fn resolve_and_evaluate<S: AsRef<str>>(
        &self,
        scan_key: &str,
        reference: &FoodReference,
        condition_names: &[S],
        serving_size: &str,
        deadline: Option<Instant>,
    ) -> Result<(NutritionProfile, Evaluation), ScanError> {
        reference.validate()?;
        let serving = ServingSize::parse(serving_size)?;
        let resolution = self
            .resolver
            .resolve_detailed(reference, &serving, deadline)
            .await?;
        let nutrition = resolution.profile;

        let evaluation = match self.engine.evaluate(&nutrition, condition_names) {
            Ok(assessment) => Evaluation {
                score: assessment.overall_score(),
                basis: assessment.basis(),
                conditions: assessment.evaluated_conditions().to_vec(),
                condition_scores: assessment.condition_scores().to_vec(),
                remarks: assessment.into_parts().0,
                degraded: false,
            },
            Err(e) => {
                ScanLogger::log_evaluation_degraded(scan_key, &e.to_string());
                let baseline = self.engine.baseline(&nutrition);
                Evaluation {
                    remarks: Vec::new(),
                    score: baseline.overall_score(),
                    basis: baseline.basis(),
                    conditions: Vec::new(),
                    condition_scores: Vec::new(),
                    degraded: true,
                }
            }
        };
        Ok((nutrition, evaluation))
    }

    /// Validate and add a user-defined condition
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::DuplicateCondition`] or
    /// [`ScanError::InvalidCondition`].
    pub fn add_condition(
        &self,
        definition: ConditionDefinition,
    ) -> Result<Arc<HealthCondition>, ScanError> {
        self.engine.catalog().add_condition(definition)
    }

    /// All conditions, built-in and user-defined
    #[must_use]
    pub fn list_conditions(&self) -> Vec<Arc<HealthCondition>> {
        self.engine.catalog().list_conditions()
    }
}
