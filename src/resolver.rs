// ABOUTME: Nutrition resolver walking ranked sources until one answers, then normalizing servings
// ABOUTME: Applies per-source timeouts and caller deadlines and learns AI estimates write-behind
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrition Resolver
//!
//! Sources are consulted strictly in the order they were added. The first
//! source that returns a candidate wins; "not found", provider errors and
//! timeouts all move on to the next source. Nothing is merged across sources.
//!
//! A source with a terminal fallback (the AI estimator) ends the chain: if it
//! fails, times out or is reached after the caller's deadline, its fallback
//! answer is used instead of reporting the food as unresolved.
//!
//! When the AI estimator wins with a real (non-fallback) estimate, the
//! normalized profile is written back to the local store on a detached task.

use crate::config::{ResolverConfig, ScannerConfig};
use crate::database::SharedFoodStore;
use crate::logging::ScanLogger;
use crate::sources::{AiEstimator, ExternalFoodSource, LocalDatabaseSource, SharedSource};
use nutriscan_core::errors::ScanError;
use nutriscan_core::models::{
    FoodReference, NutritionCandidate, NutritionProfile, ReferenceKind, SourceKind,
};
use nutriscan_core::ServingSize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};
use tracing::{debug, instrument};

/// Extra time granted to the AI source beyond its own budget
const AI_TIMEOUT_GRACE: Duration = Duration::from_secs(1);

struct RankedSource {
    source: SharedSource,
    timeout: Duration,
}

/// Outcome of one resolution
#[derive(Debug)]
pub struct Resolution {
    /// Normalized profile
    pub profile: NutritionProfile,
    /// Name of the source that answered
    pub source_name: &'static str,
    /// The AI estimator had to use generic fallback values
    pub is_fallback: bool,
    /// Learning task, when one was spawned
    pub learning: Option<JoinHandle<()>>,
}

/// Ranked fallback chain over nutrition sources
pub struct NutritionResolver {
    sources: Vec<RankedSource>,
    store: Option<SharedFoodStore>,
    config: ResolverConfig,
}

impl NutritionResolver {
    /// Resolver with no sources yet
    #[must_use]
    pub const fn new(config: ResolverConfig) -> Self {
        Self {
            sources: Vec::new(),
            store: None,
            config,
        }
    }

    /// Standard chain: local store, external databases, AI estimator.
    ///
    /// The estimator shares the database sources so that a food identified in
    /// a photo is served from them when they know it.
    #[must_use]
    pub fn from_config(config: &ScannerConfig, store: SharedFoodStore) -> Self {
        let local: SharedSource = Arc::new(LocalDatabaseSource::new(
            Arc::clone(&store),
            &config.confidence,
        ));
        let mut estimator = AiEstimator::from_config(config).with_lookup(Arc::clone(&local));
        let mut resolver = Self::new(config.resolver.clone())
            .with_source(local)
            .with_learning_store(store);

        let external = ExternalFoodSource::from_config(config);
        if external.is_configured() {
            let external: SharedSource = Arc::new(external);
            estimator = estimator.with_lookup(Arc::clone(&external));
            resolver = resolver.with_source(external);
        }
        resolver.with_estimator(estimator)
    }

    /// Append the AI estimator with a timeout covering its whole budget
    #[must_use]
    pub fn with_estimator(self, estimator: AiEstimator) -> Self {
        let ai_timeout = estimator.budget() + AI_TIMEOUT_GRACE;
        self.with_source_timeout(Arc::new(estimator), ai_timeout)
    }

    /// Append a source using the configured adapter timeout
    #[must_use]
    pub fn with_source(self, source: SharedSource) -> Self {
        let adapter_timeout = self.config.adapter_timeout();
        self.with_source_timeout(source, adapter_timeout)
    }

    /// Append a source with its own timeout
    #[must_use]
    pub fn with_source_timeout(mut self, source: SharedSource, timeout: Duration) -> Self {
        self.sources.push(RankedSource { source, timeout });
        self
    }

    /// Store that receives learned AI estimates
    #[must_use]
    pub fn with_learning_store(mut self, store: SharedFoodStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Source names in priority order
    #[must_use]
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|ranked| ranked.source.name()).collect()
    }

    /// Resolve a reference into a profile for `serving`.
    ///
    /// # Errors
    ///
    /// - [`ScanError::MalformedReference`] for an invalid reference
    /// - [`ScanError::UnresolvedFood`] when every source came up empty
    /// - [`ScanError::InvalidServingSize`] when normalization fails
    pub async fn resolve(
        &self,
        reference: &FoodReference,
        serving: &ServingSize,
    ) -> Result<NutritionProfile, ScanError> {
        self.resolve_detailed(reference, serving, None)
            .await
            .map(|resolution| resolution.profile)
    }

    /// Like [`Self::resolve`], with every source call bounded by `deadline`.
    ///
    /// Sources not reached before the deadline are skipped.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve`].
    pub async fn resolve_with_deadline(
        &self,
        reference: &FoodReference,
        serving: &ServingSize,
        deadline: Instant,
    ) -> Result<NutritionProfile, ScanError> {
        self.resolve_detailed(reference, serving, Some(deadline))
            .await
            .map(|resolution| resolution.profile)
    }

    /// Full resolution outcome, including the learning task handle
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve`].
    #[instrument(skip(self, reference, serving), fields(reference = %reference))]
    pub async fn resolve_detailed(
        &self,
        reference: &FoodReference,
        serving: &ServingSize,
        deadline: Option<Instant>,
    ) -> Result<Resolution, ScanError> {
        reference.validate()?;

        let (source, candidate) = self
            .first_candidate(reference, deadline)
            .await
            .ok_or_else(|| ScanError::unresolved(reference.to_string()))?;

        let profile = NutritionProfile::normalize(&candidate, serving)?;
        debug!(
            source = source.name(),
            food = %profile.food_name(),
            confidence = profile.confidence(),
            "Resolved nutrition"
        );

        let learning = self.learn(&candidate, &profile);
        Ok(Resolution {
            profile,
            source_name: source.name(),
            is_fallback: candidate.is_fallback,
            learning,
        })
    }

    fn is_eligible(&self, ranked: &RankedSource, kind: ReferenceKind) -> bool {
        let source = &ranked.source;
        if source.kind() == SourceKind::AiEstimate && !self.config.ai_fallback_enabled {
            debug!(source = source.name(), "AI fallback disabled, skipping");
            return false;
        }
        source.capabilities().supports(kind)
    }

    async fn first_candidate(
        &self,
        reference: &FoodReference,
        deadline: Option<Instant>,
    ) -> Option<(&SharedSource, NutritionCandidate)> {
        let kind = reference.kind();
        let eligible: Vec<&RankedSource> = self
            .sources
            .iter()
            .filter(|ranked| self.is_eligible(ranked, kind))
            .collect();

        for (position, ranked) in eligible.iter().copied().enumerate() {
            let source = &ranked.source;
            let budget = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        ScanLogger::log_source_fallback(source.name(), "deadline exceeded");
                        return eligible[position..].iter().copied().find_map(|later| {
                            later
                                .source
                                .terminal_fallback(reference)
                                .map(|candidate| (&later.source, candidate))
                        });
                    }
                    remaining.min(ranked.timeout)
                }
                None => ranked.timeout,
            };

            let failure = match timeout(budget, source.resolve(reference)).await {
                Ok(Ok(Some(candidate))) => return Some((source, candidate)),
                Ok(Ok(None)) => {
                    debug!(source = source.name(), "Not found, trying next source");
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("timed out after {}ms", budget.as_millis()),
            };
            ScanLogger::log_source_fallback(source.name(), &failure);
            if let Some(candidate) = source.terminal_fallback(reference) {
                return Some((source, candidate));
            }
        }
        None
    }

    fn learn(
        &self,
        candidate: &NutritionCandidate,
        profile: &NutritionProfile,
    ) -> Option<JoinHandle<()>> {
        if candidate.source != SourceKind::AiEstimate
            || candidate.is_fallback
            || !self.config.learning_enabled
        {
            return None;
        }
        let store = Arc::clone(self.store.as_ref()?);
        let profile = profile.clone();
        let confidence = self.config.learned_record_confidence;

        Some(tokio::spawn(async move {
            match store.save_learned_profile(&profile, confidence).await {
                Ok(Some(_)) => ScanLogger::log_learning(profile.food_name(), true, None),
                Ok(None) => debug!(food = %profile.food_name(), "Food already known, not learned"),
                Err(e) => {
                    ScanLogger::log_learning(profile.food_name(), false, Some(&e.to_string()));
                }
            }
        }))
    }
}
