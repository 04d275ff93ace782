// ABOUTME: Shared test utilities and fixtures for nutriscan integration tests
// ABOUTME: Provides scripted nutrition sources, a mock LLM provider and profile builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(missing_docs)]
//! Shared test utilities for `nutriscan`

use async_trait::async_trait;
use nutriscan::config::{ResolverConfig, ScannerConfig};
use nutriscan::errors::AppError;
use nutriscan::llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider};
use nutriscan::sources::{NutritionSource, SourceCapabilities};
use nutriscan_core::errors::ProviderError;
use nutriscan_core::models::{
    FoodIdentity, FoodReference, NutrientValues, NutritionCandidate, NutritionProfile, SourceKind,
};
use nutriscan_core::ServingSize;
use std::collections::VecDeque;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;
use tokio::time::sleep;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

// ============================================================================
// Fixtures
// ============================================================================

/// Per-100g values for a raw apple
pub fn apple_values() -> NutrientValues {
    NutrientValues {
        calories: 52.0,
        protein_g: 0.3,
        carbohydrates_g: 14.0,
        fat_g: 0.2,
        fiber_g: Some(2.4),
        sugar_g: Some(10.4),
        sodium_mg: Some(1.0),
        ..NutrientValues::default()
    }
}

/// Candidate with per-100g values from the given source
pub fn candidate(name: &str, values: NutrientValues, source: SourceKind) -> NutritionCandidate {
    NutritionCandidate::per_100g(FoodIdentity::named(name), values, 0.9, source)
}

/// Profile for a 100 g serving
pub fn profile_100g(name: &str, values: NutrientValues) -> NutritionProfile {
    NutritionProfile::normalize(
        &candidate(name, values, SourceKind::Database),
        &ServingSize::default(),
    )
    .unwrap()
}

/// 100 g profile with only the given sodium content set
pub fn sodium_profile(sodium_mg: f64) -> NutritionProfile {
    profile_100g(
        "Salted Broth",
        NutrientValues {
            calories: 20.0,
            sodium_mg: Some(sodium_mg),
            ..NutrientValues::default()
        },
    )
}

pub fn by_name(name: &str) -> FoodReference {
    FoodReference::ByName(name.to_owned())
}

/// Scanner configuration with no external services and short timeouts
pub fn offline_config() -> ScannerConfig {
    let mut config = ScannerConfig::default();
    config.external_db.enabled = false;
    config.usda.api_key = None;
    config.ai.api_key = None;
    config.resolver = ResolverConfig {
        adapter_timeout_ms: 200,
        ..ResolverConfig::default()
    };
    config
}

// ============================================================================
// Scripted Nutrition Source
// ============================================================================

/// What a scripted source does when asked
#[derive(Clone)]
pub enum Script {
    /// Return "not found"
    NotFound,
    /// Return this candidate
    Found(NutritionCandidate),
    /// Fail with a provider error
    Fail,
    /// Never answer within any reasonable timeout
    Hang,
}

/// Source whose behavior is fixed by the test
pub struct ScriptedSource {
    name: &'static str,
    kind: SourceKind,
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub const fn new(name: &'static str, kind: SourceKind, script: Script) -> Self {
        Self {
            name,
            kind,
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NutritionSource for ScriptedSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::all()
    }

    async fn resolve(
        &self,
        _reference: &FoodReference,
    ) -> Result<Option<NutritionCandidate>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::NotFound => Ok(None),
            Script::Found(candidate) => Ok(Some(candidate.clone())),
            Script::Fail => Err(ProviderError::new(self.name, "connection reset")),
            Script::Hang => {
                sleep(Duration::from_secs(30)).await;
                Ok(None)
            }
        }
    }
}

// ============================================================================
// Mock LLM Provider
// ============================================================================

/// LLM provider replaying canned replies in order; errors once they run out
pub struct MockLlmProvider {
    replies: Mutex<VecDeque<String>>,
    capabilities: LlmCapabilities,
    calls: AtomicUsize,
    delay: Duration,
}

impl MockLlmProvider {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| (*r).to_owned()).collect()),
            capabilities: LlmCapabilities::full_featured(),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    /// Wait this long before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn text_only(replies: &[&str]) -> Self {
        Self {
            capabilities: LlmCapabilities::text_only(),
            ..Self::new(replies)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        let reply = self.replies.lock().unwrap().pop_front();
        reply
            .map(|content| ChatResponse {
                content,
                model: request
                    .model
                    .clone()
                    .unwrap_or_else(|| "mock-model".to_owned()),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            })
            .ok_or_else(|| AppError::external_service("mock", "no scripted reply left"))
    }
}

/// Realistic estimation reply for a named food
pub fn estimate_reply(food_name: &str, calories: f64, confidence: f64) -> String {
    format!(
        r#"```json
{{
  "food_name": "{food_name}",
  "calories": {calories},
  "protein_g": 1.2,
  "carbohydrates_g": 13.0,
  "fat_g": 0.4,
  "fiber_g": 3.0,
  "sugar_g": 8.0,
  "sodium_mg": 2,
  "vitamin_c_mg": 20.5,
  "category": "fruit",
  "ingredients": ["{food_name}"],
  "confidence": {confidence}
}}
```"#
    )
}
