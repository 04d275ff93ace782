// ABOUTME: Integration tests for ranked nutrition resolution
// ABOUTME: Covers source priority, fallback on errors and timeouts, serving scaling and learning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    apple_values, by_name, candidate, estimate_reply, init_test_logging, offline_config,
    MockLlmProvider, Script, ScriptedSource,
};
use nutriscan::config::{AiConfig, ResolverConfig, SourceConfidenceConfig};
use nutriscan::database::{FoodStore, InMemoryFoodStore, SharedFoodStore};
use nutriscan::resolver::NutritionResolver;
use nutriscan::sources::{AiEstimator, LocalDatabaseSource, SharedSource, UNIDENTIFIED_FOOD};
use nutriscan_core::errors::ScanError;
use nutriscan_core::models::{FoodReference, ImageInput, NutrientValues, SourceKind};
use nutriscan_core::ServingSize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn fast_config() -> ResolverConfig {
    ResolverConfig {
        adapter_timeout_ms: 100,
        ..ResolverConfig::default()
    }
}

fn scripted(name: &'static str, kind: SourceKind, script: Script) -> Arc<ScriptedSource> {
    Arc::new(ScriptedSource::new(name, kind, script))
}

fn found(name: &str, calories: f64, kind: SourceKind) -> Script {
    Script::Found(candidate(
        name,
        NutrientValues {
            calories,
            ..NutrientValues::default()
        },
        kind,
    ))
}

fn hundred_grams() -> ServingSize {
    ServingSize::parse("100g").unwrap()
}

#[tokio::test]
async fn test_first_source_with_answer_wins() {
    init_test_logging();
    let primary = scripted(
        "primary",
        SourceKind::Database,
        found("Apple", 52.0, SourceKind::Database),
    );
    let secondary = scripted(
        "secondary",
        SourceKind::ExternalDb,
        found("Apple (external)", 60.0, SourceKind::ExternalDb),
    );
    let resolver = NutritionResolver::new(fast_config())
        .with_source(primary.clone())
        .with_source(secondary.clone());

    let resolution = resolver
        .resolve_detailed(&by_name("apple"), &hundred_grams(), None)
        .await
        .unwrap();

    assert_eq!(resolution.source_name, "primary");
    assert_eq!(resolution.profile.food_name(), "Apple");
    assert_eq!(resolution.profile.source(), SourceKind::Database);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 0);
    assert_eq!(resolver.source_names(), vec!["primary", "secondary"]);
}

#[tokio::test]
async fn test_not_found_error_and_timeout_fall_through() {
    init_test_logging();
    let missing = scripted("missing", SourceKind::Database, Script::NotFound);
    let broken = scripted("broken", SourceKind::ExternalDb, Script::Fail);
    let stuck = scripted("stuck", SourceKind::ExternalDb, Script::Hang);
    let estimator = scripted(
        "estimator",
        SourceKind::AiEstimate,
        found("Jackfruit", 95.0, SourceKind::AiEstimate),
    );
    let resolver = NutritionResolver::new(fast_config())
        .with_source(missing.clone())
        .with_source(broken.clone())
        .with_source(stuck.clone())
        .with_source(estimator.clone());

    let started = Instant::now();
    let profile = resolver
        .resolve(&by_name("jackfruit"), &hundred_grams())
        .await
        .unwrap();

    assert_eq!(profile.food_name(), "Jackfruit");
    assert_eq!(profile.source(), SourceKind::AiEstimate);
    assert_eq!(missing.calls(), 1);
    assert_eq!(broken.calls(), 1);
    assert_eq!(stuck.calls(), 1);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_every_source_empty_is_unresolved() {
    let resolver = NutritionResolver::new(fast_config())
        .with_source(scripted("a", SourceKind::Database, Script::NotFound))
        .with_source(scripted("b", SourceKind::ExternalDb, Script::Fail));

    let err = resolver
        .resolve(&by_name("unobtainium"), &hundred_grams())
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::UnresolvedFood { .. }));
    assert!(err.to_string().contains("unobtainium"));
}

#[tokio::test]
async fn test_disabled_ai_fallback_skips_estimator() {
    let estimator = scripted(
        "estimator",
        SourceKind::AiEstimate,
        found("Guess", 100.0, SourceKind::AiEstimate),
    );
    let resolver = NutritionResolver::new(ResolverConfig {
        ai_fallback_enabled: false,
        ..fast_config()
    })
    .with_source(scripted("local", SourceKind::Database, Script::NotFound))
    .with_source(estimator.clone());

    let err = resolver
        .resolve(&by_name("mystery stew"), &hundred_grams())
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::UnresolvedFood { .. }));
    assert_eq!(estimator.calls(), 0);
}

#[tokio::test]
async fn test_malformed_reference_rejected_before_sources() {
    let source = scripted("local", SourceKind::Database, Script::NotFound);
    let resolver = NutritionResolver::new(fast_config()).with_source(source.clone());

    let err = resolver
        .resolve(&FoodReference::ByBarcode("12ab".to_owned()), &hundred_grams())
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::MalformedReference { .. }));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_serving_scales_linearly() {
    let resolver = NutritionResolver::new(fast_config()).with_source(scripted(
        "local",
        SourceKind::Database,
        Script::Found(candidate("Apple", apple_values(), SourceKind::Database)),
    ));

    let single = resolver
        .resolve(&by_name("apple"), &hundred_grams())
        .await
        .unwrap();
    let double = resolver
        .resolve(&by_name("apple"), &ServingSize::parse("200g").unwrap())
        .await
        .unwrap();

    assert!((double.per_serving().calories - 2.0 * single.per_serving().calories).abs() < 1e-9);
    assert!((double.per_serving().protein_g - 2.0 * single.per_serving().protein_g).abs() < 1e-9);
    assert_eq!(double.per_100g(), single.per_100g());
    assert_eq!(double.serving_size().description(), "200g");
}

#[tokio::test]
async fn test_expired_deadline_stops_the_chain() {
    let stuck = scripted("stuck", SourceKind::Database, Script::Hang);
    let backup = scripted(
        "backup",
        SourceKind::ExternalDb,
        found("Apple", 52.0, SourceKind::ExternalDb),
    );
    let resolver = NutritionResolver::new(ResolverConfig {
        adapter_timeout_ms: 10_000,
        ..ResolverConfig::default()
    })
    .with_source(stuck.clone())
    .with_source(backup.clone());

    let started = Instant::now();
    let err = resolver
        .resolve_with_deadline(
            &by_name("apple"),
            &hundred_grams(),
            Instant::now() + Duration::from_millis(100),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::UnresolvedFood { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(backup.calls(), 0);
}

#[tokio::test]
async fn test_local_store_beats_ai_estimator() {
    let store: SharedFoodStore = Arc::new(InMemoryFoodStore::seeded(0.95));
    let config = offline_config();
    let resolver = NutritionResolver::from_config(&config, store);

    assert_eq!(
        resolver.source_names(),
        vec!["local database", "AI estimator"]
    );

    let resolution = resolver
        .resolve_detailed(&by_name("Apple"), &hundred_grams(), None)
        .await
        .unwrap();
    assert_eq!(resolution.source_name, "local database");
    assert_eq!(resolution.profile.source(), SourceKind::Database);
    assert!((resolution.profile.confidence() - 0.95).abs() < 1e-9);
    assert!(resolution.learning.is_none());
}

#[tokio::test]
async fn test_ai_estimate_is_learned_then_served_locally() {
    init_test_logging();
    let store = Arc::new(InMemoryFoodStore::seeded(0.95));
    let shared: SharedFoodStore = store.clone();
    let reply = estimate_reply("Dragonfruit", 60.0, 0.75);
    let provider = Arc::new(MockLlmProvider::new(&[reply.as_str()]));
    let confidence = SourceConfidenceConfig::default();
    let estimator = AiEstimator::new(Some(provider.clone()), AiConfig::default(), &confidence);

    let resolver = NutritionResolver::new(fast_config())
        .with_source(Arc::new(LocalDatabaseSource::new(
            Arc::clone(&shared),
            &confidence,
        )))
        .with_source(Arc::new(estimator))
        .with_learning_store(shared);

    let first = resolver
        .resolve_detailed(&by_name("dragonfruit"), &hundred_grams(), None)
        .await
        .unwrap();
    assert_eq!(first.source_name, "AI estimator");
    assert!(!first.is_fallback);
    assert!((first.profile.confidence() - 0.6).abs() < 1e-9);
    first.learning.unwrap().await.unwrap();

    let learned = store.find_by_name("Dragonfruit").await.unwrap().unwrap();
    assert!(learned.learned);
    assert!((learned.confidence - 0.5).abs() < 1e-9);
    assert!((learned.per_100g.calories - 60.0).abs() < 1e-9);
    assert_eq!(store.count().await.unwrap(), 7);

    let second = resolver
        .resolve_detailed(&by_name("dragonfruit"), &hundred_grams(), None)
        .await
        .unwrap();
    assert_eq!(second.source_name, "local database");
    assert!(second.learning.is_none());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_fallback_estimates_are_not_learned() {
    let store = Arc::new(InMemoryFoodStore::new());
    let shared: SharedFoodStore = store.clone();
    let estimator = AiEstimator::new(
        Some(Arc::new(MockLlmProvider::new(&["no idea, sorry"]))),
        AiConfig::default(),
        &SourceConfidenceConfig::default(),
    );
    let resolver = NutritionResolver::new(fast_config())
        .with_source(Arc::new(estimator))
        .with_learning_store(shared);

    let resolution = resolver
        .resolve_detailed(&by_name("mystery casserole"), &hundred_grams(), None)
        .await
        .unwrap();

    assert!(resolution.is_fallback);
    assert!(resolution.learning.is_none());
    assert!((resolution.profile.per_serving().calories - 200.0).abs() < 1e-9);
    assert!((resolution.profile.confidence() - 0.3).abs() < 1e-9);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_learning_disabled_writes_nothing() {
    let store = Arc::new(InMemoryFoodStore::new());
    let shared: SharedFoodStore = store.clone();
    let reply = estimate_reply("Kiwano", 44.0, 0.7);
    let estimator = AiEstimator::new(
        Some(Arc::new(MockLlmProvider::new(&[reply.as_str()]))),
        AiConfig::default(),
        &SourceConfidenceConfig::default(),
    );
    let resolver = NutritionResolver::new(ResolverConfig {
        learning_enabled: false,
        ..fast_config()
    })
    .with_source(Arc::new(estimator))
    .with_learning_store(shared);

    let resolution = resolver
        .resolve_detailed(&by_name("kiwano"), &hundred_grams(), None)
        .await
        .unwrap();
    assert!(!resolution.is_fallback);
    assert!(resolution.learning.is_none());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_image_is_identified_then_estimated() {
    let identification = r#"{"food_name": "Margherita Pizza", "confidence": 0.55,
        "category": "fast food", "ingredients": ["dough", "tomato", "mozzarella"]}"#;
    let estimate = estimate_reply("Margherita Pizza", 266.0, 0.8);
    let provider = Arc::new(MockLlmProvider::new(&[identification, estimate.as_str()]));
    let estimator = AiEstimator::new(
        Some(provider.clone()),
        AiConfig {
            recognition_threshold: 0.5,
            ..AiConfig::default()
        },
        &SourceConfidenceConfig::default(),
    );
    let resolver = NutritionResolver::new(fast_config()).with_source(Arc::new(estimator));

    let image = FoodReference::ByImage(
        ImageInput::jpeg(vec![0xFF, 0xD8, 0xFF]).with_context("lunch"),
    );
    let profile = resolver.resolve(&image, &hundred_grams()).await.unwrap();

    assert_eq!(profile.food_name(), "Margherita Pizza");
    assert!((profile.per_serving().calories - 266.0).abs() < 1e-9);
    // recognition confidence caps the estimate
    assert!((profile.confidence() - 0.55).abs() < 1e-9);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_text_only_provider_cannot_identify_images() {
    let provider = Arc::new(MockLlmProvider::text_only(&[]));
    let estimator = AiEstimator::new(
        Some(provider.clone()),
        AiConfig::default(),
        &SourceConfidenceConfig::default(),
    );

    let resolver = NutritionResolver::new(fast_config()).with_source(Arc::new(estimator));
    let profile = resolver
        .resolve(
            &FoodReference::ByImage(ImageInput::jpeg(vec![1, 2, 3])),
            &hundred_grams(),
        )
        .await
        .unwrap();

    assert_eq!(profile.food_name(), "Unidentified Food Item");
    assert_eq!(provider.calls(), 0);
}

fn photo() -> FoodReference {
    FoodReference::ByImage(ImageInput::jpeg(vec![0xFF, 0xD8, 0xFF]))
}

fn identified(name: &str, confidence: f64) -> String {
    format!(r#"{{"food_name": "{name}", "confidence": {confidence}}}"#)
}

#[tokio::test]
async fn test_photo_gets_time_for_both_llm_calls() {
    init_test_logging();
    let identification = identified("Ramen", 0.9);
    let estimate = estimate_reply("Ramen", 436.0, 0.7);
    let provider = Arc::new(
        MockLlmProvider::new(&[identification.as_str(), estimate.as_str()])
            .with_delay(Duration::from_millis(700)),
    );
    let estimator = AiEstimator::new(
        Some(provider.clone()),
        AiConfig {
            timeout_secs: 1,
            ..AiConfig::default()
        },
        &SourceConfidenceConfig::default(),
    );
    let resolver = NutritionResolver::new(fast_config()).with_estimator(estimator);

    let resolution = resolver
        .resolve_detailed(&photo(), &hundred_grams(), None)
        .await
        .unwrap();

    assert!(!resolution.is_fallback);
    assert_eq!(resolution.profile.food_name(), "Ramen");
    assert!((resolution.profile.per_serving().calories - 436.0).abs() < 1e-9);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_ai_timeout_yields_fallback_not_unresolved() {
    let provider = Arc::new(
        MockLlmProvider::new(&[r#"{"food_name": "Ramen", "confidence": 0.9}"#])
            .with_delay(Duration::from_secs(5)),
    );
    let estimator = AiEstimator::new(
        Some(provider),
        AiConfig::default(),
        &SourceConfidenceConfig::default(),
    );
    let resolver = NutritionResolver::new(fast_config())
        .with_source_timeout(Arc::new(estimator), Duration::from_millis(300));

    let started = Instant::now();
    let resolution = resolver
        .resolve_detailed(&photo(), &hundred_grams(), None)
        .await
        .unwrap();

    assert!(resolution.is_fallback);
    assert_eq!(resolution.source_name, "AI estimator");
    assert_eq!(resolution.profile.food_name(), UNIDENTIFIED_FOOD);
    assert!((resolution.profile.confidence() - 0.3).abs() < 1e-9);
    assert!(resolution.learning.is_none());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_expired_deadline_still_reaches_ai_fallback() {
    let stuck = scripted("stuck", SourceKind::Database, Script::Hang);
    let provider = Arc::new(MockLlmProvider::new(&[]));
    let estimator = AiEstimator::new(
        Some(provider.clone()),
        AiConfig::default(),
        &SourceConfidenceConfig::default(),
    );
    let resolver = NutritionResolver::new(ResolverConfig {
        adapter_timeout_ms: 10_000,
        ..ResolverConfig::default()
    })
    .with_source(stuck)
    .with_estimator(estimator);

    let resolution = resolver
        .resolve_detailed(
            &by_name("lamb tagine"),
            &hundred_grams(),
            Some(Instant::now() + Duration::from_millis(100)),
        )
        .await
        .unwrap();

    assert!(resolution.is_fallback);
    assert_eq!(resolution.source_name, "AI estimator");
    assert_eq!(resolution.profile.food_name(), "lamb tagine");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_identified_food_is_served_from_the_store() {
    let store = Arc::new(InMemoryFoodStore::seeded(0.95));
    let shared: SharedFoodStore = store.clone();
    let confidence = SourceConfidenceConfig::default();
    let local: SharedSource = Arc::new(LocalDatabaseSource::new(Arc::clone(&shared), &confidence));
    let identification = identified("Apple", 0.9);
    let provider = Arc::new(MockLlmProvider::new(&[identification.as_str()]));
    let estimator = AiEstimator::new(Some(provider.clone()), AiConfig::default(), &confidence)
        .with_lookup(Arc::clone(&local));
    let resolver = NutritionResolver::new(fast_config())
        .with_source(local)
        .with_estimator(estimator)
        .with_learning_store(shared);

    let resolution = resolver
        .resolve_detailed(&photo(), &hundred_grams(), None)
        .await
        .unwrap();

    assert_eq!(resolution.source_name, "AI estimator");
    assert_eq!(resolution.profile.food_name(), "Apple");
    assert_eq!(resolution.profile.source(), SourceKind::Database);
    assert!((resolution.profile.confidence() - 0.95).abs() < 1e-9);
    assert!(resolution.learning.is_none());
    assert_eq!(provider.calls(), 1);
    assert_eq!(store.count().await.unwrap(), 6);
}

#[tokio::test]
async fn test_uncertain_identification_uses_fallback() {
    let identification = identified("Apple", 0.4);
    let provider = Arc::new(MockLlmProvider::new(&[identification.as_str()]));
    let estimator = AiEstimator::new(
        Some(provider.clone()),
        AiConfig::default(),
        &SourceConfidenceConfig::default(),
    );
    let resolver = NutritionResolver::new(fast_config()).with_estimator(estimator);

    let resolution = resolver
        .resolve_detailed(&photo(), &hundred_grams(), None)
        .await
        .unwrap();

    assert!(resolution.is_fallback);
    assert_eq!(resolution.profile.food_name(), UNIDENTIFIED_FOOD);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_label_values_scale_from_printed_serving() {
    let store = Arc::new(InMemoryFoodStore::new());
    let shared: SharedFoodStore = store.clone();
    let label = r#"{"product_name": "Skyr Vanilla", "brand": "Nordic Dairy",
        "serving_size": "1 container (170 g)", "calories": 150, "protein_g": 17,
        "carbohydrates_g": 16, "fat_g": 0, "sugar_g": 12, "sodium_mg": 85,
        "ingredients": "skim milk, cane sugar, vanilla", "confidence": 0.9}"#;
    let provider = Arc::new(MockLlmProvider::new(&[label]));
    let estimator = AiEstimator::new(
        Some(provider.clone()),
        AiConfig::default(),
        &SourceConfidenceConfig::default(),
    );
    let resolver = NutritionResolver::new(fast_config())
        .with_estimator(estimator)
        .with_learning_store(shared);

    let reference = FoodReference::ByImage(ImageInput::jpeg(vec![0xFF, 0xD8]).as_label());
    let resolution = resolver
        .resolve_detailed(&reference, &ServingSize::parse("340g").unwrap(), None)
        .await
        .unwrap();

    let profile = &resolution.profile;
    assert!(!resolution.is_fallback);
    assert_eq!(profile.food_name(), "Skyr Vanilla");
    assert!((profile.per_serving().calories - 300.0).abs() < 1e-6);
    assert!((profile.per_100g().calories - 150.0 * 100.0 / 170.0).abs() < 1e-6);
    assert_eq!(provider.calls(), 1);

    resolution.learning.unwrap().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 1);
}
