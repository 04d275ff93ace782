// ABOUTME: Integration tests for health rule evaluation and the condition catalog
// ABOUTME: Covers severity grading, ingredient avoidance, scoring and user-defined conditions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{apple_values, init_test_logging, profile_100g, sodium_profile};
use nutriscan_core::errors::ScanError;
use nutriscan_core::models::{
    FoodIdentity, Nutrient, NutrientValues, NutritionCandidate, NutritionProfile, RemarkKind,
    RemarkSeverity, SourceKind,
};
use nutriscan_core::ServingSize;
use nutriscan_health::baseline::baseline_score;
use nutriscan_health::{
    ConditionCatalog, ConditionDefinition, EvaluationError, HealthRuleEngine, ScoreBasis,
    ScoringConfig,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn low_sodium_engine() -> HealthRuleEngine {
    let catalog = Arc::new(ConditionCatalog::empty());
    catalog
        .add_condition(ConditionDefinition {
            name: "Low Sodium".to_owned(),
            description: "Sodium restricted diet".to_owned(),
            dietary_restrictions: object(json!({ "max_sodium_mg": 1500 })),
            ..ConditionDefinition::default()
        })
        .unwrap();
    HealthRuleEngine::new(catalog, ScoringConfig::default())
}

fn builtin_engine() -> HealthRuleEngine {
    HealthRuleEngine::new(
        Arc::new(ConditionCatalog::with_builtins()),
        ScoringConfig::default(),
    )
}

#[test]
fn test_sodium_far_over_limit_is_danger() {
    init_test_logging();
    let engine = low_sodium_engine();

    let assessment = engine
        .evaluate(&sodium_profile(2300.0), &["Low Sodium"])
        .unwrap();

    assert_eq!(assessment.remarks().len(), 1);
    let remark = &assessment.remarks()[0];
    assert_eq!(remark.severity, RemarkSeverity::Danger);
    assert_eq!(remark.kind, RemarkKind::ExceedsLimit);
    assert_eq!(remark.nutrient, Some(Nutrient::SodiumMg));
    assert_eq!(remark.limit, Some(1500.0));
    assert!(remark.message.contains("sodium"));
    // 10 - 3 for the danger, capped at the baseline (7 - 1 for sodium)
    assert!((assessment.overall_score() - 6.0).abs() < 1e-9);
    assert_eq!(assessment.basis(), ScoreBasis::Conditions);
}

#[test]
fn test_sodium_slightly_over_limit_is_warning() {
    let engine = low_sodium_engine();

    let assessment = engine
        .evaluate(&sodium_profile(1800.0), &["low sodium"])
        .unwrap();

    assert_eq!(assessment.remarks().len(), 1);
    assert_eq!(assessment.remarks()[0].severity, RemarkSeverity::Warning);
    assert!((assessment.overall_score() - 6.0).abs() < 1e-9);
    assert_eq!(assessment.condition_scores().len(), 1);
    assert!((assessment.condition_scores()[0].score - 9.0).abs() < 1e-9);
}

#[test]
fn test_compliant_food_gets_single_positive_remark() {
    let engine = low_sodium_engine();

    let assessment = engine
        .evaluate(&sodium_profile(400.0), &["Low Sodium"])
        .unwrap();

    assert_eq!(assessment.remarks().len(), 1);
    let remark = &assessment.remarks()[0];
    assert_eq!(remark.kind, RemarkKind::Compliant);
    assert_eq!(remark.severity, RemarkSeverity::Info);
    assert!((assessment.overall_score() - 10.0).abs() < 1e-9);
}

#[test]
fn test_score_never_increases_with_more_sodium() {
    let engine = low_sodium_engine();
    let scores: Vec<f64> = [100.0, 1500.0, 1800.0, 2250.0, 2300.0, 9000.0]
        .iter()
        .map(|sodium| {
            engine
                .evaluate(&sodium_profile(*sodium), &["Low Sodium"])
                .unwrap()
                .overall_score()
        })
        .collect();

    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1], "scores not monotonic: {scores:?}");
    }
}

#[test]
fn test_naming_more_violated_conditions_never_raises_the_score() {
    let catalog = Arc::new(ConditionCatalog::empty());
    for (name, limit) in [("Sodium A", 2000), ("Sodium B", 1500), ("Sodium C", 1000)] {
        catalog
            .add_condition(ConditionDefinition {
                name: name.to_owned(),
                dietary_restrictions: object(json!({ "max_sodium_mg": limit })),
                ..ConditionDefinition::default()
            })
            .unwrap();
    }
    let engine = HealthRuleEngine::new(catalog, ScoringConfig::default());
    let profile = sodium_profile(2300.0);
    let baseline = engine.baseline(&profile).overall_score();

    let requests: [&[&str]; 4] = [
        &[],
        &["Sodium A"],
        &["Sodium A", "Sodium B"],
        &["Sodium A", "Sodium B", "Sodium C"],
    ];
    let scores: Vec<f64> = requests
        .iter()
        .map(|names| engine.evaluate(&profile, *names).unwrap().overall_score())
        .collect();

    assert!((scores[0] - baseline).abs() < 1e-9);
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1], "scores rose with more conditions: {scores:?}");
    }
    assert!(scores[1] <= baseline);
}

#[test]
fn test_condition_scores_are_reported_per_condition() {
    let catalog = Arc::new(ConditionCatalog::empty());
    for (name, limit) in [("Relaxed", 5000), ("Strict", 1500)] {
        catalog
            .add_condition(ConditionDefinition {
                name: name.to_owned(),
                dietary_restrictions: object(json!({ "max_sodium_mg": limit })),
                ..ConditionDefinition::default()
            })
            .unwrap();
    }
    let engine = HealthRuleEngine::new(catalog, ScoringConfig::default());

    let assessment = engine
        .evaluate(&sodium_profile(2300.0), &["Relaxed", "Strict"])
        .unwrap();

    let scores = assessment.condition_scores();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].condition, "Relaxed");
    assert!((scores[0].score - 10.0).abs() < 1e-9);
    assert_eq!(scores[1].condition, "Strict");
    assert!((scores[1].score - 7.0).abs() < 1e-9);
    assert!((assessment.overall_score() - 6.0).abs() < 1e-9);

    let baseline = engine.baseline(&sodium_profile(2300.0));
    assert!(baseline.condition_scores().is_empty());
}

#[test]
fn test_limits_compare_per_serving_amounts() {
    let engine = low_sodium_engine();
    let candidate = NutritionCandidate::per_100g(
        FoodIdentity::named("Soy Sauce"),
        NutrientValues {
            sodium_mg: Some(1000.0),
            ..NutrientValues::default()
        },
        0.9,
        SourceKind::Database,
    );

    let small = NutritionProfile::normalize(&candidate, &ServingSize::parse("100g").unwrap())
        .unwrap();
    let large = NutritionProfile::normalize(&candidate, &ServingSize::parse("200g").unwrap())
        .unwrap();

    let small_remarks = engine.evaluate(&small, &["Low Sodium"]).unwrap();
    let large_remarks = engine.evaluate(&large, &["Low Sodium"]).unwrap();
    assert_eq!(small_remarks.remarks()[0].kind, RemarkKind::Compliant);
    assert_eq!(large_remarks.remarks()[0].severity, RemarkSeverity::Warning);
}

#[test]
fn test_avoided_ingredient_is_flagged_once() {
    let engine = builtin_engine();
    let candidate = NutritionCandidate::per_100g(
        FoodIdentity {
            ingredients: Some("pork, processed meats, pickled foods, salt".to_owned()),
            ..FoodIdentity::named("Deli Platter")
        },
        NutrientValues {
            calories: 250.0,
            sodium_mg: Some(900.0),
            ..NutrientValues::default()
        },
        0.9,
        SourceKind::Database,
    );
    let profile = NutritionProfile::normalize(&candidate, &ServingSize::default()).unwrap();

    let assessment = engine.evaluate(&profile, &["Hypertension"]).unwrap();

    let avoid: Vec<_> = assessment
        .remarks()
        .iter()
        .filter(|r| r.kind == RemarkKind::AvoidIngredient)
        .collect();
    assert_eq!(avoid.len(), 1);
    assert_eq!(avoid[0].severity, RemarkSeverity::Danger);
    assert!(avoid[0].message.contains("processed meats"));
    assert!(avoid[0].message.contains("pickled foods"));
}

#[test]
fn test_shortfalls_are_informational() {
    let engine = builtin_engine();
    let profile = profile_100g("Apple", apple_values());

    let assessment = engine.evaluate(&profile, &["Diabetes"]).unwrap();

    assert!(!assessment.remarks().is_empty());
    assert!(assessment
        .remarks()
        .iter()
        .all(|r| r.kind == RemarkKind::BelowTarget && r.severity == RemarkSeverity::Info));
    let shortfalls = u32::try_from(assessment.remarks().len()).unwrap();
    let baseline = baseline_score(profile.per_100g(), &ScoringConfig::default());
    let expected = 0.25f64
        .mul_add(-f64::from(shortfalls), 10.0)
        .min(baseline);
    assert!((assessment.overall_score() - expected).abs() < 1e-9);
}

#[test]
fn test_stricter_limit_wins_across_sections() {
    let catalog = Arc::new(ConditionCatalog::empty());
    catalog
        .add_condition(ConditionDefinition {
            name: "Kidney Care".to_owned(),
            dietary_restrictions: object(json!({ "max_sodium_mg": 1500 })),
            nutritional_targets: object(json!({ "max_sodium_mg": 2000 })),
            ..ConditionDefinition::default()
        })
        .unwrap();
    let engine = HealthRuleEngine::new(catalog, ScoringConfig::default());

    let assessment = engine
        .evaluate(&sodium_profile(1800.0), &["Kidney Care"])
        .unwrap();

    assert_eq!(assessment.remarks().len(), 1);
    assert_eq!(assessment.remarks()[0].limit, Some(1500.0));
}

#[test]
fn test_unknown_and_repeated_conditions() {
    let engine = builtin_engine();
    let profile = profile_100g("Apple", apple_values());

    let unknown = engine.evaluate(&profile, &["Vampirism"]).unwrap();
    assert_eq!(unknown.basis(), ScoreBasis::Baseline);
    assert!(unknown.remarks().is_empty());
    assert!(unknown.evaluated_conditions().is_empty());

    let repeated = engine
        .evaluate(&profile, &["Diabetes", "DIABETES", "Vampirism"])
        .unwrap();
    assert_eq!(repeated.evaluated_conditions(), ["Diabetes".to_owned()]);
    let single = engine.evaluate(&profile, &["Diabetes"]).unwrap();
    assert_eq!(repeated.remarks().len(), single.remarks().len());
}

#[test]
fn test_remarks_follow_condition_order() {
    let engine = builtin_engine();
    let profile = sodium_profile(2300.0);

    let assessment = engine
        .evaluate(&profile, &["Hypertension", "Diabetes"])
        .unwrap();

    let first_diabetes = assessment
        .remarks()
        .iter()
        .position(|r| r.condition == "Diabetes")
        .unwrap();
    assert!(assessment.remarks()[..first_diabetes]
        .iter()
        .all(|r| r.condition == "Hypertension"));
    assert_eq!(
        assessment.evaluated_conditions(),
        ["Hypertension".to_owned(), "Diabetes".to_owned()]
    );
}

#[test]
fn test_non_finite_nutrient_is_an_error() {
    let engine = builtin_engine();
    let profile = profile_100g(
        "Corrupt",
        apple_values().with(Nutrient::PotassiumMg, f64::NAN),
    );

    let err = engine.evaluate(&profile, &["Diabetes"]).unwrap_err();
    assert_eq!(
        err,
        EvaluationError::NonFiniteNutrient {
            nutrient: Nutrient::PotassiumMg
        }
    );
}

#[test]
fn test_baseline_rewards_fiber_and_penalizes_sodium() {
    let engine = builtin_engine();
    let fibrous = profile_100g(
        "Lentils",
        NutrientValues {
            calories: 116.0,
            protein_g: 9.0,
            carbohydrates_g: 20.0,
            fat_g: 0.4,
            fiber_g: Some(8.0),
            ..NutrientValues::default()
        },
    );
    let salty = profile_100g(
        "Salted Crackers",
        NutrientValues {
            calories: 420.0,
            protein_g: 9.0,
            carbohydrates_g: 70.0,
            fat_g: 12.0,
            fiber_g: Some(2.0),
            sodium_mg: Some(1100.0),
            ..NutrientValues::default()
        },
    );

    let none: [&str; 0] = [];
    let fibrous_score = engine.evaluate(&fibrous, &none).unwrap().overall_score();
    let salty_score = engine.evaluate(&salty, &none).unwrap().overall_score();
    assert!(fibrous_score > salty_score);
    assert!((0.0..=10.0).contains(&fibrous_score));
    assert!((0.0..=10.0).contains(&salty_score));
}

#[test]
fn test_user_defined_condition_is_usable_immediately() {
    let catalog = Arc::new(ConditionCatalog::with_builtins());
    let engine = HealthRuleEngine::new(Arc::clone(&catalog), ScoringConfig::default());
    let before = catalog.len();

    let added = catalog
        .add_condition(ConditionDefinition {
            name: "Potassium Restriction".to_owned(),
            description: "Late-stage kidney disease".to_owned(),
            dietary_restrictions: object(json!({
                "max_potassium_mg": 200,
                "avoid_ingredients": ["Banana", "  potato "]
            })),
            recommendation_template: Some("Pick low-potassium produce".to_owned()),
            ..ConditionDefinition::default()
        })
        .unwrap();

    assert!(!added.is_builtin);
    assert_eq!(catalog.len(), before + 1);
    assert_eq!(
        added.dietary_restrictions.avoid_ingredients,
        vec!["banana".to_owned(), "potato".to_owned()]
    );

    let banana = profile_100g(
        "Banana",
        NutrientValues {
            calories: 89.0,
            ..NutrientValues::default()
        }
        .with(Nutrient::PotassiumMg, 358.0),
    );
    let assessment = engine
        .evaluate(&banana, &["potassium restriction"])
        .unwrap();
    assert!(assessment
        .remarks()
        .iter()
        .any(|r| r.kind == RemarkKind::AvoidIngredient));
    assert!(assessment
        .remarks()
        .iter()
        .any(|r| r.kind == RemarkKind::ExceedsLimit && r.nutrient == Some(Nutrient::PotassiumMg)));
}

#[test]
fn test_condition_validation_errors() {
    let catalog = ConditionCatalog::with_builtins();

    let duplicate = catalog
        .add_condition(ConditionDefinition {
            name: "diabetes".to_owned(),
            ..ConditionDefinition::default()
        })
        .unwrap_err();
    assert!(matches!(duplicate, ScanError::DuplicateCondition { .. }));

    let empty = catalog
        .add_condition(ConditionDefinition {
            name: "   ".to_owned(),
            ..ConditionDefinition::default()
        })
        .unwrap_err();
    assert!(matches!(empty, ScanError::InvalidCondition { .. }));

    let negative = catalog
        .add_condition(ConditionDefinition {
            name: "Odd".to_owned(),
            dietary_restrictions: object(json!({ "max_sugar_g": -5 })),
            ..ConditionDefinition::default()
        })
        .unwrap_err();
    assert!(matches!(negative, ScanError::InvalidCondition { .. }));

    let bad_list = catalog
        .add_condition(ConditionDefinition {
            name: "Odd".to_owned(),
            dietary_restrictions: object(json!({ "avoid_ingredients": "nuts" })),
            ..ConditionDefinition::default()
        })
        .unwrap_err();
    assert!(matches!(bad_list, ScanError::InvalidCondition { .. }));
}

#[test]
fn test_definition_deserializes_from_json() {
    let definition: ConditionDefinition = serde_json::from_value(json!({
        "name": "Gout",
        "description": "Uric acid management",
        "severity": "moderate",
        "dietary_restrictions": {
            "max_sugar_g": 20,
            "avoid_ingredients": ["anchovies", "organ meats"]
        }
    }))
    .unwrap();

    let catalog = ConditionCatalog::empty();
    let gout = catalog.add_condition(definition).unwrap();
    assert_eq!(gout.name, "Gout");
    assert_eq!(
        gout.dietary_restrictions.limits.max(Nutrient::SugarG),
        Some(20.0)
    );
    assert_eq!(catalog.list_conditions().len(), 1);
}
