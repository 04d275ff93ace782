// ABOUTME: Built-in health condition definitions seeded into every catalog at startup
// ABOUTME: Ten common diet-related conditions with thresholds, avoid lists and templates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Built-in conditions are written in the same free-form JSON shape users
//! submit, so they pass through the same validation. Keys the engine cannot
//! evaluate (`max_glycemic_index`, boolean preferences, `limit_*` hints) are
//! kept for completeness and ignored when parsed.

use crate::catalog::ConditionDefinition;
use nutriscan_core::models::ConditionSeverity;
use serde_json::{json, Map, Value};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn definition(
    name: &str,
    description: &str,
    severity: ConditionSeverity,
    restrictions: Value,
    targets: Value,
    templates: (&str, &str),
) -> ConditionDefinition {
    ConditionDefinition {
        name: name.to_owned(),
        description: description.to_owned(),
        severity,
        dietary_restrictions: object(restrictions),
        nutritional_targets: object(targets),
        warning_template: Some(templates.0.to_owned()),
        recommendation_template: Some(templates.1.to_owned()),
    }
}

/// Definitions of the built-in conditions, in seeding order
#[must_use]
pub fn builtin_definitions() -> Vec<ConditionDefinition> {
    vec![
        definition(
            "Diabetes",
            "Type 2 diabetes requiring blood sugar management through diet",
            ConditionSeverity::Moderate,
            json!({
                "max_sugar_g": 25,
                "max_carbohydrates_g": 45,
                "max_glycemic_index": 55,
                "avoid_ingredients": ["high fructose corn syrup", "refined sugar", "white flour"]
            }),
            json!({
                "min_fiber_g": 8,
                "max_sodium_mg": 2000,
                "min_protein_g": 15,
                "max_saturated_fat_g": 7
            }),
            (
                "This food may cause blood sugar spikes due to high {nutrient} content.",
                "Consider pairing with protein or fiber-rich foods to slow absorption.",
            ),
        ),
        definition(
            "Hypertension",
            "High blood pressure requiring sodium restriction and heart-healthy nutrition",
            ConditionSeverity::Moderate,
            json!({
                "max_sodium_mg": 1500,
                "max_saturated_fat_g": 6,
                "avoid_ingredients": ["processed meats", "canned soups", "pickled foods"]
            }),
            json!({
                "min_potassium_mg": 400,
                "min_magnesium_mg": 80,
                "min_fiber_g": 6,
                "max_cholesterol_mg": 200
            }),
            (
                "High sodium content may increase blood pressure.",
                "Choose fresh, unprocessed alternatives when possible.",
            ),
        ),
        definition(
            "Heart Disease",
            "Cardiovascular disease requiring heart-healthy dietary patterns",
            ConditionSeverity::Severe,
            json!({
                "max_saturated_fat_g": 5,
                "max_trans_fat_g": 0,
                "max_cholesterol_mg": 150,
                "max_sodium_mg": 1500,
                "avoid_ingredients": ["trans fats", "palm oil", "coconut oil"]
            }),
            json!({
                "min_omega3_mg": 250,
                "min_fiber_g": 10,
                "min_potassium_mg": 500,
                "max_added_sugar_g": 20
            }),
            (
                "This food contains {nutrient} that may not be heart-healthy.",
                "Focus on omega-3 rich fish, nuts, and whole grains instead.",
            ),
        ),
        definition(
            "Celiac Disease",
            "Autoimmune condition requiring strict gluten-free diet",
            ConditionSeverity::Severe,
            json!({
                "avoid_ingredients": [
                    "wheat", "barley", "rye", "triticale", "malt", "brewer's yeast",
                    "wheat flour", "semolina", "durum", "spelt", "kamut"
                ]
            }),
            json!({
                "min_iron_mg": 8,
                "min_folate_mcg": 200,
                "min_fiber_g": 8,
                "min_calcium_mg": 300
            }),
            (
                "This food may contain gluten - check ingredients carefully.",
                "Look for certified gluten-free alternatives.",
            ),
        ),
        definition(
            "Kidney Disease",
            "Chronic kidney disease requiring protein, phosphorus, and potassium management",
            ConditionSeverity::Severe,
            json!({
                "max_protein_g": 20,
                "max_phosphorus_mg": 200,
                "max_potassium_mg": 600,
                "max_sodium_mg": 2000,
                "avoid_ingredients": ["processed meats", "nuts", "seeds", "chocolate"]
            }),
            json!({
                "max_protein_g": 15,
                "min_calories": 150,
                "max_phosphorus_mg": 150
            }),
            (
                "High {nutrient} content may strain kidney function.",
                "Consult your nephrologist about portion sizes.",
            ),
        ),
        definition(
            "GERD",
            "Gastroesophageal reflux disease requiring trigger food avoidance",
            ConditionSeverity::Mild,
            json!({
                "avoid_ingredients": [
                    "citrus fruits", "tomatoes", "chocolate", "mint", "spicy foods",
                    "caffeine", "alcohol", "onions", "garlic"
                ],
                "max_fat_g": 10,
                "avoid_acidic_foods": true
            }),
            json!({
                "min_fiber_g": 5,
                "alkaline_foods_preferred": true
            }),
            (
                "This food may trigger acid reflux symptoms.",
                "Try smaller portions and avoid eating 3 hours before bedtime.",
            ),
        ),
        definition(
            "High Cholesterol",
            "Elevated blood cholesterol requiring dietary cholesterol and saturated fat restriction",
            ConditionSeverity::Moderate,
            json!({
                "max_cholesterol_mg": 200,
                "max_saturated_fat_g": 7,
                "avoid_ingredients": ["egg yolks", "organ meats", "full-fat dairy"]
            }),
            json!({
                "min_fiber_g": 10,
                "min_plant_sterols_mg": 400,
                "omega3_preferred": true
            }),
            (
                "High cholesterol or saturated fat content may raise blood cholesterol.",
                "Choose lean proteins and increase soluble fiber intake.",
            ),
        ),
        definition(
            "Lactose Intolerance",
            "Inability to digest lactose requiring dairy avoidance or lactase supplementation",
            ConditionSeverity::Mild,
            json!({
                "avoid_ingredients": [
                    "milk", "cheese", "butter", "cream", "yogurt", "ice cream",
                    "whey", "casein", "lactose"
                ]
            }),
            json!({
                "min_calcium_mg": 300,
                "min_vitamin_d_iu": 100,
                "lactose_free_alternatives": true
            }),
            (
                "This food contains lactose which may cause digestive discomfort.",
                "Look for lactose-free alternatives or take lactase supplements.",
            ),
        ),
        definition(
            "Iron Deficiency Anemia",
            "Low iron levels requiring iron-rich foods and absorption enhancers",
            ConditionSeverity::Moderate,
            json!({
                "limit_with_iron": ["tea", "coffee", "calcium supplements"],
                "avoid_with_iron_meals": ["dairy products", "whole grains"]
            }),
            json!({
                "min_iron_mg": 6,
                "min_vitamin_c_mg": 30,
                "heme_iron_preferred": true,
                "folate_support": true
            }),
            (
                "This food may inhibit iron absorption if eaten with iron-rich meals.",
                "Pair iron-rich foods with vitamin C sources like citrus or bell peppers.",
            ),
        ),
        definition(
            "Osteoporosis",
            "Bone density loss requiring calcium, vitamin D, and bone-supporting nutrients",
            ConditionSeverity::Moderate,
            json!({
                "limit_sodium_mg": 2000,
                "limit_caffeine_mg": 300,
                "avoid_excess_protein": true
            }),
            json!({
                "min_calcium_mg": 400,
                "min_vitamin_d_iu": 200,
                "min_magnesium_mg": 100,
                "min_vitamin_k_mcg": 50,
                "weight_bearing_exercise": true
            }),
            (
                "High sodium or caffeine may interfere with calcium absorption.",
                "Focus on calcium-rich foods with vitamin D for optimal bone health.",
            ),
        ),
    ]
}
