// ABOUTME: Curated foods loaded into an empty local store
// ABOUTME: Per-100g reference values for common fruits, proteins, bakery, dairy and snack items
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::FoodRecord;
use nutriscan_core::models::{FoodIdentity, NutrientValues};

struct SeedFood {
    name: &'static str,
    category: &'static str,
    brand: Option<&'static str>,
    barcode: Option<&'static str>,
    ingredients: Option<&'static str>,
    // calories, protein, carbohydrates, fat
    macros: (f64, f64, f64, f64),
    fiber_g: Option<f64>,
    sugar_g: Option<f64>,
    sodium_mg: Option<f64>,
}

const SEED_FOODS: &[SeedFood] = &[
    SeedFood {
        name: "Apple",
        category: "fruits",
        brand: None,
        barcode: None,
        ingredients: None,
        macros: (52.0, 0.3, 14.0, 0.2),
        fiber_g: Some(2.4),
        sugar_g: Some(10.4),
        sodium_mg: None,
    },
    SeedFood {
        name: "Banana",
        category: "fruits",
        brand: None,
        barcode: None,
        ingredients: None,
        macros: (89.0, 1.1, 23.0, 0.3),
        fiber_g: Some(2.6),
        sugar_g: Some(12.2),
        sodium_mg: None,
    },
    SeedFood {
        name: "Chicken Breast",
        category: "meat",
        brand: None,
        barcode: None,
        ingredients: None,
        macros: (165.0, 31.0, 0.0, 3.6),
        fiber_g: Some(0.0),
        sugar_g: None,
        sodium_mg: Some(74.0),
    },
    SeedFood {
        name: "Whole Wheat Bread",
        category: "bakery",
        brand: Some("Sample Brand"),
        barcode: Some("1234567890123"),
        ingredients: Some("whole wheat flour, water, yeast, wheat gluten, salt, sugar"),
        macros: (247.0, 13.0, 41.0, 4.2),
        fiber_g: Some(6.0),
        sugar_g: Some(5.7),
        sodium_mg: Some(491.0),
    },
    SeedFood {
        name: "Greek Yogurt",
        category: "dairy",
        brand: Some("Sample Dairy"),
        barcode: Some("2345678901234"),
        ingredients: Some("pasteurized milk, live cultures"),
        macros: (59.0, 10.0, 3.6, 0.4),
        fiber_g: Some(0.0),
        sugar_g: Some(3.6),
        sodium_mg: Some(36.0),
    },
    SeedFood {
        name: "Potato Chips",
        category: "snacks",
        brand: Some("Snack Co"),
        barcode: Some("3456789012345"),
        ingredients: Some("potatoes, sunflower oil, salt"),
        macros: (536.0, 7.0, 53.0, 34.0),
        fiber_g: Some(4.8),
        sugar_g: Some(0.3),
        sodium_mg: Some(525.0),
    },
];

/// Curated seed records, all stored with the given confidence
#[must_use]
pub fn seed_records(confidence: f64) -> Vec<FoodRecord> {
    SEED_FOODS
        .iter()
        .map(|food| {
            let (calories, protein_g, carbohydrates_g, fat_g) = food.macros;
            let values = NutrientValues {
                calories,
                protein_g,
                carbohydrates_g,
                fat_g,
                fiber_g: food.fiber_g,
                sugar_g: food.sugar_g,
                sodium_mg: food.sodium_mg,
                ..NutrientValues::default()
            };
            let identity = FoodIdentity {
                name: food.name.to_owned(),
                brand: food.brand.map(ToOwned::to_owned),
                barcode: food.barcode.map(ToOwned::to_owned),
                ingredients: food.ingredients.map(ToOwned::to_owned),
                category: Some(food.category.to_owned()),
            };
            FoodRecord::curated(identity, values, confidence)
        })
        .collect()
}
