// ABOUTME: Condition-agnostic baseline score from general nutrient balance
// ABOUTME: Rewards fiber and protein density, penalizes sugar, sodium, fat and energy density
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::ScoringConfig;
use nutriscan_core::models::{Nutrient, NutrientValues};

/// Score per-100g values with the baseline heuristic, clamped to `[0, max_score]`.
///
/// Nutrients the source did not report contribute nothing.
#[must_use]
pub fn baseline_score(per_100g: &NutrientValues, config: &ScoringConfig) -> f64 {
    let b = &config.baseline;
    let mut score = b.start_score;

    if let Some(fiber) = per_100g.fiber_g {
        if fiber >= b.high_fiber_g {
            score += b.high_fiber_bonus;
        } else if fiber >= b.moderate_fiber_g {
            score += b.moderate_fiber_bonus;
        }
    }
    if per_100g.protein_g >= b.high_protein_g {
        score += b.high_protein_bonus;
    }
    if per_100g.sugar_g.is_some_and(|sugar| sugar > b.high_sugar_g) {
        score -= b.high_sugar_penalty;
    }
    if per_100g.sodium_mg.is_some_and(|sodium| sodium > b.high_sodium_mg) {
        score -= b.high_sodium_penalty;
    }
    if per_100g
        .get(Nutrient::SaturatedFatG)
        .is_some_and(|sat| sat > b.high_saturated_fat_g)
    {
        score -= b.high_saturated_fat_penalty;
    }
    if per_100g.fat_g > b.high_fat_g {
        score -= b.high_fat_penalty;
    }
    if per_100g.calories > b.high_calories {
        score -= b.high_calories_penalty;
    }

    if score.is_finite() {
        score.clamp(0.0, config.max_score)
    } else {
        b.start_score
    }
}
