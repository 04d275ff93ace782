// ABOUTME: Health scoring configuration for remark penalties and the baseline heuristic
// ABOUTME: Configures severity penalties, danger ratio and per-100g nutrient balance thresholds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health Scoring Configuration
//!
//! Scores run from 0 to 10. With conditions, every remark subtracts a
//! severity-weighted penalty from the maximum. Without any known condition the
//! baseline heuristic scores general nutrient balance per 100 g.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Score before any penalty (10.0)
    pub max_score: f64,
    /// Penalty for a danger remark (3.0)
    pub danger_penalty: f64,
    /// Penalty for a warning remark (1.0)
    pub warning_penalty: f64,
    /// Penalty for an info remark reporting a missed target (0.25)
    pub shortfall_penalty: f64,
    /// Excess ratio above which an exceeded limit is a danger (1.5)
    pub danger_ratio: f64,
    /// Condition-agnostic baseline heuristic
    pub baseline: BaselineConfig,
}

/// Nutrient-balance heuristic used when no known condition is supplied.
///
/// All thresholds are per 100 g.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Starting score (7.0)
    pub start_score: f64,
    /// Fiber for the full bonus, g (6.0)
    pub high_fiber_g: f64,
    /// Bonus at `high_fiber_g` (1.0)
    pub high_fiber_bonus: f64,
    /// Fiber for the partial bonus, g (3.0)
    pub moderate_fiber_g: f64,
    /// Bonus at `moderate_fiber_g` (0.5)
    pub moderate_fiber_bonus: f64,
    /// Protein for a bonus, g (10.0)
    pub high_protein_g: f64,
    /// Protein bonus (0.5)
    pub high_protein_bonus: f64,
    /// Sugar above which a penalty applies, g (22.5)
    pub high_sugar_g: f64,
    /// Sugar penalty (1.0)
    pub high_sugar_penalty: f64,
    /// Sodium above which a penalty applies, mg (600)
    pub high_sodium_mg: f64,
    /// Sodium penalty (1.0)
    pub high_sodium_penalty: f64,
    /// Saturated fat above which a penalty applies, g (5.0)
    pub high_saturated_fat_g: f64,
    /// Saturated fat penalty (0.5)
    pub high_saturated_fat_penalty: f64,
    /// Total fat above which a penalty applies, g (17.5)
    pub high_fat_g: f64,
    /// Total fat penalty (0.5)
    pub high_fat_penalty: f64,
    /// Energy density above which a penalty applies, kcal (400)
    pub high_calories: f64,
    /// Energy density penalty (0.5)
    pub high_calories_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_score: 10.0,
            danger_penalty: 3.0,
            warning_penalty: 1.0,
            shortfall_penalty: 0.25,
            danger_ratio: 1.5,
            baseline: BaselineConfig::default(),
        }
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            start_score: 7.0,
            high_fiber_g: 6.0,
            high_fiber_bonus: 1.0,
            moderate_fiber_g: 3.0,
            moderate_fiber_bonus: 0.5,
            high_protein_g: 10.0,
            high_protein_bonus: 0.5,
            high_sugar_g: 22.5,
            high_sugar_penalty: 1.0,
            high_sodium_mg: 600.0,
            high_sodium_penalty: 1.0,
            high_saturated_fat_g: 5.0,
            high_saturated_fat_penalty: 0.5,
            high_fat_g: 17.5,
            high_fat_penalty: 0.5,
            high_calories: 400.0,
            high_calories_penalty: 0.5,
        }
    }
}

impl ScoringConfig {
    /// Validate penalties, ratio and baseline.
    ///
    /// # Errors
    ///
    /// Returns an error if a penalty is negative or non-finite, the danger ratio
    /// is not above 1, or the baseline start lies outside `[0, max_score]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_score.is_finite() || self.max_score <= 0.0 {
            return Err(ConfigError::ValueOutOfRange("max_score must be positive"));
        }
        let penalties = [
            self.danger_penalty,
            self.warning_penalty,
            self.shortfall_penalty,
        ];
        if penalties.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(ConfigError::InvalidWeights(
                "remark penalties must be finite and non-negative",
            ));
        }
        if self.danger_penalty < self.warning_penalty
            || self.warning_penalty < self.shortfall_penalty
        {
            return Err(ConfigError::InvalidWeights(
                "penalties must be ordered danger >= warning >= shortfall",
            ));
        }
        if !self.danger_ratio.is_finite() || self.danger_ratio <= 1.0 {
            return Err(ConfigError::ValueOutOfRange(
                "danger_ratio must be greater than 1",
            ));
        }
        if !(0.0..=self.max_score).contains(&self.baseline.start_score) {
            return Err(ConfigError::InvalidRange(
                "baseline start_score must be within [0, max_score]",
            ));
        }
        if self.baseline.moderate_fiber_g > self.baseline.high_fiber_g {
            return Err(ConfigError::InvalidRange(
                "moderate_fiber_g must not exceed high_fiber_g",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_unordered_penalties() {
        let config = ScoringConfig {
            warning_penalty: 5.0,
            ..ScoringConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_rejects_ratio_at_or_below_one() {
        let config = ScoringConfig {
            danger_ratio: 1.0,
            ..ScoringConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
