// ABOUTME: Serving size parsing from free text into a positive gram weight
// ABOUTME: Supports metric and imperial mass, volumes and household measures with fractions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Serving Sizes
//!
//! `"150g"`, `"2.5 oz"`, `"1/2 cup"`, `"1 1/2 tbsp"`, `"1 medium apple"` and the
//! empty string (100 g) are all accepted. Volumes assume water density.
//!
//! Label servings such as `"1 cup (228g)"` carry their exact weight in
//! parentheses; that weight wins over the household estimate.

use crate::errors::ScanError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Serving used when the caller does not specify one
pub const DEFAULT_SERVING: &str = "100g";

/// Quantity (decimal, fraction or mixed number), unit word, trailing description
static SERVING_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?P<qty>\d+/\d+|\d+(?:\.\d+)?(?:\s+\d+/\d+)?)?\s*(?P<unit>[a-z]+)?(?P<rest>.*)$")
        .ok()
});

/// Parenthesized exact weight printed on labels, e.g. `(228g)` or `(30 ml)`
static WEIGHT_HINT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\((?P<amount>\d+(?:\.\d+)?)\s*(?P<unit>mg|g|kg|ml|l|oz)\)").ok()
});

/// Gram weight of one unit
fn unit_grams(unit: &str) -> Option<f64> {
    let grams = match unit {
        "g" | "gr" | "gram" | "grams" | "ml" | "milliliter" | "milliliters" => 1.0,
        "kg" | "kilogram" | "kilograms" | "l" | "liter" | "liters" | "litre" | "litres" => 1000.0,
        "mg" | "milligram" | "milligrams" => 0.001,
        "oz" | "ounce" | "ounces" => 28.35,
        "lb" | "lbs" | "pound" | "pounds" => 453.6,
        "cup" | "cups" => 240.0,
        "tbsp" | "tablespoon" | "tablespoons" => 15.0,
        "tsp" | "teaspoon" | "teaspoons" => 5.0,
        "slice" | "slices" => 30.0,
        "piece" | "pieces" | "pc" | "pcs" => 50.0,
        "serving" | "servings" | "portion" | "portions" | "small" => 100.0,
        "medium" => 150.0,
        "large" => 200.0,
        _ => return None,
    };
    Some(grams)
}

fn parse_quantity(text: &str) -> Option<f64> {
    let mut total = 0.0;
    for part in text.split_whitespace() {
        let value = if let Some((num, den)) = part.split_once('/') {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        } else {
            part.parse().ok()?
        };
        total += value;
    }
    Some(total)
}

fn stated_weight(text: &str) -> Option<f64> {
    let captures = WEIGHT_HINT.as_ref()?.captures(text)?;
    let amount: f64 = captures.name("amount")?.as_str().parse().ok()?;
    Some(amount * unit_grams(captures.name("unit")?.as_str())?)
}

/// A requested serving: the caller's description and its weight in grams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingSize {
    description: String,
    grams: f64,
}

impl ServingSize {
    /// Parse a free-text serving size.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidServingSize`] naming the input when the text
    /// is not understood or does not describe a positive weight.
    pub fn parse(text: &str) -> Result<Self, ScanError> {
        let description = text.trim();
        if description.is_empty() {
            return Self::from_grams(DEFAULT_SERVING, 100.0);
        }

        let normalized = description.to_lowercase();
        if let Some(grams) = stated_weight(&normalized) {
            return Self::from_grams(description, grams);
        }

        let captures = SERVING_PATTERN
            .as_ref()
            .and_then(|re| re.captures(&normalized))
            .ok_or_else(|| ScanError::invalid_serving(description, "unrecognized format"))?;

        let quantity = match captures.name("qty") {
            Some(qty) => parse_quantity(qty.as_str())
                .ok_or_else(|| ScanError::invalid_serving(description, "invalid quantity"))?,
            None => 1.0,
        };
        let rest = captures.name("rest").map_or("", |m| m.as_str());

        let grams = match captures.name("unit") {
            Some(unit) => {
                if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                    return Err(ScanError::invalid_serving(
                        description,
                        "unrecognized format",
                    ));
                }
                let per_unit = unit_grams(unit.as_str()).ok_or_else(|| {
                    ScanError::invalid_serving(
                        description,
                        format!("unknown unit '{}'", unit.as_str()),
                    )
                })?;
                quantity * per_unit
            }
            // A bare number is a weight in grams
            None if captures.name("qty").is_some() && rest.trim().is_empty() => quantity,
            None => {
                return Err(ScanError::invalid_serving(
                    description,
                    "expected a quantity and unit such as '150g' or '1 cup'",
                ))
            }
        };

        Self::from_grams(description, grams)
    }

    /// Serving with an explicit gram weight.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidServingSize`] when `grams` is not a positive finite number.
    pub fn from_grams(description: impl Into<String>, grams: f64) -> Result<Self, ScanError> {
        let description = description.into();
        if !grams.is_finite() || grams <= 0.0 {
            return Err(ScanError::invalid_serving(
                description,
                "serving weight must be greater than zero",
            ));
        }
        Ok(Self { description, grams })
    }

    /// Description as supplied
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Weight in grams, always positive
    #[must_use]
    pub const fn grams(&self) -> f64 {
        self.grams
    }
}

impl Default for ServingSize {
    fn default() -> Self {
        Self {
            description: DEFAULT_SERVING.to_owned(),
            grams: 100.0,
        }
    }
}

impl fmt::Display for ServingSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.0}g)", self.description, self.grams)
    }
}
