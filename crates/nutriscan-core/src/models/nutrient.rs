// ABOUTME: Closed nutrient catalog and restriction key parsing
// ABOUTME: Maps wire names such as sodium_mg to typed nutrients and max_/min_ bounds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Every nutrient the engine knows how to store, compare and score.
///
/// The wire name (`as_str`) carries the unit suffix, which is also the key used
/// in condition thresholds (`max_sodium_mg`, `min_fiber_g`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    /// Energy in kcal
    Calories,
    /// Protein in grams
    #[serde(rename = "protein_g")]
    ProteinG,
    /// Carbohydrates in grams
    #[serde(rename = "carbohydrates_g")]
    CarbohydratesG,
    /// Total fat in grams
    #[serde(rename = "fat_g")]
    FatG,
    /// Dietary fiber in grams
    #[serde(rename = "fiber_g")]
    FiberG,
    /// Total sugars in grams
    #[serde(rename = "sugar_g")]
    SugarG,
    /// Sodium in milligrams
    #[serde(rename = "sodium_mg")]
    SodiumMg,
    /// Cholesterol in milligrams
    #[serde(rename = "cholesterol_mg")]
    CholesterolMg,
    /// Saturated fat in grams
    #[serde(rename = "saturated_fat_g")]
    SaturatedFatG,
    /// Trans fat in grams
    #[serde(rename = "trans_fat_g")]
    TransFatG,
    /// Added sugars in grams
    #[serde(rename = "added_sugar_g")]
    AddedSugarG,
    /// Potassium in milligrams
    #[serde(rename = "potassium_mg")]
    PotassiumMg,
    /// Calcium in milligrams
    #[serde(rename = "calcium_mg")]
    CalciumMg,
    /// Iron in milligrams
    #[serde(rename = "iron_mg")]
    IronMg,
    /// Magnesium in milligrams
    #[serde(rename = "magnesium_mg")]
    MagnesiumMg,
    /// Phosphorus in milligrams
    #[serde(rename = "phosphorus_mg")]
    PhosphorusMg,
    /// Zinc in milligrams
    #[serde(rename = "zinc_mg")]
    ZincMg,
    /// Vitamin A in IU
    #[serde(rename = "vitamin_a_iu")]
    VitaminAIu,
    /// Vitamin C in milligrams
    #[serde(rename = "vitamin_c_mg")]
    VitaminCMg,
    /// Vitamin D in IU
    #[serde(rename = "vitamin_d_iu")]
    VitaminDIu,
    /// Vitamin K in micrograms
    #[serde(rename = "vitamin_k_mcg")]
    VitaminKMcg,
    /// Folate in micrograms
    #[serde(rename = "folate_mcg")]
    FolateMcg,
    /// Omega-3 fatty acids in milligrams
    #[serde(rename = "omega3_mg")]
    Omega3Mg,
}

impl Nutrient {
    /// All nutrients, in catalog order
    pub const ALL: [Self; 23] = [
        Self::Calories,
        Self::ProteinG,
        Self::CarbohydratesG,
        Self::FatG,
        Self::FiberG,
        Self::SugarG,
        Self::SodiumMg,
        Self::CholesterolMg,
        Self::SaturatedFatG,
        Self::TransFatG,
        Self::AddedSugarG,
        Self::PotassiumMg,
        Self::CalciumMg,
        Self::IronMg,
        Self::MagnesiumMg,
        Self::PhosphorusMg,
        Self::ZincMg,
        Self::VitaminAIu,
        Self::VitaminCMg,
        Self::VitaminDIu,
        Self::VitaminKMcg,
        Self::FolateMcg,
        Self::Omega3Mg,
    ];

    /// Wire name including unit suffix
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calories => "calories",
            Self::ProteinG => "protein_g",
            Self::CarbohydratesG => "carbohydrates_g",
            Self::FatG => "fat_g",
            Self::FiberG => "fiber_g",
            Self::SugarG => "sugar_g",
            Self::SodiumMg => "sodium_mg",
            Self::CholesterolMg => "cholesterol_mg",
            Self::SaturatedFatG => "saturated_fat_g",
            Self::TransFatG => "trans_fat_g",
            Self::AddedSugarG => "added_sugar_g",
            Self::PotassiumMg => "potassium_mg",
            Self::CalciumMg => "calcium_mg",
            Self::IronMg => "iron_mg",
            Self::MagnesiumMg => "magnesium_mg",
            Self::PhosphorusMg => "phosphorus_mg",
            Self::ZincMg => "zinc_mg",
            Self::VitaminAIu => "vitamin_a_iu",
            Self::VitaminCMg => "vitamin_c_mg",
            Self::VitaminDIu => "vitamin_d_iu",
            Self::VitaminKMcg => "vitamin_k_mcg",
            Self::FolateMcg => "folate_mcg",
            Self::Omega3Mg => "omega3_mg",
        }
    }

    /// Name used in remark messages ("sodium", "saturated fat")
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Calories => "calorie",
            Self::ProteinG => "protein",
            Self::CarbohydratesG => "carbohydrate",
            Self::FatG => "fat",
            Self::FiberG => "fiber",
            Self::SugarG => "sugar",
            Self::SodiumMg => "sodium",
            Self::CholesterolMg => "cholesterol",
            Self::SaturatedFatG => "saturated fat",
            Self::TransFatG => "trans fat",
            Self::AddedSugarG => "added sugar",
            Self::PotassiumMg => "potassium",
            Self::CalciumMg => "calcium",
            Self::IronMg => "iron",
            Self::MagnesiumMg => "magnesium",
            Self::PhosphorusMg => "phosphorus",
            Self::ZincMg => "zinc",
            Self::VitaminAIu => "vitamin A",
            Self::VitaminCMg => "vitamin C",
            Self::VitaminDIu => "vitamin D",
            Self::VitaminKMcg => "vitamin K",
            Self::FolateMcg => "folate",
            Self::Omega3Mg => "omega-3",
        }
    }

    /// Whether this nutrient is one of the fixed profile fields rather than a micronutrient
    #[must_use]
    pub const fn is_core(self) -> bool {
        matches!(
            self,
            Self::Calories
                | Self::ProteinG
                | Self::CarbohydratesG
                | Self::FatG
                | Self::FiberG
                | Self::SugarG
                | Self::SodiumMg
        )
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a nutrient name outside the catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown nutrient '{0}'")]
pub struct UnknownNutrient(pub String);

impl FromStr for Nutrient {
    type Err = UnknownNutrient;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == key)
            .ok_or(UnknownNutrient(key))
    }
}

/// Direction of a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// Value must not exceed the threshold
    Max,
    /// Value should reach the threshold
    Min,
}

/// Parsed `max_<nutrient>` / `min_<nutrient>` threshold key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LimitKey {
    /// Direction
    pub bound: Bound,
    /// Target nutrient
    pub nutrient: Nutrient,
}

impl LimitKey {
    /// Parse a threshold key.
    ///
    /// Returns `None` for keys that are not thresholds on a known nutrient
    /// (boolean flags, `limit_*` hints, nutrients outside the catalog). Those
    /// keys are tolerated so older or richer condition data still loads.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        let (bound, rest) = if let Some(rest) = key.strip_prefix("max_") {
            (Bound::Max, rest)
        } else if let Some(rest) = key.strip_prefix("min_") {
            (Bound::Min, rest)
        } else {
            return None;
        };
        rest.parse::<Nutrient>()
            .ok()
            .map(|nutrient| Self { bound, nutrient })
    }

    /// Key in wire form
    #[must_use]
    pub fn as_key(&self) -> String {
        let prefix = match self.bound {
            Bound::Max => "max",
            Bound::Min => "min",
        };
        format!("{prefix}_{}", self.nutrient.as_str())
    }
}
