// ABOUTME: Domain models for food scanning: nutrients, profiles, references, conditions, remarks
// ABOUTME: Shared by the resolver, the health rule engine and the scan orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Closed nutrient catalog and threshold keys
pub mod nutrient;

/// Nutrition profiles, source candidates and provenance
pub mod profile;

/// Food references (name, barcode, image)
pub mod reference;

/// Health conditions with typed thresholds
pub mod condition;

/// Health remarks produced by evaluation
pub mod remark;

pub use condition::{
    normalize_condition_name, ConditionSeverity, DietaryRestrictions, HealthCondition,
    NutrientLimits,
};
pub use nutrient::{Bound, LimitKey, Nutrient, UnknownNutrient};
pub use profile::{
    FoodIdentity, FoodRating, NutriScore, NutrientValues, NutritionCandidate, NutritionProfile,
    SourceKind, REFERENCE_GRAMS,
};
pub use reference::{
    validate_barcode, FoodReference, ImageInput, ImageKind, ReferenceKind, ReferenceSummary,
};
pub use remark::{HealthRemark, RemarkKind, RemarkSeverity};
