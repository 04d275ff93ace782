// ABOUTME: Health remark produced when a nutrition profile is evaluated against a condition
// ABOUTME: Carries remark severity, finding kind, message and optional recommendation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::nutrient::Nutrient;
use serde::{Deserialize, Serialize};

/// How urgent a single finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemarkSeverity {
    /// Informational (shortfall or compliance)
    Info,
    /// Limit exceeded
    Warning,
    /// Limit far exceeded, or an avoided ingredient is present
    Danger,
}

/// What kind of finding a remark records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemarkKind {
    /// An ingredient the condition avoids was found
    AvoidIngredient,
    /// A `max_` threshold was exceeded
    ExceedsLimit,
    /// A `min_` target was not reached
    BelowTarget,
    /// Nothing was violated
    Compliant,
}

/// One explanatory finding tying a profile to a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRemark {
    /// Condition display name
    pub condition: String,
    /// Finding urgency
    pub severity: RemarkSeverity,
    /// Finding kind
    pub kind: RemarkKind,
    /// Human-readable finding
    pub message: String,
    /// Suggested action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    /// Nutrient the finding is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrient: Option<Nutrient>,
    /// Per-serving amount observed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
    /// Threshold compared against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
}

impl HealthRemark {
    /// Whether this remark reports a problem rather than compliance
    #[must_use]
    pub fn is_violation(&self) -> bool {
        self.kind != RemarkKind::Compliant
    }
}
