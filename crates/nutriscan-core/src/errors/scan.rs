// ABOUTME: Scan-domain error types for resolution, references, serving sizes and conditions
// ABOUTME: Provides ScanError and ProviderError with conversions into AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Scan Error Types
//!
//! - [`ScanError`]: errors a caller of the scanning engine can see and act on
//! - [`ProviderError`]: adapter-local transport or parse failure. It never reaches
//!   a caller directly; the resolver falls back to the next source instead.

use super::{AppError, ErrorCode};
use thiserror::Error;

/// Errors surfaced by the scanning engine
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum ScanError {
    /// Every nutrition source was exhausted without a result
    #[error("could not resolve nutrition data for {reference}")]
    UnresolvedFood {
        /// Human-readable form of the reference that failed
        reference: String,
    },

    /// Requested serving size cannot be converted to a positive gram weight
    #[error("invalid serving size '{serving}': {reason}")]
    InvalidServingSize {
        /// The serving size exactly as supplied
        serving: String,
        /// What was wrong with it
        reason: String,
    },

    /// Food reference is empty, ambiguous or structurally invalid
    #[error("malformed food reference: {reason}")]
    MalformedReference {
        /// What was wrong with the reference
        reason: String,
    },

    /// A condition with the same case-insensitive name already exists
    #[error("health condition '{name}' already exists")]
    DuplicateCondition {
        /// Name as supplied by the caller
        name: String,
    },

    /// Condition definition failed validation
    #[error("invalid health condition '{name}': {reason}")]
    InvalidCondition {
        /// Name as supplied by the caller
        name: String,
        /// What was wrong with the definition
        reason: String,
    },
}

impl ScanError {
    /// Create an "unresolved food" error
    #[must_use]
    pub fn unresolved(reference: impl Into<String>) -> Self {
        Self::UnresolvedFood {
            reference: reference.into(),
        }
    }

    /// Create an "invalid serving size" error
    #[must_use]
    pub fn invalid_serving(serving: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidServingSize {
            serving: serving.into(),
            reason: reason.into(),
        }
    }

    /// Create a "malformed reference" error
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedReference {
            reason: reason.into(),
        }
    }

    /// Create a "duplicate condition" error
    #[must_use]
    pub fn duplicate_condition(name: impl Into<String>) -> Self {
        Self::DuplicateCondition { name: name.into() }
    }

    /// Create an "invalid condition" error
    #[must_use]
    pub fn invalid_condition(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCondition {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Error code this variant maps to
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnresolvedFood { .. } => ErrorCode::ResourceNotFound,
            Self::InvalidServingSize { .. } | Self::InvalidCondition { .. } => {
                ErrorCode::InvalidInput
            }
            Self::MalformedReference { .. } => ErrorCode::InvalidFormat,
            Self::DuplicateCondition { .. } => ErrorCode::ResourceAlreadyExists,
        }
    }
}

impl From<ScanError> for AppError {
    fn from(error: ScanError) -> Self {
        let code = error.code();
        let app = Self::new(code, error.to_string());
        match &error {
            ScanError::InvalidServingSize { serving, .. } => {
                app.with_detail("serving_size", serving.as_str())
            }
            ScanError::DuplicateCondition { name } | ScanError::InvalidCondition { name, .. } => {
                app.with_resource_id(name.as_str())
            }
            ScanError::UnresolvedFood { .. } | ScanError::MalformedReference { .. } => app,
        }
    }
}

/// Transport or parse failure inside a single nutrition source
#[derive(Debug, Clone, Error)]
#[error("{source_name} provider error: {message}")]
pub struct ProviderError {
    /// Name of the failing source (for logs only)
    pub source_name: String,
    /// Internal failure detail (for logs only)
    pub message: String,
    /// Whether the upstream throttled the call
    pub rate_limited: bool,
}

impl ProviderError {
    /// Create a provider error
    #[must_use]
    pub fn new(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            message: message.into(),
            rate_limited: false,
        }
    }

    /// Create a provider error caused by upstream throttling
    #[must_use]
    pub fn rate_limited(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            message: "rate limit exceeded".to_owned(),
            rate_limited: true,
        }
    }
}

/// Provider detail stays internal: callers only see which service failed.
impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> Self {
        let code = if error.rate_limited {
            ErrorCode::ExternalRateLimited
        } else {
            ErrorCode::ExternalServiceError
        };
        Self::new(code, format!("{} is unavailable", error.source_name))
    }
}
