// ABOUTME: Nutrition source abstraction used by the resolver's ranked fallback chain
// ABOUTME: Local database, external food databases and the AI estimator behind one trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrition Sources
//!
//! Every source answers the same question: "what are the nutrients of this
//! food?" A source returns `Ok(None)` when it has no data for the reference
//! and `Err(ProviderError)` when it could not find out. The resolver treats
//! both as "try the next source", unless the source offers a
//! [`NutritionSource::terminal_fallback`].

mod ai;
mod external;
mod local;

pub use ai::{
    fallback_candidate, parse_estimate, parse_label, AiEstimator, FoodIdentification,
    UNIDENTIFIED_FOOD, UNREADABLE_LABEL,
};
pub use external::ExternalFoodSource;
pub use local::LocalDatabaseSource;

use async_trait::async_trait;
use bitflags::bitflags;
use nutriscan_core::errors::ProviderError;
use nutriscan_core::models::{FoodReference, NutritionCandidate, ReferenceKind, SourceKind};
use std::sync::Arc;

bitflags! {
    /// Reference kinds a source can answer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SourceCapabilities: u8 {
        /// Free-text food names
        const NAME = 0b0000_0001;
        /// Product barcodes
        const BARCODE = 0b0000_0010;
        /// Food photos
        const IMAGE = 0b0000_0100;
        /// Nutrition label photos
        const LABEL = 0b0000_1000;
    }
}

impl SourceCapabilities {
    /// Whether references of `kind` can be answered
    #[must_use]
    pub const fn supports(self, kind: ReferenceKind) -> bool {
        let flag = match kind {
            ReferenceKind::Text => Self::NAME,
            ReferenceKind::Barcode => Self::BARCODE,
            ReferenceKind::Image => Self::IMAGE,
            ReferenceKind::NutritionLabel => Self::LABEL,
        };
        self.contains(flag)
    }
}

/// One place nutrition data can come from
#[async_trait]
pub trait NutritionSource: Send + Sync {
    /// Source name for logs
    fn name(&self) -> &'static str;

    /// Provenance attached to candidates from this source
    fn kind(&self) -> SourceKind;

    /// Reference kinds this source can answer
    fn capabilities(&self) -> SourceCapabilities;

    /// Look up a food.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, parse or storage failures.
    async fn resolve(
        &self,
        reference: &FoodReference,
    ) -> Result<Option<NutritionCandidate>, ProviderError>;

    /// Answer used when this source fails or runs out of time.
    ///
    /// Ordinary sources have none and are simply skipped. A terminal source
    /// returns a candidate here so resolution still succeeds.
    fn terminal_fallback(&self, _reference: &FoodReference) -> Option<NutritionCandidate> {
        None
    }
}

/// Shared handle to a source
pub type SharedSource = Arc<dyn NutritionSource>;
