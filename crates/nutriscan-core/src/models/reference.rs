// ABOUTME: Food reference union (name, barcode, image) with construction-time validation
// ABOUTME: Rejects empty, ambiguous and structurally invalid references before resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::ScanError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Barcode lengths accepted (EAN-8, UPC-A, EAN-13, GTIN-14)
pub const VALID_BARCODE_LENGTHS: [usize; 4] = [8, 12, 13, 14];

/// What an uploaded photo shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    /// A plate, a dish or a piece of food
    #[default]
    Food,
    /// A printed nutrition facts panel
    NutritionLabel,
}

/// Uploaded food photo
#[derive(Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// MIME type (`image/jpeg`, `image/png`, ...)
    pub mime_type: String,
    /// Optional caller hint ("breakfast plate", "packaged snack")
    pub context: Option<String>,
    /// Food photo or nutrition label
    pub kind: ImageKind,
}

impl ImageInput {
    /// Food photo with the default JPEG MIME type
    #[must_use]
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "image/jpeg".to_owned(),
            context: None,
            kind: ImageKind::Food,
        }
    }

    /// Attach a caller hint
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Mark the photo as a nutrition facts label
    #[must_use]
    pub fn as_label(mut self) -> Self {
        self.kind = ImageKind::NutritionLabel;
        self
    }

    /// Whether the photo is a nutrition facts label
    #[must_use]
    pub fn is_label(&self) -> bool {
        self.kind == ImageKind::NutritionLabel
    }
}

impl fmt::Debug for ImageInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageInput")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("mime_type", &self.mime_type)
            .field("context", &self.context)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Exactly one way of pointing at a food
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoodReference {
    /// Free-text food name
    ByName(String),
    /// Product barcode
    ByBarcode(String),
    /// Food photo or nutrition label
    ByImage(ImageInput),
}

/// Kind of reference, recorded in scan history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Free-text name
    Text,
    /// Barcode
    Barcode,
    /// Food photo
    Image,
    /// Nutrition label photo
    NutritionLabel,
}

impl ReferenceKind {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Barcode => "barcode",
            Self::Image => "image",
            Self::NutritionLabel => "nutrition_label",
        }
    }
}

/// Serializable summary of a reference (images are summarized, not embedded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSummary {
    /// Reference kind
    pub kind: ReferenceKind,
    /// Name, barcode, or an image descriptor
    pub value: String,
}

impl FoodReference {
    /// Build a reference from optional request fields.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::MalformedReference`] unless exactly one field is
    /// populated and that field is valid.
    pub fn from_parts(
        name: Option<String>,
        barcode: Option<String>,
        image: Option<ImageInput>,
    ) -> Result<Self, ScanError> {
        let reference = match (name, barcode, image) {
            (Some(name), None, None) => Self::ByName(name),
            (None, Some(barcode), None) => Self::ByBarcode(barcode),
            (None, None, Some(image)) => Self::ByImage(image),
            (None, None, None) => {
                return Err(ScanError::malformed(
                    "one of name, barcode or image is required",
                ))
            }
            _ => {
                return Err(ScanError::malformed(
                    "only one of name, barcode or image may be provided",
                ))
            }
        };
        reference.validate()?;
        Ok(reference)
    }

    /// Check the populated variant.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::MalformedReference`] for an empty name, a barcode
    /// that is not 8, 12, 13 or 14 digits, or an empty image.
    pub fn validate(&self) -> Result<(), ScanError> {
        match self {
            Self::ByName(name) if name.trim().is_empty() => {
                Err(ScanError::malformed("food name is empty"))
            }
            Self::ByBarcode(code) => validate_barcode(code),
            Self::ByImage(image) if image.bytes.is_empty() => {
                Err(ScanError::malformed("image is empty"))
            }
            _ => Ok(()),
        }
    }

    /// Reference kind
    #[must_use]
    pub fn kind(&self) -> ReferenceKind {
        match self {
            Self::ByName(_) => ReferenceKind::Text,
            Self::ByBarcode(_) => ReferenceKind::Barcode,
            Self::ByImage(image) if image.is_label() => ReferenceKind::NutritionLabel,
            Self::ByImage(_) => ReferenceKind::Image,
        }
    }

    /// Trimmed food name for name references
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::ByName(name) => Some(name.trim()),
            _ => None,
        }
    }

    /// Trimmed barcode for barcode references
    #[must_use]
    pub fn barcode(&self) -> Option<&str> {
        match self {
            Self::ByBarcode(code) => Some(code.trim()),
            _ => None,
        }
    }

    /// Serializable summary
    #[must_use]
    pub fn summary(&self) -> ReferenceSummary {
        let value = match self {
            Self::ByName(name) => name.trim().to_owned(),
            Self::ByBarcode(code) => code.trim().to_owned(),
            Self::ByImage(image) => format!("{} ({} bytes)", image.mime_type, image.bytes.len()),
        };
        ReferenceSummary {
            kind: self.kind(),
            value,
        }
    }
}

impl fmt::Display for FoodReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary();
        write!(f, "{} '{}'", summary.kind.as_str(), summary.value)
    }
}

/// Digits only, standard retail lengths.
///
/// # Errors
///
/// Returns [`ScanError::MalformedReference`] describing the problem.
pub fn validate_barcode(code: &str) -> Result<(), ScanError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ScanError::malformed("barcode is empty"));
    }
    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ScanError::malformed("barcode must contain only digits"));
    }
    if !VALID_BARCODE_LENGTHS.contains(&code.len()) {
        return Err(ScanError::malformed(format!(
            "barcode must be 8, 12, 13 or 14 digits, got {}",
            code.len()
        )));
    }
    Ok(())
}
