// ABOUTME: AI nutrition estimator, the terminal fallback that always produces a candidate
// ABOUTME: Identifies foods from photos and estimates per-100g nutrients through an LLM provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # AI Estimator
//!
//! Never answers "not found". When the LLM is missing, fails, times out or
//! replies with something unparseable, the estimator returns a generic
//! fallback candidate flagged with `is_fallback` so the resolver knows not to
//! learn it.
//!
//! A food photo takes two LLM calls: identify, then estimate. Between them
//! the identified name is looked up in the lookup sources (the local and
//! external databases), so a recognized food the store already knows is
//! served from the store. A nutrition label photo takes a single call that
//! transcribes the printed values. Every path runs inside one overall
//! budget, see [`AiEstimator::budget`].

use super::{NutritionSource, SharedSource, SourceCapabilities};
use crate::config::{AiConfig, ScannerConfig, SourceConfidenceConfig};
use crate::llm::prompts::{
    estimation_prompt, extract_json_block, identification_prompt, label_prompt,
    NUTRITIONIST_SYSTEM_PROMPT,
};
use crate::llm::{ChatMessage, ChatRequest, GeminiProvider, ImageAttachment, LlmProvider};
use async_trait::async_trait;
use nutriscan_core::errors::ProviderError;
use nutriscan_core::models::{
    FoodIdentity, FoodRating, FoodReference, ImageInput, NutriScore, Nutrient, NutrientValues,
    NutritionCandidate, ReferenceKind, SourceKind, REFERENCE_GRAMS,
};
use nutriscan_core::ServingSize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};

const AI_SOURCE: &str = "AI estimator";

/// Name used when a photo could not be identified
pub const UNIDENTIFIED_FOOD: &str = "Unidentified Food Item";

/// Name used when a nutrition label could not be read
pub const UNREADABLE_LABEL: &str = "Unreadable Nutrition Label";

/// Name used when a readable label shows no product name
const UNNAMED_LABEL_PRODUCT: &str = "Labeled Product";

/// LLM calls on the longest path (identify, then estimate)
const MAX_CALLS_PER_REFERENCE: u32 = 2;

/// Generic per-100g values used when no real estimate is available
const FALLBACK_VALUES: &[(Nutrient, f64)] = &[
    (Nutrient::Calories, 200.0),
    (Nutrient::ProteinG, 5.0),
    (Nutrient::CarbohydratesG, 30.0),
    (Nutrient::FatG, 8.0),
    (Nutrient::FiberG, 2.0),
    (Nutrient::SugarG, 5.0),
    (Nutrient::SodiumMg, 300.0),
    (Nutrient::PotassiumMg, 200.0),
    (Nutrient::VitaminCMg, 2.0),
    (Nutrient::CalciumMg, 50.0),
    (Nutrient::IronMg, 1.0),
];

/// Food recognized in a photo
#[derive(Debug, Clone, PartialEq)]
pub struct FoodIdentification {
    /// Recognized food name
    pub food_name: String,
    /// Model-reported confidence
    pub confidence: f64,
    /// Category, when given
    pub category: Option<String>,
    /// Likely ingredients joined with commas
    pub ingredients: Option<String>,
}

/// Generic candidate returned when no real estimate is possible
#[must_use]
pub fn fallback_candidate(identity: FoodIdentity, confidence: f64) -> NutritionCandidate {
    let values = FALLBACK_VALUES
        .iter()
        .fold(NutrientValues::default(), |values, (nutrient, amount)| {
            values.with(*nutrient, *amount)
        });
    NutritionCandidate {
        is_fallback: true,
        ..NutritionCandidate::per_100g(identity, values, confidence, SourceKind::AiEstimate)
    }
}

/// Plain number, numeric string, or nothing; negatives and non-finite values become 0
fn lenient_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Some(if number.is_finite() && number > 0.0 { number } else { 0.0 })
}

fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            Some(joined).filter(|s| !s.is_empty())
        }
        _ => None,
    }
}

fn parse_object(reply: &str) -> Result<Map<String, Value>, ProviderError> {
    match serde_json::from_str(extract_json_block(reply)) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ProviderError::new(AI_SOURCE, "reply is not a JSON object")),
        Err(e) => Err(ProviderError::new(AI_SOURCE, format!("JSON parse error: {e}"))),
    }
}

/// Catalog nutrients from a reply object; missing core macros become 0
fn nutrient_values(object: &Map<String, Value>) -> NutrientValues {
    let mut values = NutrientValues::default();
    for nutrient in Nutrient::ALL {
        match lenient_number(object.get(nutrient.as_str())) {
            Some(amount) => values.set(nutrient, amount),
            None if nutrient.is_core() => values.set(nutrient, 0.0),
            None => {}
        }
    }
    values
}

fn reported_confidence(object: &Map<String, Value>, config: &AiConfig, ceiling: f64) -> f64 {
    lenient_number(object.get("confidence"))
        .unwrap_or(config.min_confidence)
        .clamp(config.min_confidence, config.max_confidence)
        .min(ceiling)
}

fn rating(object: &Map<String, Value>) -> FoodRating {
    FoodRating {
        nutri_score: text_field(object, "nutri_score")
            .as_deref()
            .and_then(NutriScore::parse),
        glycemic_load_index: lenient_number(object.get("glycemic_load_index")),
    }
}

/// Parse an estimation reply into a candidate for `food_name`.
///
/// Core macros default to 0 when missing. Confidence is clamped to the
/// configured bounds and capped at `ceiling`.
///
/// # Errors
///
/// Returns [`ProviderError`] when the reply holds no JSON object.
pub fn parse_estimate(
    reply: &str,
    food_name: &str,
    config: &AiConfig,
    ceiling: f64,
) -> Result<NutritionCandidate, ProviderError> {
    let object = parse_object(reply)?;
    let identity = FoodIdentity {
        name: food_name.trim().to_owned(),
        brand: None,
        barcode: None,
        ingredients: text_field(&object, "ingredients"),
        category: text_field(&object, "category"),
    };
    Ok(NutritionCandidate::per_100g(
        identity,
        nutrient_values(&object),
        reported_confidence(&object, config, ceiling),
        SourceKind::AiEstimate,
    )
    .with_rating(rating(&object)))
}

/// Parse a label transcription into a candidate at the printed serving.
///
/// The printed serving becomes the candidate's native weight; when it cannot
/// be read the values are taken as per 100 g.
///
/// # Errors
///
/// Returns [`ProviderError`] when the reply holds no JSON object or no energy
/// value.
pub fn parse_label(
    reply: &str,
    config: &AiConfig,
    ceiling: f64,
) -> Result<NutritionCandidate, ProviderError> {
    let object = parse_object(reply)?;
    if lenient_number(object.get("calories")).is_none() {
        return Err(ProviderError::new(AI_SOURCE, "label shows no calories"));
    }

    let native_grams = text_field(&object, "serving_size")
        .and_then(|printed| ServingSize::parse(&printed).ok())
        .map_or(REFERENCE_GRAMS, |serving| serving.grams());
    let identity = FoodIdentity {
        name: text_field(&object, "product_name")
            .unwrap_or_else(|| UNNAMED_LABEL_PRODUCT.to_owned()),
        brand: text_field(&object, "brand"),
        barcode: None,
        ingredients: text_field(&object, "ingredients"),
        category: None,
    };
    Ok(NutritionCandidate {
        native_grams,
        ..NutritionCandidate::per_100g(
            identity,
            nutrient_values(&object),
            reported_confidence(&object, config, ceiling),
            SourceKind::AiEstimate,
        )
    })
}

fn parse_identification(reply: &str) -> Result<FoodIdentification, ProviderError> {
    let object = parse_object(reply)?;
    let food_name = text_field(&object, "food_name")
        .ok_or_else(|| ProviderError::new(AI_SOURCE, "identification has no food_name"))?;
    Ok(FoodIdentification {
        food_name,
        confidence: lenient_number(object.get("confidence"))
            .unwrap_or(0.0)
            .clamp(0.0, 1.0),
        category: text_field(&object, "category"),
        ingredients: text_field(&object, "ingredients"),
    })
}

/// LLM-backed nutrition estimator
pub struct AiEstimator {
    provider: Option<Arc<dyn LlmProvider>>,
    lookups: Vec<SharedSource>,
    lookup_timeout: Duration,
    config: AiConfig,
    ceiling: f64,
}

impl AiEstimator {
    /// Estimator over an optional provider; `None` always yields fallbacks
    #[must_use]
    pub fn new(
        provider: Option<Arc<dyn LlmProvider>>,
        config: AiConfig,
        confidence: &SourceConfidenceConfig,
    ) -> Self {
        Self {
            provider,
            lookups: Vec::new(),
            lookup_timeout: Duration::from_secs(config.timeout_secs),
            config,
            ceiling: confidence.for_source(SourceKind::AiEstimate),
        }
    }

    /// Gemini-backed estimator when an API key is configured
    #[must_use]
    pub fn from_config(config: &ScannerConfig) -> Self {
        let call_timeout = Duration::from_secs(config.ai.timeout_secs);
        let provider = config.ai.api_key.as_ref().map(|key| {
            let gemini = GeminiProvider::with_timeout(key.clone(), call_timeout)
                .with_default_model(config.ai.model.clone());
            Arc::new(gemini) as Arc<dyn LlmProvider>
        });
        Self::new(provider, config.ai.clone(), &config.confidence)
            .with_lookup_timeout(config.resolver.adapter_timeout())
    }

    /// Source consulted with the name identified in a photo, in the order added
    #[must_use]
    pub fn with_lookup(mut self, source: SharedSource) -> Self {
        self.lookups.push(source);
        self
    }

    /// Time allowed for each lookup
    #[must_use]
    pub const fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    /// Whether an LLM provider is attached
    #[must_use]
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Longest time one reference may take: every LLM call on the photo path
    /// plus every lookup. Past it the estimator answers with a fallback.
    #[must_use]
    pub fn budget(&self) -> Duration {
        let lookups = u32::try_from(self.lookups.len()).unwrap_or(u32::MAX);
        self.call_timeout()
            .saturating_mul(MAX_CALLS_PER_REFERENCE)
            .saturating_add(self.lookup_timeout.saturating_mul(lookups))
    }

    fn fallback(&self, identity: FoodIdentity) -> NutritionCandidate {
        fallback_candidate(identity, self.config.fallback_confidence.min(self.ceiling))
    }

    /// Generic answer for any reference, without calling the provider
    fn fallback_for(&self, reference: &FoodReference) -> NutritionCandidate {
        match reference {
            FoodReference::ByName(name) => self.fallback(FoodIdentity::named(name.trim())),
            FoodReference::ByBarcode(code) => {
                let code = code.trim();
                self.fallback(FoodIdentity {
                    barcode: Some(code.to_owned()),
                    ..FoodIdentity::named(format!("Unknown product {code}"))
                })
            }
            FoodReference::ByImage(image) if image.is_label() => {
                self.fallback(FoodIdentity::named(UNREADABLE_LABEL))
            }
            FoodReference::ByImage(_) => self.fallback(FoodIdentity::named(UNIDENTIFIED_FOOD)),
        }
    }

    fn vision_provider(&self) -> Result<(), ProviderError> {
        match &self.provider {
            Some(provider) if !provider.capabilities().supports_vision() => Err(
                ProviderError::new(provider.name(), "provider does not support image input"),
            ),
            _ => Ok(()),
        }
    }

    async fn ask(&self, request: ChatRequest, deadline: Instant) -> Result<String, ProviderError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| ProviderError::new(AI_SOURCE, "no LLM provider configured"))?;
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ProviderError::new(AI_SOURCE, "time budget exhausted"));
        }
        let request = request
            .with_model(self.config.model.clone())
            .with_temperature(self.config.temperature)
            .with_json_output();

        match timeout(self.call_timeout().min(remaining), provider.complete(&request)).await {
            Ok(Ok(response)) => Ok(response.content),
            Ok(Err(e)) => Err(ProviderError::new(provider.name(), e.to_string())),
            Err(_) => Err(ProviderError::new(provider.name(), "LLM call timed out")),
        }
    }

    /// Best-effort per-100g estimate for a food name; never fails
    pub async fn estimate_by_name(&self, name: &str) -> NutritionCandidate {
        self.estimate_until(name, Instant::now() + self.budget())
            .await
    }

    async fn estimate_until(&self, name: &str, deadline: Instant) -> NutritionCandidate {
        let request = ChatRequest::new(vec![
            ChatMessage::system(NUTRITIONIST_SYSTEM_PROMPT),
            ChatMessage::user(estimation_prompt(name)),
        ]);
        let estimate = match self.ask(request, deadline).await {
            Ok(reply) => parse_estimate(&reply, name, &self.config, self.ceiling),
            Err(e) => Err(e),
        };
        estimate.unwrap_or_else(|e| {
            warn!(food = name, error = %e, "AI estimation failed, using fallback values");
            self.fallback(FoodIdentity::named(name.trim()))
        })
    }

    /// Recognize the main food in a photo
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when no vision-capable provider is
    /// configured, the call fails, or the reply cannot be parsed.
    pub async fn identify_food(
        &self,
        image: &ImageInput,
    ) -> Result<FoodIdentification, ProviderError> {
        self.identify_until(image, Instant::now() + self.call_timeout())
            .await
    }

    async fn identify_until(
        &self,
        image: &ImageInput,
        deadline: Instant,
    ) -> Result<FoodIdentification, ProviderError> {
        self.vision_provider()?;
        let request = ChatRequest::new(vec![
            ChatMessage::system(NUTRITIONIST_SYSTEM_PROMPT),
            ChatMessage::user(identification_prompt(image.context.as_deref())).with_image(
                ImageAttachment::new(image.mime_type.clone(), image.bytes.clone()),
            ),
        ]);
        let reply = self.ask(request, deadline).await?;
        parse_identification(&reply)
    }

    /// Transcribe a nutrition facts label; values refer to the printed serving
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when no vision-capable provider is
    /// configured, the call fails, or the label cannot be read.
    pub async fn read_label(&self, image: &ImageInput) -> Result<NutritionCandidate, ProviderError> {
        self.read_label_until(image, Instant::now() + self.call_timeout())
            .await
    }

    async fn read_label_until(
        &self,
        image: &ImageInput,
        deadline: Instant,
    ) -> Result<NutritionCandidate, ProviderError> {
        self.vision_provider()?;
        let request = ChatRequest::new(vec![
            ChatMessage::system(NUTRITIONIST_SYSTEM_PROMPT),
            ChatMessage::user(label_prompt(image.context.as_deref())).with_image(
                ImageAttachment::new(image.mime_type.clone(), image.bytes.clone()),
            ),
        ]);
        let reply = self.ask(request, deadline).await?;
        parse_label(&reply, &self.config, self.ceiling)
    }

    /// First lookup source that knows `name`, within the deadline
    async fn look_up(&self, name: &str, deadline: Instant) -> Option<NutritionCandidate> {
        let reference = FoodReference::ByName(name.to_owned());
        for lookup in &self.lookups {
            if !lookup.capabilities().supports(ReferenceKind::Text) {
                continue;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            match timeout(remaining.min(self.lookup_timeout), lookup.resolve(&reference)).await {
                Ok(Ok(Some(candidate))) => {
                    debug!(food = name, source = lookup.name(), "Identified food already known");
                    return Some(candidate);
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => debug!(source = lookup.name(), error = %e, "Lookup failed"),
                Err(_) => debug!(source = lookup.name(), "Lookup timed out"),
            }
        }
        None
    }

    async fn estimate_from_image(&self, image: &ImageInput, deadline: Instant) -> NutritionCandidate {
        let identification = match self.identify_until(image, deadline).await {
            Ok(identification) => identification,
            Err(e) => {
                warn!(error = %e, "Food identification failed, using fallback values");
                return self.fallback(FoodIdentity::named(UNIDENTIFIED_FOOD));
            }
        };
        debug!(
            food = %identification.food_name,
            confidence = identification.confidence,
            "Identified food in image"
        );
        if identification.confidence < self.config.recognition_threshold {
            warn!(
                food = %identification.food_name,
                confidence = identification.confidence,
                threshold = self.config.recognition_threshold,
                "Identification below recognition threshold, using fallback values"
            );
            return self.fallback(FoodIdentity::named(UNIDENTIFIED_FOOD));
        }

        if let Some(known) = self.look_up(&identification.food_name, deadline).await {
            return known;
        }

        let mut candidate = self
            .estimate_until(&identification.food_name, deadline)
            .await;
        if !candidate.is_fallback {
            let recognized = identification.confidence.max(self.config.min_confidence);
            candidate.confidence = candidate.confidence.min(recognized);
        }
        if candidate.identity.ingredients.is_none() {
            candidate.identity.ingredients = identification.ingredients;
        }
        if candidate.identity.category.is_none() {
            candidate.identity.category = identification.category;
        }
        candidate
    }

    async fn estimate_from_label(&self, image: &ImageInput, deadline: Instant) -> NutritionCandidate {
        self.read_label_until(image, deadline)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Nutrition label extraction failed, using fallback values");
                self.fallback(FoodIdentity::named(UNREADABLE_LABEL))
            })
    }
}

#[async_trait]
impl NutritionSource for AiEstimator {
    fn name(&self) -> &'static str {
        AI_SOURCE
    }

    fn kind(&self) -> SourceKind {
        SourceKind::AiEstimate
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::all()
    }

    async fn resolve(
        &self,
        reference: &FoodReference,
    ) -> Result<Option<NutritionCandidate>, ProviderError> {
        let deadline = Instant::now() + self.budget();
        let candidate = match reference {
            FoodReference::ByName(name) => self.estimate_until(name, deadline).await,
            FoodReference::ByImage(image) if image.is_label() => {
                self.estimate_from_label(image, deadline).await
            }
            FoodReference::ByImage(image) => self.estimate_from_image(image, deadline).await,
            // A bare barcode gives the model nothing to estimate from
            FoodReference::ByBarcode(_) => self.fallback_for(reference),
        };
        Ok(Some(candidate))
    }

    fn terminal_fallback(&self, reference: &FoodReference) -> Option<NutritionCandidate> {
        Some(self.fallback_for(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ai_config() -> AiConfig {
        AiConfig::default()
    }

    #[test]
    fn test_parse_fenced_estimate() {
        let reply = "```json\n{\"food_name\": \"Mango\", \"calories\": 60, \"protein_g\": \"0.8\", \
                     \"carbohydrates_g\": 15, \"fat_g\": 0.4, \"fiber_g\": 1.6, \"vitamin_c_mg\": 36.4, \
                     \"category\": \"fruit\", \"ingredients\": [\"mango\"], \"confidence\": 0.95}\n```";
        let candidate = parse_estimate(reply, "mango", &ai_config(), 0.6).unwrap();

        assert_eq!(candidate.identity.name, "mango");
        assert_eq!(candidate.identity.category.as_deref(), Some("fruit"));
        assert!((candidate.values.calories - 60.0).abs() < 1e-9);
        assert!((candidate.values.protein_g - 0.8).abs() < 1e-9);
        assert!((candidate.values.get(Nutrient::VitaminCMg).unwrap() - 36.4).abs() < 1e-9);
        // 0.95 clamps to 0.8, then the source ceiling applies
        assert!((candidate.confidence - 0.6).abs() < 1e-9);
        assert!(!candidate.is_fallback);
    }

    #[test]
    fn test_negative_and_invalid_numbers_become_zero() {
        let reply = r#"{"calories": -20, "protein_g": "trace", "fat_g": 1, "confidence": 0.01}"#;
        let candidate = parse_estimate(reply, "mystery", &ai_config(), 0.6).unwrap();
        assert!(candidate.values.calories.abs() < 1e-9);
        assert!(candidate.values.protein_g.abs() < 1e-9);
        assert!(candidate.values.carbohydrates_g.abs() < 1e-9);
        assert!((candidate.confidence - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_unparseable_reply_is_error() {
        assert!(parse_estimate("I cannot help with that", "x", &ai_config(), 0.6).is_err());
    }

    #[test]
    fn test_fallback_candidate_values() {
        let candidate = fallback_candidate(FoodIdentity::named("stew"), 0.3);
        assert!(candidate.is_fallback);
        assert_eq!(candidate.source, SourceKind::AiEstimate);
        assert!((candidate.values.calories - 200.0).abs() < 1e-9);
        assert_eq!(candidate.values.sodium_mg, Some(300.0));
    }

    #[tokio::test]
    async fn test_without_provider_every_reference_resolves() {
        let estimator = AiEstimator::new(None, ai_config(), &SourceConfidenceConfig::default());

        let by_name = estimator
            .resolve(&FoodReference::ByName("apple".to_owned()))
            .await
            .unwrap()
            .unwrap();
        assert!(by_name.is_fallback);
        assert_eq!(by_name.identity.name, "apple");

        let by_barcode = estimator
            .resolve(&FoodReference::ByBarcode("12345678".to_owned()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_barcode.identity.name, "Unknown product 12345678");

        let by_image = estimator
            .resolve(&FoodReference::ByImage(ImageInput::jpeg(vec![1, 2, 3])))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_image.identity.name, UNIDENTIFIED_FOOD);

        let by_label = estimator
            .resolve(&FoodReference::ByImage(ImageInput::jpeg(vec![1, 2, 3]).as_label()))
            .await
            .unwrap()
            .unwrap();
        assert!(by_label.is_fallback);
        assert_eq!(by_label.identity.name, UNREADABLE_LABEL);
    }

    #[test]
    fn test_estimate_reads_nutri_score_and_glycemic_load() {
        let reply = r#"{"calories": 52, "nutri_score": "a", "glycemic_load_index": 6}"#;
        let candidate = parse_estimate(reply, "apple", &ai_config(), 0.6).unwrap();
        assert_eq!(candidate.rating.nutri_score, Some(NutriScore::A));
        assert_eq!(candidate.rating.glycemic_load_index, Some(6.0));

        let template_echo = r#"{"calories": 52, "nutri_score": "A | B | C | D | E"}"#;
        let candidate = parse_estimate(template_echo, "apple", &ai_config(), 0.6).unwrap();
        assert!(candidate.rating.is_empty());
    }

    #[test]
    fn test_label_values_refer_to_printed_serving() {
        let reply = r#"{"product_name": "Oat Crunch", "brand": "Acme",
            "serving_size": "1 cup (40g)", "calories": 150, "protein_g": 4,
            "carbohydrates_g": 27, "fat_g": 3, "sodium_mg": 190,
            "ingredients": ["whole grain oats", "sugar"], "confidence": 0.9}"#;
        let candidate = parse_label(reply, &ai_config(), 0.6).unwrap();

        assert_eq!(candidate.identity.name, "Oat Crunch");
        assert_eq!(candidate.identity.brand.as_deref(), Some("Acme"));
        assert_eq!(
            candidate.identity.ingredients.as_deref(),
            Some("whole grain oats, sugar")
        );
        assert!((candidate.native_grams - 40.0).abs() < 1e-9);
        assert!((candidate.values.calories - 150.0).abs() < 1e-9);
        assert!((candidate.confidence - 0.6).abs() < 1e-9);
        assert!(!candidate.is_fallback);
    }

    #[test]
    fn test_label_without_serving_or_energy() {
        let per_100g = parse_label(r#"{"calories": 380}"#, &ai_config(), 0.6).unwrap();
        assert_eq!(per_100g.identity.name, UNNAMED_LABEL_PRODUCT);
        assert!((per_100g.native_grams - 100.0).abs() < 1e-9);

        assert!(parse_label(r#"{"product_name": "Blurry"}"#, &ai_config(), 0.6).is_err());
    }

    #[test]
    fn test_budget_covers_two_calls_and_lookups() {
        let config = AiConfig {
            timeout_secs: 5,
            ..ai_config()
        };
        let estimator = AiEstimator::new(None, config, &SourceConfidenceConfig::default())
            .with_lookup_timeout(Duration::from_secs(1));
        assert_eq!(estimator.budget(), Duration::from_secs(10));
    }
}
