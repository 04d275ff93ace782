// ABOUTME: Scanner configuration loaded from environment variables with validation
// ABOUTME: Covers source confidences, resolver behavior, external APIs, AI, scoring, history and storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Scanner Configuration
//!
//! Every value has a default and may be overridden by an environment variable.
//! [`ScannerConfig::global`] loads once per process; tests and embedders build
//! a config explicitly and pass it to the orchestrator instead.

use nutriscan_core::models::SourceKind;
use nutriscan_health::config::{ConfigError, ScoringConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{info, warn};

static SCANNER_CONFIG: OnceLock<ScannerConfig> = OnceLock::new();

/// Default Open Food Facts host
pub const DEFAULT_OPEN_FOOD_FACTS_URL: &str = "https://world.openfoodfacts.org";

/// Default USDA `FoodData` Central API root
pub const DEFAULT_USDA_URL: &str = "https://api.nal.usda.gov/fdc/v1";

/// Default Gemini model for identification and estimation
pub const DEFAULT_AI_MODEL: &str = "gemini-2.5-flash";

/// Complete scanner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Default confidence per source
    pub confidence: SourceConfidenceConfig,
    /// Resolution pipeline behavior
    pub resolver: ResolverConfig,
    /// Open Food Facts barcode lookups
    pub external_db: ExternalDbConfig,
    /// USDA `FoodData` Central name lookups
    pub usda: UsdaApiConfig,
    /// AI estimator
    pub ai: AiConfig,
    /// Health scoring
    pub scoring: ScoringConfig,
    /// Scan history
    pub history: HistoryConfig,
    /// Local food store
    pub database: DatabaseConfig,
}

/// Default confidence attached to each source's results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfidenceConfig {
    /// Local database records (0.95)
    pub database: f64,
    /// External food database products (0.85)
    pub external_db: f64,
    /// AI estimates (0.6)
    pub ai_estimate: f64,
}

impl Default for SourceConfidenceConfig {
    fn default() -> Self {
        Self {
            database: 0.95,
            external_db: 0.85,
            ai_estimate: 0.6,
        }
    }
}

impl SourceConfidenceConfig {
    /// Confidence for a source kind
    #[must_use]
    pub const fn for_source(&self, source: SourceKind) -> f64 {
        match source {
            SourceKind::Database => self.database,
            SourceKind::ExternalDb => self.external_db,
            SourceKind::AiEstimate => self.ai_estimate,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for value in [self.database, self.external_db, self.ai_estimate] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidRange(
                    "source confidences must be between 0 and 1",
                ));
            }
        }
        if self.database < self.external_db || self.external_db < self.ai_estimate {
            return Err(ConfigError::InvalidWeights(
                "source confidences must satisfy database >= external_db >= ai_estimate",
            ));
        }
        Ok(())
    }
}

/// Resolution pipeline behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Upper bound for a single source call, in milliseconds (8000)
    pub adapter_timeout_ms: u64,
    /// Consult the AI estimator when the databases miss (true)
    pub ai_fallback_enabled: bool,
    /// Persist AI estimates to the local store (true)
    pub learning_enabled: bool,
    /// Confidence stored on learned records (0.5)
    pub learned_record_confidence: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            adapter_timeout_ms: 8000,
            ai_fallback_enabled: true,
            learning_enabled: true,
            learned_record_confidence: 0.5,
        }
    }
}

impl ResolverConfig {
    /// Per-source timeout
    #[must_use]
    pub const fn adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.adapter_timeout_ms)
    }
}

/// Open Food Facts settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalDbConfig {
    /// Barcode lookups enabled (true)
    pub enabled: bool,
    /// API host
    pub base_url: String,
    /// User agent the API asks clients to send
    pub user_agent: String,
    /// HTTP timeout in seconds (10)
    pub timeout_secs: u64,
    /// Product cache TTL in seconds (3600)
    pub cache_ttl_secs: u64,
    /// Products kept in the cache (500)
    pub max_cache_items: usize,
    /// Requests allowed per minute (60)
    pub rate_limit_per_minute: u32,
}

impl Default for ExternalDbConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_OPEN_FOOD_FACTS_URL.to_owned(),
            user_agent: format!("nutriscan/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 10,
            cache_ttl_secs: 3600,
            max_cache_items: 500,
            rate_limit_per_minute: 60,
        }
    }
}

/// USDA `FoodData` Central settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsdaApiConfig {
    /// API key; name lookups are skipped without one
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API root
    pub base_url: String,
    /// HTTP timeout in seconds (10)
    pub timeout_secs: u64,
    /// Cache TTL in seconds (86400)
    pub cache_ttl_secs: u64,
    /// Entries kept per cache (1000)
    pub max_cache_items: usize,
    /// Requests allowed per minute (30)
    pub rate_limit_per_minute: u32,
}

impl Default for UsdaApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_USDA_URL.to_owned(),
            timeout_secs: 10,
            cache_ttl_secs: 86_400,
            max_cache_items: 1000,
            rate_limit_per_minute: 30,
        }
    }
}

/// AI estimator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Gemini API key; without one the estimator only returns fallback values
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Sampling temperature (0.2)
    pub temperature: f32,
    /// Timeout of one LLM call in seconds (30); a photo takes two calls
    pub timeout_secs: u64,
    /// Identification confidence a photo needs before its food name is used (0.6)
    pub recognition_threshold: f64,
    /// Lowest confidence an estimate may report (0.1)
    pub min_confidence: f64,
    /// Highest confidence an estimate may report (0.8)
    pub max_confidence: f64,
    /// Confidence of the generic fallback profile (0.3)
    pub fallback_confidence: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_AI_MODEL.to_owned(),
            temperature: 0.2,
            timeout_secs: 30,
            recognition_threshold: 0.6,
            min_confidence: 0.1,
            max_confidence: 0.8,
            fallback_confidence: 0.3,
        }
    }
}

impl AiConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_confidence)
            || !(0.0..=1.0).contains(&self.max_confidence)
            || self.min_confidence > self.max_confidence
        {
            return Err(ConfigError::InvalidRange(
                "AI confidence bounds must satisfy 0 <= min <= max <= 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.fallback_confidence) {
            return Err(ConfigError::InvalidRange(
                "AI fallback confidence must be between 0 and 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.recognition_threshold) {
            return Err(ConfigError::InvalidRange(
                "AI recognition threshold must be between 0 and 1",
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValueOutOfRange(
                "AI temperature must be between 0 and 2",
            ));
        }
        Ok(())
    }
}

/// Scan history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Entries retained (200)
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 200 }
    }
}

/// Local food store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `sqlite:` URL; absent means the seeded in-memory store
    pub url: Option<String>,
}

impl ScannerConfig {
    /// Process-wide configuration, loaded from the environment on first use
    pub fn global() -> &'static Self {
        SCANNER_CONFIG.get_or_init(|| {
            Self::from_env().unwrap_or_else(|e| {
                warn!("Failed to load scanner config: {e}, using defaults");
                Self::default()
            })
        })
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or validation fails
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        info!(
            ai_enabled = config.ai.api_key.is_some(),
            usda_enabled = config.usda.api_key.is_some(),
            persistent_store = config.database.url.is_some(),
            "Scanner configuration loaded"
        );
        Ok(config)
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.confidence.validate()?;
        self.ai.validate()?;
        self.scoring.validate()?;

        if self.resolver.adapter_timeout_ms == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "adapter timeout must be greater than zero",
            ));
        }
        if !(0.0..=1.0).contains(&self.resolver.learned_record_confidence) {
            return Err(ConfigError::InvalidRange(
                "learned record confidence must be between 0 and 1",
            ));
        }
        if self.history.capacity == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "history capacity must be greater than zero",
            ));
        }
        if self.external_db.max_cache_items == 0 || self.usda.max_cache_items == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "cache sizes must be greater than zero",
            ));
        }
        if self.external_db.rate_limit_per_minute == 0 || self.usda.rate_limit_per_minute == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "rate limits must be greater than zero",
            ));
        }
        if let Some(url) = &self.database.url {
            if !url.starts_with("sqlite:") {
                return Err(ConfigError::Parse(format!(
                    "DATABASE_URL must be a sqlite: URL, got '{url}'"
                )));
            }
        }
        Ok(())
    }

    /// Helper function to parse and apply an environment variable override
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    /// Set an optional string from a non-empty environment variable
    fn apply_env_opt(env_var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = env::var(env_var_name) {
            let val = val.trim();
            if !val.is_empty() {
                *target = Some(val.to_owned());
            }
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        Self::apply_env_var("NUTRISCAN_CONFIDENCE_DATABASE", &mut self.confidence.database)?;
        Self::apply_env_var(
            "NUTRISCAN_CONFIDENCE_EXTERNAL_DB",
            &mut self.confidence.external_db,
        )?;
        Self::apply_env_var(
            "NUTRISCAN_CONFIDENCE_AI_ESTIMATE",
            &mut self.confidence.ai_estimate,
        )?;

        Self::apply_env_var(
            "NUTRISCAN_ADAPTER_TIMEOUT_MS",
            &mut self.resolver.adapter_timeout_ms,
        )?;
        Self::apply_env_var(
            "NUTRISCAN_AI_FALLBACK_ENABLED",
            &mut self.resolver.ai_fallback_enabled,
        )?;
        Self::apply_env_var(
            "NUTRISCAN_LEARNING_ENABLED",
            &mut self.resolver.learning_enabled,
        )?;
        Self::apply_env_var(
            "NUTRISCAN_LEARNED_CONFIDENCE",
            &mut self.resolver.learned_record_confidence,
        )?;

        Self::apply_env_var("OPEN_FOOD_FACTS_ENABLED", &mut self.external_db.enabled)?;
        Self::apply_env_var("OPEN_FOOD_FACTS_BASE_URL", &mut self.external_db.base_url)?;
        Self::apply_env_var(
            "OPEN_FOOD_FACTS_USER_AGENT",
            &mut self.external_db.user_agent,
        )?;
        Self::apply_env_var(
            "OPEN_FOOD_FACTS_RATE_LIMIT",
            &mut self.external_db.rate_limit_per_minute,
        )?;

        Self::apply_env_opt("USDA_API_KEY", &mut self.usda.api_key);
        Self::apply_env_var("USDA_BASE_URL", &mut self.usda.base_url)?;
        Self::apply_env_var("USDA_RATE_LIMIT", &mut self.usda.rate_limit_per_minute)?;

        Self::apply_env_opt("GEMINI_API_KEY", &mut self.ai.api_key);
        Self::apply_env_var("GEMINI_MODEL", &mut self.ai.model)?;
        Self::apply_env_var("NUTRISCAN_AI_TEMPERATURE", &mut self.ai.temperature)?;
        Self::apply_env_var("NUTRISCAN_AI_TIMEOUT_SECS", &mut self.ai.timeout_secs)?;
        Self::apply_env_var(
            "NUTRISCAN_RECOGNITION_THRESHOLD",
            &mut self.ai.recognition_threshold,
        )?;

        Self::apply_env_var(
            "NUTRISCAN_DANGER_PENALTY",
            &mut self.scoring.danger_penalty,
        )?;
        Self::apply_env_var(
            "NUTRISCAN_WARNING_PENALTY",
            &mut self.scoring.warning_penalty,
        )?;
        Self::apply_env_var(
            "NUTRISCAN_SHORTFALL_PENALTY",
            &mut self.scoring.shortfall_penalty,
        )?;
        Self::apply_env_var("NUTRISCAN_DANGER_RATIO", &mut self.scoring.danger_ratio)?;
        Self::apply_env_var(
            "NUTRISCAN_BASELINE_SCORE",
            &mut self.scoring.baseline.start_score,
        )?;

        Self::apply_env_var("NUTRISCAN_HISTORY_CAPACITY", &mut self.history.capacity)?;
        Self::apply_env_opt("DATABASE_URL", &mut self.database.url);

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScannerConfig::default();
        config.validate().unwrap();
        assert!((config.confidence.database - 0.95).abs() < f64::EPSILON);
        assert!((config.confidence.external_db - 0.85).abs() < f64::EPSILON);
        assert!((config.confidence.ai_estimate - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.resolver.adapter_timeout(), Duration::from_secs(8));
        assert_eq!(config.history.capacity, 200);
    }

    #[test]
    fn test_confidence_ordering_enforced() {
        let mut config = ScannerConfig::default();
        config.confidence.ai_estimate = 0.9;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_confidence_range_enforced() {
        let mut config = ScannerConfig::default();
        config.confidence.database = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRange(_))));
    }

    #[test]
    fn test_for_source() {
        let confidence = SourceConfidenceConfig::default();
        assert!(
            (confidence.for_source(SourceKind::ExternalDb) - confidence.external_db).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ScannerConfig::default();
        config.resolver.adapter_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_url_must_be_sqlite() {
        let mut config = ScannerConfig::default();
        config.database.url = Some("postgres://localhost/food".to_owned());
        assert!(matches!(config.validate(), Err(ConfigError::Parse(_))));

        config.database.url = Some("sqlite::memory:".to_owned());
        config.validate().unwrap();
    }

    #[test]
    fn test_ai_bounds_validated() {
        let mut config = ScannerConfig::default();
        config.ai.min_confidence = 0.9;
        assert!(config.validate().is_err());

        let mut config = ScannerConfig::default();
        config.ai.recognition_threshold = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRange(_))));
    }

    #[test]
    fn test_api_keys_not_serialized() {
        let mut config = ScannerConfig::default();
        config.ai.api_key = Some("gemini-secret".to_owned());
        config.usda.api_key = Some("usda-secret".to_owned());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
