// ABOUTME: Logging configuration and structured logging setup for the scanning service
// ABOUTME: Configures log levels, formatters and noise filters, plus structured scan events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging with `tracing`.
//!
//! Output goes to stderr so command-line JSON on stdout stays clean.

use anyhow::{anyhow, Result};
use nutriscan_core::models::{ReferenceKind, SourceKind};
use serde_json::json;
use std::env;
use std::io;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Default service name in structured logs
pub const SERVICE_NAME: &str = "nutriscan";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread information
    pub include_thread: bool,
    /// Include span open/close events
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for terminals
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            include_spans: false,
            service_name: SERVICE_NAME.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        Self {
            level,
            format,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: is_production || env::var("LOG_INCLUDE_THREAD").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| SERVICE_NAME.into()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_owned()),
            environment,
        }
    }

    /// Quiet configuration for command-line use: warnings and above, compact
    #[must_use]
    pub fn for_cli() -> Self {
        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
            format: LogFormat::Compact,
            ..Self::default()
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let directive = |d: &str, fallback: LevelFilter| -> Directive {
            d.parse().unwrap_or_else(|_| fallback.into())
        };

        EnvFilter::new(&self.level)
            .add_directive(directive("hyper=warn", LevelFilter::WARN))
            .add_directive(directive("hyper::proto=warn", LevelFilter::WARN))
            .add_directive(directive("reqwest=warn", LevelFilter::WARN))
            .add_directive(directive("h2=warn", LevelFilter::WARN))
            .add_directive(directive("rustls=warn", LevelFilter::WARN))
            .add_directive(directive("sqlx=warn", LevelFilter::WARN))
            .add_directive(directive("sqlx::query=warn", LevelFilter::WARN))
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let installed = match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_thread_ids(self.include_thread)
                        .with_thread_names(self.include_thread)
                        .with_target(true)
                        .with_writer(io::stderr)
                        .with_span_events(span_events)
                        .json(),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_thread_ids(self.include_thread)
                        .with_thread_names(self.include_thread)
                        .with_target(true)
                        .with_writer(io::stderr)
                        .with_span_events(span_events),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(io::stderr)
                        .with_span_events(FmtSpan::NONE),
                )
                .try_init(),
        };
        installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        let config_summary = json!({
            "service": {
                "name": self.service_name,
                "version": self.service_version,
                "environment": self.environment
            },
            "logging": {
                "level": self.level,
                "format": format!("{:?}", self.format),
                "features": {
                    "location": self.include_location,
                    "thread": self.include_thread,
                    "spans": self.include_spans
                }
            }
        });
        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            "Logging initialized: {config_summary}"
        );
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Structured events emitted along the scan pipeline
pub struct ScanLogger;

impl ScanLogger {
    /// A scan request was accepted
    pub fn log_scan_started(scan_id: &str, kind: ReferenceKind, conditions: usize) {
        info!(
            scan.id = %scan_id,
            scan.kind = kind.as_str(),
            scan.conditions = conditions,
            "Scan started"
        );
    }

    /// A scan produced a result
    pub fn log_scan_completed(
        scan_id: &str,
        food: &str,
        source: SourceKind,
        confidence: f64,
        score: f64,
        duration_ms: u64,
    ) {
        info!(
            scan.id = %scan_id,
            food.name = %food,
            nutrition.source = source.as_str(),
            nutrition.confidence = confidence,
            health.score = score,
            scan.duration_ms = duration_ms,
            "Scan completed"
        );
    }

    /// A scan failed with a caller-visible error
    pub fn log_scan_failed(scan_id: &str, reason: &str, duration_ms: u64) {
        warn!(
            scan.id = %scan_id,
            scan.error = %reason,
            scan.duration_ms = duration_ms,
            "Scan failed"
        );
    }

    /// Health evaluation failed and the scan was degraded
    pub fn log_evaluation_degraded(scan_id: &str, reason: &str) {
        warn!(
            scan.id = %scan_id,
            health.error = %reason,
            "Health evaluation failed, returning nutrition without remarks"
        );
    }

    /// A source failed and resolution moved to the next one
    pub fn log_source_fallback(source: &str, reason: &str) {
        warn!(
            nutrition.source = %source,
            error = %reason,
            "Nutrition source failed, falling back"
        );
    }

    /// Outcome of a learning write-behind
    pub fn log_learning(food: &str, success: bool, details: Option<&str>) {
        if success {
            info!(food.name = %food, "Learned AI nutrition estimate");
        } else {
            warn!(
                food.name = %food,
                error = details.unwrap_or(""),
                "Failed to persist learned nutrition estimate"
            );
        }
    }
}
