// ABOUTME: Bounded in-memory log of recent scans, successful or failed
// ABOUTME: Appended by the orchestrator's caller and listed newest first
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::scan::ScanResult;
use chrono::{DateTime, Utc};
use nutriscan_core::errors::ScanError;
use nutriscan_core::models::{FoodReference, ReferenceKind, SourceKind};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

/// How a scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Produced a result
    Completed,
    /// Failed with a caller-visible error
    Failed,
}

/// One history entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanHistoryEntry {
    /// Entry id (the scan id for completed scans)
    pub id: Uuid,
    /// Outcome
    pub status: ScanStatus,
    /// Reference kind
    pub scan_type: ReferenceKind,
    /// Name, barcode or image descriptor
    pub reference: String,
    /// Resolved food name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    /// Nutrition provenance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,
    /// Overall score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_health_score: Option<f64>,
    /// Conditions requested
    pub conditions: Vec<String>,
    /// Wall time
    pub processing_time_ms: u64,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// When the entry was recorded
    pub created_at: DateTime<Utc>,
}

impl ScanHistoryEntry {
    /// Entry for a completed scan
    #[must_use]
    pub fn completed(result: &ScanResult, conditions: &[String]) -> Self {
        Self {
            id: result.scan_id(),
            status: ScanStatus::Completed,
            scan_type: result.kind(),
            reference: result.reference().value.clone(),
            food_name: Some(result.food_name().to_owned()),
            source: Some(result.nutrition().source()),
            overall_health_score: Some(result.overall_health_score()),
            conditions: conditions.to_vec(),
            processing_time_ms: result.processing_time_ms(),
            error_message: None,
            created_at: result.scanned_at(),
        }
    }

    /// Entry for a failed scan
    #[must_use]
    pub fn failed(
        reference: &FoodReference,
        conditions: &[String],
        error: &ScanError,
        processing_time_ms: u64,
    ) -> Self {
        let summary = reference.summary();
        Self {
            id: Uuid::new_v4(),
            status: ScanStatus::Failed,
            scan_type: summary.kind,
            reference: summary.value,
            food_name: None,
            source: None,
            overall_health_score: None,
            conditions: conditions.to_vec(),
            processing_time_ms,
            error_message: Some(error.to_string()),
            created_at: Utc::now(),
        }
    }
}

/// Thread-safe ring of the most recent scans
#[derive(Debug)]
pub struct ScanHistory {
    entries: Mutex<VecDeque<ScanHistoryEntry>>,
    capacity: usize,
}

impl ScanHistory {
    /// History keeping at most `capacity` entries (at least one)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append an entry, dropping the oldest when full
    pub fn record(&self, entry: ScanHistoryEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Up to `limit` entries, newest first
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<ScanHistoryEntry> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.iter().rev().take(limit).cloned().collect()
    }

    /// Number of entries held
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no entry is held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
