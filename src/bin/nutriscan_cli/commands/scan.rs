// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Scan command for nutriscan-cli
// ABOUTME: Builds the food store and orchestrator, runs one scan and prints the result

use crate::ScanArgs;
use anyhow::{Context, Result};
use nutriscan::config::ScannerConfig;
use nutriscan::database::{InMemoryFoodStore, SharedFoodStore, SqliteFoodStore};
use nutriscan::history::{ScanHistory, ScanHistoryEntry};
use nutriscan::scan::ScanOrchestrator;
use nutriscan_core::models::{FoodReference, ImageInput, ImageKind};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tracing::info;

/// Run one scan and print it as JSON
pub async fn run(config: &ScannerConfig, args: ScanArgs) -> Result<()> {
    let store = open_store(config).await?;
    let orchestrator = ScanOrchestrator::from_config(config, store);
    let history = ScanHistory::new(config.history.capacity);

    let image = match &args.image {
        Some(path) => Some(read_image(path, args.context, args.label).await?),
        None => None,
    };
    let reference = FoodReference::from_parts(args.name, args.barcode, image)?;

    let started = Instant::now();
    match orchestrator
        .scan(&reference, &args.conditions, &args.serving)
        .await
    {
        Ok(result) => {
            history.record(ScanHistoryEntry::completed(&result, &args.conditions));
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            history.record(ScanHistoryEntry::failed(
                &reference,
                &args.conditions,
                &e,
                elapsed,
            ));
            Err(e.into())
        }
    }
}

async fn open_store(config: &ScannerConfig) -> Result<SharedFoodStore> {
    let seed_confidence = config.confidence.database;
    if let Some(url) = &config.database.url {
        let store = SqliteFoodStore::connect(url).await?;
        store.seed_if_empty(seed_confidence).await?;
        info!(url = %url, "Using SQLite food store");
        return Ok(Arc::new(store));
    }
    Ok(Arc::new(InMemoryFoodStore::seeded(seed_confidence)))
}

async fn read_image(path: &Path, context: Option<String>, label: bool) -> Result<ImageInput> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("failed to read image {}", path.display()))?;
    let mime_type = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    };
    Ok(ImageInput {
        bytes,
        mime_type: mime_type.to_owned(),
        context,
        kind: if label {
            ImageKind::NutritionLabel
        } else {
            ImageKind::Food
        },
    })
}
