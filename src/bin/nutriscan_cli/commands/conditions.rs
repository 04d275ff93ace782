// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Health condition commands for nutriscan-cli
// ABOUTME: Lists the catalog and validates user-defined condition files

use anyhow::{Context, Result};
use nutriscan_core::models::HealthCondition;
use nutriscan_health::{ConditionCatalog, ConditionDefinition};
use std::path::Path;
use tokio::fs;

/// Print every condition as JSON
pub fn list() -> Result<()> {
    let conditions = ConditionCatalog::global().list_conditions();
    let conditions: Vec<&HealthCondition> = conditions.iter().map(AsRef::as_ref).collect();
    println!("{}", serde_json::to_string_pretty(&conditions)?);
    Ok(())
}

/// Validate a definition file, add it to the catalog and print the stored condition
pub async fn add(file: &Path) -> Result<()> {
    let raw = fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let definition: ConditionDefinition = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid condition definition", file.display()))?;

    let condition = ConditionCatalog::global().add_condition(definition)?;
    println!("{}", serde_json::to_string_pretty(condition.as_ref())?);
    Ok(())
}
