// ABOUTME: Prompts for AI food identification and nutrition estimation loaded at compile time
// ABOUTME: Also extracts the JSON payload from model replies wrapped in markdown fences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.
//! Placeholders are `{name}` tokens replaced with [`str::replace`], so the
//! literal JSON braces in the templates need no escaping.

/// System instruction shared by every nutrition request
pub const NUTRITIONIST_SYSTEM_PROMPT: &str = include_str!("nutritionist_system.md");

/// Image identification template, placeholder `{context}`
pub const IDENTIFY_FOOD_PROMPT: &str = include_str!("identify_food.md");

/// Per-100g estimation template, placeholder `{food_name}`
pub const ESTIMATE_NUTRITION_PROMPT: &str = include_str!("estimate_nutrition.md");

/// Nutrition label reading template, placeholder `{context}`
pub const EXTRACT_LABEL_PROMPT: &str = include_str!("extract_label.md");

fn context_or_none(context: Option<&str>) -> &str {
    context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("none")
}

/// Prompt asking the model what food a photo shows
#[must_use]
pub fn identification_prompt(context: Option<&str>) -> String {
    IDENTIFY_FOOD_PROMPT.replace("{context}", context_or_none(context))
}

/// Prompt asking the model to transcribe a nutrition facts label
#[must_use]
pub fn label_prompt(context: Option<&str>) -> String {
    EXTRACT_LABEL_PROMPT.replace("{context}", context_or_none(context))
}

/// Prompt asking for per-100g nutrition of a named food
#[must_use]
pub fn estimation_prompt(food_name: &str) -> String {
    // Quotes would break the JSON example in the template
    let cleaned = food_name.trim().replace('"', "'");
    ESTIMATE_NUTRITION_PROMPT.replace("{food_name}", &cleaned)
}

/// Strip a surrounding markdown code fence (```` ``` ```` or ```` ```json ````)
/// and any prose around the outermost JSON object.
#[must_use]
pub fn extract_json_block(reply: &str) -> &str {
    let mut text = reply.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        text = rest.strip_suffix("```").unwrap_or(rest).trim();
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}
