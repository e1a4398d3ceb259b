use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::ai::endpoint::{AnalysisEndpoint, TextAnalysisRequest, TextFrame};
use crate::ai::error::ChannelError;
use crate::ai::json_extract::find_json_array;
use crate::email::email_model::{AIAnalysis, ChannelResult, EmailCategory};
use crate::screen::screen_model::{ChildNode, Screen, ScreenContent};

pub const MAX_TEXT_EXCERPTS: usize = 10;
pub const MAX_CHILD_NAMES: usize = 5;

pub const DEFAULT_CONFIDENCE: f32 = 0.5;
pub const FALLBACK_CONFIDENCE: f32 = 0.3;
pub const PLACEHOLDER: &str = "Unknown";
pub const FAILED_REASONING: &str = "analysis failed";

pub type TextChannelOutput = HashMap<String, ChannelResult<AIAnalysis>>;

// ============================================================================
// Channel entry point
// ============================================================================

/// Analyze a batch of screens with one call to the text endpoint.
///
/// The returned map only holds screens the response mentioned, unless the
/// call or the parse failed as a whole; then every requested screen gets the
/// fallback stub. Never fails.
pub async fn analyze_screens(endpoint: &dyn AnalysisEndpoint, screens: &[Screen]) -> TextChannelOutput {
    if screens.is_empty() {
        return TextChannelOutput::new();
    }

    let request = build_request(screens);
    let instruction = build_instruction(&request);

    let parsed = match endpoint.analyze_text(&instruction, &request).await {
        Ok(raw) => parse_text_response(&raw, screens),
        Err(e) => Err(e),
    };

    match parsed {
        Ok(output) => {
            debug!(requested = screens.len(), matched = output.len(), "text analysis parsed");
            output
        }
        Err(e) => {
            warn!(error = %e, screens = screens.len(), "text analysis failed, using fallback");
            screens
                .iter()
                .map(|s| (s.id.clone(), ChannelResult::Fallback(fallback_analysis(&s.id))))
                .collect()
        }
    }
}

/// Stub attached to every screen when the text channel fails.
pub fn fallback_analysis(screen_id: &str) -> AIAnalysis {
    AIAnalysis {
        screen_id: screen_id.to_string(),
        detected_purpose: PLACEHOLDER.to_string(),
        category: EmailCategory::GenericTransactional,
        suggested_name: EmailCategory::GenericTransactional.display_name().to_string(),
        confidence: FALLBACK_CONFIDENCE,
        reasoning: FAILED_REASONING.to_string(),
        suggested_variables: vec![],
    }
}

// ============================================================================
// Request and prompt
// ============================================================================

/// Build the batched request, truncating each screen's content.
pub fn build_request(screens: &[Screen]) -> TextAnalysisRequest {
    TextAnalysisRequest {
        frames: screens
            .iter()
            .map(|s| TextFrame {
                name: s.name.clone(),
                id: s.id.clone(),
                content: truncate_content(&s.content),
            })
            .collect(),
    }
}

/// Keep the first excerpts and child names, appending a marker entry that
/// says how many were dropped.
pub fn truncate_content(content: &ScreenContent) -> ScreenContent {
    let mut text_content: Vec<String> = content
        .text_content
        .iter()
        .take(MAX_TEXT_EXCERPTS)
        .cloned()
        .collect();
    if content.text_content.len() > MAX_TEXT_EXCERPTS {
        text_content.push(truncation_marker(content.text_content.len() - MAX_TEXT_EXCERPTS));
    }

    let mut child_nodes: Vec<ChildNode> = content
        .child_nodes
        .iter()
        .take(MAX_CHILD_NAMES)
        .cloned()
        .collect();
    if content.child_nodes.len() > MAX_CHILD_NAMES {
        child_nodes.push(ChildNode {
            name: truncation_marker(content.child_nodes.len() - MAX_CHILD_NAMES),
            node_type: "TRUNCATED".to_string(),
        });
    }

    ScreenContent {
        text_content,
        child_nodes,
        dimensions: content.dimensions,
    }
}

pub fn truncation_marker(remaining: usize) -> String {
    format!("... ({} more)", remaining)
}

pub fn category_list() -> String {
    EmailCategory::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn build_instruction(request: &TextAnalysisRequest) -> String {
    let screens = request
        .frames
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let text = if f.content.text_content.is_empty() {
                "(none)".to_string()
            } else {
                f.content
                    .text_content
                    .iter()
                    .map(|t| format!("\"{}\"", t))
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            let elements = if f.content.child_nodes.is_empty() {
                "(none)".to_string()
            } else {
                f.content
                    .child_nodes
                    .iter()
                    .map(|c| c.name.clone())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!(
                "{}. \"{}\" (id: {}, {}x{})\n   Text: {}\n   Elements: {}",
                i + 1,
                f.name,
                f.id,
                f.content.dimensions.width,
                f.content.dimensions.height,
                text,
                elements
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r##"Analyze these UI screens from a product design and decide which transactional email each screen would trigger.

SCREENS:
{screens}

EMAIL TYPES (use exactly one per screen):
{categories}

Return ONLY a JSON array with one object per screen, matching this schema:
[
  {{
    "frameId": "screen id from above",
    "frameName": "screen name from above",
    "detectedPurpose": "what the user does on this screen",
    "suggestedEmailType": "one of the email types",
    "suggestedEmailName": "human readable email name",
    "confidence": 0.0,
    "reasoning": "why this email fits",
    "suggestedVariables": ["variable_name"]
  }}
]

Respond with ONLY valid JSON, no explanation."##,
        screens = screens,
        categories = category_list(),
    )
}

// ============================================================================
// Response parsing
// ============================================================================

/// Parse a raw response into analyses keyed by requested screen id.
///
/// Records are joined by `frameId`; unknown ids are ignored and the first
/// record wins when an id repeats. Errors when no JSON array can be parsed
/// or when no record joins to a requested screen.
pub fn parse_text_response(raw: &str, requested: &[Screen]) -> Result<TextChannelOutput, ChannelError> {
    let array = find_json_array(raw)
        .ok_or_else(|| ChannelError::Parse("no JSON array in text response".into()))?;

    let records: Vec<Value> = serde_json::from_str(array)
        .map_err(|e| ChannelError::Parse(format!("text response array: {}", e)))?;

    let mut output = TextChannelOutput::new();
    for record in &records {
        let Some(frame_id) = record.get("frameId").and_then(Value::as_str) else {
            debug!("text record without frameId ignored");
            continue;
        };

        if !requested.iter().any(|s| s.id == frame_id) {
            debug!(frame_id, "text record for unknown screen ignored");
            continue;
        }

        if output.contains_key(frame_id) {
            debug!(frame_id, "duplicate text record ignored");
            continue;
        }

        output.insert(frame_id.to_string(), ChannelResult::Analyzed(analysis_from_record(frame_id, record)));
    }

    if output.is_empty() && !requested.is_empty() {
        return Err(ChannelError::Parse(format!(
            "none of {} records matched a requested screen",
            records.len()
        )));
    }

    Ok(output)
}

fn analysis_from_record(frame_id: &str, record: &Value) -> AIAnalysis {
    let category = category_field(record, "suggestedEmailType");

    AIAnalysis {
        screen_id: frame_id.to_string(),
        detected_purpose: string_field(record, "detectedPurpose").unwrap_or_else(|| PLACEHOLDER.to_string()),
        category,
        suggested_name: string_field(record, "suggestedEmailName")
            .unwrap_or_else(|| category.display_name().to_string()),
        confidence: confidence_field(record, "confidence"),
        reasoning: string_field(record, "reasoning").unwrap_or_else(|| PLACEHOLDER.to_string()),
        suggested_variables: string_list_field(record, "suggestedVariables"),
    }
}

// ---- field helpers shared with the vision channel ----

/// Non-blank string value of `key`.
pub fn string_field(record: &Value, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Confidence clamped to [0, 1]; `DEFAULT_CONFIDENCE` when absent or not a number.
pub fn confidence_field(record: &Value, key: &str) -> f32 {
    match record.get(key).and_then(Value::as_f64) {
        Some(c) => {
            if !(0.0..=1.0).contains(&c) {
                debug!(key, value = c, "confidence out of range, clamped");
            }
            c.clamp(0.0, 1.0) as f32
        }
        None => DEFAULT_CONFIDENCE,
    }
}

/// Category value of `key`; the generic member when absent or unknown.
pub fn category_field(record: &Value, key: &str) -> EmailCategory {
    match record.get(key).and_then(Value::as_str) {
        Some(raw) => EmailCategory::parse(raw).unwrap_or_else(|| {
            debug!(value = raw, "unknown email category replaced");
            EmailCategory::GenericTransactional
        }),
        None => EmailCategory::GenericTransactional,
    }
}

/// String elements of an array field; non-string elements are dropped.
pub fn string_list_field(record: &Value, key: &str) -> Vec<String> {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
