use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::ai::endpoint::{AnalysisEndpoint, VisionAnalysisRequest, VisionFrame};
use crate::ai::error::ChannelError;
use crate::ai::json_extract::find_json_object;
use crate::ai::renderer::ScreenRenderer;
use crate::ai::text_channel::{
    FALLBACK_CONFIDENCE, PLACEHOLDER, category_field, category_list, confidence_field,
    string_field, string_list_field,
};
use crate::email::email_model::{ChannelResult, EmailCategory, VisualAnalysis};
use crate::screen::screen_model::Screen;

pub const FAILED_SUMMARY: &str = "Analysis failed";

pub type VisionChannelOutput = HashMap<String, ChannelResult<VisualAnalysis>>;

/// Analyze screens one at a time, in order. A failure for one screen only
/// replaces that screen's result with the fallback.
///
/// `keep_going` is checked before every call; when it returns false the
/// remaining screens are skipped.
pub async fn analyze_screens(
    endpoint: &dyn AnalysisEndpoint,
    renderer: &dyn ScreenRenderer,
    screens: &[Screen],
    keep_going: impl Fn() -> bool,
) -> VisionChannelOutput {
    let mut output = VisionChannelOutput::new();

    for screen in screens {
        if !keep_going() {
            debug!(screen_id = %screen.id, "vision analysis stopped early");
            break;
        }

        let result = match analyze_one(endpoint, renderer, screen).await {
            Ok(analysis) => ChannelResult::Analyzed(analysis),
            Err(e) => {
                warn!(screen_id = %screen.id, error = %e, "vision analysis failed, using fallback");
                ChannelResult::Fallback(fallback_visual(&screen.id))
            }
        };
        output.insert(screen.id.clone(), result);
    }

    output
}

/// Fixed object substituted for a screen whose vision call failed.
pub fn fallback_visual(screen_id: &str) -> VisualAnalysis {
    VisualAnalysis {
        screen_id: screen_id.to_string(),
        design_summary: FAILED_SUMMARY.to_string(),
        user_flow_purpose: PLACEHOLDER.to_string(),
        key_elements: vec![],
        category: EmailCategory::GenericTransactional,
        suggested_name: EmailCategory::GenericTransactional.display_name().to_string(),
        email_context: PLACEHOLDER.to_string(),
        confidence: FALLBACK_CONFIDENCE,
        image: None,
    }
}

async fn analyze_one(
    endpoint: &dyn AnalysisEndpoint,
    renderer: &dyn ScreenRenderer,
    screen: &Screen,
) -> Result<VisualAnalysis, ChannelError> {
    let image = renderer.render(screen).await?.to_data_uri();

    let request = VisionAnalysisRequest {
        frames: vec![VisionFrame {
            frame_id: screen.id.clone(),
            frame_name: screen.name.clone(),
            image_data: image.clone(),
        }],
    };
    let instruction = build_instruction(screen);

    let raw = endpoint.analyze_image(&instruction, &request).await?;
    let mut analysis = parse_vision_response(&raw, &screen.id)?;
    analysis.image = Some(image);
    Ok(analysis)
}

pub fn build_instruction(screen: &Screen) -> String {
    format!(
        r##"You are looking at the UI screen "{name}" from a product design.
Describe the design and decide which transactional email this screen would trigger.

EMAIL TYPES (use exactly one):
{categories}

Return ONLY a JSON object matching this schema:
{{
  "frameId": "{id}",
  "frameName": "{name}",
  "designSummary": "short description of the visual design",
  "userFlowPurpose": "what the user accomplishes on this screen",
  "keyElements": ["notable UI element"],
  "suggestedEmailType": "one of the email types",
  "suggestedEmailName": "human readable email name",
  "emailContext": "when and why the email is sent",
  "confidence": 0.0
}}

Respond with ONLY valid JSON, no explanation."##,
        name = screen.name,
        id = screen.id,
        categories = category_list(),
    )
}

/// Parse one vision response. Accepts either a bare analysis object or the
/// `{"analyses": [...]}` envelope, which must hold an entry for `screen_id`.
pub fn parse_vision_response(raw: &str, screen_id: &str) -> Result<VisualAnalysis, ChannelError> {
    let object = find_json_object(raw)
        .ok_or_else(|| ChannelError::Parse("no JSON object in vision response".into()))?;

    let value: Value = serde_json::from_str(object)
        .map_err(|e| ChannelError::Parse(format!("vision response object: {}", e)))?;

    let record = match value.get("analyses").and_then(Value::as_array) {
        Some(entries) => entries
            .iter()
            .find(|e| e.get("frameId").and_then(Value::as_str) == Some(screen_id))
            .ok_or_else(|| ChannelError::Parse(format!("no analysis for frame {}", screen_id)))?,
        None => &value,
    };

    let category = category_field(record, "suggestedEmailType");

    Ok(VisualAnalysis {
        screen_id: screen_id.to_string(),
        design_summary: string_field(record, "designSummary").unwrap_or_else(|| PLACEHOLDER.to_string()),
        user_flow_purpose: string_field(record, "userFlowPurpose")
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        key_elements: string_list_field(record, "keyElements"),
        category,
        suggested_name: string_field(record, "suggestedEmailName")
            .unwrap_or_else(|| category.display_name().to_string()),
        email_context: string_field(record, "emailContext").unwrap_or_else(|| PLACEHOLDER.to_string()),
        confidence: confidence_field(record, "confidence"),
        image: None,
    })
}
