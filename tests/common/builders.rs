use async_trait::async_trait;

use email_detection::ai::endpoint::{
    TextAnalysisRecord, TextAnalysisResponse, VisionAnalysisRecord, VisionAnalysisResponse,
};
use email_detection::ai::error::ChannelError;
use email_detection::ai::renderer::{RenderedImage, ScreenRenderer};
use email_detection::screen::screen_model::{ChildNode, Dimensions, Screen, ScreenContent};

// ============================================================================
// Screen builders
// ============================================================================

pub fn screen(id: &str, name: &str) -> Screen {
    Screen::new(id, name).with_content(ScreenContent {
        text_content: vec![],
        child_nodes: vec![],
        dimensions: Dimensions {
            width: 375.0,
            height: 812.0,
        },
    })
}

pub fn screen_with_text(id: &str, name: &str, text: &[&str]) -> Screen {
    let mut s = screen(id, name);
    s.content.text_content = text.iter().map(|t| t.to_string()).collect();
    s
}

pub fn child(name: &str) -> ChildNode {
    ChildNode {
        name: name.into(),
        node_type: "FRAME".into(),
    }
}

/// "Sign Up", "Checkout", "Reset Password"
pub fn three_screens() -> Vec<Screen> {
    vec![
        screen("1:1", "Sign Up"),
        screen("1:2", "Checkout"),
        screen("1:3", "Reset Password"),
    ]
}

// ============================================================================
// Response builders
// ============================================================================

pub fn text_record(frame_id: &str, email_type: &str, name: &str, confidence: f32) -> TextAnalysisRecord {
    TextAnalysisRecord {
        frame_id: frame_id.into(),
        frame_name: "screen".into(),
        detected_purpose: format!("Purpose of {}", frame_id),
        suggested_email_type: email_type.into(),
        suggested_email_name: name.into(),
        confidence,
        reasoning: format!("Reasoning for {}", frame_id),
        suggested_variables: vec!["user_name".into(), "order_number".into()],
    }
}

/// `{"analysis": [...]}` as the text endpoint returns it.
pub fn text_body(records: Vec<TextAnalysisRecord>) -> String {
    serde_json::to_string(&TextAnalysisResponse { analysis: records }).unwrap()
}

pub fn vision_record(frame_id: &str, email_type: &str, confidence: f32) -> VisionAnalysisRecord {
    VisionAnalysisRecord {
        frame_id: frame_id.into(),
        frame_name: "screen".into(),
        design_summary: format!("Design of {}", frame_id),
        user_flow_purpose: format!("Flow purpose of {}", frame_id),
        key_elements: vec!["Primary button".into()],
        suggested_email_type: email_type.into(),
        suggested_email_name: format!("Email for {}", frame_id),
        email_context: format!("Sent after {}", frame_id),
        confidence,
    }
}

/// A single bare analysis object.
pub fn vision_body(frame_id: &str, email_type: &str, confidence: f32) -> String {
    serde_json::to_string(&vision_record(frame_id, email_type, confidence)).unwrap()
}

/// `{"analyses": [...]}` as a relay returns it.
pub fn vision_envelope(records: Vec<VisionAnalysisRecord>) -> String {
    serde_json::to_string(&VisionAnalysisResponse { analyses: records }).unwrap()
}

// ============================================================================
// Renderers
// ============================================================================

/// Renders every screen to the same tiny payload.
pub struct StaticRenderer;

#[async_trait]
impl ScreenRenderer for StaticRenderer {
    async fn render(&self, _screen: &Screen) -> Result<RenderedImage, ChannelError> {
        Ok(RenderedImage::png(vec![0x89, 0x50, 0x4e, 0x47]))
    }
}

/// Fails to render the listed screen ids.
pub struct FailingRenderer {
    pub failing: Vec<String>,
}

#[async_trait]
impl ScreenRenderer for FailingRenderer {
    async fn render(&self, screen: &Screen) -> Result<RenderedImage, ChannelError> {
        if self.failing.contains(&screen.id) {
            return Err(ChannelError::Render(format!("cannot render {}", screen.id)));
        }
        Ok(RenderedImage::png(vec![1, 2, 3]))
    }
}
