use crate::ai::text_channel::PLACEHOLDER;
use crate::email::email_model::{
    AIAnalysis, ChannelResult, EmailCategory, EmailOpportunity, HeuristicMatch,
    OpportunityContext, VisualAnalysis,
};
use crate::email::identity::opportunity_id;
use crate::screen::screen_model::Screen;

/// The signal chosen to drive category, name, and confidence.
struct Resolved {
    category: EmailCategory,
    name: String,
    confidence: f32,
}

/// Merge the signals for one screen into an opportunity.
///
/// Successful results rank vision > text > heuristic. A fallback result is
/// attached but only decides the category when no successful source exists.
/// Returns `None` when no source is present at all.
pub fn fuse(
    screen: &Screen,
    heuristic: Option<&HeuristicMatch>,
    text: Option<&ChannelResult<AIAnalysis>>,
    vision: Option<&ChannelResult<VisualAnalysis>>,
) -> Option<EmailOpportunity> {
    let resolved = resolve(heuristic, text, vision)?;

    Some(EmailOpportunity {
        id: opportunity_id(&screen.id),
        category: resolved.category,
        screen_name: screen.name.clone(),
        screen_id: screen.id.clone(),
        suggested_name: resolved.name,
        confidence: resolved.confidence.clamp(0.0, 1.0),
        context: OpportunityContext {
            product_type: heuristic.and_then(|h| h.context.product_type.clone()),
            user_action: heuristic.and_then(|h| h.context.user_action.clone()),
            detected_variables: merge_variables(heuristic, text),
        },
        content: Some(screen.content.clone()),
        heuristic: heuristic.cloned(),
        text_analysis: text.cloned(),
        visual_analysis: vision.cloned(),
    })
}

fn resolve(
    heuristic: Option<&HeuristicMatch>,
    text: Option<&ChannelResult<AIAnalysis>>,
    vision: Option<&ChannelResult<VisualAnalysis>>,
) -> Option<Resolved> {
    let from_vision = |v: &VisualAnalysis| Resolved {
        category: v.category,
        name: v.suggested_name.clone(),
        confidence: v.confidence,
    };
    let from_text = |t: &AIAnalysis| Resolved {
        category: t.category,
        name: t.suggested_name.clone(),
        confidence: t.confidence,
    };
    let from_heuristic = |h: &HeuristicMatch| Resolved {
        category: h.category,
        name: h.category.display_name().to_string(),
        confidence: h.confidence,
    };

    vision
        .and_then(ChannelResult::analyzed)
        .map(from_vision)
        .or_else(|| text.and_then(ChannelResult::analyzed).map(from_text))
        .or_else(|| heuristic.map(from_heuristic))
        .or_else(|| vision.map(|v| from_vision(v.value())))
        .or_else(|| text.map(|t| from_text(t.value())))
}

/// Union of the sources' variables, first-seen order, in precedence order.
fn merge_variables(
    heuristic: Option<&HeuristicMatch>,
    text: Option<&ChannelResult<AIAnalysis>>,
) -> Vec<String> {
    let text_vars = text.map(|t| t.value().suggested_variables.as_slice()).unwrap_or_default();
    let heuristic_vars = heuristic
        .map(|h| h.context.detected_variables.as_slice())
        .unwrap_or_default();

    let mut merged: Vec<String> = Vec::new();
    for var in text_vars.iter().chain(heuristic_vars) {
        if !merged.contains(var) {
            merged.push(var.clone());
        }
    }
    merged
}

// ============================================================================
// Best-available views used by the flow synthesizer and reports
// ============================================================================

fn meaningful(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty() && trimmed != PLACEHOLDER).then_some(trimmed)
}

impl EmailOpportunity {
    /// Purpose text: vision > text > heuristic trigger. Fallback results and
    /// placeholder values are skipped.
    pub fn purpose(&self) -> Option<&str> {
        self.visual_analysis
            .as_ref()
            .and_then(ChannelResult::analyzed)
            .and_then(|v| meaningful(&v.user_flow_purpose))
            .or_else(|| {
                self.text_analysis
                    .as_ref()
                    .and_then(ChannelResult::analyzed)
                    .and_then(|t| meaningful(&t.detected_purpose))
            })
            .or_else(|| self.heuristic.as_ref().map(|h| h.category.trigger_description()))
    }

    /// Why the email is sent: vision email context > text reasoning >
    /// the resolved category's trigger.
    pub fn context_text(&self) -> String {
        self.visual_analysis
            .as_ref()
            .and_then(ChannelResult::analyzed)
            .and_then(|v| meaningful(&v.email_context))
            .or_else(|| {
                self.text_analysis
                    .as_ref()
                    .and_then(ChannelResult::analyzed)
                    .and_then(|t| meaningful(&t.reasoning))
            })
            .unwrap_or_else(|| self.category.trigger_description())
            .to_string()
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.visual_analysis
            .as_ref()
            .and_then(ChannelResult::analyzed)
            .and_then(|v| v.image.as_deref())
    }

    pub fn has_fallback(&self) -> bool {
        self.text_analysis.as_ref().is_some_and(ChannelResult::is_fallback)
            || self.visual_analysis.as_ref().is_some_and(ChannelResult::is_fallback)
    }
}
