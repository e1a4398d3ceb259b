use std::collections::HashSet;

use crate::email::email_model::{EmailOpportunity, FlowStep, FlowSummary, SuggestedEmail};
use crate::screen::classifier::{contains_keyword, tokenize};
use crate::screen::screen_model::Screen;

pub const GENERAL_PURPOSE: &str = "general screen";

struct ProductGroup {
    product_type: &'static str,
    description: &'static str,
    keywords: &'static [&'static str],
}

/// Checked in order; the first group with a keyword hit wins. Keywords match
/// on word boundaries like the screen classifier's.
const PRODUCT_GROUPS: [ProductGroup; 4] = [
    ProductGroup {
        product_type: "E-commerce",
        description: "an e-commerce store",
        keywords: &["cart", "checkout", "product", "shop", "order", "purchase", "shipping"],
    },
    ProductGroup {
        product_type: "SaaS",
        description: "a SaaS product with a dashboard",
        keywords: &["dashboard", "workspace", "subscription", "plan", "analytics", "billing"],
    },
    ProductGroup {
        product_type: "Booking",
        description: "a booking and scheduling service",
        keywords: &["booking", "appointment", "reservation", "schedule", "calendar"],
    },
    ProductGroup {
        product_type: "Authentication",
        description: "an authentication flow",
        keywords: &["login", "log in", "sign in", "sign up", "password", "account", "register"],
    },
];

const GENERAL_PRODUCT: (&str, &str) = ("General", "a general digital product");

/// Build the cross-screen summary for every screen in scan order.
///
/// Steps, screen count and product text cover all screens; a screen without
/// an opportunity still gets a step. Suggestions and the aggregate come from
/// the fused opportunities. Recomputed from scratch on every call.
pub fn synthesize_flow(screens: &[Screen], opportunities: &[EmailOpportunity]) -> FlowSummary {
    let (product_type, description) = classify_product(screens, opportunities);

    FlowSummary {
        product_type: product_type.to_string(),
        narrative: narrative(screens.len(), description),
        screen_count: screens.len(),
        steps: build_steps(screens, opportunities),
        suggested_emails: suggest_emails(opportunities),
        aggregate_confidence: aggregate_confidence(opportunities),
    }
}

/// Product type and description from every opportunity's purpose and every
/// screen's raw text.
pub fn classify_product(
    screens: &[Screen],
    opportunities: &[EmailOpportunity],
) -> (&'static str, &'static str) {
    let mut words = Vec::new();
    for purpose in opportunities.iter().filter_map(EmailOpportunity::purpose) {
        words.extend(tokenize(purpose));
    }
    for text in screens.iter().flat_map(|s| &s.content.text_content) {
        words.extend(tokenize(text));
    }

    PRODUCT_GROUPS
        .iter()
        .find(|g| g.keywords.iter().any(|k| contains_keyword(&words, k)))
        .map(|g| (g.product_type, g.description))
        .unwrap_or(GENERAL_PRODUCT)
}

fn narrative(screen_count: usize, description: &str) -> String {
    let noun = if screen_count == 1 { "screen" } else { "screens" };
    format!(
        "This flow of {} {} appears to be {}.",
        screen_count, noun, description
    )
}

fn build_steps(screens: &[Screen], opportunities: &[EmailOpportunity]) -> Vec<FlowStep> {
    screens
        .iter()
        .enumerate()
        .map(|(i, screen)| {
            let opp = opportunities.iter().find(|o| o.screen_id == screen.id);
            FlowStep {
                index: i + 1,
                screen_name: screen.name.clone(),
                purpose: opp
                    .and_then(EmailOpportunity::purpose)
                    .unwrap_or(GENERAL_PURPOSE)
                    .to_string(),
                thumbnail: opp.and_then(EmailOpportunity::thumbnail).map(str::to_string),
            }
        })
        .collect()
}

/// One suggestion per category, taken from the first screen assigned it.
fn suggest_emails(opportunities: &[EmailOpportunity]) -> Vec<SuggestedEmail> {
    let mut seen = HashSet::new();

    opportunities
        .iter()
        .filter(|opp| seen.insert(opp.category))
        .map(|opp| SuggestedEmail {
            category: opp.category,
            name: opp.suggested_name.clone(),
            context: opp.context_text(),
        })
        .collect()
}

fn aggregate_confidence(opportunities: &[EmailOpportunity]) -> f32 {
    if opportunities.is_empty() {
        return 0.0;
    }
    let total: f32 = opportunities.iter().map(|o| o.confidence).sum();
    (total / opportunities.len() as f32).clamp(0.0, 1.0)
}
