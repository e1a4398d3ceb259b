use crate::email::draft::EmailDraft;
use crate::email::email_model::ChannelResult;
use crate::engine::engine::DetectionReport;

// ============================================================================
// Console reporter
// ============================================================================

/// Format a detection report for terminal output.
///
/// Produces output like:
/// ```text
/// === Email Opportunities (2 detected) ===
///
/// [welcome_email] Sign Up -> Welcome Email (90%)
///     variables: user_name, user_email
///
/// === Flow: E-commerce ===
/// This flow of 2 screens appears to be an e-commerce store.
///   1. Sign Up - User creates an account
///
/// Suggested emails:
///   - Welcome Email (welcome_email): User creates an account
///
/// === Aggregate confidence: 92% ===
/// ```
pub fn format_console_report(report: &DetectionReport, drafts: Option<&[EmailDraft]>) -> String {
    let mut out = String::new();

    for notice in &report.notices {
        out.push_str(&format!("! {}\n", notice));
    }
    if !report.notices.is_empty() {
        out.push('\n');
    }

    out.push_str(&format!(
        "=== Email Opportunities ({} detected) ===\n\n",
        report.opportunities.len()
    ));

    for opp in &report.opportunities {
        out.push_str(&format!(
            "[{}] {} -> {} ({})\n",
            opp.category,
            opp.screen_name,
            opp.suggested_name,
            percent(opp.confidence)
        ));

        if !opp.context.detected_variables.is_empty() {
            out.push_str(&format!(
                "    variables: {}\n",
                opp.context.detected_variables.join(", ")
            ));
        }

        if let Some(text) = &opp.text_analysis {
            out.push_str(&format!("    text: {}\n", channel_status(text)));
        }
        if let Some(vision) = &opp.visual_analysis {
            out.push_str(&format!("    vision: {}\n", channel_status(vision)));
        }
    }

    let summary = &report.summary;
    out.push_str(&format!("\n=== Flow: {} ===\n", summary.product_type));
    out.push_str(&format!("{}\n", summary.narrative));
    for step in &summary.steps {
        out.push_str(&format!("  {}. {} - {}\n", step.index, step.screen_name, step.purpose));
    }

    if !summary.suggested_emails.is_empty() {
        out.push_str("\nSuggested emails:\n");
        for email in &summary.suggested_emails {
            out.push_str(&format!(
                "  - {} ({}): {}\n",
                email.name, email.category, email.context
            ));
        }
    }

    if let Some(drafts) = drafts {
        for draft in drafts {
            out.push_str(&format!(
                "\n--- Draft [{}] ---\nSubject: {}\nPreheader: {}\n\n{}",
                draft.category, draft.subject, draft.preheader, draft.body
            ));
        }
    }

    out.push_str(&format!(
        "\n=== Aggregate confidence: {} ===\n",
        percent(summary.aggregate_confidence)
    ));

    out
}

fn percent(confidence: f32) -> String {
    format!("{:.0}%", confidence * 100.0)
}

fn channel_status<T>(result: &ChannelResult<T>) -> &'static str {
    match result {
        ChannelResult::Analyzed(_) => "analyzed",
        ChannelResult::Fallback(_) => "fallback",
    }
}
