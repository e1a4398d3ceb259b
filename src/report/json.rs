use serde::Serialize;

use crate::email::draft::EmailDraft;
use crate::engine::engine::DetectionReport;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a DetectionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    drafts: Option<&'a [EmailDraft]>,
}

/// Pretty JSON payload for the presentation layer.
pub fn format_json_report(
    report: &DetectionReport,
    drafts: Option<&[EmailDraft]>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport { report, drafts })
}
