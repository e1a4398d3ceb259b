use std::sync::Arc;

use tracing::info;

use crate::ai::endpoint::AnalysisEndpoint;
use crate::ai::renderer::DirectoryRenderer;
use crate::email::draft::draft_all;
use crate::engine::engine::{DetectOptions, DetectionEngine};
use crate::report::console::format_console_report;
use crate::report::json::format_json_report;
use crate::screen::screen_model::DocumentNode;
use crate::trace::logger::TraceLogger;

// ============================================================================
// detect subcommand
// ============================================================================

pub struct DetectArgs<'a> {
    pub input: &'a str,
    pub options: DetectOptions,
    pub images: Option<&'a str>,
    pub format: &'a str,
    pub drafts: bool,
    pub trace: Option<&'a str>,
    pub output: Option<&'a str>,
}

pub async fn cmd_detect(
    args: DetectArgs<'_>,
    endpoint: Option<Arc<dyn AnalysisEndpoint>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = load_document(args.input)?;

    let mut engine = DetectionEngine::new(endpoint);
    if let Some(dir) = args.images {
        engine = engine.with_renderer(Arc::new(DirectoryRenderer::new(dir)));
    }
    if let Some(path) = args.trace {
        engine = engine.with_tracer(TraceLogger::new(path));
    }

    let report = engine
        .detect(&document, args.options)
        .await
        .ok_or("detection pass was superseded")?;

    info!(
        opportunities = report.opportunities.len(),
        product = %report.summary.product_type,
        "detection complete"
    );

    let drafts = args.drafts.then(|| draft_all(&report.opportunities));

    let output_content = match args.format {
        "json" => format_json_report(&report, drafts.as_deref())?,
        _ => format_console_report(&report, drafts.as_deref()),
    };

    match args.output {
        Some(path) => std::fs::write(path, &output_content)?,
        None => print!("{}", output_content),
    }

    Ok(())
}

/// Load a document tree. A bare array of nodes is wrapped in a document root.
pub fn load_document(path: &str) -> Result<DocumentNode, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    parse_document(&content)
}

pub fn parse_document(content: &str) -> Result<DocumentNode, Box<dyn std::error::Error>> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    if value.is_array() {
        let children: Vec<DocumentNode> = serde_json::from_value(value)?;
        return Ok(DocumentNode {
            name: "Document".to_string(),
            node_type: "DOCUMENT".to_string(),
            children,
            ..Default::default()
        });
    }

    Ok(serde_json::from_value(value)?)
}
