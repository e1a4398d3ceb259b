use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ai::endpoint::AnalysisEndpoint;
use crate::ai::renderer::ScreenRenderer;
use crate::ai::text_channel::{self, TextChannelOutput};
use crate::ai::vision_channel::{self, VisionChannelOutput};
use crate::email::email_model::{EmailOpportunity, FlowSummary, HeuristicMatch};
use crate::fusion::flow_synthesizer::synthesize_flow;
use crate::fusion::fusion::fuse;
use crate::screen::classifier::classify_screen;
use crate::screen::extractor::extract_screens;
use crate::screen::screen_model::{DocumentNode, Screen};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{PassOutcome, TraceEvent};

pub const NO_ENDPOINT_NOTICE: &str =
    "No AI endpoint configured; showing heuristic results only";
pub const NO_RENDERER_NOTICE: &str = "No screen renderer configured; vision analysis skipped";

/// Which user-triggered channels to run on top of the heuristic pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectOptions {
    pub text: bool,
    pub vision: bool,
}

impl DetectOptions {
    pub fn heuristic_only() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            text: true,
            vision: true,
        }
    }
}

/// Identifies one detection pass. Only the newest pass may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassToken(u64);

impl PassToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Per-pass results keyed by screen id. Owned by a single pass and dropped
/// with it.
#[derive(Debug)]
pub struct ResultTable {
    pub token: PassToken,
    pub heuristic: HashMap<String, HeuristicMatch>,
    pub text: TextChannelOutput,
    pub vision: VisionChannelOutput,
}

impl ResultTable {
    fn new(token: PassToken) -> Self {
        Self {
            token,
            heuristic: HashMap::new(),
            text: TextChannelOutput::new(),
            vision: VisionChannelOutput::new(),
        }
    }
}

/// What the presentation layer receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub pass: u64,
    pub opportunities: Vec<EmailOpportunity>,
    pub summary: FlowSummary,
    pub notices: Vec<String>,
}

impl DetectionReport {
    pub fn fallback_count(&self) -> usize {
        self.opportunities.iter().filter(|o| o.has_fallback()).count()
    }
}

// ============================================================================
// DetectionEngine
// ============================================================================

pub struct DetectionEngine {
    endpoint: Option<Arc<dyn AnalysisEndpoint>>,
    renderer: Option<Arc<dyn ScreenRenderer>>,
    tracer: TraceLogger,
    generation: AtomicU64,
    published: Mutex<Option<DetectionReport>>,
}

impl DetectionEngine {
    pub fn new(endpoint: Option<Arc<dyn AnalysisEndpoint>>) -> Self {
        Self {
            endpoint,
            renderer: None,
            tracer: TraceLogger::disabled(),
            generation: AtomicU64::new(0),
            published: Mutex::new(None),
        }
    }

    pub fn heuristic_only() -> Self {
        Self::new(None)
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ScreenRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = tracer;
        self
    }

    /// Start a new pass, superseding any pass still in flight.
    pub fn begin_pass(&self) -> PassToken {
        PassToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: PassToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// The report of the newest pass that completed, if any.
    pub fn current(&self) -> Option<DetectionReport> {
        match self.published.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Extract screens from a document and run a detection pass over them.
    pub async fn detect(&self, document: &DocumentNode, options: DetectOptions) -> Option<DetectionReport> {
        let screens = extract_screens(document);
        self.detect_screens(&screens, options).await
    }

    /// Run one detection pass. Returns the published report, or `None` when a
    /// newer pass started before this one finished; its results are dropped.
    pub async fn detect_screens(&self, screens: &[Screen], options: DetectOptions) -> Option<DetectionReport> {
        let token = self.begin_pass();
        let mut table = ResultTable::new(token);
        let mut notices = Vec::new();
        let mut channels = vec!["heuristic"];

        info!(pass = token.0, screens = screens.len(), "detection pass started");

        for screen in screens {
            if let Some(m) = classify_screen(&screen.name, &screen.interactive_labels) {
                table.heuristic.insert(screen.id.clone(), m);
            }
        }

        let wants_ai = options.text || options.vision;
        match self.endpoint.as_deref() {
            None if wants_ai => {
                warn!("AI analysis requested without an endpoint");
                notices.push(NO_ENDPOINT_NOTICE.to_string());
            }
            None => {}
            Some(endpoint) => {
                if options.text {
                    channels.push("text");
                    table.text = text_channel::analyze_screens(endpoint, screens).await;
                    if !self.is_current(token) {
                        return self.discard(token, screens.len());
                    }
                }

                if options.vision {
                    match self.renderer.as_deref() {
                        Some(renderer) => {
                            channels.push("vision");
                            table.vision = vision_channel::analyze_screens(
                                endpoint,
                                renderer,
                                screens,
                                || self.is_current(token),
                            )
                            .await;
                        }
                        None => notices.push(NO_RENDERER_NOTICE.to_string()),
                    }
                }
            }
        }

        if !self.is_current(token) {
            return self.discard(token, screens.len());
        }

        let report = build_report(screens, &table, notices);
        self.publish(report, screens.len(), &channels)
    }

    fn publish(&self, report: DetectionReport, screens: usize, channels: &[&str]) -> Option<DetectionReport> {
        let token = PassToken(report.pass);
        {
            let mut slot = match self.published.lock() {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
            // Checked under the lock so an older pass can never replace a newer report
            if !self.is_current(token) {
                drop(slot);
                return self.discard(token, screens);
            }
            *slot = Some(report.clone());
        }

        info!(
            pass = report.pass,
            opportunities = report.opportunities.len(),
            "detection pass published"
        );
        self.tracer.log(
            &TraceEvent::now(report.pass, PassOutcome::Published)
                .with_screens(screens)
                .with_channels(channels)
                .with_opportunities(report.opportunities.len(), report.fallback_count())
                .with_notices(&report.notices),
        );

        Some(report)
    }

    fn discard(&self, token: PassToken, screens: usize) -> Option<DetectionReport> {
        info!(pass = token.0, "detection pass superseded, results discarded");
        self.tracer
            .log(&TraceEvent::now(token.0, PassOutcome::Discarded).with_screens(screens));
        None
    }
}

/// Fuse every screen in scan order and synthesize the flow summary.
pub fn build_report(screens: &[Screen], table: &ResultTable, notices: Vec<String>) -> DetectionReport {
    let mut opportunities: Vec<EmailOpportunity> = screens
        .iter()
        .filter_map(|s| {
            fuse(
                s,
                table.heuristic.get(&s.id),
                table.text.get(&s.id),
                table.vision.get(&s.id),
            )
        })
        .collect();

    debug!(
        pass = table.token.0,
        screens = screens.len(),
        opportunities = opportunities.len(),
        "fusion complete"
    );

    let summary = synthesize_flow(screens, &opportunities);
    for opp in &mut opportunities {
        opp.context.product_type = Some(summary.product_type.clone());
    }

    DetectionReport {
        pass: table.token.0,
        opportunities,
        summary,
        notices,
    }
}
