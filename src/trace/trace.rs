use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassOutcome {
    Published,
    Discarded,
}

/// One line of the pass trace.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub pass: u64,
    pub outcome: PassOutcome,

    pub screens: usize,
    pub channels: Vec<String>,

    pub opportunities: usize,
    pub fallbacks: usize,
    pub notices: Vec<String>,
}

impl TraceEvent {
    pub fn now(pass: u64, outcome: PassOutcome) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            pass,
            outcome,
            screens: 0,
            channels: vec![],
            opportunities: 0,
            fallbacks: 0,
            notices: vec![],
        }
    }

    pub fn with_screens(mut self, screens: usize) -> Self {
        self.screens = screens;
        self
    }

    pub fn with_channels(mut self, channels: &[&str]) -> Self {
        self.channels = channels.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_opportunities(mut self, opportunities: usize, fallbacks: usize) -> Self {
        self.opportunities = opportunities;
        self.fallbacks = fallbacks;
        self
    }

    pub fn with_notices(mut self, notices: &[String]) -> Self {
        self.notices = notices.to_vec();
        self
    }
}
