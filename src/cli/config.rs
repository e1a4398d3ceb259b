use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::ai::endpoint::{
    AnalysisEndpoint, DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL, OllamaEndpoint, RelayEndpoint,
};
use crate::ai::error::ChannelError;

pub const DEFAULT_CONFIG_PATH: &str = "email-detection.yaml";
pub const ENDPOINT_ENV: &str = "EMAIL_DETECTION_ENDPOINT";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "email-detection",
    version,
    about = "Detect transactional email opportunities in design screens"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: email-detection.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Endpoint protocol: ollama or relay
    #[arg(long, value_enum, global = true)]
    pub endpoint_kind: Option<EndpointKind>,

    /// URL of the text-analysis endpoint
    #[arg(long, global = true)]
    pub text_endpoint: Option<String>,

    /// URL of the vision-analysis endpoint
    #[arg(long, global = true)]
    pub vision_endpoint: Option<String>,

    /// Text model name (ollama only)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Vision model name (ollama only)
    #[arg(long, global = true)]
    pub vision_model: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect email opportunities in an exported document tree
    Detect {
        /// Document tree JSON (a node, or an array of screen nodes)
        #[arg(long)]
        input: String,

        /// Run the text-analysis channel
        #[arg(long)]
        text: bool,

        /// Run the vision-analysis channel
        #[arg(long)]
        vision: bool,

        /// Directory of exported screen images (<screen-id>.png)
        #[arg(long)]
        images: Option<String>,

        /// Output format: console or json
        #[arg(long)]
        format: Option<String>,

        /// Include email drafts in the output
        #[arg(long)]
        drafts: bool,

        /// Append a JSONL trace of each pass to this file
        #[arg(long)]
        trace: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    #[default]
    Ollama,
    Relay,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `email-detection.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub detect: DetectConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub kind: EndpointKind,

    pub text_url: Option<String>,
    pub vision_url: Option<String>,
    pub model: Option<String>,
    pub vision_model: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            kind: EndpointKind::Ollama,
            text_url: None,
            vision_url: None,
            model: None,
            vision_model: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    #[serde(default)]
    pub text: bool,

    #[serde(default)]
    pub vision: bool,

    #[serde(default = "default_console")]
    pub format: String,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            text: false,
            vision: false,
            format: default_console(),
        }
    }
}

// Serde default helpers
fn default_timeout() -> u64 { 60 }
fn default_console() -> String { "console".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = config_path, error = %e, "malformed config file, using defaults");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Endpoint resolution: CLI > config > env > defaults
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSettings {
    pub kind: EndpointKind,
    pub text_url: Option<String>,
    pub vision_url: Option<String>,
    pub model: String,
    pub vision_model: String,
    pub timeout: Duration,
}

impl EndpointSettings {
    pub fn is_configured(&self) -> bool {
        self.text_url.is_some() || self.vision_url.is_some()
    }
}

pub fn resolve_endpoint_settings(
    cli: &Cli,
    config: &EndpointConfig,
    env_url: Option<String>,
) -> EndpointSettings {
    let kind = cli.endpoint_kind.unwrap_or(config.kind);

    let text_url = cli
        .text_endpoint
        .clone()
        .or_else(|| config.text_url.clone())
        .or_else(|| env_url.clone());

    let mut vision_url = cli
        .vision_endpoint
        .clone()
        .or_else(|| config.vision_url.clone())
        .or(env_url);

    // One Ollama server answers both channels
    if kind == EndpointKind::Ollama && vision_url.is_none() {
        vision_url = text_url.clone();
    }

    EndpointSettings {
        kind,
        text_url,
        vision_url,
        model: cli
            .model
            .clone()
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
        vision_model: cli
            .vision_model
            .clone()
            .or_else(|| config.vision_model.clone())
            .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
        timeout: Duration::from_secs(config.timeout_secs),
    }
}

/// Build the endpoint, or `None` when no URL was configured.
pub fn build_endpoint(
    settings: &EndpointSettings,
) -> Result<Option<Arc<dyn AnalysisEndpoint>>, ChannelError> {
    if !settings.is_configured() {
        return Ok(None);
    }

    let endpoint: Arc<dyn AnalysisEndpoint> = match settings.kind {
        EndpointKind::Relay => Arc::new(RelayEndpoint::new(
            settings.text_url.clone(),
            settings.vision_url.clone(),
            settings.timeout,
        )?),
        EndpointKind::Ollama => {
            let url = settings
                .text_url
                .as_deref()
                .or(settings.vision_url.as_deref())
                .ok_or(ChannelError::NotConfigured)?;
            Arc::new(OllamaEndpoint::new(
                url,
                &settings.model,
                &settings.vision_model,
                settings.timeout,
            )?)
        }
    };

    Ok(Some(endpoint))
}
