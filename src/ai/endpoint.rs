use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::error::ChannelError;
use crate::screen::screen_model::ScreenContent;

// ============================================================================
// Wire contracts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysisRequest {
    pub frames: Vec<TextFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFrame {
    pub name: String,
    pub id: String,
    #[serde(flatten)]
    pub content: ScreenContent,
}

/// One record of the text endpoint's `analysis` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysisRecord {
    pub frame_id: String,
    pub frame_name: String,
    pub detected_purpose: String,
    pub suggested_email_type: String,
    pub suggested_email_name: String,
    pub confidence: f32,
    pub reasoning: String,
    pub suggested_variables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysisResponse {
    pub analysis: Vec<TextAnalysisRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionAnalysisRequest {
    pub frames: Vec<VisionFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionFrame {
    pub frame_id: String,
    pub frame_name: String,
    /// `data:<mime>;base64,<payload>`
    pub image_data: String,
}

/// One record of the vision endpoint's `analyses` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionAnalysisRecord {
    pub frame_id: String,
    pub frame_name: String,
    pub design_summary: String,
    pub user_flow_purpose: String,
    pub key_elements: Vec<String>,
    pub suggested_email_type: String,
    pub suggested_email_name: String,
    pub email_context: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionAnalysisResponse {
    pub analyses: Vec<VisionAnalysisRecord>,
}

// ============================================================================
// AnalysisEndpoint trait: network boundary of both AI channels
// ============================================================================

/// Sends one request to an LLM-backed service and returns the raw body.
///
/// Implementations report every failure as a `ChannelError`; the channels
/// decide how to degrade.
#[async_trait]
pub trait AnalysisEndpoint: Send + Sync {
    async fn analyze_text(
        &self,
        instruction: &str,
        request: &TextAnalysisRequest,
    ) -> Result<String, ChannelError>;

    async fn analyze_image(
        &self,
        instruction: &str,
        request: &VisionAnalysisRequest,
    ) -> Result<String, ChannelError>;
}

fn build_client(timeout: Duration) -> Result<Client, ChannelError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ChannelError::Network(format!("failed to build HTTP client: {}", e)))
}

async fn read_body(response: reqwest::Response) -> Result<String, ChannelError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ChannelError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}

// ============================================================================
// Relay endpoint (speaks the frames contracts directly)
// ============================================================================

#[derive(Serialize)]
struct RelayEnvelope<'a, T: Serialize> {
    #[serde(flatten)]
    request: &'a T,
    instruction: &'a str,
}

/// Posts the frames contracts to an analysis relay service.
pub struct RelayEndpoint {
    client: Client,
    text_url: Option<String>,
    vision_url: Option<String>,
}

impl RelayEndpoint {
    pub fn new(
        text_url: Option<String>,
        vision_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ChannelError> {
        Ok(Self {
            client: build_client(timeout)?,
            text_url,
            vision_url,
        })
    }

    async fn post<T: Serialize + Sync>(
        &self,
        url: Option<&str>,
        instruction: &str,
        request: &T,
    ) -> Result<String, ChannelError> {
        let url = url.ok_or(ChannelError::NotConfigured)?;
        debug!(url, "posting to analysis relay");

        let response = self
            .client
            .post(url)
            .json(&RelayEnvelope { request, instruction })
            .send()
            .await?;

        read_body(response).await
    }
}

#[async_trait]
impl AnalysisEndpoint for RelayEndpoint {
    async fn analyze_text(
        &self,
        instruction: &str,
        request: &TextAnalysisRequest,
    ) -> Result<String, ChannelError> {
        self.post(self.text_url.as_deref(), instruction, request).await
    }

    async fn analyze_image(
        &self,
        instruction: &str,
        request: &VisionAnalysisRequest,
    ) -> Result<String, ChannelError> {
        self.post(self.vision_url.as_deref(), instruction, request).await
    }
}

// ============================================================================
// Ollama endpoint
// ============================================================================

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_TEXT_MODEL: &str = "qwen2.5:1.5b";
pub const DEFAULT_VISION_MODEL: &str = "llava:7b";

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Talks to a local Ollama `/api/generate` endpoint. The instruction already
/// embeds the frame data, so only the images travel separately.
pub struct OllamaEndpoint {
    client: Client,
    url: String,
    model: String,
    vision_model: String,
}

impl OllamaEndpoint {
    pub fn new(
        url: &str,
        model: &str,
        vision_model: &str,
        timeout: Duration,
    ) -> Result<Self, ChannelError> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.to_string(),
            model: model.to_string(),
            vision_model: vision_model.to_string(),
        })
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        images: Vec<&str>,
    ) -> Result<String, ChannelError> {
        let request = OllamaRequest {
            model,
            prompt,
            stream: false,
            format: "json",
            images,
        };

        let response = self.client.post(&self.url).json(&request).send().await?;
        let body = read_body(response).await?;

        let parsed: OllamaResponse = serde_json::from_str(&body)
            .map_err(|e| ChannelError::Parse(format!("unexpected Ollama body: {}", e)))?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl AnalysisEndpoint for OllamaEndpoint {
    async fn analyze_text(
        &self,
        instruction: &str,
        _request: &TextAnalysisRequest,
    ) -> Result<String, ChannelError> {
        self.generate(&self.model, instruction, vec![]).await
    }

    async fn analyze_image(
        &self,
        instruction: &str,
        request: &VisionAnalysisRequest,
    ) -> Result<String, ChannelError> {
        // Ollama wants bare base64, not a data URI
        let images = request
            .frames
            .iter()
            .map(|f| f.image_data.split_once(',').map_or(f.image_data.as_str(), |(_, b64)| b64))
            .collect();

        self.generate(&self.vision_model, instruction, images).await
    }
}

// ============================================================================
// Mock endpoint (for testing without a live service)
// ============================================================================

/// Scripted endpoint. Text calls pop responses in order; image calls are
/// answered per frame id. Unscripted calls fail with a network error.
#[derive(Default)]
pub struct MockEndpoint {
    text_responses: Mutex<VecDeque<Result<String, String>>>,
    image_responses: Mutex<HashMap<String, Result<String, String>>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_response(self, body: &str) -> Self {
        self.push_text(Ok(body.to_string()));
        self
    }

    pub fn with_text_failure(self, message: &str) -> Self {
        self.push_text(Err(message.to_string()));
        self
    }

    pub fn with_image_response(self, frame_id: &str, body: &str) -> Self {
        self.insert_image(frame_id, Ok(body.to_string()));
        self
    }

    pub fn with_image_failure(self, frame_id: &str, message: &str) -> Self {
        self.insert_image(frame_id, Err(message.to_string()));
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls received so far: `"text"` or `"image:<frame id>"`, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Highest number of calls that were ever in progress at once.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn push_text(&self, response: Result<String, String>) {
        if let Ok(mut queue) = self.text_responses.lock() {
            queue.push_back(response);
        }
    }

    fn insert_image(&self, frame_id: &str, response: Result<String, String>) {
        if let Ok(mut map) = self.image_responses.lock() {
            map.insert(frame_id.to_string(), response);
        }
    }

    async fn answer(
        &self,
        call: String,
        scripted: Option<Result<String, String>>,
    ) -> Result<String, ChannelError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match scripted {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => Err(ChannelError::Network(message)),
            None => Err(ChannelError::Network("no scripted response".into())),
        }
    }
}

#[async_trait]
impl AnalysisEndpoint for MockEndpoint {
    async fn analyze_text(
        &self,
        _instruction: &str,
        _request: &TextAnalysisRequest,
    ) -> Result<String, ChannelError> {
        let scripted = self.text_responses.lock().ok().and_then(|mut q| q.pop_front());
        self.answer("text".to_string(), scripted).await
    }

    async fn analyze_image(
        &self,
        _instruction: &str,
        request: &VisionAnalysisRequest,
    ) -> Result<String, ChannelError> {
        let frame_id = request
            .frames
            .first()
            .map(|f| f.frame_id.clone())
            .unwrap_or_default();
        let scripted = self
            .image_responses
            .lock()
            .ok()
            .and_then(|m| m.get(&frame_id).cloned());
        self.answer(format!("image:{}", frame_id), scripted).await
    }
}
