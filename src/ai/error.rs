use thiserror::Error;

/// A screen node the extractor cannot turn into a `Screen`.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("node '{0}' has no id")]
    MissingId(String),

    #[error("node '{node}' has invalid dimensions {width}x{height}")]
    InvalidDimensions { node: String, width: f64, height: f64 },
}

/// Failure of one channel call. Never escapes a channel: each variant is
/// converted into the channel's fallback stub.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Connection failed, timed out, or the body could not be read
    #[error("network error: {0}")]
    Network(String),

    /// Endpoint answered with a non-success status
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response had no usable JSON
    #[error("parse error: {0}")]
    Parse(String),

    /// No endpoint configured for this channel
    #[error("no analysis endpoint configured")]
    NotConfigured,

    /// The screen could not be rendered to an image
    #[error("render error: {0}")]
    Render(String),
}

impl From<reqwest::Error> for ChannelError {
    fn from(e: reqwest::Error) -> Self {
        ChannelError::Network(e.to_string())
    }
}
