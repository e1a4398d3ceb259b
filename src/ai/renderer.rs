use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::ai::error::ChannelError;
use crate::screen::screen_model::Screen;

/// Encoded image of one screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl RenderedImage {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: "image/png".to_string(),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Turns a screen into an image for the vision channel.
#[async_trait]
pub trait ScreenRenderer: Send + Sync {
    async fn render(&self, screen: &Screen) -> Result<RenderedImage, ChannelError>;
}

/// Reads pre-exported images named after the screen id (`1:23` → `1-23.png`).
pub struct DirectoryRenderer {
    dir: PathBuf,
}

impl DirectoryRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn image_path(&self, screen_id: &str) -> PathBuf {
        self.dir.join(format!("{}.png", sanitize_id(screen_id)))
    }
}

#[async_trait]
impl ScreenRenderer for DirectoryRenderer {
    async fn render(&self, screen: &Screen) -> Result<RenderedImage, ChannelError> {
        let path = self.image_path(&screen.id);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ChannelError::Render(format!("{}: {}", path.display(), e)))?;
        Ok(RenderedImage::png(bytes))
    }
}

fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}
