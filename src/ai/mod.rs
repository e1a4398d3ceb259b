pub mod endpoint;
pub mod error;
pub mod json_extract;
pub mod renderer;
pub mod text_channel;
pub mod vision_channel;
