//! Contract with the image-generation service. The only thing the editor
//! needs from a generated image is a locator it can put in an image clip.

use aicut_core::ClipKind;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::future::Future;
use std::path::PathBuf;

use crate::error::{Result, ServiceError};

const LABEL_MAX_CHARS: usize = 32;

pub trait ImageGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<GeneratedImage>> + Send;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl GeneratedImage {
    /// Inline `data:` URL, usable directly as a clip source.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }

    pub fn clip_kind(&self) -> ClipKind {
        ClipKind::Image {
            source: self.data_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireImage {
    mime_type: String,
    data: String,
}

/// Parse a `{ "mimeType": ..., "data": <base64> }` reply.
pub fn parse_image_reply(reply: &str) -> Result<GeneratedImage> {
    let wire: WireImage = serde_json::from_str(reply)?;
    if !wire.mime_type.starts_with("image/") {
        return Err(ServiceError::MalformedReply(format!(
            "expected an image, got {}",
            wire.mime_type
        )));
    }
    let data = STANDARD.decode(wire.data.trim())?;
    if data.is_empty() {
        return Err(ServiceError::ImageGeneration("service returned an empty image".into()));
    }
    Ok(GeneratedImage {
        mime_type: wire.mime_type,
        data,
    })
}

/// An image generator that answers with a reply stored on disk, in the
/// same format the service returns.
#[derive(Debug, Clone)]
pub struct FileImageGenerator {
    reply_path: PathBuf,
}

impl FileImageGenerator {
    pub fn new(reply_path: impl Into<PathBuf>) -> Self {
        Self {
            reply_path: reply_path.into(),
        }
    }
}

impl ImageGenerator for FileImageGenerator {
    async fn generate(&self, _prompt: &str) -> Result<GeneratedImage> {
        let reply = tokio::fs::read_to_string(&self.reply_path)
            .await
            .map_err(|e| ServiceError::ImageGeneration(format!("{}: {e}", self.reply_path.display())))?;
        parse_image_reply(&reply)
    }
}

/// Clip label for a generated image: the prompt, cut to a readable length.
pub fn label_for_prompt(prompt: &str) -> String {
    let prompt = prompt.trim();
    if prompt.chars().count() <= LABEL_MAX_CHARS {
        return prompt.to_string();
    }
    let mut label: String = prompt.chars().take(LABEL_MAX_CHARS - 1).collect();
    label.push('…');
    label
}

/// Generate an image and return the clip kind and label to insert.
pub async fn generate_clip<G: ImageGenerator>(generator: &G, prompt: &str) -> Result<(ClipKind, String)> {
    if prompt.trim().is_empty() {
        return Err(ServiceError::ImageGeneration("prompt is empty".into()));
    }
    tracing::info!(prompt, "requesting image");
    let image = generator.generate(prompt).await?;
    tracing::info!(bytes = image.data.len(), mime = %image.mime_type, "image generated");
    Ok((image.clip_kind(), label_for_prompt(prompt)))
}
