use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("unsupported media type: {0}")]
    UnsupportedMedia(PathBuf),

    #[error("failed to execute ffprobe: {0}")]
    FfprobeExec(String),

    #[error("ffprobe failed: {0}")]
    FfprobeFailed(String),

    #[error("no duration reported for {0}")]
    MissingDuration(PathBuf),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("image generation failed: {0}")]
    ImageGeneration(String),

    #[error("malformed service reply: {0}")]
    MalformedReply(String),

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
