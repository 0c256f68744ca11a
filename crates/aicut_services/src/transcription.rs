//! Contract with the speech-to-caption service.
//!
//! The service receives the raw bytes of the whole source asset and answers
//! with caption spans in source-media time, seconds as floats. Nothing here
//! touches the clip store: callers take the returned spans and hand them to
//! `Editor::insert_captions` themselves.

use aicut_core::{CaptionSpan, TimeUs};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::{Result, ServiceError};
use crate::probe::mime_type;

pub const TRANSCRIPTION_PROMPT: &str = "Transcribe the speech in this media. \
Answer with a JSON array of objects with the fields startTime and endTime \
(seconds from the start of the media) and text.";

/// Anything that can turn media bytes into source-time captions.
pub trait Transcriber {
    fn transcribe(&self, media: &[u8], mime_type: &str) -> impl Future<Output = Result<Vec<CaptionSpan>>> + Send;
}

/// Request body for a transcription call, with the media inlined as base64.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionRequest {
    pub prompt: String,
    pub mime_type: String,
    pub data: String,
}

impl TranscriptionRequest {
    pub fn new(media: &[u8], mime_type: &str) -> Self {
        Self {
            prompt: TRANSCRIPTION_PROMPT.to_string(),
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(media),
        }
    }

    pub fn media(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(&self.data)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCaption {
    start_time: f64,
    end_time: f64,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireReply {
    Bare(Vec<WireCaption>),
    Wrapped { captions: Vec<WireCaption> },
}

/// Parse the service's reply. Accepts a bare JSON array or an object with
/// a `captions` array, optionally inside a Markdown code fence.
///
/// Spans with `startTime >= endTime` are passed through untouched; the
/// aligner reports them as malformed.
pub fn parse_transcript(reply: &str) -> Result<Vec<CaptionSpan>> {
    let body = strip_code_fence(reply);
    let captions = match serde_json::from_str::<WireReply>(body)? {
        WireReply::Bare(c) => c,
        WireReply::Wrapped { captions } => captions,
    };

    captions
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let timestamp = |secs: f64| {
                TimeUs::try_from_seconds(secs).ok_or_else(|| {
                    ServiceError::MalformedReply(format!("caption {i} has an out-of-range timestamp {secs}"))
                })
            };
            Ok(CaptionSpan::new(timestamp(c.start_time)?, timestamp(c.end_time)?, c.text.trim()))
        })
        .collect()
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string ("json") up to the first newline
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

async fn read_media(path: &Path) -> Result<(Vec<u8>, &'static str)> {
    if !path.exists() {
        return Err(ServiceError::FileNotFound(path.to_path_buf()));
    }
    let media = tokio::fs::read(path).await?;
    Ok((media, mime_type(path)))
}

/// Build the request body for transcribing a media file, for callers that
/// talk to the service themselves.
pub async fn request_for_file(path: impl AsRef<Path>) -> Result<TranscriptionRequest> {
    let (media, mime) = read_media(path.as_ref()).await?;
    Ok(TranscriptionRequest::new(&media, mime))
}

/// Read a media file and send it to `transcriber`.
pub async fn transcribe_file<T: Transcriber>(transcriber: &T, path: impl AsRef<Path>) -> Result<Vec<CaptionSpan>> {
    let path = path.as_ref();
    let (media, mime) = read_media(path).await?;
    tracing::info!(path = %path.display(), bytes = media.len(), mime, "requesting transcription");

    let captions = transcriber.transcribe(&media, mime).await?;
    tracing::info!(count = captions.len(), "transcription finished");
    Ok(captions)
}

/// A transcriber that answers with a reply stored on disk, in the same
/// format the service returns.
#[derive(Debug, Clone)]
pub struct FileTranscriber {
    reply_path: PathBuf,
}

impl FileTranscriber {
    pub fn new(reply_path: impl Into<PathBuf>) -> Self {
        Self {
            reply_path: reply_path.into(),
        }
    }
}

impl Transcriber for FileTranscriber {
    async fn transcribe(&self, _media: &[u8], _mime_type: &str) -> Result<Vec<CaptionSpan>> {
        let reply = tokio::fs::read_to_string(&self.reply_path)
            .await
            .map_err(|e| ServiceError::Transcription(format!("{}: {e}", self.reply_path.display())))?;
        parse_transcript(&reply)
    }
}
