//! Media source resolution: turn a file on disk into a clip source locator
//! right away, and find its natural duration with ffprobe afterwards.

use aicut_core::{ClipKind, TimeUs};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, ServiceError};

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub fn name(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }
}

/// A media file that can back a clip. The duration arrives separately,
/// see [`probe_duration`].
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    pub path: PathBuf,
    /// Stable locator stored in the clip.
    pub locator: String,
    pub name: String,
    pub kind: MediaKind,
}

impl MediaSource {
    /// The clip kind for this source, shown from the start of the media.
    pub fn clip_kind(&self) -> ClipKind {
        match self.kind {
            MediaKind::Video => ClipKind::Video {
                source: self.locator.clone(),
                source_offset_us: TimeUs::ZERO,
            },
            MediaKind::Image => ClipKind::Image {
                source: self.locator.clone(),
            },
        }
    }
}

/// Resolve a file into a [`MediaSource`] without touching its contents.
pub fn locate(path: impl AsRef<Path>) -> Result<MediaSource> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ServiceError::FileNotFound(path.to_path_buf()));
    }

    let kind = detect_media_kind(path).ok_or_else(|| ServiceError::UnsupportedMedia(path.to_path_buf()))?;
    let canonical = path.canonicalize()?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(MediaSource {
        locator: format!("file://{}", canonical.display()),
        path: canonical,
        name,
        kind,
    })
}

/// Ask ffprobe for the natural duration of a media file.
pub async fn probe_duration(path: impl AsRef<Path>) -> Result<TimeUs> {
    use tokio::process::Command;

    let path = path.as_ref();
    if !path.exists() {
        return Err(ServiceError::FileNotFound(path.to_path_buf()));
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| ServiceError::FfprobeExec(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ServiceError::FfprobeFailed(stderr.into_owned()));
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    let duration = parse_duration(&probe).ok_or_else(|| ServiceError::MissingDuration(path.to_path_buf()))?;
    tracing::debug!(path = %path.display(), %duration, "probed media duration");
    Ok(duration)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Container duration in `format.duration`, seconds as a decimal string.
fn parse_duration(probe: &FfprobeOutput) -> Option<TimeUs> {
    probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(TimeUs::from_seconds)
}

/// Detect media kind from the file extension.
fn detect_media_kind(path: &Path) -> Option<MediaKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" => Some(MediaKind::Image),
        "mp4" | "mkv" | "webm" | "mov" | "avi" | "m4v" => Some(MediaKind::Video),
        _ => None,
    }
}

/// MIME type for the media extensions the editor accepts.
pub fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn detect_kind_by_extension() {
        assert_eq!(detect_media_kind(Path::new("photo.png")), Some(MediaKind::Image));
        assert_eq!(detect_media_kind(Path::new("PHOTO.JPG")), Some(MediaKind::Image));
        assert_eq!(detect_media_kind(Path::new("talk.MP4")), Some(MediaKind::Video));
        assert_eq!(detect_media_kind(Path::new("song.mp3")), None);
        assert_eq!(detect_media_kind(Path::new("noext")), None);
    }

    #[test]
    fn mime_types() {
        assert_eq!(mime_type(Path::new("a.mp4")), "video/mp4");
        assert_eq!(mime_type(Path::new("a.webm")), "video/webm");
        assert_eq!(mime_type(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_type(Path::new("a.xyz")), "application/octet-stream");
    }

    #[test]
    fn parse_duration_video() {
        let json = r#"{
            "streams": [
                { "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080 },
                { "codec_type": "audio", "codec_name": "aac" }
            ],
            "format": { "duration": "10.5" }
        }"#;
        let output: FfprobeOutput = serde_json::from_str(json).unwrap();
        assert_eq!(parse_duration(&output), Some(TimeUs::from_seconds(10.5)));
    }

    #[test]
    fn parse_duration_missing_or_invalid() {
        let missing: FfprobeOutput = serde_json::from_str(r#"{ "streams": [], "format": {} }"#).unwrap();
        assert_eq!(parse_duration(&missing), None);

        let garbage: FfprobeOutput =
            serde_json::from_str(r#"{ "streams": [], "format": { "duration": "N/A" } }"#).unwrap();
        assert_eq!(parse_duration(&garbage), None);

        let zero: FfprobeOutput =
            serde_json::from_str(r#"{ "streams": [], "format": { "duration": "0.000" } }"#).unwrap();
        assert_eq!(parse_duration(&zero), None);
    }

    #[test]
    fn locate_existing_video() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"not really a video").unwrap();

        let media = locate(&path).unwrap();
        assert_eq!(media.kind, MediaKind::Video);
        assert_eq!(media.name, "clip.mp4");
        assert!(media.locator.starts_with("file://"));
        assert!(media.locator.ends_with("clip.mp4"));
        assert!(matches!(
            media.clip_kind(),
            ClipKind::Video { source_offset_us: TimeUs::ZERO, .. }
        ));
    }

    #[test]
    fn locate_rejects_missing_and_unsupported() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.mp4");
        assert!(matches!(locate(&missing), Err(ServiceError::FileNotFound(_))));

        let audio = dir.path().join("song.mp3");
        std::fs::write(&audio, b"id3").unwrap();
        assert!(matches!(locate(&audio), Err(ServiceError::UnsupportedMedia(_))));
    }

    #[tokio::test]
    async fn probe_nonexistent_file_returns_error() {
        let result = probe_duration("/tmp/does_not_exist_aicut_probe_test.mp4").await;
        assert!(matches!(result, Err(ServiceError::FileNotFound(_))));
    }
}
