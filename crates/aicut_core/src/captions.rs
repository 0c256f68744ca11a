//! Place transcribed captions on the timeline.
//!
//! Transcription runs over the whole, untrimmed source asset, so caption
//! times arrive in source-media time. A video clip only shows the window
//! `[offset, offset + duration)` of its source, starting at its timeline
//! position. Alignment keeps the captions that fall inside that window,
//! cuts them to it, and shifts them into timeline time.

use crate::error::{CoreError, Result};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One caption as produced by the transcription service, in source time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptionSpan {
    pub start_us: TimeUs,
    pub end_us: TimeUs,
    pub text: String,
}

impl CaptionSpan {
    pub fn new(start_us: TimeUs, end_us: TimeUs, text: impl Into<String>) -> Self {
        Self {
            start_us,
            end_us,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// `start >= end` as delivered by the service.
    MalformedCaption,
    /// Entirely before or after the clip's source window.
    NoOverlap,
    /// Nothing left once cut to the clip's visible extent.
    DegenerateSpan,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DropReason::MalformedCaption => "malformed caption (start >= end)",
            DropReason::NoOverlap => "outside the trimmed source window",
            DropReason::DegenerateSpan => "empty after clamping to the clip",
        };
        f.write_str(s)
    }
}

/// A caption that did not make it onto the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedCaption {
    /// Position in the input sequence.
    pub index: usize,
    pub text: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentOutcome {
    /// The service returned no captions at all.
    NothingTranscribed,
    /// Captions were returned but none survived trimming.
    NothingSurvived { dropped: Vec<DroppedCaption> },
    /// At least one text clip was produced, in input order.
    Placed {
        clips: Vec<Clip>,
        dropped: Vec<DroppedCaption>,
    },
}

impl AlignmentOutcome {
    pub fn clips(&self) -> &[Clip] {
        match self {
            AlignmentOutcome::Placed { clips, .. } => clips,
            _ => &[],
        }
    }

    pub fn dropped(&self) -> &[DroppedCaption] {
        match self {
            AlignmentOutcome::NothingTranscribed => &[],
            AlignmentOutcome::NothingSurvived { dropped } => dropped,
            AlignmentOutcome::Placed { dropped, .. } => dropped,
        }
    }

    pub fn into_clips(self) -> Vec<Clip> {
        match self {
            AlignmentOutcome::Placed { clips, .. } => clips,
            _ => Vec::new(),
        }
    }
}

/// Turn source-time captions into text clips for the trimmed `source` clip.
///
/// Only video clips have a trim window; anything else is rejected. Each
/// caption is handled independently and a dropped caption never stops the
/// rest of the batch.
pub fn align_captions(source: &Clip, captions: &[CaptionSpan]) -> Result<AlignmentOutcome> {
    if !matches!(source.kind, ClipKind::Video { .. }) {
        return Err(CoreError::InvalidOperation(format!(
            "captions can only be aligned to a video clip, {} is {}",
            source.id,
            source.kind.name()
        )));
    }

    if captions.is_empty() {
        return Ok(AlignmentOutcome::NothingTranscribed);
    }

    let mut clips = Vec::new();
    let mut dropped = Vec::new();

    for (index, caption) in captions.iter().enumerate() {
        match place_caption(source, caption) {
            Ok(clip) => clips.push(clip),
            Err(reason) => {
                if reason == DropReason::MalformedCaption {
                    tracing::warn!(
                        index,
                        start_us = caption.start_us.0,
                        end_us = caption.end_us.0,
                        "skipping malformed caption"
                    );
                } else {
                    tracing::debug!(index, %reason, "caption dropped");
                }
                dropped.push(DroppedCaption {
                    index,
                    text: caption.text.clone(),
                    reason,
                });
            }
        }
    }

    if clips.is_empty() {
        Ok(AlignmentOutcome::NothingSurvived { dropped })
    } else {
        Ok(AlignmentOutcome::Placed { clips, dropped })
    }
}

fn place_caption(source: &Clip, caption: &CaptionSpan) -> std::result::Result<Clip, DropReason> {
    if caption.start_us >= caption.end_us {
        return Err(DropReason::MalformedCaption);
    }

    let (window_start, window_end) = source.source_window();
    if !(caption.start_us < window_end && caption.end_us > window_start) {
        return Err(DropReason::NoOverlap);
    }

    // saturates for extreme source times
    let local_start = caption.start_us - window_start;
    let local_end = caption.end_us - window_start;
    let (start, end) =
        clamp_to_clip(local_start, local_end, source.duration_us).ok_or(DropReason::DegenerateSpan)?;

    Ok(Clip::text(
        caption.text.clone(),
        source.timeline_start_us + start,
        end - start,
    ))
}

/// Cut a clip-local span to `[0, duration)`. `None` if nothing is left.
pub fn clamp_to_clip(local_start: TimeUs, local_end: TimeUs, duration: TimeUs) -> Option<(TimeUs, TimeUs)> {
    let start = local_start.max(TimeUs::ZERO);
    let end = local_end.min(duration);
    (end - start).is_positive().then_some((start, end))
}
