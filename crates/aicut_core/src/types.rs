use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TimeUs
// ---------------------------------------------------------------------------

/// A point or span on either the timeline or a source asset, in microseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeUs(pub i64);

impl TimeUs {
    pub const ZERO: Self = Self(0);

    /// Convert seconds to microseconds, rounding to the nearest microsecond.
    /// Out-of-range values saturate; use [`TimeUs::try_from_seconds`] for
    /// untrusted input.
    pub fn from_seconds(s: f64) -> Self {
        Self((s * 1_000_000.0).round() as i64)
    }

    /// Like `from_seconds`, but `None` for NaN, infinities and values that
    /// do not fit in an `i64` of microseconds.
    pub fn try_from_seconds(s: f64) -> Option<Self> {
        let us = (s * 1_000_000.0).round();
        // i64::MAX as f64 rounds up to 2^63, which is itself out of range
        (us.is_finite() && us >= i64::MIN as f64 && us < i64::MAX as f64).then_some(Self(us as i64))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

// Saturating: results clamp to the i64 bounds.
impl Add for TimeUs {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for TimeUs {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for TimeUs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_us = self.0.unsigned_abs();
        let total_ms = total_us / 1_000;
        let ms = total_ms % 1_000;
        let total_secs = total_ms / 1_000;
        let secs = total_secs % 60;
        let total_mins = total_secs / 60;
        let mins = total_mins % 60;
        let hours = total_mins / 60;
        if self.0 < 0 {
            write!(f, "-{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        } else {
            write!(f, "{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        }
    }
}

// ---------------------------------------------------------------------------
// ClipKind
// ---------------------------------------------------------------------------

/// What a clip shows. Only video clips can be trimmed into their source,
/// and text clips have no backing media at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    Video {
        source: String,
        source_offset_us: TimeUs,
    },
    Image {
        source: String,
    },
    Text,
}

impl ClipKind {
    pub fn is_visual(&self) -> bool {
        matches!(self, ClipKind::Video { .. } | ClipKind::Image { .. })
    }

    pub fn source_offset_us(&self) -> TimeUs {
        match self {
            ClipKind::Video {
                source_offset_us, ..
            } => *source_offset_us,
            ClipKind::Image { .. } | ClipKind::Text => TimeUs::ZERO,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClipKind::Video { .. } => "video",
            ClipKind::Image { .. } => "image",
            ClipKind::Text => "text",
        }
    }
}

// ---------------------------------------------------------------------------
// Clip
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    pub id: Uuid,
    pub kind: ClipKind,
    /// Display name. For text clips this is the caption itself.
    pub label: String,
    pub timeline_start_us: TimeUs,
    pub duration_us: TimeUs,
}

impl Clip {
    pub fn video(
        source: impl Into<String>,
        label: impl Into<String>,
        timeline_start_us: TimeUs,
        duration_us: TimeUs,
        source_offset_us: TimeUs,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ClipKind::Video {
                source: source.into(),
                source_offset_us,
            },
            label: label.into(),
            timeline_start_us,
            duration_us,
        }
    }

    pub fn image(
        source: impl Into<String>,
        label: impl Into<String>,
        timeline_start_us: TimeUs,
        duration_us: TimeUs,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ClipKind::Image {
                source: source.into(),
            },
            label: label.into(),
            timeline_start_us,
            duration_us,
        }
    }

    pub fn text(text: impl Into<String>, timeline_start_us: TimeUs, duration_us: TimeUs) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ClipKind::Text,
            label: text.into(),
            timeline_start_us,
            duration_us,
        }
    }

    pub fn timeline_end_us(&self) -> TimeUs {
        self.timeline_start_us + self.duration_us
    }

    pub fn source(&self) -> Option<&str> {
        match &self.kind {
            ClipKind::Video { source, .. } => Some(source),
            ClipKind::Image { source } => Some(source),
            ClipKind::Text => None,
        }
    }

    pub fn source_offset_us(&self) -> TimeUs {
        self.kind.source_offset_us()
    }

    /// The part of the source asset that is shown, `[offset, offset + duration)`.
    pub fn source_window(&self) -> (TimeUs, TimeUs) {
        let offset = self.source_offset_us();
        (offset, offset + self.duration_us)
    }

    /// Half-open containment: a clip is active from its start up to, but not
    /// including, its end.
    pub fn contains(&self, time: TimeUs) -> bool {
        time >= self.timeline_start_us && time < self.timeline_end_us()
    }

    /// Check the data-model invariants a stored clip must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        if !self.duration_us.is_positive() {
            return Err(format!(
                "clip {} has non-positive duration {}",
                self.id, self.duration_us.0
            ));
        }
        if self.timeline_start_us.is_negative() {
            return Err(format!(
                "clip {} starts before the timeline origin ({})",
                self.id, self.timeline_start_us.0
            ));
        }
        if self.source_offset_us().is_negative() {
            return Err(format!(
                "clip {} has negative source offset {}",
                self.id,
                self.source_offset_us().0
            ));
        }
        if self.timeline_start_us.checked_add(self.duration_us).is_none() {
            return Err(format!("clip {} ends beyond the representable timeline", self.id));
        }
        if self.source_offset_us().checked_add(self.duration_us).is_none() {
            return Err(format!("clip {} ends beyond the representable source", self.id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
