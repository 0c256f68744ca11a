use crate::captions::{align_captions, AlignmentOutcome, CaptionSpan};
use crate::error::{CoreError, Result};
use crate::projection::{project, Projection};
use crate::settings::EditorSettings;
use crate::store::ClipStore;
use crate::types::*;
use uuid::Uuid;

/// The editor context every mutation runs against. There is no global
/// editor state; callers own an `Editor` and pass it where needed.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    pub store: ClipStore,
    pub settings: EditorSettings,
}

impl Editor {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            store: ClipStore::new(),
            settings,
        }
    }

    /// What the player shows at the current playhead.
    pub fn projection(&self) -> Projection<'_> {
        project(self.store.clips(), self.store.playhead_us())
    }

    pub fn set_playhead(&mut self, time: TimeUs) {
        self.store.set_playhead(time);
    }

    pub fn select(&mut self, id: Uuid) -> Result<()> {
        self.store.select(id)
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    /// Where the next clip goes: the playhead, or the origin of an empty
    /// timeline.
    pub fn insertion_point(&self) -> TimeUs {
        if self.store.is_empty() {
            TimeUs::ZERO
        } else {
            self.store.playhead_us()
        }
    }

    /// Insert a new clip at the insertion point. Without an explicit
    /// duration the clip gets the configured default for its kind; media
    /// clips use the placeholder until `resolve_duration` is called.
    pub fn add_clip_at_playhead(
        &mut self,
        kind: ClipKind,
        label: impl Into<String>,
        duration: Option<TimeUs>,
    ) -> Result<Uuid> {
        let duration_us = duration.unwrap_or_else(|| self.default_duration(&kind));
        self.insert_new(kind, label.into(), self.insertion_point(), duration_us)
    }

    /// Insert an uploaded or generated media clip at the insertion point.
    /// See [`Editor::add_media_clip_at`].
    pub fn add_media_clip(
        &mut self,
        kind: ClipKind,
        label: impl Into<String>,
        natural_duration: Option<TimeUs>,
    ) -> Result<Uuid> {
        self.add_media_clip_at(self.insertion_point(), kind, label, natural_duration)
    }

    /// Insert a media clip at `start`. Its length is the part of the source
    /// after the trim offset; while the natural duration is still unknown
    /// the clip gets the placeholder length, to be fixed up later through
    /// `resolve_duration`.
    pub fn add_media_clip_at(
        &mut self,
        start: TimeUs,
        kind: ClipKind,
        label: impl Into<String>,
        natural_duration: Option<TimeUs>,
    ) -> Result<Uuid> {
        let duration_us = match (&kind, natural_duration) {
            (ClipKind::Text, _) => {
                return Err(CoreError::InvalidOperation(
                    "text clips have no source media".into(),
                ))
            }
            (ClipKind::Image { .. }, None) => self.settings.image_duration_us,
            (_, None) => self.settings.placeholder_duration_us,
            (kind, Some(natural)) => natural - kind.source_offset_us(),
        };
        self.insert_new(kind, label.into(), start, duration_us)
    }

    /// Apply a media clip's natural duration once the resolver reports it.
    /// The visible length is what remains of the source after the clip's
    /// offset.
    pub fn resolve_duration(&mut self, id: Uuid, natural_duration: TimeUs) -> Result<()> {
        let clip = self.store.get(id).ok_or(CoreError::ClipNotFound(id))?;
        if matches!(clip.kind, ClipKind::Text) {
            return Err(CoreError::InvalidOperation(format!(
                "text clip {id} has no source media to resolve"
            )));
        }

        let mut resolved = clip.clone();
        resolved.duration_us = natural_duration - clip.source_offset_us();
        tracing::debug!(%id, duration = %resolved.duration_us, "resolved media duration");
        self.store.replace(resolved).map(|_| ())
    }

    /// Delete the selected clip. Does nothing when no clip is selected.
    pub fn remove_selected(&mut self) -> Option<Clip> {
        let id = self.store.selected_id()?;
        let removed = self.store.delete(id);
        if removed.is_some() {
            tracing::info!(%id, "removed selected clip");
        }
        removed
    }

    /// Align source-time captions against a stored video clip and insert
    /// every caption that survives.
    pub fn insert_captions(&mut self, source_id: Uuid, captions: &[CaptionSpan]) -> Result<AlignmentOutcome> {
        let source = self
            .store
            .get(source_id)
            .ok_or(CoreError::ClipNotFound(source_id))?;
        let outcome = align_captions(source, captions)?;

        for clip in outcome.clips() {
            self.store.insert(clip.clone())?;
        }

        match &outcome {
            AlignmentOutcome::NothingTranscribed => {
                tracing::info!(%source_id, "transcription returned no captions");
            }
            AlignmentOutcome::NothingSurvived { dropped } => {
                tracing::warn!(%source_id, dropped = dropped.len(), "no caption falls inside the clip");
            }
            AlignmentOutcome::Placed { clips, dropped } => {
                tracing::info!(%source_id, placed = clips.len(), dropped = dropped.len(), "captions placed");
            }
        }
        Ok(outcome)
    }

    /// Cut the selected clip at the playhead. The left part keeps the
    /// original id; the right part is a new clip starting at the playhead
    /// whose source offset is advanced by the cut position.
    /// Returns the ids of (left, right).
    pub fn split_at_playhead(&mut self) -> Result<(Uuid, Uuid)> {
        let id = self
            .store
            .selected_id()
            .ok_or_else(|| CoreError::InvalidOperation("no clip selected".into()))?;
        let clip = self.store.get(id).ok_or(CoreError::ClipNotFound(id))?;
        let split_us = self.store.playhead_us();

        if split_us <= clip.timeline_start_us || split_us >= clip.timeline_end_us() {
            return Err(CoreError::InvalidOperation(
                "split position must be strictly between clip start and end".into(),
            ));
        }

        let local = split_us - clip.timeline_start_us;

        let mut left = clip.clone();
        left.duration_us = local;

        let mut right = clip.clone();
        right.id = Uuid::new_v4();
        right.timeline_start_us = split_us;
        right.duration_us = clip.duration_us - local;
        if let ClipKind::Video {
            source_offset_us, ..
        } = &mut right.kind
        {
            *source_offset_us = *source_offset_us + local;
        }

        let right_id = right.id;
        self.store.splice(id, vec![left, right])?;
        tracing::info!(%id, %right_id, at = %split_us, "split clip");
        Ok((id, right_id))
    }

    fn insert_new(&mut self, kind: ClipKind, label: String, start: TimeUs, duration_us: TimeUs) -> Result<Uuid> {
        let clip = Clip {
            id: Uuid::new_v4(),
            kind,
            label,
            timeline_start_us: start,
            duration_us,
        };
        let id = clip.id;
        tracing::info!(
            %id,
            kind = clip.kind.name(),
            start = %clip.timeline_start_us,
            duration = %clip.duration_us,
            "adding clip"
        );
        self.store.insert(clip)?;
        Ok(id)
    }

    fn default_duration(&self, kind: &ClipKind) -> TimeUs {
        match kind {
            ClipKind::Video { .. } => self.settings.placeholder_duration_us,
            ClipKind::Image { .. } => self.settings.image_duration_us,
            ClipKind::Text => self.settings.text_duration_us,
        }
    }
}
