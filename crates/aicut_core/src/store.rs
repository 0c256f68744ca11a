use crate::error::{CoreError, Result};
use crate::types::*;
use uuid::Uuid;

/// Owns every clip on the timeline, in insertion order, together with the
/// playhead and the current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipStore {
    clips: Vec<Clip>,
    selected: Option<Uuid>,
    playhead_us: TimeUs,
}

impl ClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn playhead_us(&self) -> TimeUs {
        self.playhead_us
    }

    /// Move the playhead. Negative times are clamped to the timeline origin.
    pub fn set_playhead(&mut self, time: TimeUs) {
        self.playhead_us = if time.is_negative() { TimeUs::ZERO } else { time };
    }

    /// Total timeline length: the latest end over all clips.
    pub fn duration_us(&self) -> TimeUs {
        self.clips
            .iter()
            .map(Clip::timeline_end_us)
            .max()
            .unwrap_or(TimeUs::ZERO)
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Clip> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Append a clip. Rejects clips that break the data-model invariants
    /// or reuse an id already in the store.
    pub fn insert(&mut self, clip: Clip) -> Result<()> {
        clip.validate().map_err(CoreError::InvalidClip)?;
        if self.contains(clip.id) {
            return Err(CoreError::InvalidClip(format!(
                "clip id {} is already in use",
                clip.id
            )));
        }
        self.clips.push(clip);
        Ok(())
    }

    /// Remove a clip by id. Absent ids are ignored. Returns the removed clip.
    pub fn delete(&mut self, id: Uuid) -> Option<Clip> {
        let pos = self.clips.iter().position(|c| c.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.clips.remove(pos))
    }

    /// Swap a stored clip for a new version with the same id, keeping its
    /// position in insertion order.
    pub fn replace(&mut self, clip: Clip) -> Result<Clip> {
        clip.validate().map_err(CoreError::InvalidClip)?;
        let pos = self
            .clips
            .iter()
            .position(|c| c.id == clip.id)
            .ok_or(CoreError::ClipNotFound(clip.id))?;
        Ok(std::mem::replace(&mut self.clips[pos], clip))
    }

    /// Replace one clip with several, in place. The replacements are
    /// validated up front so the store is never left half-updated.
    pub fn splice(&mut self, id: Uuid, replacements: Vec<Clip>) -> Result<Clip> {
        let pos = self
            .clips
            .iter()
            .position(|c| c.id == id)
            .ok_or(CoreError::ClipNotFound(id))?;

        for (i, clip) in replacements.iter().enumerate() {
            clip.validate().map_err(CoreError::InvalidClip)?;
            let reused = clip.id != id && self.contains(clip.id);
            let repeated = replacements[..i].iter().any(|c| c.id == clip.id);
            if reused || repeated {
                return Err(CoreError::InvalidClip(format!(
                    "clip id {} is already in use",
                    clip.id
                )));
            }
        }

        let removed = self.clips.splice(pos..=pos, replacements).next();
        if self.selected.is_some_and(|sel| !self.contains(sel)) {
            self.selected = None;
        }
        removed.ok_or(CoreError::ClipNotFound(id))
    }

    /// Select a clip. Unknown ids are rejected and leave the selection as is.
    pub fn select(&mut self, id: Uuid) -> Result<()> {
        if !self.contains(id) {
            return Err(CoreError::ClipNotFound(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}
