//! Resolve what the player shows at a given timeline time.
//!
//! Visual clips (video and image) share one logical track: when several
//! contain the playhead, the one inserted last wins. Text clips are
//! overlays and all active ones are returned in insertion order.

use crate::types::*;

/// What the player should present at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<'a> {
    pub active_visual: Option<&'a Clip>,
    pub active_captions: Vec<&'a str>,
}

/// Project `clips` at `time`. Pure: never mutates, same inputs give the
/// same output.
pub fn project(clips: &[Clip], time: TimeUs) -> Projection<'_> {
    Projection {
        active_visual: active_visual(clips, time),
        active_captions: active_captions(clips, time),
    }
}

/// The visual clip under `time`, preferring the most recently inserted on
/// overlap. Outside every visual clip this falls back to the first video
/// clip in the store so the player has something loaded before the
/// playhead reaches any clip.
pub fn active_visual(clips: &[Clip], time: TimeUs) -> Option<&Clip> {
    clips
        .iter()
        .rev()
        .find(|c| c.kind.is_visual() && c.contains(time))
        .or_else(|| {
            clips
                .iter()
                .find(|c| matches!(c.kind, ClipKind::Video { .. }))
        })
}

/// Labels of every text clip under `time`, in insertion order.
pub fn active_captions(clips: &[Clip], time: TimeUs) -> Vec<&str> {
    clips
        .iter()
        .filter(|c| matches!(c.kind, ClipKind::Text) && c.contains(time))
        .map(|c| c.label.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> TimeUs {
        TimeUs::from_seconds(s)
    }

    fn video(start: f64, dur: f64) -> Clip {
        Clip::video("blob:v", "v.mp4", secs(start), secs(dur), TimeUs::ZERO)
    }

    #[test]
    fn empty_store_projects_nothing() {
        let clips: Vec<Clip> = vec![];
        for t in [0.0, 1.5, 1000.0] {
            let p = project(&clips, secs(t));
            assert!(p.active_visual.is_none());
            assert!(p.active_captions.is_empty());
        }
    }

    #[test]
    fn video_with_caption_track() {
        let v = video(0.0, 10.0);
        let caption = Clip::text("hello", secs(3.0), secs(2.0));
        let clips = vec![v.clone(), caption];

        let at_four = project(&clips, secs(4.0));
        assert_eq!(at_four.active_visual.map(|c| c.id), Some(v.id));
        assert_eq!(at_four.active_captions, vec!["hello"]);

        let at_six = project(&clips, secs(6.0));
        assert_eq!(at_six.active_visual.map(|c| c.id), Some(v.id));
        assert!(at_six.active_captions.is_empty());
    }

    #[test]
    fn overlapping_visuals_prefer_last_inserted() {
        let first = video(0.0, 10.0);
        let second = Clip::image("data:image/png;base64,AA==", "overlay", secs(2.0), secs(4.0));
        let clips = vec![first.clone(), second.clone()];

        assert_eq!(project(&clips, secs(3.0)).active_visual.map(|c| c.id), Some(second.id));
        assert_eq!(project(&clips, secs(1.0)).active_visual.map(|c| c.id), Some(first.id));
        // image ends at 6s, the video underneath takes over again
        assert_eq!(project(&clips, secs(6.0)).active_visual.map(|c| c.id), Some(first.id));
    }

    #[test]
    fn overlapping_videos_prefer_last_inserted() {
        let earlier = video(0.0, 10.0);
        let later = video(5.0, 10.0);
        let clips = vec![earlier.clone(), later.clone()];

        assert_eq!(project(&clips, secs(7.0)).active_visual.map(|c| c.id), Some(later.id));
        assert_eq!(project(&clips, secs(4.0)).active_visual.map(|c| c.id), Some(earlier.id));

        // insertion order decides, not timeline position
        let reversed = vec![later.clone(), earlier.clone()];
        assert_eq!(project(&reversed, secs(7.0)).active_visual.map(|c| c.id), Some(earlier.id));
    }

    #[test]
    fn falls_back_to_first_video_outside_all_clips() {
        let image = Clip::image("data:image/png;base64,AA==", "img", secs(0.0), secs(2.0));
        let first_video = video(20.0, 5.0);
        let second_video = video(30.0, 5.0);
        let clips = vec![image, first_video.clone(), second_video];

        let p = project(&clips, secs(10.0));
        assert_eq!(p.active_visual.map(|c| c.id), Some(first_video.id));
    }

    #[test]
    fn no_fallback_without_video() {
        let image = Clip::image("data:image/png;base64,AA==", "img", secs(0.0), secs(2.0));
        let clips = vec![image];
        assert!(project(&clips, secs(5.0)).active_visual.is_none());
    }

    #[test]
    fn captions_keep_insertion_order_and_duplicates() {
        let clips = vec![
            Clip::text("second line", secs(1.0), secs(3.0)),
            Clip::text("first line", secs(0.0), secs(3.0)),
            Clip::text("second line", secs(2.0), secs(1.0)),
        ];
        let p = project(&clips, secs(2.5));
        assert_eq!(p.active_captions, vec!["second line", "first line", "second line"]);
    }

    #[test]
    fn caption_end_is_exclusive() {
        let clips = vec![Clip::text("bye", secs(1.0), secs(1.0))];
        assert_eq!(project(&clips, secs(1.0)).active_captions, vec!["bye"]);
        assert!(project(&clips, secs(2.0)).active_captions.is_empty());
    }

    #[test]
    fn projection_is_idempotent() {
        let clips = vec![
            video(0.0, 10.0),
            video(5.0, 10.0),
            Clip::text("a", secs(4.0), secs(4.0)),
        ];
        let snapshot = clips.clone();
        for t in [0.0, 4.5, 7.0, 14.0, 99.0] {
            let first = project(&clips, secs(t));
            let second = project(&clips, secs(t));
            assert_eq!(first, second);
        }
        assert_eq!(clips, snapshot);
    }
}
