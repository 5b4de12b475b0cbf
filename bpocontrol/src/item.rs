//! Pure builders turning scheduled events and media references into
//! device-agnostic playout items.

use std::path::Path;

use bpoutils::{ticks_to_frames, FrameRate};

use crate::model::{
    Event, EventKind, MediaMetadata, MediaType, PlayoutItem, Transition, TransitionType,
    VideoLayer,
};

/// Legacy SD captures with extra VBI lines need their visible region cropped
/// back out on playout.
const EXTRA_LINES_FILTER: &str = " FILTER CROP=720:576:0:32";
const STEREO_LAYOUT: &str = " CHANNEL_LAYOUT STEREO";

/// Fallback source played when no live input is configured.
pub const BLACK_SOURCE: &str = "BLACK";

fn clip_descriptor(media: &MediaMetadata) -> String {
    let stem = Path::new(&media.file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut clip = format!("\"{}\"", stem);
    if media.media_type == MediaType::Movie {
        if media.has_extra_lines {
            clip.push_str(EXTRA_LINES_FILTER);
        }
        clip.push_str(STEREO_LAYOUT);
    }
    clip
}

/// Builds the playout item for a scheduled event, or `None` when the event
/// cannot be played (missing media, or a graphics-overlay kind which never
/// yields a playout item).
pub fn item_for_event(
    event: &Event,
    rate: FrameRate,
    live_input: Option<&str>,
) -> Option<PlayoutItem> {
    let clip_name = match event.kind {
        EventKind::Live => live_input.unwrap_or(BLACK_SOURCE).to_string(),
        EventKind::Movie | EventKind::StillImage => clip_descriptor(event.media.as_deref()?),
        EventKind::GraphicsOverlay => return None,
    };
    Some(PlayoutItem {
        clip_name,
        video_layer: event.layer.index(),
        loop_media: false,
        seek: event.seek,
        length: None,
        transition: Transition {
            duration: ticks_to_frames(event.transition_ticks, rate),
            kind: event.transition,
        },
    })
}

/// Builds an item directly from a media reference, for loads that bypass the
/// scheduler. The seek offset is explicit here rather than taken from an
/// event.
pub fn item_for_media(media: &MediaMetadata, layer: VideoLayer, seek: i64) -> PlayoutItem {
    PlayoutItem {
        clip_name: clip_descriptor(media),
        video_layer: layer.index(),
        loop_media: false,
        seek,
        length: None,
        transition: Transition {
            duration: 0,
            kind: TransitionType::Cut,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpoutils::TICKS_PER_SECOND;
    use std::sync::Arc;

    fn movie_media(extra_lines: bool) -> Arc<MediaMetadata> {
        Arc::new(MediaMetadata {
            file_name: "clips/NEWS_OPEN.mxf".to_string(),
            media_type: MediaType::Movie,
            duration_ticks: 60 * TICKS_PER_SECOND,
            has_extra_lines: extra_lines,
            tc_play: 0,
        })
    }

    fn movie_event(media: Option<Arc<MediaMetadata>>) -> Event {
        Event {
            id: 1,
            kind: EventKind::Movie,
            layer: VideoLayer::Program,
            scheduled_tc: 0,
            position: 0,
            seek: 125,
            transition_ticks: TICKS_PER_SECOND / 5, // 200 ms
            transition: TransitionType::Mix,
            media,
            template: None,
        }
    }

    #[test]
    fn test_movie_clip_descriptor() {
        let item = item_for_event(&movie_event(Some(movie_media(false))), FrameRate::Pal, None)
            .unwrap();
        assert_eq!(item.clip_name, "\"NEWS_OPEN\" CHANNEL_LAYOUT STEREO");
        assert_eq!(item.video_layer, VideoLayer::Program.index());
        assert_eq!(item.seek, 125);
        assert_eq!(item.transition.duration, 5);
        assert_eq!(item.transition.kind, TransitionType::Mix);
        assert!(!item.loop_media);
    }

    #[test]
    fn test_extra_lines_adds_single_crop_clause() {
        let item = item_for_event(&movie_event(Some(movie_media(true))), FrameRate::Pal, None)
            .unwrap();
        assert_eq!(item.clip_name.matches("FILTER CROP=720:576:0:32").count(), 1);
        assert_eq!(item.clip_name.matches("CHANNEL_LAYOUT STEREO").count(), 1);
        let plain = item_for_event(&movie_event(Some(movie_media(false))), FrameRate::Pal, None)
            .unwrap();
        assert!(!plain.clip_name.contains("CROP"));
    }

    #[test]
    fn test_still_image_has_no_audio_or_crop_clause() {
        let media = Arc::new(MediaMetadata {
            file_name: "stills/LOGO.png".to_string(),
            media_type: MediaType::Still,
            duration_ticks: 0,
            has_extra_lines: true,
            tc_play: 0,
        });
        let mut event = movie_event(Some(media));
        event.kind = EventKind::StillImage;
        let item = item_for_event(&event, FrameRate::Pal, None).unwrap();
        assert_eq!(item.clip_name, "\"LOGO\"");
    }

    #[test]
    fn test_missing_media_yields_none() {
        assert!(item_for_event(&movie_event(None), FrameRate::Pal, None).is_none());
    }

    #[test]
    fn test_live_uses_configured_input_or_black() {
        let mut event = movie_event(None);
        event.kind = EventKind::Live;
        let item = item_for_event(&event, FrameRate::Pal, Some("DECKLINK 1")).unwrap();
        assert_eq!(item.clip_name, "DECKLINK 1");
        let fallback = item_for_event(&event, FrameRate::Pal, None).unwrap();
        assert_eq!(fallback.clip_name, BLACK_SOURCE);
    }

    #[test]
    fn test_overlay_never_builds_an_item() {
        let mut event = movie_event(Some(movie_media(false)));
        event.kind = EventKind::GraphicsOverlay;
        assert!(item_for_event(&event, FrameRate::Pal, None).is_none());
    }

    #[test]
    fn test_item_for_media_uses_explicit_seek() {
        let item = item_for_media(&movie_media(true), VideoLayer::Preview, 250);
        assert_eq!(item.seek, 250);
        assert_eq!(item.video_layer, VideoLayer::Preview.index());
        assert!(item.clip_name.contains("CROP"));
    }
}
