//! Channel controller: the public command surface of one playout channel.
//!
//! Every command re-checks backend connectivity before dispatching; the
//! connection can drop between calls and a stale check would issue commands
//! into the void. Failures never escalate past this module: mutating
//! commands return a success flag (or are void best-effort) and leave a
//! `debug!` trace, operators poll the connection flag and the registry to
//! detect persistent trouble.

use std::sync::{Arc, Mutex};

use tracing::debug;

use bpoutils::{format_timecode, ticks_to_frames, FrameRate};

use crate::backend::PlayoutBackend;
use crate::clock::{Clock, SystemClock};
use crate::errors::PlayoutError;
use crate::events::ChannelEventBus;
use crate::item::{item_for_event, item_for_media};
use crate::model::{
    CgData, ChannelEvent, Event, EventKind, MediaMetadata, Transition, TransitionType, VideoFormat,
    VideoLayer, VideoMode,
};
use crate::registry::LayerRegistry;

/// Transition forced onto a recovery load so the restart stays visually
/// unobtrusive, whatever the event's own transition was.
const RESTART_MIX_FRAMES: i64 = 3;

pub struct Channel {
    number: u8,
    frame_rate: FrameRate,
    live_input: Option<String>,
    master_volume: f64,
    backend: Arc<dyn PlayoutBackend>,
    registry: Arc<LayerRegistry>,
    clock: Arc<dyn Clock>,
    /// Recorded output aspect; guards `set_aspect` dispatch.
    aspect_narrow: Mutex<bool>,
    events: ChannelEventBus,
}

impl Channel {
    pub fn new(
        number: u8,
        frame_rate: FrameRate,
        live_input: Option<String>,
        master_volume: f64,
        backend: Arc<dyn PlayoutBackend>,
    ) -> Self {
        Self::with_clock(
            number,
            frame_rate,
            live_input,
            master_volume,
            backend,
            Arc::new(SystemClock),
        )
    }

    pub fn with_clock(
        number: u8,
        frame_rate: FrameRate,
        live_input: Option<String>,
        master_volume: f64,
        backend: Arc<dyn PlayoutBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            number,
            frame_rate,
            live_input,
            master_volume,
            backend,
            registry: Arc::new(LayerRegistry::new()),
            clock,
            aspect_narrow: Mutex::new(false),
            events: ChannelEventBus::new(),
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    /// Canonical visible/loaded-next bookkeeping for this channel. The
    /// scheduler mutates it through this handle after successful dispatches.
    pub fn registry(&self) -> Arc<LayerRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn subscribe(&self) -> crossbeam_channel::Receiver<ChannelEvent> {
        self.events.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.backend.is_connected()
    }

    fn dispatch(&self, action: &str, result: Result<(), PlayoutError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                debug!("channel {}: {} failed: {}", self.number, action, err);
                false
            }
        }
    }

    /// Pushes the configured master volume to the device mixer. Called once
    /// after the backend comes up.
    pub fn initialize(&self) {
        if !self.backend.is_connected() {
            return;
        }
        let command = format!(
            "MIXER {} MASTERVOLUME {:.3}",
            self.number, self.master_volume
        );
        self.dispatch("initialize", self.backend.custom_command(&command));
    }

    /// Cues the event in the background: LOADBG for playable kinds, a
    /// graphics add for overlays. Registry bookkeeping is the scheduler's
    /// job once this returns true.
    pub fn load_next(&self, event: &Event) -> bool {
        if !self.backend.is_connected() {
            debug!("channel {}: load_next skipped, not connected", self.number);
            return false;
        }
        match event.kind {
            EventKind::Live | EventKind::Movie | EventKind::StillImage => {
                match item_for_event(event, self.frame_rate, self.live_input.as_deref()) {
                    Some(item) => {
                        debug!("channel {}: LOADBG {}", self.number, item.clip_name);
                        self.dispatch("load_next", self.backend.load_bg(&item))
                    }
                    None => {
                        debug!(
                            "channel {}: load_next: event {} has no playable item",
                            self.number, event.id
                        );
                        false
                    }
                }
            }
            EventKind::GraphicsOverlay => self.cg_add_event(event),
        }
    }

    /// Loads the event live-ready on its layer.
    pub fn load_event(&self, event: &Event) -> bool {
        if !self.backend.is_connected() {
            debug!("channel {}: load skipped, not connected", self.number);
            return false;
        }
        match event.kind {
            EventKind::Live | EventKind::Movie | EventKind::StillImage => {
                match item_for_event(event, self.frame_rate, self.live_input.as_deref()) {
                    Some(item) => {
                        debug!("channel {}: LOAD {}", self.number, item.clip_name);
                        self.dispatch("load", self.backend.load(&item))
                    }
                    None => {
                        debug!(
                            "channel {}: load: event {} has no playable item",
                            self.number, event.id
                        );
                        false
                    }
                }
            }
            EventKind::GraphicsOverlay => self.cg_add_event(event),
        }
    }

    fn cg_add_event(&self, event: &Event) -> bool {
        let (Some(template), Some(media)) = (event.template.as_ref(), event.media.as_ref())
        else {
            debug!(
                "channel {}: event {} misses template or media for CG add",
                self.number, event.id
            );
            return false;
        };
        let data = CgData::from_template(template);
        self.dispatch(
            "cg_add",
            self.backend
                .cg_add(event.layer.index(), template.layer, &media.file_name, &data),
        )
    }

    /// Direct load bypassing the scheduler; seek and length are explicit.
    pub fn load_media(
        &self,
        media: &MediaMetadata,
        layer: VideoLayer,
        seek: i64,
        duration: i64,
    ) -> bool {
        if !self.backend.is_connected() {
            return false;
        }
        let mut item = item_for_media(media, layer, seek);
        item.length = Some(duration);
        debug!(
            "channel {}: LOAD {} layer {:?} seek {}",
            self.number, item.clip_name, layer, seek
        );
        self.dispatch("load_media", self.backend.load(&item))
    }

    /// Loads a solid color (`#AARRGGBB`) on a layer.
    pub fn load_color(&self, color: &str, layer: VideoLayer) -> bool {
        if !self.backend.is_connected() {
            return false;
        }
        let item = crate::model::PlayoutItem {
            clip_name: color.to_string(),
            video_layer: layer.index(),
            loop_media: false,
            seek: 0,
            length: None,
            transition: Transition {
                duration: 0,
                kind: TransitionType::Cut,
            },
        };
        debug!("channel {}: LOAD color {} layer {:?}", self.number, color, layer);
        self.dispatch("load_color", self.backend.load(&item))
    }

    /// Starts playback of whatever is loaded for this event: the media
    /// layer for playable kinds, the graphics play action for overlays.
    pub fn play_event(&self, event: &Event) -> bool {
        if !self.backend.is_connected() {
            return false;
        }
        if event.kind == EventKind::GraphicsOverlay {
            return self.dispatch("cg_play", self.backend.cg_play(event.layer.index()));
        }
        if event.kind == EventKind::Live || event.media.is_some() {
            debug!("channel {}: PLAY layer {:?}", self.number, event.layer);
            return self.dispatch("play", self.backend.play(event.layer.index()));
        }
        // Nothing was loadable for this event; there is nothing to start.
        true
    }

    pub fn play(&self, layer: VideoLayer) -> bool {
        if !self.backend.is_connected() {
            return false;
        }
        debug!("channel {}: PLAY layer {:?}", self.number, layer);
        self.dispatch("play", self.backend.play(layer.index()))
    }

    pub fn stop_event(&self, event: &Event) -> bool {
        self.stop(event.layer)
    }

    pub fn stop(&self, layer: VideoLayer) -> bool {
        if !self.backend.is_connected() {
            return false;
        }
        debug!("channel {}: STOP layer {:?}", self.number, layer);
        self.dispatch("stop", self.backend.stop(layer.index()))
    }

    pub fn pause_event(&self, event: &Event) -> bool {
        self.pause(event.layer)
    }

    pub fn pause(&self, layer: VideoLayer) -> bool {
        if !self.backend.is_connected() {
            return false;
        }
        let command = format!("PAUSE {}-{}", self.number, layer.index());
        self.dispatch("pause", self.backend.custom_command(&command))
    }

    /// Raw positioning command addressed by channel and layer.
    pub fn seek(&self, layer: VideoLayer, position: i64) -> bool {
        if !self.backend.is_connected() {
            return false;
        }
        let command = format!("CALL {}-{} SEEK {}", self.number, layer.index(), position);
        debug!("channel {}: {}", self.number, command);
        self.dispatch("seek", self.backend.custom_command(&command))
    }

    pub fn clear(&self, layer: VideoLayer) {
        if !self.backend.is_connected() {
            return;
        }
        debug!("channel {}: CLEAR layer {:?}", self.number, layer);
        self.dispatch("clear", self.backend.clear(layer.index()));
    }

    pub fn clear_all(&self) {
        if !self.backend.is_connected() {
            return;
        }
        debug!("channel {}: CLEAR", self.number);
        self.dispatch("clear_all", self.backend.clear_all());
    }

    /// Sets the mixer volume of a layer. Always dispatches and always
    /// broadcasts `VolumeChanged`, including for repeated identical values.
    pub fn set_volume(&self, layer: VideoLayer, volume: f64) {
        if !self.backend.is_connected() {
            return;
        }
        let command = format!("MIXER {}-{} VOLUME {:.3}", self.number, layer.index(), volume);
        self.dispatch("set_volume", self.backend.custom_command(&command));
        self.events
            .broadcast(ChannelEvent::VolumeChanged { layer, volume });
    }

    /// Switches the program output between full and narrow (4:3 pillarbox)
    /// fill. Idempotent: dispatches only when the requested state differs
    /// from the recorded one.
    pub fn set_aspect(&self, narrow: bool) {
        let mut recorded = self.aspect_narrow.lock().unwrap();
        if *recorded == narrow || !self.backend.is_connected() {
            return;
        }
        *recorded = narrow;
        let command = if narrow {
            format!(
                "MIXER {}-{} FILL 0.125 0 0.75 1 10",
                self.number,
                VideoLayer::Program.index()
            )
        } else {
            format!(
                "MIXER {}-{} FILL 0 0 1 1 10",
                self.number,
                VideoLayer::Program.index()
            )
        };
        debug!("channel {}: aspect narrow={}", self.number, narrow);
        self.dispatch("set_aspect", self.backend.custom_command(&command));
    }

    /// Recovery: puts a layer back on air at the position it should have
    /// reached, then re-cues any loaded-next event the interruption may have
    /// dropped on the device.
    pub fn restart(&self, layer: VideoLayer) {
        if !self.backend.is_connected() {
            return;
        }
        let Some(event) = self.registry.visible(layer) else {
            return;
        };
        if let Some(mut item) = item_for_event(&event, self.frame_rate, self.live_input.as_deref())
        {
            if event.kind == EventKind::Movie {
                if let Some(media) = event.media.as_ref() {
                    item.seek = self.recovery_seek(&event, media);
                }
            }
            item.transition = Transition {
                duration: RESTART_MIX_FRAMES,
                kind: TransitionType::Mix,
            };
            debug!(
                "channel {}: restart {} (scheduled {}) from frame {}",
                self.number,
                item.clip_name,
                format_timecode(event.scheduled_tc, self.frame_rate),
                item.seek
            );
            if self.dispatch("restart load", self.backend.load_bg(&item)) {
                self.dispatch("restart play", self.backend.play(item.video_layer));
            }
        }
        // An explicit stop just before the recovery may have dropped the
        // cued-next item on the device; take it (at most once) and reissue.
        if let Some(next) = self.registry.take_loaded_next(layer) {
            debug!("channel {}: restart re-cues event {}", self.number, next.id);
            self.load_next(&next);
        }
    }

    /// Frame position the event should be at now: its recorded position
    /// plus the frames elapsed since its scheduled start, never negative,
    /// clamped to the end of the media when its duration is known.
    fn recovery_seek(&self, event: &Event, media: &MediaMetadata) -> i64 {
        let elapsed = self.clock.now_ticks() - event.scheduled_tc - media.tc_play;
        let mut seek = event.position + ticks_to_frames(elapsed, self.frame_rate);
        if seek < 0 {
            seek = 0;
        }
        if media.duration_ticks > 0 {
            seek = seek.min(ticks_to_frames(media.duration_ticks, self.frame_rate));
        }
        seek
    }

    /// Maps the device-reported video mode onto the system's own format
    /// enumeration; `Other` for anything unmapped or while disconnected.
    pub fn format(&self) -> VideoFormat {
        if !self.backend.is_connected() {
            return VideoFormat::Other;
        }
        match self.backend.video_mode() {
            VideoMode::Pal => VideoFormat::PalFha,
            VideoMode::Ntsc => VideoFormat::Ntsc,
            VideoMode::Hd720p5000 => VideoFormat::Hd720p5000,
            VideoMode::Hd1080i5000 => VideoFormat::Hd1080i5000,
            VideoMode::Unknown => VideoFormat::Other,
        }
    }
}
