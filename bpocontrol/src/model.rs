use std::sync::Arc;

/// Independently addressable output plane on a playout channel.
///
/// The discriminant is the device-side layer number used on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum VideoLayer {
    Program = 10,
    Preview = 20,
    Cg1 = 30,
    Cg2 = 40,
    Cg3 = 50,
    Animation = 60,
}

impl VideoLayer {
    pub fn index(self) -> i32 {
        self as i32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Live,
    Movie,
    StillImage,
    GraphicsOverlay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaType {
    Movie,
    Still,
    Audio,
}

/// Transition vocabulary, mapped 1:1 onto the backend's.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionType {
    Cut,
    Mix,
    Push,
    Slide,
    Wipe,
}

/// Media file description supplied by the media library.
#[derive(Clone, Debug)]
pub struct MediaMetadata {
    pub file_name: String,
    pub media_type: MediaType,
    /// Total duration in ticks; 0 when unknown.
    pub duration_ticks: i64,
    /// Cropping anomaly of some legacy SD captures; such clips carry extra
    /// VBI lines and need a geometry filter on playout.
    pub has_extra_lines: bool,
    /// Original play-in timecode of the material, in ticks.
    pub tc_play: i64,
}

/// Graphics template description: the device-side template layer plus the
/// ordered field name/value pairs to inject.
#[derive(Clone, Debug)]
pub struct Template {
    pub layer: i32,
    pub fields: Vec<(String, String)>,
}

/// A scheduled unit of playback. Owned by the scheduler; immutable once
/// dispatched.
#[derive(Clone, Debug)]
pub struct Event {
    pub id: u64,
    pub kind: EventKind,
    pub layer: VideoLayer,
    /// Scheduled start, in ticks.
    pub scheduled_tc: i64,
    /// Playback position bookkeeping, in frames; used by recovery.
    pub position: i64,
    /// Program-side seek offset, in frames; used when the item is built.
    pub seek: i64,
    pub transition_ticks: i64,
    pub transition: TransitionType,
    pub media: Option<Arc<MediaMetadata>>,
    pub template: Option<Arc<Template>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Duration in frames.
    pub duration: i64,
    pub kind: TransitionType,
}

/// Ephemeral, backend-agnostic description of what to load on a layer.
/// Built fresh for every dispatch, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayoutItem {
    /// Clip descriptor as sent on the wire, quoting and filters included.
    pub clip_name: String,
    pub video_layer: i32,
    pub loop_media: bool,
    /// Start offset within the media, in frames.
    pub seek: i64,
    /// Playback length in frames, when bounded.
    pub length: Option<i64>,
    pub transition: Transition,
}

/// Field data handed to a graphics-add command, one text field per template
/// field, order preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CgData {
    pub pairs: Vec<(String, String)>,
}

impl CgData {
    pub fn from_template(template: &Template) -> Self {
        CgData {
            pairs: template.fields.clone(),
        }
    }
}

/// Video mode as reported by the device backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoMode {
    Pal,
    Ntsc,
    Hd720p5000,
    Hd1080i5000,
    Unknown,
}

/// System-side video format enumeration. `Other` is the sentinel for any
/// unmapped device mode and for a disconnected channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoFormat {
    PalFha,
    Ntsc,
    Hd720p5000,
    Hd1080i5000,
    Other,
}

/// Notifications broadcast by a channel controller.
#[derive(Clone, Debug)]
pub enum ChannelEvent {
    VolumeChanged { layer: VideoLayer, volume: f64 },
}
