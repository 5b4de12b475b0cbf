/// Frame and timecode arithmetic shared by every BPOPlay crate.
///
/// The scheduler, the channel controllers and the device backends all speak
/// different time bases (wall-clock ticks, scheduled timecodes, device frame
/// positions); this module provides the exact conversions between them.
mod frames;

pub use frames::{
    format_timecode, frames_to_ticks, ticks_to_frames, FrameRate, TICKS_PER_SECOND,
};
