//! Tick/frame conversion for broadcast frame rates.
//!
//! All durations handed to a device backend are integer frame counts; the
//! scheduler side works in 100 ns ticks. Conversions are performed with
//! exact rational arithmetic (`i128` intermediates) so that repeated calls
//! never drift, including for the 1001-denominator NTSC family.

use serde::{Deserialize, Serialize};

/// Number of scheduler ticks per second (100 ns resolution).
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Video frame rate of a playout channel, stored as an exact rational.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameRate {
    /// 25 fps (PAL / 1080i50).
    Pal,
    /// 30000/1001 fps (NTSC).
    Ntsc,
    /// 50 fps (720p50).
    Hd50,
    /// 60000/1001 fps (720p59.94).
    Hd5994,
}

impl FrameRate {
    /// Frames-per-second numerator/denominator pair.
    pub fn ratio(self) -> (i64, i64) {
        match self {
            FrameRate::Pal => (25, 1),
            FrameRate::Ntsc => (30_000, 1001),
            FrameRate::Hd50 => (50, 1),
            FrameRate::Hd5994 => (60_000, 1001),
        }
    }

    /// Nominal duration of one frame in ticks, rounded to the nearest tick.
    ///
    /// Exact for integer rates (400_000 ticks at 25 fps); for the NTSC
    /// family this is only a display value, conversions go through
    /// [`ticks_to_frames`] instead.
    pub fn frame_ticks(self) -> i64 {
        let (num, den) = self.ratio();
        div_round(TICKS_PER_SECOND as i128 * den as i128, num as i128) as i64
    }
}

fn div_round(n: i128, d: i128) -> i128 {
    if n >= 0 {
        (n + d / 2) / d
    } else {
        -((-n + d / 2) / d)
    }
}

/// Converts a tick duration to a frame count at the given rate, rounding to
/// the nearest frame.
///
/// # Examples
/// ```
/// use bpoutils::{ticks_to_frames, FrameRate, TICKS_PER_SECOND};
/// // 200 ms at 25 fps is exactly 5 frames.
/// assert_eq!(ticks_to_frames(TICKS_PER_SECOND / 5, FrameRate::Pal), 5);
/// assert_eq!(ticks_to_frames(TICKS_PER_SECOND, FrameRate::Pal), 25);
/// ```
pub fn ticks_to_frames(ticks: i64, rate: FrameRate) -> i64 {
    let (num, den) = rate.ratio();
    div_round(
        ticks as i128 * num as i128,
        den as i128 * TICKS_PER_SECOND as i128,
    ) as i64
}

/// Converts a frame count back to ticks at the given rate, rounding to the
/// nearest tick. Round-trips exactly with [`ticks_to_frames`] for any whole
/// frame count.
pub fn frames_to_ticks(frames: i64, rate: FrameRate) -> i64 {
    let (num, den) = rate.ratio();
    div_round(
        frames as i128 * den as i128 * TICKS_PER_SECOND as i128,
        num as i128,
    ) as i64
}

/// Renders a tick timestamp as `HH:MM:SS:FF` for trace output.
///
/// Negative inputs are clamped to zero; this is a logging helper, not a
/// scheduling primitive.
pub fn format_timecode(ticks: i64, rate: FrameRate) -> String {
    let ticks = ticks.max(0);
    let seconds = ticks / TICKS_PER_SECOND;
    let frame = ticks_to_frames(ticks % TICKS_PER_SECOND, rate);
    format!(
        "{:02}:{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60,
        frame
    )
}
