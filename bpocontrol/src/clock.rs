use std::time::{SystemTime, UNIX_EPOCH};

use bpoutils::TICKS_PER_SECOND;

/// Wall-clock source for the recovery position recompute. A trait so tests
/// can drive `restart` with a fixed time instead of `SystemTime::now`.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in ticks, same epoch as scheduled timecodes.
    fn now_ticks(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ticks(&self) -> i64 {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        elapsed.as_secs() as i64 * TICKS_PER_SECOND + elapsed.subsec_nanos() as i64 / 100
    }
}
