//! L4 Atomic Layer: Time calculation utilities for interpolation
//!
//! Timestamps are host-clock offsets (`Duration` since the host origin), so
//! every calculation here is pure and can be fed synthetic time.

use std::time::Duration;

/// Time elapsed between `start` and `now`, zero if the clock went backwards
#[inline]
pub fn elapsed(start: Duration, now: Duration) -> Duration {
    now.saturating_sub(start)
}

/// Calculate animation progress (0.0 to 1.0) from elapsed time and duration
///
/// A zero duration is always complete.
#[inline]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Check if animation is complete
#[inline]
pub fn is_complete(elapsed: Duration, duration: Duration) -> bool {
    elapsed >= duration
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
