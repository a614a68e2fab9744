//! L4 Atomic Layer: Tick source abstraction
//!
//! Anything that advances with the host clock implements [`TickSource`]. The
//! host (or a test) feeds timestamps; the source writes its effects and says
//! whether it wants more ticks.

use std::time::Duration;

use crate::host::Effect;

pub trait TickSource {
    /// Advance to `now`, pushing any produced effects into `out`
    ///
    /// Returns `true` while the source still needs ticks.
    fn on_tick(&mut self, now: Duration, out: &mut Vec<Effect>) -> bool;
}

/// Feed ticks every `interval` starting at `start` until the source goes idle
///
/// Gives up after `max_ticks`. Returns the timestamp of the last tick
/// delivered together with every effect produced.
pub fn run_until_idle<S: TickSource + ?Sized>(
    source: &mut S,
    start: Duration,
    interval: Duration,
    max_ticks: usize,
) -> (Duration, Vec<Effect>) {
    let mut effects = Vec::new();
    let mut now = start;
    for _ in 0..max_ticks {
        now += interval;
        if !source.on_tick(now, &mut effects) {
            break;
        }
    }
    (now, effects)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Countdown(u32);

    impl TickSource for Countdown {
        fn on_tick(&mut self, _now: Duration, _out: &mut Vec<Effect>) -> bool {
            self.0 = self.0.saturating_sub(1);
            self.0 > 0
        }
    }

    #[test]
    fn test_runs_until_idle() {
        let mut source = Countdown(3);
        let (last, _) = run_until_idle(&mut source, Duration::ZERO, Duration::from_millis(16), 100);
        assert_eq!(last, Duration::from_millis(48));
    }

    #[test]
    fn test_respects_max_ticks() {
        let mut source = Countdown(1000);
        let (last, _) = run_until_idle(&mut source, Duration::ZERO, Duration::from_millis(10), 5);
        assert_eq!(last, Duration::from_millis(50));
        assert_eq!(source.0, 995);
    }
}
