//! L4 Atomic Layer: Stagger delay offsets for batches of elements
//!
//! A batch of elements that become visible together animates in sequence
//! rather than all at once.
//!
//! # Invariants
//!
//! 1. `Indexed`: offset[i] = i * step, so delays follow registration order.
//! 2. `Random`: every offset lies in `[0, window)`; order is unspecified.
//! 3. The first `Indexed` offset is always `Duration::ZERO`.

use std::time::Duration;

use crate::random::RandomSource;

/// How delay offsets are assigned across a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaggerPolicy {
    /// Ordered reveal: offset = index * step
    Indexed { step: Duration },
    /// Decorative jitter: offset = random() * window
    Random { window: Duration },
}

impl StaggerPolicy {
    pub fn indexed(step_ms: u64) -> Self {
        Self::Indexed {
            step: Duration::from_millis(step_ms),
        }
    }

    pub fn random(window_ms: u64) -> Self {
        Self::Random {
            window: Duration::from_millis(window_ms),
        }
    }
}

/// Delay offset for the element at `index` within its batch
pub fn stagger_delay(policy: StaggerPolicy, index: usize, rng: &mut dyn RandomSource) -> Duration {
    match policy {
        StaggerPolicy::Indexed { step } => {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            step.saturating_mul(index)
        }
        StaggerPolicy::Random { window } => window.mul_f64(rng.next_f64()),
    }
}

/// Delay offsets for a whole batch of `count` elements
pub fn stagger_offsets(
    count: usize,
    policy: StaggerPolicy,
    rng: &mut dyn RandomSource,
) -> Vec<Duration> {
    (0..count).map(|i| stagger_delay(policy, i, rng)).collect()
}
