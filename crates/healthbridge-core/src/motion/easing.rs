//! L4 Atomic Layer: Pure easing functions for counter animations
//!
//! Maps progress in [0, 1] to eased progress in [0, 1].

use serde::{Deserialize, Serialize};

/// Progress-to-value curve of an interpolation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingKind {
    /// Constant speed
    #[default]
    Linear,
    /// Fast start, long settle: f(t) = 1 - (1-t)⁴
    EaseOutQuartic,
}

impl EasingKind {
    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value, clamped to [0, 1]
    ///
    /// # Returns
    /// Eased value in [0, 1]; exactly 1.0 at `t = 1`
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingKind::Linear => t,
            EasingKind::EaseOutQuartic => quartic_ease_out(t),
        }
    }
}

#[inline]
fn quartic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv * inv
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingKind; 2] = [EasingKind::Linear, EasingKind::EaseOutQuartic];

    #[test]
    fn test_easing_boundaries() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{:?} at t=0", easing);
            assert_eq!(easing.apply(1.0), 1.0, "{:?} at t=1", easing);
        }
    }

    #[test]
    fn test_easing_monotonic_and_bounded() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 0..=1000 {
                let t = i as f64 / 1000.0;
                let v = easing.apply(t);
                assert!((0.0..=1.0).contains(&v), "{:?} out of range at t={}", easing, t);
                assert!(v >= prev, "{:?} not monotonic at t={}", easing, t);
                prev = v;
            }
        }
    }

    #[test]
    fn test_quartic_values() {
        let v = EasingKind::EaseOutQuartic.apply(0.5);
        assert!((v - 0.9375).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        assert_eq!(EasingKind::EaseOutQuartic.apply(1.5), 1.0);
        assert_eq!(EasingKind::Linear.apply(-0.2), 0.0);
    }
}
