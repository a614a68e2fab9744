//! L3 Molecular Layer: Counter interpolation jobs
//!
//! Combines easing, timing and the notation formatter to drive counter text
//! from a start value to a target value, one job per element.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use super::easing::EasingKind;
use super::tick::TickSource;
use super::timing::{elapsed, is_complete, lerp, progress};
use crate::format::Notation;
use crate::host::{Effect, ElementId, TimerToken, TimerTokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Completed,
}

/// One counter animation
#[derive(Debug, Clone)]
pub struct InterpolationJob {
    start_value: f64,
    target_value: f64,
    duration: Duration,
    /// `None` until the job is anchored to a host timestamp
    start_timestamp: Option<Duration>,
    easing: EasingKind,
    formatter: Notation,
    state: JobState,
}

impl InterpolationJob {
    /// Linear, grouped-integer job
    ///
    /// Without [`starting_at`](Self::starting_at) the job starts at the first
    /// timestamp it is sampled at, so a host that was idle when the job was
    /// created still sees the whole animation.
    pub fn new(start_value: f64, target_value: f64, duration: Duration) -> Self {
        Self {
            start_value,
            target_value,
            duration,
            start_timestamp: None,
            easing: EasingKind::Linear,
            formatter: Notation::Grouped,
            state: JobState::Running,
        }
    }

    pub fn with_easing(mut self, easing: EasingKind) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_formatter(mut self, formatter: Notation) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn starting_at(mut self, timestamp: Duration) -> Self {
        self.start_timestamp = Some(timestamp);
        self
    }

    pub fn start_value(&self) -> f64 {
        self.start_value
    }

    pub fn target_value(&self) -> f64 {
        self.target_value
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn start_timestamp(&self) -> Option<Duration> {
        self.start_timestamp
    }

    fn anchor(&mut self, now: Duration) {
        if self.start_timestamp.is_none() {
            self.start_timestamp = Some(now);
        }
    }

    pub fn easing(&self) -> EasingKind {
        self.easing
    }

    pub fn formatter(&self) -> Notation {
        self.formatter
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_complete_at(&self, now: Duration) -> bool {
        let start = self.start_timestamp.unwrap_or(now);
        is_complete(elapsed(start, now), self.duration)
    }

    /// Interpolated value at `now`
    ///
    /// Once the duration has elapsed this is exactly the target value, never
    /// the eased formula's floating-point approximation of it.
    pub fn value_at(&self, now: Duration) -> f64 {
        let elapsed = elapsed(self.start_timestamp.unwrap_or(now), now);
        if is_complete(elapsed, self.duration) {
            return self.target_value;
        }
        let t = self.easing.apply(progress(elapsed, self.duration));
        lerp(self.start_value, self.target_value, t)
    }

    /// Formatted text at `now`
    pub fn render_at(&self, now: Duration) -> String {
        self.formatter.format(self.value_at(now))
    }
}

#[derive(Debug)]
struct ActiveJob {
    job: InterpolationJob,
    token: TimerToken,
}

/// Runs at most one [`InterpolationJob`] per element
#[derive(Debug)]
pub struct Interpolator {
    tick_interval: Duration,
    jobs: BTreeMap<ElementId, ActiveJob>,
}

impl Interpolator {
    /// Create an interpolator that asks the host for ticks every `tick_interval`
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            jobs: BTreeMap::new(),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Start a job for `element`
    ///
    /// A job already running for the element is cancelled first: its timer is
    /// released before the new one is requested.
    pub fn start(
        &mut self,
        element: ElementId,
        job: InterpolationJob,
        tokens: &mut TimerTokens,
    ) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if let Some(previous) = self.jobs.remove(&element) {
            debug!("Replacing running counter on {}", element);
            effects.push(Effect::CancelTimer {
                token: previous.token,
            });
        }

        let token = tokens.issue();
        debug!(
            element = %element,
            from = job.start_value,
            to = job.target_value,
            duration_ms = job.duration.as_millis(),
            "Counter started"
        );
        effects.push(Effect::ScheduleTimer {
            token,
            delay: self.tick_interval,
        });
        self.jobs.insert(element, ActiveJob { job, token });
        effects
    }

    /// Stop the element's job without writing a final value
    pub fn cancel(&mut self, element: &ElementId) -> Option<Effect> {
        self.jobs
            .remove(element)
            .map(|active| Effect::CancelTimer {
                token: active.token,
            })
    }

    pub fn is_running(&self, element: &ElementId) -> bool {
        self.jobs.contains_key(element)
    }

    pub fn job(&self, element: &ElementId) -> Option<&InterpolationJob> {
        self.jobs.get(element).map(|active| &active.job)
    }

    pub fn active_count(&self) -> usize {
        self.jobs.len()
    }
}

impl TickSource for Interpolator {
    fn on_tick(&mut self, now: Duration, out: &mut Vec<Effect>) -> bool {
        for (element, active) in self.jobs.iter_mut() {
            active.job.anchor(now);
            out.push(Effect::set_text(element, active.job.render_at(now)));
            if active.job.is_complete_at(now) {
                active.job.state = JobState::Completed;
                out.push(Effect::CancelTimer {
                    token: active.token,
                });
                debug!("Counter on {} completed", element);
            }
        }
        self.jobs
            .retain(|_, active| active.job.state == JobState::Running);
        !self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::tick::run_until_idle;

    const TICK: Duration = Duration::from_millis(16);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_sample_at_zero_and_duration() {
        for easing in [EasingKind::Linear, EasingKind::EaseOutQuartic] {
            for (target, formatter) in [
                (15_000.0, Notation::Grouped),
                (2_100_000.0, Notation::Millions),
                (94.0, Notation::Percentage),
                (12_000.0, Notation::Thousands),
                (1.0 / 3.0, Notation::Grouped),
            ] {
                let job = InterpolationJob::new(0.0, target, ms(2000))
                    .with_easing(easing)
                    .with_formatter(formatter)
                    .starting_at(ms(500));
                assert_eq!(job.render_at(ms(500)), formatter.format(0.0));
                assert_eq!(job.render_at(ms(2500)), formatter.format(target));
                assert_eq!(job.value_at(ms(2500)), target);
            }
        }
    }

    #[test]
    fn test_linear_midpoint() {
        let job = InterpolationJob::new(0.0, 100.0, ms(1000)).starting_at(Duration::ZERO);
        assert!((job.value_at(ms(500)) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_quartic_runs_ahead_of_linear() {
        let linear = InterpolationJob::new(0.0, 100.0, ms(1000)).starting_at(Duration::ZERO);
        let eased = linear.clone().with_easing(EasingKind::EaseOutQuartic);
        assert!(eased.value_at(ms(250)) > linear.value_at(ms(250)));
    }

    #[test]
    fn test_no_overshoot_after_duration() {
        let job = InterpolationJob::new(0.0, 2_100_000.0, ms(2000))
            .with_easing(EasingKind::EaseOutQuartic)
            .with_formatter(Notation::Millions)
            .starting_at(Duration::ZERO);
        assert_eq!(job.value_at(ms(10_000)), 2_100_000.0);
        assert_eq!(job.render_at(ms(10_000)), "2.1M+");
    }

    #[test]
    fn test_runs_to_exact_target_and_stops() {
        let mut tokens = TimerTokens::default();
        let mut interpolator = Interpolator::new(TICK);
        let element = ElementId::new("patients");
        let start = interpolator.start(
            element.clone(),
            InterpolationJob::new(0.0, 15_000.0, ms(2000)),
            &mut tokens,
        );
        assert!(matches!(start.as_slice(), [Effect::ScheduleTimer { delay, .. }] if *delay == TICK));

        let (_, effects) = run_until_idle(&mut interpolator, Duration::ZERO, TICK, 1000);
        let texts: Vec<_> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::SetText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts.last(), Some(&"15,000+"));
        assert_eq!(texts.iter().filter(|t| **t == "15,000+").count(), 1);
        assert!(matches!(effects.last(), Some(Effect::CancelTimer { .. })));
        assert!(!interpolator.is_running(&element));
        assert_eq!(interpolator.active_count(), 0);
    }

    #[test]
    fn test_values_are_monotonic() {
        let mut tokens = TimerTokens::default();
        let mut interpolator = Interpolator::new(TICK);
        interpolator.start(
            "a".into(),
            InterpolationJob::new(0.0, 500.0, ms(300)).with_easing(EasingKind::EaseOutQuartic),
            &mut tokens,
        );
        let (_, effects) = run_until_idle(&mut interpolator, Duration::ZERO, TICK, 100);
        let mut prev = 0u64;
        for effect in effects {
            if let Effect::SetText { text, .. } = effect {
                let v: u64 = text.trim_end_matches('+').replace(',', "").parse().unwrap();
                assert!(v >= prev);
                prev = v;
            }
        }
        assert_eq!(prev, 500);
    }

    #[test]
    fn test_new_job_cancels_previous() {
        let mut tokens = TimerTokens::default();
        let mut interpolator = Interpolator::new(TICK);
        let element = ElementId::new("stat");

        let first = interpolator.start(
            element.clone(),
            InterpolationJob::new(0.0, 100.0, ms(1000)),
            &mut tokens,
        );
        let Effect::ScheduleTimer { token: first_token, .. } = first[0] else {
            panic!("expected a timer request");
        };

        let second = interpolator.start(
            element.clone(),
            InterpolationJob::new(0.0, 50.0, ms(1000)).starting_at(Duration::ZERO),
            &mut tokens,
        );
        assert_eq!(second[0], Effect::CancelTimer { token: first_token });
        assert!(matches!(second[1], Effect::ScheduleTimer { token, .. } if token != first_token));
        assert_eq!(interpolator.active_count(), 1);
        assert_eq!(interpolator.job(&element).map(|j| j.target_value()), Some(50.0));

        // Only the replacement job writes text
        let mut out = Vec::new();
        interpolator.on_tick(ms(1000), &mut out);
        assert_eq!(out[0], Effect::set_text(&element, "50+"));
    }

    #[test]
    fn test_zero_duration_completes_on_first_tick() {
        let mut tokens = TimerTokens::default();
        let mut interpolator = Interpolator::new(TICK);
        interpolator.start(
            "pct".into(),
            InterpolationJob::new(0.0, 94.0, Duration::ZERO).with_formatter(Notation::Percentage),
            &mut tokens,
        );
        let mut out = Vec::new();
        assert!(!interpolator.on_tick(TICK, &mut out));
        assert_eq!(out[0], Effect::set_text(&"pct".into(), "94%"));
    }

    #[test]
    fn test_unanchored_job_starts_at_first_tick() {
        let mut tokens = TimerTokens::default();
        let mut interpolator = Interpolator::new(TICK);
        let element = ElementId::new("late");
        interpolator.start(element.clone(), InterpolationJob::new(0.0, 15_000.0, ms(2000)), &mut tokens);

        // Host was idle for ten seconds before the first tick
        let (end, effects) = run_until_idle(&mut interpolator, ms(10_000), TICK, 1000);
        let texts: Vec<_> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::SetText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts.first(), Some(&"0+"));
        assert_eq!(texts.last(), Some(&"15,000+"));
        assert!(texts.len() > 100);
        assert_eq!(end, ms(10_000) + TICK + ms(2000));
    }

    #[test]
    fn test_unanchored_value_is_start() {
        let job = InterpolationJob::new(10.0, 20.0, ms(100));
        assert_eq!(job.start_timestamp(), None);
        assert_eq!(job.value_at(ms(5000)), 10.0);
        assert!(!job.is_complete_at(ms(5000)));
    }

    #[test]
    fn test_cancel() {
        let mut tokens = TimerTokens::default();
        let mut interpolator = Interpolator::new(TICK);
        let element = ElementId::new("x");
        interpolator.start(element.clone(), InterpolationJob::new(0.0, 1.0, ms(100)), &mut tokens);
        assert!(matches!(interpolator.cancel(&element), Some(Effect::CancelTimer { .. })));
        assert!(interpolator.cancel(&element).is_none());
    }
}
