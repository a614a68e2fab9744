//! Debounce and throttle
//!
//! Two flavors of each:
//! - Clock-driven state machines ([`Debounce`], [`Throttle`] and their
//!   callback-owning wrappers) that take explicit host timestamps. The
//!   scheduler context uses these so everything stays replayable.
//! - Closures backed by tokio timers ([`debounce`], [`throttle`]) for code
//!   running on a tokio runtime.
//!
//! Debounce has no maximum wait: a source that never goes quiet for `wait`
//! starves the callback forever. Callers that need a bounded delay must
//! combine it with a throttle.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::host::Effect;
use crate::motion::TickSource;

/// Trailing-edge debounce over host timestamps
#[derive(Debug, Clone)]
pub struct Debounce<A> {
    wait: Duration,
    pending: Option<(Duration, A)>,
}

impl<A> Debounce<A> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Record a call at `now`, replacing any pending call and its deadline
    pub fn call(&mut self, now: Duration, args: A) {
        self.pending = Some((now + self.wait, args));
    }

    /// Take the pending arguments if the quiet period has elapsed at `now`
    pub fn poll(&mut self, now: Duration) -> Option<A> {
        match self.pending {
            Some((deadline, _)) if now >= deadline => self.pending.take().map(|(_, args)| args),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Leading-edge throttle over host timestamps
///
/// Calls inside an open window are dropped, not queued.
#[derive(Debug, Clone)]
pub struct Throttle {
    limit: Duration,
    window_start: Option<Duration>,
}

impl Throttle {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            window_start: None,
        }
    }

    /// Whether a call at `now` may run; opens a new window if so
    pub fn try_acquire(&mut self, now: Duration) -> bool {
        match self.window_start {
            Some(start) if now < start + self.limit => false,
            _ => {
                self.window_start = Some(now);
                true
            }
        }
    }

    pub fn in_cooldown(&self, now: Duration) -> bool {
        self.window_start
            .is_some_and(|start| now < start + self.limit)
    }
}

/// A callback wrapped in a [`Debounce`]
///
/// The callback runs from [`TickSource::on_tick`] once the quiet period ends.
pub struct Debounced<F, A> {
    debounce: Debounce<A>,
    callback: F,
}

impl<F, A> Debounced<F, A>
where
    F: FnMut(A),
{
    pub fn new(callback: F, wait: Duration) -> Self {
        Self {
            debounce: Debounce::new(wait),
            callback,
        }
    }

    pub fn call(&mut self, now: Duration, args: A) {
        self.debounce.call(now, args);
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }
}

impl<F, A> TickSource for Debounced<F, A>
where
    F: FnMut(A),
{
    fn on_tick(&mut self, now: Duration, _out: &mut Vec<Effect>) -> bool {
        if let Some(args) = self.debounce.poll(now) {
            (self.callback)(args);
        }
        self.debounce.is_pending()
    }
}

/// A callback wrapped in a [`Throttle`]
pub struct Throttled<F> {
    throttle: Throttle,
    callback: F,
}

impl<F> Throttled<F> {
    pub fn new(callback: F, limit: Duration) -> Self {
        Self {
            throttle: Throttle::new(limit),
            callback,
        }
    }

    /// Run the callback unless a window is open; returns whether it ran
    pub fn call<A>(&mut self, now: Duration, args: A) -> bool
    where
        F: FnMut(A),
    {
        if self.throttle.try_acquire(now) {
            (self.callback)(args);
            true
        } else {
            false
        }
    }
}

/// Debounce `callback` with tokio timers
///
/// Each call aborts the pending timer task and spawns a new one that sleeps
/// for `wait` and then runs `callback` with the latest arguments. Must be
/// called from within a tokio runtime.
pub fn debounce<F, A>(callback: F, wait: Duration) -> impl FnMut(A)
where
    F: FnMut(A) + Send + 'static,
    A: Send + 'static,
{
    let callback = Arc::new(Mutex::new(callback));
    let mut pending: Option<JoinHandle<()>> = None;

    move |args: A| {
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        let callback = Arc::clone(&callback);
        pending = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            let mut callback = callback.lock().unwrap_or_else(PoisonError::into_inner);
            (*callback)(args);
        }));
    }
}

/// Throttle `callback` against the tokio clock
///
/// Runs synchronously on the caller; no task is spawned.
pub fn throttle<F, A>(mut callback: F, limit: Duration) -> impl FnMut(A)
where
    F: FnMut(A),
{
    let origin = tokio::time::Instant::now();
    let mut gate = Throttle::new(limit);

    move |args: A| {
        if gate.try_acquire(origin.elapsed()) {
            callback(args);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_debounce_runs_once_with_latest_args() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let mut debounced = Debounced::new(move |v: u32| sink.borrow_mut().push(v), ms(30));

        let mut out = Vec::new();
        let mut fired_at = None;
        for t in 0..=100u64 {
            match t {
                0 => debounced.call(ms(t), 1),
                10 => debounced.call(ms(t), 2),
                20 => debounced.call(ms(t), 3),
                _ => {}
            }
            let before = calls.borrow().len();
            debounced.on_tick(ms(t), &mut out);
            if calls.borrow().len() > before && fired_at.is_none() {
                fired_at = Some(t);
            }
        }

        assert_eq!(*calls.borrow(), vec![3]);
        assert_eq!(fired_at, Some(50));
        assert!(out.is_empty());
    }

    #[test]
    fn test_debounce_starves_under_constant_calls() {
        let mut debounce = Debounce::new(ms(30));
        for t in (0..1000).step_by(10) {
            debounce.call(ms(t), t);
            assert_eq!(debounce.poll(ms(t)), None);
        }
        assert_eq!(debounce.deadline(), Some(ms(1020)));
        assert_eq!(debounce.poll(ms(1020)), Some(990));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_debounce_cancel() {
        let mut debounce = Debounce::new(ms(5));
        debounce.call(ms(0), ());
        debounce.cancel();
        assert_eq!(debounce.poll(ms(100)), None);
    }

    #[test]
    fn test_throttle_drops_calls_in_window() {
        let mut runs = Vec::new();
        let mut throttled = Throttled::new(|t: u64| runs.push(t), ms(20));
        for t in [0, 5, 15, 25] {
            throttled.call(ms(t), t);
        }
        drop(throttled);
        assert_eq!(runs, vec![0, 25]);
    }

    #[test]
    fn test_throttle_cooldown() {
        let mut throttle = Throttle::new(ms(20));
        assert!(!throttle.in_cooldown(ms(0)));
        assert!(throttle.try_acquire(ms(0)));
        assert!(throttle.in_cooldown(ms(19)));
        assert!(!throttle.try_acquire(ms(19)));
        assert!(!throttle.in_cooldown(ms(20)));
        assert!(throttle.try_acquire(ms(20)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_timer() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let origin = tokio::time::Instant::now();
        let mut debounced = debounce(
            move |v: u32| sink.lock().unwrap().push((v, origin.elapsed())),
            ms(30),
        );

        debounced(1);
        tokio::time::sleep(ms(10)).await;
        debounced(2);
        tokio::time::sleep(ms(10)).await;
        debounced(3);
        tokio::time::sleep(ms(100)).await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, 3);
        assert!(calls[0].1 >= ms(50) && calls[0].1 <= ms(51), "fired at {:?}", calls[0].1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_timer() {
        let mut runs = Vec::new();
        {
            let origin = tokio::time::Instant::now();
            let mut throttled = throttle(|v: u32| runs.push((v, origin.elapsed())), ms(20));
            throttled(0);
            tokio::time::sleep(ms(5)).await;
            throttled(5);
            tokio::time::sleep(ms(10)).await;
            throttled(15);
            tokio::time::sleep(ms(10)).await;
            throttled(25);
        }
        let values: Vec<u32> = runs.iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![0, 25]);
    }
}
