//! Scheduler context: owns every registration table and routes host events
//!
//! One context per page. The host registers elements once, then feeds
//! [`HostEvent`]s through [`SchedulerContext::handle`]; every resulting
//! [`Effect`] is written straight into the host's [`Page`].

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::format::{classify, parse_target, Notation};
use crate::host::{Effect, ElementId, HostEvent, Page, TimerToken, TimerTokens};
use crate::motion::{stagger_offsets, InterpolationJob, Interpolator, StaggerPolicy, TickSource};
use crate::navbar::Navbar;
use crate::random::{RandomSource, XorShift64};
use crate::rate_limit::Debounce;
use crate::scan::{ScanSimulator, ScanState};
use crate::validate::FieldRule;
use crate::visibility::{Reaction, VisibilityObserver, WatchedElement};

pub const VISIBLE_CLASS: &str = "visible";
pub const INVALID_CLASS: &str = "is-invalid";

#[derive(Debug, Clone, Copy)]
struct CounterSpec {
    notation: Notation,
    target: f64,
}

#[derive(Debug)]
struct PendingReveal {
    element: ElementId,
    delay: Duration,
    /// Set by the first tick after the element became visible
    due: Option<Duration>,
}

#[derive(Debug)]
struct FieldState {
    rule: FieldRule,
    debounce: Debounce<String>,
    token: Option<TimerToken>,
}

pub struct SchedulerContext {
    config: AppConfig,
    observer: VisibilityObserver,
    interpolator: Interpolator,
    scan: ScanSimulator,
    navbar: Option<Navbar>,
    fields: BTreeMap<ElementId, FieldState>,
    counters: HashMap<ElementId, CounterSpec>,
    pending_reveals: Vec<PendingReveal>,
    tokens: TimerTokens,
    rng: Box<dyn RandomSource>,
    now: Duration,
}

impl SchedulerContext {
    /// Context whose randomness is seeded from entropy
    pub fn new(config: AppConfig) -> Self {
        Self::with_random(config, Box::new(XorShift64::from_entropy()))
    }

    /// Fully reproducible context
    pub fn seeded(config: AppConfig, seed: u64) -> Self {
        Self::with_random(config, Box::new(XorShift64::seeded(seed)))
    }

    pub fn with_random(config: AppConfig, mut rng: Box<dyn RandomSource>) -> Self {
        let scan_rng = XorShift64::seeded(rng.next_u64());
        Self {
            observer: VisibilityObserver::new(
                config.reveal.threshold,
                config.reveal.bottom_margin_px,
            ),
            interpolator: Interpolator::new(config.motion.tick_interval()),
            scan: ScanSimulator::new(config.scan.clone(), Box::new(scan_rng)),
            navbar: None,
            fields: BTreeMap::new(),
            counters: HashMap::new(),
            pending_reveals: Vec::new(),
            tokens: TimerTokens::default(),
            rng,
            now: Duration::ZERO,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Latest host timestamp seen
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn observer(&self) -> &VisibilityObserver {
        &self.observer
    }

    pub fn interpolator(&self) -> &Interpolator {
        &self.interpolator
    }

    pub fn scan(&self) -> &ScanSimulator {
        &self.scan
    }

    /// Whether anything is waiting on host ticks
    pub fn needs_tick(&self) -> bool {
        self.interpolator.active_count() > 0
            || matches!(self.scan.state(), ScanState::Uploading | ScanState::Analyzing)
            || !self.pending_reveals.is_empty()
            || self.fields.values().any(|f| f.debounce.is_pending())
    }

    fn require<P: Page + ?Sized>(page: &P, ids: &[&ElementId]) -> Result<()> {
        if let Some(missing) = ids.iter().find(|id| !page.contains(id)) {
            error!("Cannot register missing element {}", missing);
            return Err(Error::ElementNotFound((*missing).clone()));
        }
        Ok(())
    }

    /// Watch a batch of elements that fade in when scrolled into view
    ///
    /// Delays are assigned by batch position. Fails without registering
    /// anything if any element is missing from the page.
    pub fn register_reveals<P: Page + ?Sized>(
        &mut self,
        page: &P,
        ids: &[ElementId],
        policy: StaggerPolicy,
    ) -> Result<()> {
        Self::require(page, &ids.iter().collect::<Vec<_>>())?;

        let offsets = stagger_offsets(ids.len(), policy, self.rng.as_mut());
        for (id, delay) in ids.iter().zip(offsets) {
            let text = page.text(id).unwrap_or_default();
            self.observer.register(
                WatchedElement::new(id.clone(), text, Reaction::Reveal).with_stagger_delay(delay),
            );
        }
        debug!("Registered {} reveal elements", ids.len());
        Ok(())
    }

    /// Watch the hero block, staggered by the configured hero step
    pub fn register_hero<P: Page + ?Sized>(&mut self, page: &P, ids: &[ElementId]) -> Result<()> {
        let policy = self.config.reveal.hero_policy();
        self.register_reveals(page, ids, policy)
    }

    /// Watch a statistic whose text animates up from zero when it becomes visible
    pub fn register_counter<P: Page + ?Sized>(&mut self, page: &P, id: &ElementId) -> Result<()> {
        let Some(text) = page.text(id) else {
            error!("Cannot register missing counter {}", id);
            return Err(Error::ElementNotFound(id.clone()));
        };

        let spec = CounterSpec {
            notation: classify(&text),
            target: parse_target(&text).unwrap_or(0.0),
        };
        debug!(element = %id, text = %text, notation = ?spec.notation, "Registered counter");
        self.counters.insert(id.clone(), spec);
        self.observer
            .register(WatchedElement::new(id.clone(), text, Reaction::Counter));
        Ok(())
    }

    /// Attach the configured navbar element
    pub fn register_navbar<P: Page + ?Sized>(&mut self, page: &P) -> Result<()> {
        let id = ElementId::new(self.config.navbar.element.as_str());
        Self::require(page, &[&id])?;
        self.navbar = Some(Navbar::new(
            id,
            self.config.navbar.scrolled_offset_px,
            Duration::from_millis(self.config.rate_limit.scroll_throttle_ms),
        ));
        Ok(())
    }

    /// Validate a form field on blur and, debounced, while typing
    pub fn register_field<P: Page + ?Sized>(
        &mut self,
        page: &P,
        id: &ElementId,
        rule: FieldRule,
    ) -> Result<()> {
        Self::require(page, &[id])?;
        self.fields.insert(
            id.clone(),
            FieldState {
                rule,
                debounce: Debounce::new(Duration::from_millis(
                    self.config.rate_limit.input_debounce_ms,
                )),
                token: None,
            },
        );
        Ok(())
    }

    /// Route one host event and apply its effects to `page`
    pub fn handle<P: Page + ?Sized>(&mut self, event: HostEvent, page: &mut P) {
        for effect in self.dispatch(event) {
            page.apply(effect);
        }
    }

    fn advance(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    fn dispatch(&mut self, event: HostEvent) -> Vec<Effect> {
        match event {
            HostEvent::VisibilityChanged { element, ratio } => self
                .observer
                .notify(&element, ratio)
                .map(|watched| self.on_visible(watched))
                .unwrap_or_default(),
            HostEvent::ElementMoved {
                element,
                rect,
                viewport,
            } => self
                .observer
                .notify_rect(&element, rect, viewport)
                .map(|watched| self.on_visible(watched))
                .unwrap_or_default(),
            HostEvent::FileSelected(file) => {
                match self.scan.select_file(file, &mut self.tokens) {
                    Ok(effects) => effects,
                    Err(Error::InvalidInput(message)) => {
                        let status = ElementId::new(self.config.scan.elements.status.as_str());
                        vec![
                            Effect::set_text(&status, message),
                            Effect::add_class(&status, INVALID_CLASS),
                        ]
                    }
                    Err(e) => {
                        warn!("File selection failed: {}", e);
                        Vec::new()
                    }
                }
            }
            HostEvent::Tick { now } => {
                self.advance(now);
                self.on_tick(self.now)
            }
            HostEvent::Click { target } => {
                if &target == self.scan.dismiss_element() {
                    self.scan.dismiss()
                } else {
                    Vec::new()
                }
            }
            HostEvent::Scroll { offset_y, now } => {
                self.advance(now);
                let now = self.now;
                self.navbar
                    .as_mut()
                    .and_then(|navbar| navbar.on_scroll(offset_y, now))
                    .into_iter()
                    .collect()
            }
            HostEvent::Input { field, value, now } => {
                self.advance(now);
                self.on_input(field, value)
            }
            HostEvent::Blur { field, value } => self.on_blur(field, value),
        }
    }

    fn on_visible(&mut self, watched: WatchedElement) -> Vec<Effect> {
        match watched.reaction {
            Reaction::Reveal => {
                let mut effects = vec![Effect::add_class(&watched.id, VISIBLE_CLASS)];
                if watched.stagger_delay.is_zero() {
                    effects.extend(reveal_styles(&watched.id));
                } else {
                    effects.push(Effect::ScheduleTimer {
                        token: self.tokens.issue(),
                        delay: watched.stagger_delay,
                    });
                    self.pending_reveals.push(PendingReveal {
                        element: watched.id,
                        delay: watched.stagger_delay,
                        due: None,
                    });
                }
                effects
            }
            Reaction::Counter => {
                let Some(spec) = self.counters.get(&watched.id).copied() else {
                    return Vec::new();
                };
                if spec.target <= 0.0 {
                    debug!("Counter {} has no numeric target", watched.id);
                    return Vec::new();
                }
                let job = InterpolationJob::new(0.0, spec.target, self.config.motion.counter_duration())
                    .with_easing(self.config.motion.easing)
                    .with_formatter(spec.notation);
                self.interpolator.start(watched.id, job, &mut self.tokens)
            }
        }
    }

    fn on_tick(&mut self, now: Duration) -> Vec<Effect> {
        let mut out = Vec::new();
        self.interpolator.on_tick(now, &mut out);
        self.scan.on_tick(now, &mut out);

        for reveal in self.pending_reveals.iter_mut() {
            if reveal.due.is_none() {
                reveal.due = Some(now + reveal.delay);
            }
        }
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_reveals)
            .into_iter()
            .partition(|reveal| reveal.due.is_some_and(|due| due <= now));
        self.pending_reveals = waiting;
        for reveal in due {
            out.extend(reveal_styles(&reveal.element));
        }

        for (id, field) in self.fields.iter_mut() {
            if let Some(value) = field.debounce.poll(now) {
                field.token = None;
                out.extend(field_feedback(id, field.rule.check(&value)));
            }
        }
        out
    }

    fn on_input(&mut self, id: ElementId, value: String) -> Vec<Effect> {
        let Some(field) = self.fields.get_mut(&id) else {
            return Vec::new();
        };

        // Typing clears the error right away; re-validation waits for a pause
        let mut effects = clear_field_error(&id);
        if let Some(token) = field.token.take() {
            effects.push(Effect::CancelTimer { token });
        }
        field.debounce.call(self.now, value);
        let token = self.tokens.issue();
        field.token = Some(token);
        effects.push(Effect::ScheduleTimer {
            token,
            delay: field.debounce.wait(),
        });
        effects
    }

    fn on_blur(&mut self, id: ElementId, value: String) -> Vec<Effect> {
        let Some(field) = self.fields.get_mut(&id) else {
            return Vec::new();
        };

        let mut effects = Vec::new();
        field.debounce.cancel();
        if let Some(token) = field.token.take() {
            effects.push(Effect::CancelTimer { token });
        }
        effects.extend(field_feedback(&id, field.rule.check(&value)));
        effects
    }
}

fn reveal_styles(id: &ElementId) -> [Effect; 2] {
    [
        Effect::set_style(id, "opacity", "1"),
        Effect::set_style(id, "transform", "translateY(0)"),
    ]
}

fn clear_field_error(id: &ElementId) -> Vec<Effect> {
    vec![
        Effect::remove_class(id, INVALID_CLASS),
        Effect::set_text(&id.feedback(), ""),
    ]
}

fn field_feedback(id: &ElementId, result: Result<()>) -> Vec<Effect> {
    match result {
        Ok(()) => clear_field_error(id),
        Err(Error::InvalidInput(message)) => {
            debug!(field = %id, %message, "Field rejected");
            vec![
                Effect::add_class(id, INVALID_CLASS),
                Effect::set_text(&id.feedback(), message),
            ]
        }
        Err(e) => {
            warn!("Validation of {} failed: {}", id, e);
            Vec::new()
        }
    }
}
