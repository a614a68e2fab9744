//! Single-shot visibility triggers
//!
//! Elements are registered once and fire once: the first time their visible
//! fraction reaches the threshold, the observer marks them triggered, stops
//! watching them and hands the element back to the caller. Re-registering an
//! element re-arms it.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, trace};

use crate::host::{ElementId, Rect, Viewport};

/// What the scheduler does when a watched element becomes visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Add the `visible` class, then fade in after the stagger delay
    Reveal,
    /// Run the element's counter animation
    Counter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchedElement {
    pub id: ElementId,
    pub triggered: bool,
    pub stagger_delay: Duration,
    pub original_text: String,
    pub reaction: Reaction,
}

impl WatchedElement {
    pub fn new(id: ElementId, original_text: impl Into<String>, reaction: Reaction) -> Self {
        Self {
            id,
            triggered: false,
            stagger_delay: Duration::ZERO,
            original_text: original_text.into(),
            reaction,
        }
    }

    pub fn with_stagger_delay(mut self, delay: Duration) -> Self {
        self.stagger_delay = delay;
        self
    }
}

/// Fraction of `rect` inside the viewport once its bottom edge is pulled in
/// by `bottom_margin`
///
/// Zero-height elements count as fully visible while they sit inside the
/// shrunk viewport.
pub fn intersection_ratio(rect: Rect, viewport: Viewport, bottom_margin: f64) -> f64 {
    let visible_bottom = viewport.height - bottom_margin;
    let height = rect.height();
    if height <= 0.0 {
        return if rect.top >= 0.0 && rect.top <= visible_bottom {
            1.0
        } else {
            0.0
        };
    }
    let overlap = rect.bottom.min(visible_bottom) - rect.top.max(0.0);
    (overlap / height).clamp(0.0, 1.0)
}

/// Registration table of watched elements
#[derive(Debug)]
pub struct VisibilityObserver {
    threshold: f64,
    bottom_margin: f64,
    elements: HashMap<ElementId, WatchedElement>,
}

impl VisibilityObserver {
    /// # Arguments
    /// * `threshold` - Visible fraction that counts as "in view" (e.g. 0.1)
    /// * `bottom_margin` - Pixels an element must clear above the viewport bottom
    pub fn new(threshold: f64, bottom_margin: f64) -> Self {
        Self {
            threshold,
            bottom_margin,
            elements: HashMap::new(),
        }
    }

    /// Watch an element, re-arming it if it was already registered
    pub fn register(&mut self, element: WatchedElement) {
        trace!("Watching {}", element.id);
        let element = WatchedElement {
            triggered: false,
            ..element
        };
        self.elements.insert(element.id.clone(), element);
    }

    pub fn unregister(&mut self, id: &ElementId) -> Option<WatchedElement> {
        self.elements.remove(id)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn get(&self, id: &ElementId) -> Option<&WatchedElement> {
        self.elements.get(id)
    }

    /// Whether the element is registered and has not fired yet
    pub fn is_watching(&self, id: &ElementId) -> bool {
        self.elements.get(id).is_some_and(|e| !e.triggered)
    }

    pub fn watching_count(&self) -> usize {
        self.elements.values().filter(|e| !e.triggered).count()
    }

    /// Report a host-computed intersection ratio
    ///
    /// Returns the element the first time it crosses the threshold; every
    /// later report for it yields `None` until it is registered again.
    pub fn notify(&mut self, id: &ElementId, ratio: f64) -> Option<WatchedElement> {
        let Some(element) = self.elements.get_mut(id) else {
            trace!("Visibility report for unwatched element {}", id);
            return None;
        };
        if element.triggered || ratio <= 0.0 || ratio < self.threshold {
            return None;
        }

        element.triggered = true;
        debug!(element = %id, ratio, "Element became visible");
        Some(element.clone())
    }

    /// Report element geometry; the ratio is computed against the viewport
    /// shrunk by the bottom margin
    pub fn notify_rect(
        &mut self,
        id: &ElementId,
        rect: Rect,
        viewport: Viewport,
    ) -> Option<WatchedElement> {
        let ratio = intersection_ratio(rect, viewport, self.bottom_margin);
        self.notify(id, ratio)
    }
}
