//! Navbar chrome that reacts to page scroll

use std::time::Duration;

use tracing::trace;

use crate::host::{Effect, ElementId};
use crate::rate_limit::Throttle;

pub const SCROLLED_CLASS: &str = "scrolled";

#[derive(Debug)]
pub struct Navbar {
    element: ElementId,
    scrolled_offset: f64,
    throttle: Throttle,
    scrolled: bool,
}

impl Navbar {
    pub fn new(element: ElementId, scrolled_offset: f64, throttle: Duration) -> Self {
        Self {
            element,
            scrolled_offset,
            throttle: Throttle::new(throttle),
            scrolled: false,
        }
    }

    pub fn element(&self) -> &ElementId {
        &self.element
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    /// Handle a scroll event; only emits when the `scrolled` state flips
    pub fn on_scroll(&mut self, offset_y: f64, now: Duration) -> Option<Effect> {
        if !self.throttle.try_acquire(now) {
            trace!("Scroll at {:?} throttled", now);
            return None;
        }

        let scrolled = offset_y > self.scrolled_offset;
        if scrolled == self.scrolled {
            return None;
        }
        self.scrolled = scrolled;
        Some(if scrolled {
            Effect::add_class(&self.element, SCROLLED_CLASS)
        } else {
            Effect::remove_class(&self.element, SCROLLED_CLASS)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_toggles_on_crossing() {
        let id = ElementId::new("navbar");
        let mut navbar = Navbar::new(id.clone(), 100.0, ms(10));

        assert_eq!(navbar.on_scroll(50.0, ms(0)), None);
        assert_eq!(navbar.on_scroll(150.0, ms(20)), Some(Effect::add_class(&id, "scrolled")));
        assert_eq!(navbar.on_scroll(300.0, ms(40)), None);
        assert!(navbar.is_scrolled());
        assert_eq!(navbar.on_scroll(100.0, ms(60)), Some(Effect::remove_class(&id, "scrolled")));
    }

    #[test]
    fn test_scroll_inside_window_is_dropped() {
        let id = ElementId::new("navbar");
        let mut navbar = Navbar::new(id, 100.0, ms(10));
        assert_eq!(navbar.on_scroll(10.0, ms(0)), None);
        // Crossed, but still within the throttle window
        assert_eq!(navbar.on_scroll(500.0, ms(5)), None);
        assert!(!navbar.is_scrolled());
        assert!(navbar.on_scroll(500.0, ms(10)).is_some());
    }
}
