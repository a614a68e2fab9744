//! Host boundary: element handles, input events and output effects
//!
//! The engine never touches a real document. It reads [`HostEvent`]s and
//! writes [`Effect`]s into a [`Page`], which is whatever the embedding host
//! uses to represent its UI elements.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scan::FileSelection;

/// Opaque handle to a UI element
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Companion element that holds validation feedback for a form field
    pub fn feedback(&self) -> Self {
        Self(format!("{}-feedback", self.0))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Handle for a host timer requested through [`Effect::ScheduleTimer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Issues unique timer tokens for one scheduler context
#[derive(Debug, Default)]
pub struct TimerTokens {
    next: u64,
}

impl TimerTokens {
    pub fn issue(&mut self) -> TimerToken {
        self.next += 1;
        TimerToken(self.next)
    }
}

/// Vertical extent of an element, in pixels relative to the viewport top
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub height: f64,
}

/// Events delivered by the host
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// Host-computed intersection ratio for an element
    VisibilityChanged { element: ElementId, ratio: f64 },
    /// Element geometry changed; the observer computes the ratio itself
    ElementMoved {
        element: ElementId,
        rect: Rect,
        viewport: Viewport,
    },
    /// User picked a file for the scan demo
    FileSelected(FileSelection),
    /// Periodic clock tick; `now` is the time since the host clock origin
    Tick { now: Duration },
    /// User clicked an element
    Click { target: ElementId },
    /// Page scrolled to `offset_y`
    Scroll { offset_y: f64, now: Duration },
    /// Form field content changed
    Input {
        field: ElementId,
        value: String,
        now: Duration,
    },
    /// Form field lost focus
    Blur { field: ElementId, value: String },
}

/// Effects written into the page
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SetText {
        element: ElementId,
        text: String,
    },
    SetStyle {
        element: ElementId,
        property: String,
        value: String,
    },
    AddClass {
        element: ElementId,
        class: String,
    },
    RemoveClass {
        element: ElementId,
        class: String,
    },
    /// Ask the host to keep delivering ticks (or call back once) after `delay`
    ScheduleTimer { token: TimerToken, delay: Duration },
    CancelTimer { token: TimerToken },
}

impl Effect {
    pub fn set_text(element: &ElementId, text: impl Into<String>) -> Self {
        Self::SetText {
            element: element.clone(),
            text: text.into(),
        }
    }

    pub fn set_style(element: &ElementId, property: &str, value: impl Into<String>) -> Self {
        Self::SetStyle {
            element: element.clone(),
            property: property.to_string(),
            value: value.into(),
        }
    }

    pub fn add_class(element: &ElementId, class: &str) -> Self {
        Self::AddClass {
            element: element.clone(),
            class: class.to_string(),
        }
    }

    pub fn remove_class(element: &ElementId, class: &str) -> Self {
        Self::RemoveClass {
            element: element.clone(),
            class: class.to_string(),
        }
    }

    /// Element the effect targets, if any
    pub fn element(&self) -> Option<&ElementId> {
        match self {
            Self::SetText { element, .. }
            | Self::SetStyle { element, .. }
            | Self::AddClass { element, .. }
            | Self::RemoveClass { element, .. } => Some(element),
            Self::ScheduleTimer { .. } | Self::CancelTimer { .. } => None,
        }
    }
}

/// The host's element store and effect sink
pub trait Page {
    /// Current display text of an element, `None` if the element does not exist
    fn text(&self, element: &ElementId) -> Option<String>;

    fn apply(&mut self, effect: Effect);

    fn contains(&self, element: &ElementId) -> bool {
        self.text(element).is_some()
    }
}

#[derive(Debug, Clone, Default)]
struct ElementState {
    text: String,
    styles: BTreeMap<String, String>,
    classes: BTreeSet<String>,
}

/// In-memory page used for headless runs and tests
///
/// Keeps the current state of every element plus the full log of applied
/// effects, timer effects included.
#[derive(Debug, Default)]
pub struct MemoryPage {
    elements: HashMap<ElementId, ElementState>,
    log: Vec<Effect>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element with its initial text
    pub fn insert(&mut self, element: impl Into<ElementId>, text: impl Into<String>) {
        self.elements.insert(
            element.into(),
            ElementState {
                text: text.into(),
                ..Default::default()
            },
        );
    }

    pub fn with_element(mut self, element: impl Into<ElementId>, text: impl Into<String>) -> Self {
        self.insert(element, text);
        self
    }

    pub fn has_class(&self, element: &ElementId, class: &str) -> bool {
        self.elements
            .get(element)
            .is_some_and(|e| e.classes.contains(class))
    }

    pub fn style(&self, element: &ElementId, property: &str) -> Option<&str> {
        self.elements
            .get(element)
            .and_then(|e| e.styles.get(property))
            .map(String::as_str)
    }

    pub fn effects(&self) -> &[Effect] {
        &self.log
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.log)
    }

    /// All texts written to an element, in order
    pub fn text_history(&self, element: &ElementId) -> Vec<&str> {
        self.log
            .iter()
            .filter_map(|effect| match effect {
                Effect::SetText { element: e, text } if e == element => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Page for MemoryPage {
    fn text(&self, element: &ElementId) -> Option<String> {
        self.elements.get(element).map(|e| e.text.clone())
    }

    fn apply(&mut self, effect: Effect) {
        if let Some(element) = effect.element() {
            if let Some(state) = self.elements.get_mut(element) {
                match &effect {
                    Effect::SetText { text, .. } => state.text = text.clone(),
                    Effect::SetStyle {
                        property, value, ..
                    } => {
                        state.styles.insert(property.clone(), value.clone());
                    }
                    Effect::AddClass { class, .. } => {
                        state.classes.insert(class.clone());
                    }
                    Effect::RemoveClass { class, .. } => {
                        state.classes.remove(class);
                    }
                    Effect::ScheduleTimer { .. } | Effect::CancelTimer { .. } => {}
                }
            } else {
                tracing::trace!("Effect for unknown element {} ignored", element);
            }
        }
        self.log.push(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let mut tokens = TimerTokens::default();
        let a = tokens.issue();
        let b = tokens.issue();
        assert_ne!(a, b);
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_memory_page_applies_effects() {
        let mut page = MemoryPage::new().with_element("stat", "94%");
        let id = ElementId::new("stat");

        page.apply(Effect::set_text(&id, "50%"));
        page.apply(Effect::add_class(&id, "visible"));
        page.apply(Effect::set_style(&id, "opacity", "1"));

        assert_eq!(page.text(&id).as_deref(), Some("50%"));
        assert!(page.has_class(&id, "visible"));
        assert_eq!(page.style(&id, "opacity"), Some("1"));

        page.apply(Effect::remove_class(&id, "visible"));
        assert!(!page.has_class(&id, "visible"));
        assert_eq!(page.effects().len(), 4);
    }

    #[test]
    fn test_missing_element() {
        let page = MemoryPage::new();
        assert!(!page.contains(&ElementId::new("nope")));
    }

    #[test]
    fn test_feedback_id() {
        assert_eq!(ElementId::new("email").feedback().as_str(), "email-feedback");
    }
}
