//! Terminal host: an in-memory page that reports effects as they land, and
//! a tokio tick loop that drives a scheduler context.

use std::time::Duration;

use healthbridge_core::{Effect, ElementId, HostEvent, MemoryPage, Page, SchedulerContext};

/// [`MemoryPage`] that hands every effect to `listener` before applying it
pub struct TerminalPage<F> {
    inner: MemoryPage,
    listener: F,
}

impl<F> TerminalPage<F>
where
    F: FnMut(&Effect),
{
    pub fn new(listener: F) -> Self {
        Self {
            inner: MemoryPage::new(),
            listener,
        }
    }

    pub fn insert(&mut self, element: impl Into<ElementId>, text: impl Into<String>) {
        self.inner.insert(element, text);
    }

    pub fn inner(&self) -> &MemoryPage {
        &self.inner
    }
}

impl<F> Page for TerminalPage<F>
where
    F: FnMut(&Effect),
{
    fn text(&self, element: &ElementId) -> Option<String> {
        self.inner.text(element)
    }

    fn apply(&mut self, effect: Effect) {
        (self.listener)(&effect);
        self.inner.apply(effect);
    }
}

/// Deliver ticks on a tokio interval until the context goes idle
///
/// Host time continues from the context's last timestamp. Gives up once
/// `limit` has passed; returns the timestamp of the last tick.
pub async fn drive<P: Page>(
    ctx: &mut SchedulerContext,
    page: &mut P,
    interval: Duration,
    limit: Duration,
) -> Duration {
    let base = ctx.now();
    let origin = tokio::time::Instant::now();
    let mut ticker = tokio::time::interval(interval);

    while ctx.needs_tick() && origin.elapsed() < limit {
        ticker.tick().await;
        ctx.handle(
            HostEvent::Tick {
                now: base + origin.elapsed(),
            },
            page,
        );
    }
    ctx.now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthbridge_core::AppConfig;

    #[test]
    fn test_listener_sees_every_effect() {
        let mut seen = Vec::new();
        {
            let mut page = TerminalPage::new(|effect: &Effect| seen.push(effect.clone()));
            page.insert("a", "x");
            let id = ElementId::new("a");
            page.apply(Effect::set_text(&id, "y"));
            assert_eq!(page.text(&id).as_deref(), Some("y"));
        }
        assert_eq!(seen.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_runs_counter_to_completion() {
        let mut page = TerminalPage::new(|_: &Effect| {});
        page.insert("stat", "94%");
        let id = ElementId::new("stat");
        let mut ctx = SchedulerContext::seeded(AppConfig::default(), 1);
        ctx.register_counter(&page, &id).unwrap();
        ctx.handle(
            HostEvent::VisibilityChanged {
                element: id.clone(),
                ratio: 1.0,
            },
            &mut page,
        );

        let end = drive(&mut ctx, &mut page, Duration::from_millis(16), Duration::from_secs(10)).await;
        assert!(end >= Duration::from_millis(2000));
        assert_eq!(page.text(&id).as_deref(), Some("94%"));
        assert!(!ctx.needs_tick());
    }
}
