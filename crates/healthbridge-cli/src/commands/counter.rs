use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Result};
use tracing::debug;

use healthbridge_core::motion::EasingKind;
use healthbridge_core::{AppConfig, Effect, ElementId, HostEvent, SchedulerContext};

use crate::page::{drive, TerminalPage};

/// Overwrite the current terminal line with `text`
fn render_frame(out: &mut impl Write, text: &str) -> std::io::Result<()> {
    write!(out, "\r\x1b[K{}", text)?;
    out.flush()
}

pub async fn run(
    mut config: AppConfig,
    text: &str,
    duration: Option<u64>,
    ease_out: bool,
) -> Result<()> {
    if let Some(ms) = duration {
        config.motion.counter_duration_ms = ms;
    }
    if ease_out {
        config.motion.easing = EasingKind::EaseOutQuartic;
    }
    let tick = config.motion.tick_interval();
    let limit = config.motion.counter_duration() + Duration::from_secs(1);

    let id = ElementId::new("counter");
    let mut page = TerminalPage::new(|effect: &Effect| {
        if let Effect::SetText { text, .. } = effect {
            if let Err(e) = render_frame(&mut std::io::stdout(), text) {
                debug!("Failed to draw counter frame: {}", e);
            }
        }
    });
    page.insert(id.clone(), text);

    let mut ctx = SchedulerContext::new(config);
    ctx.register_counter(&page, &id)?;
    ctx.handle(
        HostEvent::VisibilityChanged {
            element: id,
            ratio: 1.0,
        },
        &mut page,
    );
    if !ctx.needs_tick() {
        bail!("No positive number to count up to in {:?}", text);
    }

    drive(&mut ctx, &mut page, tick, limit).await;
    println!();

    Ok(())
}
