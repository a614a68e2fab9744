use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use healthbridge_core::motion::StaggerPolicy;
use healthbridge_core::{AppConfig, Effect, ElementId, HostEvent, SchedulerContext};

use crate::page::{drive, TerminalPage};

pub async fn run(
    config: AppConfig,
    count: usize,
    random: bool,
    hero: bool,
    seed: Option<u64>,
) -> Result<()> {
    let policy = if random {
        StaggerPolicy::random(config.reveal.random_window_ms)
    } else if hero {
        config.reveal.hero_policy()
    } else {
        config.reveal.stagger_policy()
    };
    let tick = config.motion.tick_interval();
    debug!(?policy, count, "Reveal batch");

    let origin = tokio::time::Instant::now();
    let mut page = TerminalPage::new(move |effect: &Effect| {
        if let Effect::SetStyle {
            element,
            property,
            value,
        } = effect
        {
            if property == "opacity" && value == "1" {
                println!("{:>6} ms  {} faded in", origin.elapsed().as_millis(), element);
            }
        }
    });

    let ids: Vec<ElementId> = (1..=count)
        .map(|i| ElementId::new(format!("item-{}", i)))
        .collect();
    for id in &ids {
        page.insert(id.clone(), "");
    }

    let mut ctx = match seed {
        Some(seed) => SchedulerContext::seeded(config, seed),
        None => SchedulerContext::new(config),
    };
    if hero {
        ctx.register_hero(&page, &ids)?;
    } else {
        ctx.register_reveals(&page, &ids, policy)?;
    }

    println!("Schedule:");
    for id in &ids {
        if let Some(watched) = ctx.observer().get(id) {
            println!("  {:<10} +{} ms", id, watched.stagger_delay.as_millis());
        }
    }
    println!();

    for id in &ids {
        ctx.handle(
            HostEvent::VisibilityChanged {
                element: id.clone(),
                ratio: 1.0,
            },
            &mut page,
        );
    }
    drive(&mut ctx, &mut page, tick, Duration::from_secs(60)).await;

    Ok(())
}
