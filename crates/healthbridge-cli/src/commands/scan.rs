use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use healthbridge_core::rate_limit::throttle;
use healthbridge_core::scan::{FileSelection, ScanState};
use healthbridge_core::{AppConfig, Effect, ElementId, HostEvent, Page, SchedulerContext};

use crate::page::{drive, TerminalPage};

/// MIME type for the upload formats the scanner knows about
fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

/// Throttle progress widths into `sink`, letting the final "100%" through
fn progress_reporter<F>(sink: F, limit: Duration) -> impl FnMut(String)
where
    F: FnMut(&str),
{
    let sink = Rc::new(RefCell::new(sink));
    let throttled_sink = Rc::clone(&sink);
    let mut throttled = throttle(
        move |width: String| (*throttled_sink.borrow_mut())(&width),
        limit,
    );
    move |width: String| {
        if width == "100%" {
            (*sink.borrow_mut())(&width);
        } else {
            throttled(width);
        }
    }
}

pub async fn run(
    config: AppConfig,
    file: &Path,
    seed: Option<u64>,
    mime: Option<String>,
) -> Result<()> {
    let metadata = tokio::fs::metadata(file)
        .await
        .with_context(|| format!("Cannot read {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let mime = mime.unwrap_or_else(|| guess_mime(file).to_string());

    let elements = config.scan.elements.clone();
    let status_id = ElementId::new(elements.status.as_str());
    let progress_id = ElementId::new(elements.progress.as_str());
    let tick = config.motion.tick_interval();

    let mut show_progress = progress_reporter(
        |width: &str| eprint!("\r\x1b[K  {}", width),
        Duration::from_millis(100),
    );
    let status = status_id.clone();
    let mut page = TerminalPage::new(move |effect: &Effect| match effect {
        Effect::SetStyle {
            element,
            property,
            value,
        } if *element == progress_id && property == "width" => show_progress(value.clone()),
        Effect::SetText { element, text } if *element == status && !text.is_empty() => {
            eprintln!("\r\x1b[K{}", text)
        }
        _ => {}
    });

    let mut ctx = match seed {
        Some(seed) => SchedulerContext::seeded(config, seed),
        None => SchedulerContext::new(config),
    };
    for id in ctx.scan().element_ids() {
        page.insert(id.clone(), "");
    }

    ctx.handle(
        HostEvent::FileSelected(FileSelection::new(name, metadata.len(), mime)),
        &mut page,
    );
    if ctx.scan().state() == ScanState::Idle {
        bail!("{}", page.text(&status_id).unwrap_or_default());
    }
    if let Some(label) = page.inner().text(&ElementId::new(elements.file.as_str())) {
        eprintln!("File: {}", label);
    }

    drive(&mut ctx, &mut page, tick, Duration::from_secs(120)).await;

    let session = ctx.scan().session().context("Scan session was dropped")?;
    let Some(result) = &session.result else {
        bail!("Scan did not complete");
    };
    eprintln!("{}", result.summary());
    println!("{}", result.to_json()?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("bill.PDF")), "application/pdf");
        assert_eq!(guess_mime(Path::new("a/b/scan.jpeg")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("photo.png")), "image/png");
        assert_eq!(guess_mime(Path::new("notes")), "application/octet-stream");
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_always_shows_completion() {
        let shown = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&shown);
        let mut report = progress_reporter(
            move |width: &str| sink.borrow_mut().push(width.to_string()),
            Duration::from_millis(100),
        );

        report("10%".to_string());
        tokio::time::advance(Duration::from_millis(16)).await;
        report("20%".to_string());
        tokio::time::advance(Duration::from_millis(16)).await;
        report("100%".to_string());
        assert_eq!(*shown.borrow(), vec!["10%", "100%"]);

        tokio::time::advance(Duration::from_millis(200)).await;
        report("30%".to_string());
        assert_eq!(shown.borrow().last().map(String::as_str), Some("30%"));
    }
}
