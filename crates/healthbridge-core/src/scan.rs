//! Bill scan demo: Idle → Uploading → Analyzing → Complete
//!
//! The simulator never looks at file contents. It validates the MIME type,
//! animates a progress bar through the host's timer, then produces a mock
//! result drawn from the injected [`RandomSource`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ProgressMode, ScanConfig};
use crate::error::{Error, Result};
use crate::format::format_file_size;
use crate::host::{Effect, ElementId, TimerToken, TimerTokens};
use crate::motion::timing::{elapsed, progress};
use crate::motion::TickSource;
use crate::random::RandomSource;

/// Billing error labels a mock result draws from
pub const ERROR_CATALOG: [&str; 7] = [
    "Duplicate charges",
    "Incorrect coding",
    "Overcharged services",
    "Unbundled procedures",
    "Upcoding",
    "Services not received",
    "Balance billing",
];

pub const STATUS_UPLOADING: &str = "Uploading your bill...";
pub const STATUS_ANALYZING: &str = "Analyzing your bill...";
pub const STATUS_COMPLETE: &str = "Analysis Complete!";

/// A file picked by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSelection {
    pub name: String,
    pub size: u64,
    pub mime: String,
}

impl FileSelection {
    pub fn new(name: impl Into<String>, size: u64, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime: mime.into(),
        }
    }

    /// Label shown next to the upload widget, e.g. `bill.pdf (1.5 MB)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, format_file_size(self.size))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    #[default]
    Idle,
    Uploading,
    Analyzing,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub error_count: u32,
    pub savings_amount: u32,
    pub error_types: Vec<String>,
}

impl ScanResult {
    /// Headline shown in the result panel
    pub fn summary(&self) -> String {
        format!("{} potential errors found", self.error_count)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub state: ScanState,
    pub file_name: String,
    pub byte_size: u64,
    pub progress_percent: f64,
    pub result: Option<ScanResult>,
}

impl ScanSession {
    fn new(file: &FileSelection) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            state: ScanState::Uploading,
            file_name: file.name.clone(),
            byte_size: file.size,
            progress_percent: 0.0,
            result: None,
        }
    }
}

/// How upload progress advances
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressPolicy {
    /// Linear 0 → 100 over `duration`
    Fixed { duration: Duration },
    /// Every `interval`, a random increment in `[0, max_increment)` percent
    Stepped {
        interval: Duration,
        max_increment: f64,
    },
}

impl ProgressPolicy {
    pub fn from_config(config: &ScanConfig) -> Self {
        match config.progress {
            ProgressMode::Fixed => Self::Fixed {
                duration: Duration::from_millis(config.upload_duration_ms),
            },
            ProgressMode::Stepped => Self::Stepped {
                interval: Duration::from_millis(config.step_interval_ms),
                max_increment: config.max_increment_percent,
            },
        }
    }
}

/// Draw a mock analysis result
///
/// The error count is clamped to the catalog size so labels stay distinct.
pub fn generate_result(config: &ScanConfig, rng: &mut dyn RandomSource) -> ScanResult {
    let max_index = ERROR_CATALOG.len() as u32 - 1;
    let count = rng
        .gen_range(config.min_errors..=config.max_errors)
        .min(ERROR_CATALOG.len() as u32);

    let mut error_types: Vec<String> = Vec::with_capacity(count as usize);
    while error_types.len() < count as usize {
        let label = ERROR_CATALOG[rng.gen_range(0..=max_index) as usize];
        if !error_types.iter().any(|t| t == label) {
            error_types.push(label.to_string());
        }
    }

    ScanResult {
        error_count: count,
        savings_amount: rng.gen_range(config.min_savings..=config.max_savings),
        error_types,
    }
}

#[derive(Debug, Clone)]
struct ScanElementIds {
    status: ElementId,
    progress: ElementId,
    file: ElementId,
    result: ElementId,
    dismiss: ElementId,
}

/// The scan widget's state machine
pub struct ScanSimulator {
    config: ScanConfig,
    policy: ProgressPolicy,
    rng: Box<dyn RandomSource>,
    elements: ScanElementIds,
    session: Option<ScanSession>,
    /// When the current state was entered; set by the first tick after the
    /// upload starts
    phase_started: Option<Duration>,
    last_step: Duration,
    token: Option<TimerToken>,
}

impl ScanSimulator {
    pub fn new(config: ScanConfig, rng: Box<dyn RandomSource>) -> Self {
        let elements = ScanElementIds {
            status: ElementId::new(config.elements.status.as_str()),
            progress: ElementId::new(config.elements.progress.as_str()),
            file: ElementId::new(config.elements.file.as_str()),
            result: ElementId::new(config.elements.result.as_str()),
            dismiss: ElementId::new(config.elements.dismiss.as_str()),
        };
        Self {
            policy: ProgressPolicy::from_config(&config),
            config,
            rng,
            elements,
            session: None,
            phase_started: None,
            last_step: Duration::ZERO,
            token: None,
        }
    }

    pub fn state(&self) -> ScanState {
        self.session
            .as_ref()
            .map_or(ScanState::Idle, |session| session.state)
    }

    pub fn session(&self) -> Option<&ScanSession> {
        self.session.as_ref()
    }

    pub fn policy(&self) -> ProgressPolicy {
        self.policy
    }

    pub fn is_accepted(&self, mime: &str) -> bool {
        self.config
            .accepted_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(mime))
    }

    /// Element whose click dismisses the result panel
    pub fn dismiss_element(&self) -> &ElementId {
        &self.elements.dismiss
    }

    /// Elements the widget writes to
    pub fn element_ids(&self) -> [&ElementId; 4] {
        [
            &self.elements.status,
            &self.elements.progress,
            &self.elements.file,
            &self.elements.result,
        ]
    }

    fn timer_delay(&self) -> Duration {
        match self.policy {
            ProgressPolicy::Fixed { .. } => Duration::from_millis(self.config.step_interval_ms),
            ProgressPolicy::Stepped { interval, .. } => interval,
        }
    }

    /// Start a new session for `file`, replacing any session in progress
    ///
    /// Unsupported types are rejected with [`Error::InvalidInput`] and leave
    /// the current session untouched. Progress is timed from the next tick.
    pub fn select_file(
        &mut self,
        file: FileSelection,
        tokens: &mut TimerTokens,
    ) -> Result<Vec<Effect>> {
        if !self.is_accepted(&file.mime) {
            warn!(file = %file.name, mime = %file.mime, "Rejected upload");
            return Err(Error::InvalidInput(
                "Please upload a PDF, JPG or PNG file".to_string(),
            ));
        }

        let mut effects = Vec::with_capacity(6);
        if let Some(previous) = self.token.take() {
            effects.push(Effect::CancelTimer { token: previous });
        }

        let session = ScanSession::new(&file);
        info!(session = %session.id, file = %file.name, size = file.size, "Scan uploading");

        effects.push(Effect::set_text(&self.elements.file, file.label()));
        effects.push(Effect::set_text(&self.elements.status, STATUS_UPLOADING));
        effects.push(Effect::set_style(&self.elements.progress, "width", "0%"));
        effects.push(Effect::remove_class(&self.elements.result, "visible"));

        let token = tokens.issue();
        effects.push(Effect::ScheduleTimer {
            token,
            delay: self.timer_delay(),
        });

        self.session = Some(session);
        self.phase_started = None;
        self.token = Some(token);
        Ok(effects)
    }

    /// Drop the session and reset the widget to Idle
    pub fn dismiss(&mut self) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(5);
        if let Some(token) = self.token.take() {
            effects.push(Effect::CancelTimer { token });
        }
        if let Some(session) = self.session.take() {
            debug!(session = %session.id, "Scan dismissed");
        }
        effects.push(Effect::set_text(&self.elements.file, ""));
        effects.push(Effect::set_text(&self.elements.status, ""));
        effects.push(Effect::set_style(&self.elements.progress, "width", "0%"));
        effects.push(Effect::remove_class(&self.elements.result, "visible"));
        effects
    }

    fn next_progress(&mut self, current: f64, now: Duration) -> f64 {
        let next = match self.policy {
            ProgressPolicy::Fixed { duration } => {
                let started = self.phase_started.unwrap_or(now);
                100.0 * progress(elapsed(started, now), duration)
            }
            ProgressPolicy::Stepped {
                interval,
                max_increment,
            } => {
                if interval.is_zero() {
                    return 100.0;
                }
                let mut value = current;
                while now >= self.last_step + interval && value < 100.0 {
                    value += self.rng.next_f64() * max_increment;
                    self.last_step += interval;
                }
                value
            }
        };
        next.clamp(current, 100.0)
    }
}

impl TickSource for ScanSimulator {
    fn on_tick(&mut self, now: Duration, out: &mut Vec<Effect>) -> bool {
        let Some(state) = self.session.as_ref().map(|s| s.state) else {
            return false;
        };
        if self.token.is_none() {
            return false;
        }

        if state == ScanState::Uploading {
            if self.phase_started.is_none() {
                self.phase_started = Some(now);
                self.last_step = now;
            }
            let current = self
                .session
                .as_ref()
                .map_or(0.0, |s| s.progress_percent);
            let next = self.next_progress(current, now);
            out.push(Effect::set_style(
                &self.elements.progress,
                "width",
                format!("{}%", next.floor() as u32),
            ));

            let finished = next >= 100.0;
            if let Some(session) = self.session.as_mut() {
                session.progress_percent = next;
                if finished {
                    session.state = ScanState::Analyzing;
                    info!(session = %session.id, "Scan analyzing");
                }
            }
            if !finished {
                return true;
            }
            self.phase_started = Some(now);
            out.push(Effect::set_text(&self.elements.status, STATUS_ANALYZING));
        }

        let analysis_delay = Duration::from_millis(self.config.analysis_delay_ms);
        if elapsed(self.phase_started.unwrap_or(now), now) < analysis_delay {
            return true;
        }

        let result = generate_result(&self.config, self.rng.as_mut());
        out.push(Effect::set_text(&self.elements.status, STATUS_COMPLETE));
        out.push(Effect::set_text(&self.elements.result, result.summary()));
        out.push(Effect::add_class(&self.elements.result, "visible"));
        if let Some(token) = self.token.take() {
            out.push(Effect::CancelTimer { token });
        }
        if let Some(session) = self.session.as_mut() {
            info!(
                session = %session.id,
                errors = result.error_count,
                savings = result.savings_amount,
                "Scan complete"
            );
            session.state = ScanState::Complete;
            session.result = Some(result);
        }
        false
    }
}
