use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::motion::{EasingKind, StaggerPolicy};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub navbar: NavbarConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Host tick cadence for running animations
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Counter animation duration
    #[serde(default = "default_counter_duration")]
    pub counter_duration_ms: u64,
    /// Counter easing: "linear" or "ease_out_quartic"
    #[serde(default)]
    pub easing: EasingKind,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            counter_duration_ms: default_counter_duration(),
            easing: EasingKind::default(),
        }
    }
}

impl MotionConfig {
    pub fn tick_interval(&self) -> Duration {
        if self.tick_interval_ms == 0 {
            Duration::from_millis(default_tick_interval()) // ~60fps fallback
        } else {
            Duration::from_millis(self.tick_interval_ms)
        }
    }

    pub fn counter_duration(&self) -> Duration {
        Duration::from_millis(self.counter_duration_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerMode {
    #[default]
    Indexed,
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Visible fraction that triggers a reveal (0.0-1.0)
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Pixels an element must clear above the viewport bottom
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin_px: f64,
    /// Stagger policy for scroll reveals
    #[serde(default)]
    pub stagger: StaggerMode,
    /// Delay step between ordered reveals
    #[serde(default = "default_stagger_step")]
    pub stagger_step_ms: u64,
    /// Delay step for the hero block, which animates slower
    #[serde(default = "default_hero_step")]
    pub hero_step_ms: u64,
    /// Window for randomized decorative stagger
    #[serde(default = "default_random_window")]
    pub random_window_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            bottom_margin_px: default_bottom_margin(),
            stagger: StaggerMode::default(),
            stagger_step_ms: default_stagger_step(),
            hero_step_ms: default_hero_step(),
            random_window_ms: default_random_window(),
        }
    }
}

impl RevealConfig {
    /// Stagger policy for ordinary scroll reveals
    pub fn stagger_policy(&self) -> StaggerPolicy {
        match self.stagger {
            StaggerMode::Indexed => StaggerPolicy::indexed(self.stagger_step_ms),
            StaggerMode::Random => StaggerPolicy::random(self.random_window_ms),
        }
    }

    pub fn hero_policy(&self) -> StaggerPolicy {
        StaggerPolicy::indexed(self.hero_step_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum spacing between handled scroll events
    #[serde(default = "default_scroll_throttle")]
    pub scroll_throttle_ms: u64,
    /// Quiet period before a typed form value is re-validated
    #[serde(default = "default_input_debounce")]
    pub input_debounce_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            scroll_throttle_ms: default_scroll_throttle(),
            input_debounce_ms: default_input_debounce(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavbarConfig {
    /// Scroll offset beyond which the navbar gets the `scrolled` class
    #[serde(default = "default_scrolled_offset")]
    pub scrolled_offset_px: f64,
    /// Element id of the navbar
    #[serde(default = "default_navbar_element")]
    pub element: String,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self {
            scrolled_offset_px: default_scrolled_offset(),
            element: default_navbar_element(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressMode {
    /// Linear 0 to 100 over `upload_duration_ms`
    #[default]
    Fixed,
    /// Random increments of up to `max_increment_percent` every `step_interval_ms`
    Stepped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub progress: ProgressMode,
    #[serde(default = "default_upload_duration")]
    pub upload_duration_ms: u64,
    #[serde(default = "default_step_interval")]
    pub step_interval_ms: u64,
    #[serde(default = "default_max_increment")]
    pub max_increment_percent: f64,
    /// Time spent in the Analyzing state (0 = complete on the same tick)
    #[serde(default)]
    pub analysis_delay_ms: u64,
    /// Accepted upload MIME types
    #[serde(default = "default_accepted_types")]
    pub accepted_types: Vec<String>,
    #[serde(default = "default_min_errors")]
    pub min_errors: u32,
    #[serde(default = "default_max_errors")]
    pub max_errors: u32,
    #[serde(default = "default_min_savings")]
    pub min_savings: u32,
    #[serde(default = "default_max_savings")]
    pub max_savings: u32,
    /// Element ids of the upload widget
    #[serde(default)]
    pub elements: ScanElements,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            progress: ProgressMode::default(),
            upload_duration_ms: default_upload_duration(),
            step_interval_ms: default_step_interval(),
            max_increment_percent: default_max_increment(),
            analysis_delay_ms: 0,
            accepted_types: default_accepted_types(),
            min_errors: default_min_errors(),
            max_errors: default_max_errors(),
            min_savings: default_min_savings(),
            max_savings: default_max_savings(),
            elements: ScanElements::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanElements {
    #[serde(default = "default_scan_status")]
    pub status: String,
    #[serde(default = "default_scan_progress")]
    pub progress: String,
    #[serde(default = "default_scan_file")]
    pub file: String,
    #[serde(default = "default_scan_result")]
    pub result: String,
    #[serde(default = "default_scan_dismiss")]
    pub dismiss: String,
}

impl Default for ScanElements {
    fn default() -> Self {
        Self {
            status: default_scan_status(),
            progress: default_scan_progress(),
            file: default_scan_file(),
            result: default_scan_result(),
            dismiss: default_scan_dismiss(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tick_interval() -> u64 {
    16 // ~60fps
}

fn default_counter_duration() -> u64 {
    2000
}

fn default_threshold() -> f64 {
    0.1
}

fn default_bottom_margin() -> f64 {
    50.0
}

fn default_stagger_step() -> u64 {
    100
}

fn default_hero_step() -> u64 {
    200
}

fn default_random_window() -> u64 {
    500
}

fn default_scroll_throttle() -> u64 {
    10
}

fn default_input_debounce() -> u64 {
    300
}

fn default_scrolled_offset() -> f64 {
    100.0
}

fn default_navbar_element() -> String {
    "navbar".to_string()
}

fn default_upload_duration() -> u64 {
    3000
}

fn default_step_interval() -> u64 {
    200
}

fn default_max_increment() -> f64 {
    10.0
}

fn default_accepted_types() -> Vec<String> {
    ["application/pdf", "image/jpeg", "image/jpg", "image/png"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_min_errors() -> u32 {
    2
}

fn default_max_errors() -> u32 {
    4
}

fn default_min_savings() -> u32 {
    500
}

fn default_max_savings() -> u32 {
    1500
}

fn default_scan_status() -> String {
    "scan-status".to_string()
}

fn default_scan_progress() -> String {
    "scan-progress".to_string()
}

fn default_scan_file() -> String {
    "scan-file".to_string()
}

fn default_scan_result() -> String {
    "scan-result".to_string()
}

fn default_scan_dismiss() -> String {
    "scan-dismiss".to_string()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/healthbridge/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("healthbridge")
            .join("config.toml")
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.reveal.threshold) {
            return Err(crate::Error::Config(format!(
                "reveal.threshold must be within 0.0-1.0, got {}",
                self.reveal.threshold
            )));
        }
        if self.scan.min_errors > self.scan.max_errors {
            return Err(crate::Error::Config(
                "scan.min_errors must not exceed scan.max_errors".to_string(),
            ));
        }
        if self.scan.min_savings > self.scan.max_savings {
            return Err(crate::Error::Config(
                "scan.min_savings must not exceed scan.max_savings".to_string(),
            ));
        }
        if self.scan.progress == ProgressMode::Stepped && self.scan.max_increment_percent <= 0.0 {
            return Err(crate::Error::Config(
                "scan.max_increment_percent must be positive in stepped mode".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.motion.tick_interval_ms, 16);
        assert_eq!(config.motion.counter_duration_ms, 2000);
        assert_eq!(config.motion.easing, EasingKind::Linear);
        assert_eq!(config.reveal.threshold, 0.1);
        assert_eq!(config.reveal.bottom_margin_px, 50.0);
        assert_eq!(config.rate_limit.input_debounce_ms, 300);
        assert_eq!(config.scan.upload_duration_ms, 3000);
        assert_eq!(config.scan.accepted_types.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [motion]
            easing = "ease_out_quartic"
            counter_duration_ms = 1500

            [reveal]
            stagger = "random"
            "#,
        )
        .unwrap();
        assert_eq!(config.motion.easing, EasingKind::EaseOutQuartic);
        assert_eq!(config.motion.counter_duration(), Duration::from_millis(1500));
        assert_eq!(config.motion.tick_interval_ms, 16);
        assert_eq!(
            config.reveal.stagger_policy(),
            StaggerPolicy::random(500)
        );
        assert_eq!(config.scan.elements.status, "scan-status");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.scan.max_savings, 1500);
        assert_eq!(parsed.reveal.hero_policy(), StaggerPolicy::indexed(200));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AppConfig::from_toml("[reveal]\nthreshold = 1.5\n").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));

        let err = AppConfig::from_toml("[scan]\nmin_errors = 5\n").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));

        assert!(AppConfig::from_toml("motion = 3").is_err());
    }

    #[test]
    fn test_zero_tick_interval_falls_back() {
        let config = MotionConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(16));
    }
}
