use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::{EasingType, Repeat};
use crate::marquee::{ControllerOptions, LoopConfig, Snap};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub marquee: MarqueeConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Rail contents and loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarqueeConfig {
    /// Text of each rail item, in order
    #[serde(default = "default_items")]
    pub items: Vec<String>,
    /// Speed multiplier (speed * 100 pixels per second)
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Margin after every item, in pixels
    #[serde(default = "default_gap")]
    pub gap: f64,
    /// Gap after the last item before the cycle repeats; defaults to `gap`
    #[serde(default)]
    pub padding_right: Option<f64>,
    /// -1 repeats forever
    #[serde(default)]
    pub repeat: Repeat,
    /// Percent rounding increment, or false to disable
    #[serde(default)]
    pub snap: Snap,
    /// Start paused
    #[serde(default)]
    pub paused: bool,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            items: default_items(),
            speed: default_speed(),
            gap: default_gap(),
            padding_right: None,
            repeat: Repeat::default(),
            snap: Snap::default(),
            paused: false,
        }
    }
}

impl MarqueeConfig {
    /// Effective trailing padding
    pub fn padding_right(&self) -> f64 {
        self.padding_right.unwrap_or(self.gap)
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            speed: self.speed,
            padding_right: self.padding_right(),
            repeat: self.repeat,
            snap: self.snap,
            paused: self.paused,
        }
    }
}

/// Scroll reaction tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// React to scrolling at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Idle rate multiplier
    #[serde(default = "default_base_multiplier")]
    pub base_multiplier: f64,
    /// Velocity divisor for the rate boost
    #[serde(default = "default_velocity_normalizer")]
    pub velocity_normalizer: f64,
    /// Silence before the rate relaxes (ms)
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,
    /// Relaxation length (ms)
    #[serde(default = "default_decay_duration_ms")]
    pub decay_duration_ms: u64,
    /// Relaxation curve
    #[serde(default)]
    pub easing: EasingType,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            base_multiplier: default_base_multiplier(),
            velocity_normalizer: default_velocity_normalizer(),
            quiet_period_ms: default_quiet_period_ms(),
            decay_duration_ms: default_decay_duration_ms(),
            easing: EasingType::default(),
        }
    }
}

impl ControllerConfig {
    pub fn options(&self) -> ControllerOptions {
        ControllerOptions {
            base_multiplier: self.base_multiplier,
            velocity_normalizer: self.velocity_normalizer,
            quiet_period: Duration::from_millis(self.quiet_period_ms),
            decay_duration: Duration::from_millis(self.decay_duration_ms),
            easing: self.easing,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Idle tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frames per second while the rail is moving
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Pixels represented by one terminal column
    #[serde(default = "default_cell_width_px")]
    pub cell_width_px: f64,
    /// Page pixels scrolled per line
    #[serde(default = "default_scroll_step")]
    pub scroll_step: f64,
    /// Height of the scrollable page in pixels
    #[serde(default = "default_page_height")]
    pub page_height: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            cell_width_px: default_cell_width_px(),
            scroll_step: default_scroll_step(),
            page_height: default_page_height(),
        }
    }
}

impl UiConfig {
    /// Frame interval for the configured FPS
    pub fn frame_interval(&self) -> Duration {
        if self.animation_fps == 0 {
            Duration::from_millis(16) // ~60fps fallback
        } else {
            Duration::from_millis(1000 / u64::from(self.animation_fps))
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tactile")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_items() -> Vec<String> {
    [
        "Tactile Poetry",
        "Precision Tools",
        "Work Louder",
        "Make It Yours",
        "Tactile Poetry",
        "Precision Tools",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_speed() -> f64 {
    1.5
}

fn default_gap() -> f64 {
    48.0
}

fn default_true() -> bool {
    true
}

fn default_base_multiplier() -> f64 {
    crate::marquee::controller::BASE_MULTIPLIER
}

fn default_velocity_normalizer() -> f64 {
    crate::marquee::controller::VELOCITY_NORMALIZER
}

fn default_quiet_period_ms() -> u64 {
    200
}

fn default_decay_duration_ms() -> u64 {
    500
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

fn default_cell_width_px() -> f64 {
    16.0
}

fn default_scroll_step() -> f64 {
    24.0
}

fn default_page_height() -> f64 {
    4000.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> crate::Result<()> {
    if condition {
        Ok(())
    } else {
        Err(crate::Error::InvalidConfig(message()))
    }
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and validate a specific file
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> crate::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/tactile/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("tactile")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Log file used while the terminal UI owns the screen
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("tactile.log")
    }

    /// Reject values the loop or controller cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        let m = &self.marquee;
        ensure(m.speed.is_finite() && m.speed > 0.0, || {
            format!("marquee.speed must be positive, got {}", m.speed)
        })?;
        ensure(m.gap.is_finite() && m.gap >= 0.0, || {
            format!("marquee.gap must be non-negative, got {}", m.gap)
        })?;
        let padding = m.padding_right();
        ensure(padding.is_finite() && padding >= 0.0, || {
            format!("marquee.padding_right must be non-negative, got {}", padding)
        })?;
        if let Snap::Increment(step) = m.snap {
            ensure(step.is_finite() && step > 0.0, || {
                format!("marquee.snap must be false or positive, got {}", step)
            })?;
        }

        let c = &self.controller;
        ensure(c.base_multiplier.is_finite() && c.base_multiplier > 0.0, || {
            format!("controller.base_multiplier must be positive, got {}", c.base_multiplier)
        })?;
        ensure(c.velocity_normalizer.is_finite() && c.velocity_normalizer > 0.0, || {
            format!(
                "controller.velocity_normalizer must be positive, got {}",
                c.velocity_normalizer
            )
        })?;

        let ui = &self.ui;
        ensure(ui.cell_width_px.is_finite() && ui.cell_width_px > 0.0, || {
            format!("ui.cell_width_px must be positive, got {}", ui.cell_width_px)
        })?;
        ensure(ui.page_height.is_finite() && ui.page_height > 0.0, || {
            format!("ui.page_height must be positive, got {}", ui.page_height)
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.marquee.items.len(), 6);
        assert_eq!(config.marquee.speed, 1.5);
        assert_eq!(config.marquee.padding_right(), 48.0);
        assert_eq!(config.marquee.repeat, Repeat::Infinite);
        assert_eq!(config.controller.options(), ControllerOptions::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [marquee]
            items = ["One", "Two"]
            speed = 2.0
            snap = false

            [controller]
            decay_duration_ms = 300
            easing = "quintic"
            "#,
        )
        .unwrap();
        assert_eq!(config.marquee.items, vec!["One", "Two"]);
        assert_eq!(config.marquee.snap, Snap::Off);
        assert_eq!(config.marquee.gap, 48.0);
        assert_eq!(config.controller.options().decay_duration, Duration::from_millis(300));
        assert_eq!(config.controller.easing, EasingType::Quintic);
        assert_eq!(config.controller.quiet_period_ms, 200);
        assert_eq!(config.ui.animation_fps, 60);
    }

    #[test]
    fn test_loop_config_mapping() {
        let marquee = MarqueeConfig {
            padding_right: Some(0.0),
            repeat: Repeat::Count(2),
            paused: true,
            ..Default::default()
        };
        let config = marquee.loop_config();
        assert_eq!(config.padding_right, 0.0);
        assert_eq!(config.repeat, Repeat::Count(2));
        assert!(config.paused);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for text in [
            "[marquee]\nspeed = 0.0",
            "[marquee]\ngap = -1.0",
            "[marquee]\nsnap = 0",
            "[controller]\nbase_multiplier = 0.0",
            "[controller]\nvelocity_normalizer = -5.0",
            "[ui]\ncell_width_px = 0.0",
        ] {
            let err = AppConfig::from_toml(text).unwrap_err();
            assert!(matches!(err, crate::Error::InvalidConfig(_)), "{}", text);
        }
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = AppConfig::from_toml("[marquee\nspeed = ").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join(format!("tactile-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let mut config = AppConfig::default();
        config.marquee.items = vec!["Alpha".into()];
        config.marquee.snap = Snap::Increment(0.5);
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.marquee.items, vec!["Alpha"]);
        assert_eq!(loaded.marquee.snap, Snap::Increment(0.5));
        assert_eq!(loaded.marquee.repeat, Repeat::Infinite);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_frame_interval() {
        let mut ui = UiConfig::default();
        assert_eq!(ui.frame_interval(), Duration::from_millis(16));
        ui.animation_fps = 0;
        assert_eq!(ui.frame_interval(), Duration::from_millis(16));
        ui.animation_fps = 30;
        assert_eq!(ui.frame_interval(), Duration::from_millis(33));
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(expand_tilde(Path::new("/tmp/x")), PathBuf::from("/tmp/x"));
    }
}
