use crate::style::{Severity, SeverityStyle};
use crate::zone::{Zone, ZoneLayout};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_margin")]
    pub margin: i32, // px from the parent edges

    #[serde(default = "default_spacing")]
    pub spacing: i32, // px between stacked notifications

    #[serde(default = "default_width")]
    pub default_width: i32,

    #[serde(default)]
    pub default_zone: Zone,

    #[serde(default = "default_enter_ms")]
    pub enter_ms: u64,

    #[serde(default = "default_exit_ms")]
    pub exit_ms: u64,

    #[serde(default = "default_reflow_ms")]
    pub reflow_ms: u64,

    #[serde(default = "default_true")]
    pub hover_pause: bool,

    /// Per-severity overrides applied on top of the built-in styles
    #[serde(default)]
    pub styles: HashMap<Severity, SeverityStyle>,
}

fn default_margin() -> i32 { 15 }
fn default_spacing() -> i32 { 10 }
fn default_width() -> i32 { crate::notification::DEFAULT_WIDTH }
fn default_enter_ms() -> u64 { 300 }
fn default_exit_ms() -> u64 { 250 }
fn default_reflow_ms() -> u64 { 250 }
fn default_true() -> bool { true }

impl Default for Config {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            spacing: default_spacing(),
            default_width: default_width(),
            default_zone: Zone::default(),
            enter_ms: default_enter_ms(),
            exit_ms: default_exit_ms(),
            reflow_ms: default_reflow_ms(),
            hover_pause: true,
            styles: HashMap::new(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        if !config_path.exists() {
            log::info!("No config file found at {:?}, using defaults", config_path);
            return Config::default();
        }
        let contents = match fs::read_to_string(config_path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("Failed to read config {:?}: {e}, using defaults", config_path);
                return Config::default();
            }
        };
        Self::from_yaml_str(&contents).unwrap_or_else(|e| {
            log::warn!("Failed to parse config: {e}, using defaults");
            Config::default()
        })
    }

    /// Parse YAML; empty input gives the defaults. Geometry that would make
    /// stacked notifications overlap is clamped.
    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str::<Config>(contents).map(Config::sanitized)
    }

    /// Clamp negative margin/spacing to 0 and a non-positive width to the default.
    pub fn sanitized(mut self) -> Self {
        if self.margin < 0 {
            log::warn!("Negative margin {} in config, using 0", self.margin);
            self.margin = 0;
        }
        if self.spacing < 0 {
            log::warn!("Negative spacing {} in config, using 0", self.spacing);
            self.spacing = 0;
        }
        if self.default_width <= 0 {
            log::warn!("Invalid default_width {} in config, using {}", self.default_width, default_width());
            self.default_width = default_width();
        }
        self
    }

    pub fn config_dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        p.push("toaststack");
        p
    }

    pub fn config_path() -> PathBuf {
        let mut p = Self::config_dir();
        p.push("config.yaml");
        p
    }

    pub fn layout(&self) -> ZoneLayout {
        ZoneLayout::new(self.margin, self.spacing)
    }

    pub fn enter_duration(&self) -> Duration {
        Duration::from_millis(self.enter_ms)
    }

    pub fn exit_duration(&self) -> Duration {
        Duration::from_millis(self.exit_ms)
    }

    pub fn reflow_duration(&self) -> Duration {
        Duration::from_millis(self.reflow_ms)
    }
}
