use crate::error::ToastError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Severity levels, each with a built-in look and dismiss delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Success,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ToastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ToastError::InvalidParameter(format!("unknown severity {s:?}")))
    }
}

/// How long a notification stays up before dismissing itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    Never,
    After(Duration),
}

impl Timeout {
    /// 0 = never auto-dismiss
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Timeout::Never
        } else {
            Timeout::After(Duration::from_millis(ms))
        }
    }

    pub fn duration(self) -> Option<Duration> {
        match self {
            Timeout::Never => None,
            Timeout::After(d) => Some(d),
        }
    }
}

/// Colors and default dismiss delay for one severity level.
///
/// Colors are CSS color strings so they can be handed to CSS-driven hosts as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityStyle {
    pub bg: String,
    pub border: String,
    pub text: String,
    /// Auto-dismiss delay in ms, 0 = never
    #[serde(default)]
    pub duration_ms: u64,
}

impl SeverityStyle {
    pub fn new(
        bg: impl Into<String>,
        border: impl Into<String>,
        text: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            bg: bg.into(),
            border: border.into(),
            text: text.into(),
            duration_ms,
        }
    }

    /// Built-in style for a severity level
    pub fn builtin(severity: Severity) -> Self {
        match severity {
            Severity::Info => Self::new("#3498db", "#2980b9", "#ffffff", 3000),
            Severity::Success => Self::new("#27ae60", "#1e8449", "#ffffff", 3000),
            Severity::Warning => Self::new("#f39c12", "#d68910", "#ffffff", 5000),
            Severity::Error => Self::new("#e74c3c", "#c0392b", "#ffffff", 7000),
            Severity::Critical => Self::new("#8e44ad", "#6c3483", "#ffffff", 0),
        }
    }

    pub fn timeout(&self) -> Timeout {
        Timeout::from_millis(self.duration_ms)
    }

    /// Frame stylesheet for hosts that style surfaces with CSS.
    pub fn to_css(&self, selector: &str) -> String {
        format!(
            "{selector} {{\n  background-color: {};\n  border: 2px solid {};\n  border-radius: 8px;\n  color: {};\n}}\n",
            self.bg, self.border, self.text
        )
    }
}

/// Per-manager mapping from severity to its current style.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: HashMap<Severity, SeverityStyle>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self {
            styles: Severity::ALL
                .into_iter()
                .map(|sev| (sev, SeverityStyle::builtin(sev)))
                .collect(),
        }
    }

    pub fn set(&mut self, severity: Severity, style: SeverityStyle) {
        log::debug!("Style override for {severity}: {style:?}");
        self.styles.insert(severity, style);
    }

    pub fn get(&self, severity: Severity) -> SeverityStyle {
        self.styles
            .get(&severity)
            .cloned()
            .unwrap_or_else(|| SeverityStyle::builtin(severity))
    }

    /// Restore the built-in style for one severity, or for all when `None`.
    pub fn reset(&mut self, severity: Option<Severity>) {
        match severity {
            Some(sev) => {
                self.styles.insert(sev, SeverityStyle::builtin(sev));
            }
            None => *self = Self::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_durations_match_severity() {
        assert_eq!(
            SeverityStyle::builtin(Severity::Info).timeout(),
            Timeout::After(Duration::from_millis(3000))
        );
        assert_eq!(
            SeverityStyle::builtin(Severity::Error).timeout(),
            Timeout::After(Duration::from_millis(7000))
        );
        assert_eq!(SeverityStyle::builtin(Severity::Critical).timeout(), Timeout::Never);
    }

    #[test]
    fn set_and_reset_single_severity() {
        let mut reg = StyleRegistry::new();
        let custom = SeverityStyle::new("#ff0000", "#cc0000", "#ffffff", 0);
        reg.set(Severity::Warning, custom.clone());
        reg.set(Severity::Error, custom.clone());
        assert_eq!(reg.get(Severity::Warning), custom);

        reg.reset(Some(Severity::Warning));
        assert_eq!(reg.get(Severity::Warning), SeverityStyle::builtin(Severity::Warning));
        assert_eq!(reg.get(Severity::Error), custom);
    }

    #[test]
    fn reset_all_restores_builtins() {
        let mut reg = StyleRegistry::new();
        for sev in Severity::ALL {
            reg.set(sev, SeverityStyle::new("#000", "#000", "#000", 1));
        }
        reg.reset(None);
        for sev in Severity::ALL {
            assert_eq!(reg.get(sev), SeverityStyle::builtin(sev));
        }
    }

    #[test]
    fn registries_are_independent() {
        let mut a = StyleRegistry::new();
        let b = StyleRegistry::new();
        a.set(Severity::Info, SeverityStyle::new("#111", "#222", "#333", 10));
        assert_eq!(b.get(Severity::Info), SeverityStyle::builtin(Severity::Info));
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("CRITICAL".parse::<Severity>(), Ok(Severity::Critical));
        assert_eq!(" success ".parse::<Severity>(), Ok(Severity::Success));
        assert!(matches!(
            "fatal".parse::<Severity>(),
            Err(ToastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn css_includes_all_colors() {
        let css = SeverityStyle::builtin(Severity::Success).to_css(".toast");
        assert!(css.starts_with(".toast {"));
        assert!(css.contains("background-color: #27ae60;"));
        assert!(css.contains("border: 2px solid #1e8449;"));
        assert!(css.contains("color: #ffffff;"));
    }
}
