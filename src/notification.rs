use crate::error::{Result, ToastError};
use crate::style::{Severity, SeverityStyle, Timeout};
use crate::surface::CustomContent;
use crate::zone::{Point, Zone};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_WIDTH: i32 = 320;

/// Manager-assigned, auto-incrementing notification ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(pub u32);

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a notification went away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Dismiss timer ran out
    Expired,
    /// User hit the close button
    Dismissed,
    /// Closed through a handle or `close_all`
    Closed,
    /// Parent surface destroyed; no exit animation was played
    ParentDestroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Running,
    Paused,
    /// Never auto-dismisses
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    AnimatingIn,
    Visible(TimerState),
    AnimatingOut,
    Destroyed,
}

impl Lifecycle {
    /// Still owns a slot in its zone
    pub fn is_live(self) -> bool {
        !matches!(self, Lifecycle::Destroyed)
    }

    pub fn is_closing(self) -> bool {
        matches!(self, Lifecycle::AnimatingOut | Lifecycle::Destroyed)
    }
}

/// Parameters of a show request. Everything is optional.
///
/// ```ignore
/// manager.show(
///     ToastRequest::new("File saved")
///         .severity(Severity::Success)
///         .zone(Zone::BottomRight)
///         .duration_ms(5000),
/// )?;
/// ```
#[derive(Clone, Default)]
pub struct ToastRequest {
    pub message: String,
    pub title: String,
    pub severity: Severity,
    pub zone: Option<Zone>,
    /// Milliseconds, 0 = never. `None` uses the severity's style.
    pub duration_ms: Option<i64>,
    pub width: Option<i32>,
    pub custom: Option<CustomContent>,
}

impl fmt::Debug for ToastRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastRequest")
            .field("message", &self.message)
            .field("title", &self.title)
            .field("severity", &self.severity)
            .field("zone", &self.zone)
            .field("duration_ms", &self.duration_ms)
            .field("width", &self.width)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

impl ToastRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    #[must_use]
    pub fn duration_ms(mut self, ms: i64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    /// Never auto-dismiss, whatever the severity's default
    #[must_use]
    pub fn persistent(self) -> Self {
        self.duration_ms(0)
    }

    #[must_use]
    pub fn width(mut self, width: i32) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn custom(mut self, content: CustomContent) -> Self {
        self.custom = Some(content);
        self
    }

    /// Explicit timeout override, if any.
    pub(crate) fn timeout_override(&self) -> Result<Option<Timeout>> {
        match self.duration_ms {
            None => Ok(None),
            Some(ms) if ms < 0 => Err(ToastError::InvalidParameter(format!(
                "negative duration {ms}ms"
            ))),
            Some(ms) => Ok(Some(Timeout::from_millis(ms as u64))),
        }
    }

    pub(crate) fn checked_width(&self, default: i32) -> Result<i32> {
        let width = self.width.unwrap_or(default);
        if width <= 0 {
            return Err(ToastError::InvalidParameter(format!("width {width} must be positive")));
        }
        Ok(width)
    }
}

/// Core notification data, fixed at creation
#[derive(Clone)]
pub struct Notification {
    pub id: ToastId,
    /// Unique identifier for logging
    pub uuid: String,
    pub message: String,
    pub title: String,
    pub severity: Severity,
    pub zone: Zone,
    pub width: i32,
    pub custom: Option<CustomContent>,
    /// Style resolved from the registry at show time
    pub style: SeverityStyle,
    /// Explicit override or the style's default
    pub timeout: Timeout,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("id", &self.id)
            .field("uuid", &self.uuid)
            .field("message", &self.message)
            .field("title", &self.title)
            .field("severity", &self.severity)
            .field("zone", &self.zone)
            .field("width", &self.width)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Notification {
    pub(crate) fn new(
        id: ToastId,
        request: ToastRequest,
        zone: Zone,
        width: i32,
        style: SeverityStyle,
        timeout: Timeout,
    ) -> Self {
        Self {
            id,
            uuid: Uuid::new_v4().to_string(),
            message: request.message,
            title: request.title,
            severity: request.severity,
            zone,
            width,
            custom: request.custom,
            style,
            timeout,
            created_at: Utc::now(),
        }
    }

    /// Custom content replaces the text when both are given
    pub fn shows_text(&self) -> bool {
        self.custom.is_none()
    }
}

/// Snapshot of a live notification
#[derive(Debug, Clone)]
pub struct ToastInfo {
    pub id: ToastId,
    pub uuid: String,
    pub message: String,
    pub title: String,
    pub severity: Severity,
    pub zone: Zone,
    pub width: i32,
    pub height: i32,
    pub offset: Point,
    pub lifecycle: Lifecycle,
    pub timeout: Timeout,
    /// Budget left on the dismiss timer; `None` if it never auto-dismisses
    pub remaining: Option<Duration>,
    pub created_at: DateTime<Utc>,
}

/// Payload of the "closed" event
#[derive(Debug, Clone)]
pub struct ClosedEvent {
    pub id: ToastId,
    pub uuid: String,
    pub severity: Severity,
    pub zone: Zone,
    pub reason: CloseReason,
}

pub type ClosedListener = Box<dyn FnOnce(&ClosedEvent)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_duration_has_no_override() {
        let req = ToastRequest::new("hi");
        assert_eq!(req.timeout_override(), Ok(None));
    }

    #[test]
    fn zero_duration_means_never() {
        let req = ToastRequest::new("hi").severity(Severity::Info).persistent();
        assert_eq!(req.timeout_override(), Ok(Some(Timeout::Never)));
    }

    #[test]
    fn negative_values_are_rejected() {
        let req = ToastRequest::new("hi").duration_ms(-1);
        assert!(matches!(req.timeout_override(), Err(ToastError::InvalidParameter(_))));

        let req = ToastRequest::new("hi").width(-320);
        assert!(matches!(req.checked_width(DEFAULT_WIDTH), Err(ToastError::InvalidParameter(_))));
        assert_eq!(ToastRequest::new("hi").checked_width(DEFAULT_WIDTH), Ok(320));
    }

    #[test]
    fn custom_content_hides_text_but_keeps_it() {
        let req = ToastRequest::new("body").title("head").custom(std::rc::Rc::new(42u8));
        let n = Notification::new(
            ToastId(1),
            req,
            Zone::TopRight,
            DEFAULT_WIDTH,
            SeverityStyle::builtin(Severity::Info),
            Timeout::Never,
        );
        assert!(!n.shows_text());
        assert_eq!(n.message, "body");
        assert_eq!(n.title, "head");
        assert_eq!(n.uuid.len(), 36);
    }

    #[test]
    fn lifecycle_predicates() {
        assert!(Lifecycle::AnimatingOut.is_live());
        assert!(!Lifecycle::Destroyed.is_live());
        assert!(Lifecycle::AnimatingOut.is_closing());
        assert!(!Lifecycle::Visible(TimerState::Paused).is_closing());
    }
}
