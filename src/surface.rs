//! What the engine needs from the host GUI toolkit.
//!
//! A [`Host`] is the parent window notifications are stacked over; it creates
//! one [`Surface`] per notification and reports [`HostEvent`]s back to the
//! manager through the sink handed to [`Host::connect_events`].

use crate::event_loop::EventLoop;
use crate::notification::ToastId;
use crate::style::SeverityStyle;
use crate::zone::{Point, Size, Zone};
use std::any::Any;
use std::rc::Rc;
use std::time::Duration;

/// Host-provided widget shown instead of the message/title text
pub type CustomContent = Rc<dyn Any>;

/// Identity of a parent surface, stable for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Resized,
    Destroyed,
    PointerEnter(ToastId),
    PointerLeave(ToastId),
    /// The user pressed a notification's close button
    CloseClicked(ToastId),
    /// A notification's content changed height
    ContentResized(ToastId),
}

pub type EventSink = Rc<dyn Fn(HostEvent)>;

pub trait Host {
    fn id(&self) -> HostId;

    fn size(&self) -> Size;

    fn event_loop(&self) -> Rc<dyn EventLoop>;

    /// Register the sink that receives this parent's events.
    fn connect_events(&self, sink: EventSink);

    fn create_surface(&self, spec: &SurfaceSpec<'_>) -> Box<dyn Surface>;
}

/// Everything a host needs to build the visual for one notification.
pub struct SurfaceSpec<'a> {
    pub id: ToastId,
    pub zone: Zone,
    pub width: i32,
    pub style: &'a SeverityStyle,
    pub message: &'a str,
    pub title: &'a str,
    /// When set, message and title are not rendered.
    pub custom: Option<&'a CustomContent>,
}

/// The visual for a single notification.
///
/// Implementations must not call back into the manager synchronously; pointer
/// and resize events go through the [`EventSink`].
pub trait Surface {
    fn size(&self) -> Size;

    fn move_to(&self, at: Point);

    /// Start a motion, replacing any motion still in flight. A replacing
    /// motion begins at the interrupted one's current position and opacity.
    fn animate(&self, motion: &Motion);

    fn destroy(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Enter,
    Exit,
    Reflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    OutCubic,
    InCubic,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::InCubic => t * t * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub kind: MotionKind,
    pub from: Point,
    pub to: Point,
    pub opacity: (f64, f64),
    pub duration: Duration,
    pub easing: Easing,
}

impl Motion {
    pub fn enter(from: Point, to: Point, duration: Duration) -> Self {
        Self {
            kind: MotionKind::Enter,
            from,
            to,
            opacity: (0.0, 1.0),
            duration,
            easing: Easing::OutCubic,
        }
    }

    pub fn exit(from: Point, to: Point, duration: Duration) -> Self {
        Self {
            kind: MotionKind::Exit,
            from,
            to,
            opacity: (1.0, 0.0),
            duration,
            easing: Easing::InCubic,
        }
    }

    pub fn reflow(from: Point, to: Point, duration: Duration) -> Self {
        Self {
            kind: MotionKind::Reflow,
            from,
            to,
            opacity: (1.0, 1.0),
            duration,
            easing: Easing::OutCubic,
        }
    }

    /// Start from `opacity` instead of the kind's default, e.g. when taking
    /// over from a half-finished fade.
    #[must_use]
    pub fn with_start_opacity(mut self, opacity: f64) -> Self {
        self.opacity.0 = opacity;
        self
    }

    /// Position and opacity at `progress` (0.0..=1.0 of the duration).
    pub fn sample(&self, progress: f64) -> (Point, f64) {
        let e = self.easing.apply(progress);
        let lerp = |a: i32, b: i32| a + ((b - a) as f64 * e).round() as i32;
        let at = Point::new(lerp(self.from.x, self.to.x), lerp(self.from.y, self.to.y));
        let (o0, o1) = self.opacity;
        (at, o0 + (o1 - o0) * e)
    }

    /// Like [`Motion::sample`], from time elapsed since the motion started.
    pub fn sample_at(&self, elapsed: Duration) -> (Point, f64) {
        if self.duration.is_zero() {
            return self.sample(1.0);
        }
        self.sample(elapsed.as_secs_f64() / self.duration.as_secs_f64())
    }
}
