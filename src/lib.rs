//! Stacked, self-dismissing toast notifications for an application window.
//!
//! A [`Manager`] is bound to one parent surface (a [`Host`]). It keeps an
//! ordered stack of notifications in each screen corner ([`Zone`]), slides
//! them in, dismisses them after a severity-dependent delay (paused while the
//! pointer is over them) and moves the rest of the stack into the gap when one
//! leaves. Drawing is left to the host toolkit through the [`Surface`] trait;
//! timing runs on the host's [`EventLoop`].

mod config;
mod convenience;
mod error;
mod event_loop;
mod glib_loop;
mod manager;
mod notification;
mod style;
mod surface;
mod timer;
mod zone;

pub use config::Config;
pub use convenience::{
    manager_for, show_critical, show_error, show_info, show_success, show_warning,
};
pub use error::{Result, ToastError};
pub use event_loop::{Callback, EventLoop, ManualLoop, TimeoutGuard, TimeoutId};
pub use glib_loop::GlibLoop;
pub use manager::{Manager, ToastHandle};
pub use notification::{
    CloseReason, ClosedEvent, ClosedListener, DEFAULT_WIDTH, Lifecycle, Notification, TimerState,
    ToastId, ToastInfo, ToastRequest,
};
pub use style::{Severity, SeverityStyle, StyleRegistry, Timeout};
pub use surface::{
    CustomContent, Easing, EventSink, Host, HostEvent, HostId, Motion, MotionKind, Surface,
    SurfaceSpec,
};
pub use timer::DismissTimer;
pub use zone::{Corner, Growth, Point, Size, Zone, ZoneLayout};
