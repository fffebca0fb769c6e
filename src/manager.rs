//! Notification lifecycle and stacking.
//!
//! The [`Manager`] owns, per zone, the ordered list of live notifications of
//! one parent surface. Items go Created → AnimatingIn → Visible →
//! AnimatingOut → Destroyed; the phase changes after a show or close request
//! arrive later as event-loop callbacks, so every request returns immediately.

use crate::config::Config;
use crate::convenience;
use crate::error::{Result, ToastError};
use crate::event_loop::{EventLoop, TimeoutGuard};
use crate::notification::{
    CloseReason, ClosedEvent, ClosedListener, Lifecycle, Notification, TimerState, ToastId,
    ToastInfo, ToastRequest,
};
use crate::style::{Severity, SeverityStyle, StyleRegistry, Timeout};
use crate::surface::{EventSink, Host, HostEvent, HostId, Motion, Surface, SurfaceSpec};
use crate::timer::DismissTimer;
use crate::zone::{Point, Size, Zone, ZoneLayout};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

/// Orchestrates the notifications shown over one parent surface.
///
/// Cheap to clone; clones share state. Dropping the last clone destroys the
/// remaining surfaces without firing their closed listeners.
///
/// The parent is held weakly: once the application drops it the manager
/// behaves as disposed, even if the host never reported
/// [`HostEvent::Destroyed`].
#[derive(Clone)]
pub struct Manager {
    inner: Rc<RefCell<Inner>>,
}

struct Inner {
    /// Owned by the application; a dropped host orphans the manager
    host: Weak<dyn Host>,
    host_id: HostId,
    parent: Size,
    event_loop: Rc<dyn EventLoop>,
    config: Config,
    layout: ZoneLayout,
    styles: StyleRegistry,
    zones: HashMap<Zone, Vec<ToastId>>,
    items: HashMap<ToastId, Item>,
    next_id: u32,
    disposed: bool,
    self_ref: Weak<RefCell<Inner>>,
}

struct Item {
    toast: Notification,
    lifecycle: Lifecycle,
    /// Target slot; the surface may still be moving toward it
    offset: Point,
    /// Motion last handed to the surface and when it started
    motion: Option<(Motion, Instant)>,
    height: i32,
    hovered: bool,
    timer: Option<DismissTimer>,
    /// Completion of the enter or exit motion in flight
    phase_done: Option<TimeoutGuard>,
    close_reason: Option<CloseReason>,
    listeners: Vec<ClosedListener>,
    surface: Box<dyn Surface>,
}

impl Item {
    fn info(&self) -> ToastInfo {
        let remaining = match (&self.timer, self.toast.timeout) {
            (Some(timer), _) => Some(timer.remaining()),
            (None, Timeout::After(d)) if !self.lifecycle.is_closing() => Some(d),
            (None, Timeout::After(_)) => Some(Duration::ZERO),
            (None, Timeout::Never) => None,
        };
        ToastInfo {
            id: self.toast.id,
            uuid: self.toast.uuid.clone(),
            message: self.toast.message.clone(),
            title: self.toast.title.clone(),
            severity: self.toast.severity,
            zone: self.toast.zone,
            width: self.toast.width,
            height: self.height,
            offset: self.offset,
            lifecycle: self.lifecycle,
            timeout: self.toast.timeout,
            remaining,
            created_at: self.toast.created_at,
        }
    }

    fn closed_event(&self, reason: CloseReason) -> ClosedEvent {
        ClosedEvent {
            id: self.toast.id,
            uuid: self.toast.uuid.clone(),
            severity: self.toast.severity,
            zone: self.toast.zone,
            reason,
        }
    }

    /// Where the surface is drawn at `now`, and its opacity.
    fn pose(&self, now: Instant) -> (Point, f64) {
        match &self.motion {
            Some((motion, started)) => motion.sample_at(now.saturating_duration_since(*started)),
            None => (self.offset, 1.0),
        }
    }

    fn play(&mut self, motion: Motion, now: Instant) {
        self.surface.animate(&motion);
        self.motion = Some((motion, now));
    }

    /// Fire the closed listeners in registration order, then tear down the surface.
    fn finish(mut self, reason: CloseReason) {
        self.lifecycle = Lifecycle::Destroyed;
        self.timer = None;
        self.phase_done = None;
        let event = self.closed_event(reason);
        for listener in std::mem::take(&mut self.listeners) {
            listener(&event);
        }
        self.surface.destroy();
    }
}

/// Run `f` against the manager after `delay`, unless it is gone by then.
fn schedule(
    manager: &Weak<RefCell<Inner>>,
    event_loop: &Rc<dyn EventLoop>,
    delay: Duration,
    f: impl FnOnce(&Manager) + 'static,
) -> TimeoutGuard {
    let weak = manager.clone();
    TimeoutGuard::schedule(
        event_loop,
        delay,
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                f(&Manager { inner });
            }
        }),
    )
}

impl Inner {
    fn is_orphaned(&self) -> bool {
        self.disposed || self.host.strong_count() == 0
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_orphaned() {
            return Err(ToastError::Disposed);
        }
        Ok(())
    }

    /// Target slot of every member of `zone`, in stacking order.
    fn slots(&mut self, zone: Zone) -> Vec<(ToastId, Point)> {
        let mut members = Vec::new();
        let mut sizes = Vec::new();
        for id in self.zones.get(&zone).into_iter().flatten() {
            if let Some(item) = self.items.get_mut(id) {
                item.height = item.surface.size().height;
                members.push(*id);
                sizes.push(Size::new(item.toast.width, item.height));
            }
        }
        let targets = self.layout.slots(zone, self.parent, &sizes);
        members.into_iter().zip(targets).collect()
    }

    /// Move every settled or entering member of `zone` whose slot changed.
    fn reflow(&mut self, zone: Zone) {
        let duration = self.config.reflow_duration();
        let now = self.event_loop.now();
        for (id, target) in self.slots(zone) {
            let Some(item) = self.items.get_mut(&id) else {
                continue;
            };
            if !matches!(item.lifecycle, Lifecycle::AnimatingIn | Lifecycle::Visible(_)) {
                continue;
            }
            if item.offset != target {
                let (from, opacity) = item.pose(now);
                log::debug!("Reflow {id} in {zone}: {from:?} -> {target:?}");
                item.play(Motion::reflow(from, target, duration).with_start_opacity(opacity), now);
                item.offset = target;
            }
        }
    }

    fn animate_in(&mut self, id: ToastId) {
        let Some(zone) = self.zone_of(id) else {
            return;
        };
        let target = self
            .slots(zone)
            .into_iter()
            .find_map(|(member, at)| (member == id).then_some(at))
            .unwrap_or_default();
        let parent = self.parent;
        let duration = self.config.enter_duration();
        let now = self.event_loop.now();
        let Some(item) = self.items.get_mut(&id) else {
            return;
        };
        let start = self.layout.off_screen(item.toast.zone, parent, item.toast.width, target);
        item.surface.move_to(start);
        item.play(Motion::enter(start, target, duration), now);
        item.offset = target;
        item.lifecycle = Lifecycle::AnimatingIn;
        item.phase_done = Some(schedule(&self.self_ref, &self.event_loop, duration, move |m| {
            m.enter_finished(id)
        }));
    }

    fn zone_of(&self, id: ToastId) -> Option<Zone> {
        self.items.get(&id).map(|item| item.toast.zone)
    }

    /// Start the exit motion. False if the item is gone or already leaving.
    fn begin_close(&mut self, id: ToastId, reason: CloseReason) -> bool {
        let parent = self.parent;
        let duration = self.config.exit_duration();
        let now = self.event_loop.now();
        let Some(item) = self.items.get_mut(&id) else {
            return false;
        };
        if item.lifecycle.is_closing() {
            return false;
        }
        log::info!("Close {id}: reason={reason:?}");
        item.timer = None;
        item.phase_done = None;
        item.close_reason = Some(reason);
        item.lifecycle = Lifecycle::AnimatingOut;
        let (from, opacity) = item.pose(now);
        let end = self.layout.off_screen(item.toast.zone, parent, item.toast.width, from);
        item.play(Motion::exit(from, end, duration).with_start_opacity(opacity), now);
        item.phase_done = Some(schedule(&self.self_ref, &self.event_loop, duration, move |m| {
            m.exit_finished(id)
        }));
        true
    }

    fn expire(&mut self, id: ToastId) {
        let Some(timer) = self.items.get_mut(&id).and_then(|item| item.timer.as_mut()) else {
            return;
        };
        if timer.expire() {
            log::info!("Expired {id}");
            self.begin_close(id, CloseReason::Expired);
        }
    }

    fn pointer_enter(&mut self, id: ToastId) {
        let hover_pause = self.config.hover_pause;
        let Some(item) = self.items.get_mut(&id) else {
            return;
        };
        item.hovered = true;
        if !hover_pause || item.lifecycle != Lifecycle::Visible(TimerState::Running) {
            return;
        }
        if let Some(timer) = item.timer.as_mut() {
            timer.pause();
            item.lifecycle = Lifecycle::Visible(TimerState::Paused);
            log::debug!("Paused {id} with {:?} left", timer.remaining());
        }
    }

    fn pointer_leave(&mut self, id: ToastId) {
        let Some(item) = self.items.get_mut(&id) else {
            return;
        };
        item.hovered = false;
        if item.lifecycle != Lifecycle::Visible(TimerState::Paused) {
            return;
        }
        let Some(timer) = item.timer.as_mut() else {
            return;
        };
        if timer.remaining().is_zero() {
            self.expire(id);
        } else {
            timer.resume();
            item.lifecycle = Lifecycle::Visible(TimerState::Running);
            log::debug!("Resumed {id} with {:?} left", timer.remaining());
        }
    }

    fn infos(&self, zone: Option<Zone>) -> Vec<ToastInfo> {
        Zone::ALL
            .into_iter()
            .filter(|z| zone.is_none_or(|wanted| wanted == *z))
            .filter_map(|z| self.zones.get(&z))
            .flatten()
            .filter_map(|id| self.items.get(id))
            .map(Item::info)
            .collect()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for item in self.items.values() {
            item.surface.destroy();
        }
    }
}

impl Manager {
    pub fn new(host: Rc<dyn Host>) -> Self {
        Self::with_config(host, Config::default())
    }

    /// Bind a manager to `host`, subscribing to its resize/destroy/pointer events.
    pub fn with_config(host: Rc<dyn Host>, config: Config) -> Self {
        let config = config.sanitized();
        let mut styles = StyleRegistry::new();
        for (severity, style) in &config.styles {
            styles.set(*severity, style.clone());
        }
        let host_id = host.id();
        let inner = Rc::new_cyclic(|self_ref| {
            RefCell::new(Inner {
                event_loop: host.event_loop(),
                host: Rc::downgrade(&host),
                host_id,
                parent: host.size(),
                layout: config.layout(),
                config,
                styles,
                zones: HashMap::new(),
                items: HashMap::new(),
                next_id: 0,
                disposed: false,
                self_ref: self_ref.clone(),
            })
        });

        let weak = Rc::downgrade(&inner);
        let sink: EventSink = Rc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                Manager { inner }.handle_event(event);
            }
        });
        host.connect_events(sink);
        log::info!("Notification manager bound to parent {host_id:?}");

        Self { inner }
    }

    pub fn host_id(&self) -> HostId {
        self.inner.borrow().host_id
    }

    /// True once the parent was destroyed or dropped.
    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().is_orphaned()
    }

    pub(crate) fn same_as(&self, other: &Manager) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Create a notification and start sliding it into its zone.
    ///
    /// Invalid parameters are rejected before anything is created.
    pub fn show(&self, request: ToastRequest) -> Result<ToastHandle> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        inner.ensure_live()?;
        let host = inner.host.upgrade().ok_or(ToastError::Disposed)?;

        let zone = request.zone.unwrap_or(inner.config.default_zone);
        let width = request.checked_width(inner.config.default_width)?;
        let style = inner.styles.get(request.severity);
        let timeout = request.timeout_override()?.unwrap_or_else(|| style.timeout());

        inner.next_id += 1;
        let id = ToastId(inner.next_id);
        let toast = Notification::new(id, request, zone, width, style, timeout);
        let surface = host.create_surface(&SurfaceSpec {
            id,
            zone,
            width,
            style: &toast.style,
            message: &toast.message,
            title: &toast.title,
            custom: toast.custom.as_ref(),
        });
        log::info!(
            "Show {id}: severity={}, zone={zone}, timeout={:?}, title={:?}",
            toast.severity,
            timeout,
            toast.title
        );

        inner.zones.entry(zone).or_default().push(id);
        inner.items.insert(
            id,
            Item {
                height: surface.size().height,
                toast,
                lifecycle: Lifecycle::Created,
                offset: Point::default(),
                motion: None,
                hovered: false,
                timer: None,
                phase_done: None,
                close_reason: None,
                listeners: Vec::new(),
                surface,
            },
        );
        inner.animate_in(id);
        inner.reflow(zone);

        Ok(ToastHandle {
            id,
            manager: Rc::downgrade(&self.inner),
        })
    }

    /// Shorthand for [`Manager::show`] with just a message and severity.
    pub fn notify(&self, severity: Severity, message: impl Into<String>) -> Result<ToastHandle> {
        self.show(ToastRequest::new(message).severity(severity))
    }

    pub fn close(&self, id: ToastId) -> Result<()> {
        self.close_with(id, CloseReason::Closed)
    }

    fn close_with(&self, id: ToastId, reason: CloseReason) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_live()?;
        inner.begin_close(id, reason);
        Ok(())
    }

    /// Close every live notification, or only those of `zone`.
    pub fn close_all(&self, zone: Option<Zone>) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_live()?;
        let ids: Vec<ToastId> = inner.infos(zone).into_iter().map(|info| info.id).collect();
        let closed = ids
            .into_iter()
            .filter(|id| inner.begin_close(*id, CloseReason::Closed))
            .count();
        log::info!("Close all ({}): {closed} closing", zone.map_or("all zones", Zone::as_str));
        Ok(())
    }

    /// Live notifications in stacking order, optionally restricted to one zone.
    pub fn notifications(&self, zone: Option<Zone>) -> Result<Vec<ToastInfo>> {
        let inner = self.inner.borrow();
        inner.ensure_live()?;
        Ok(inner.infos(zone))
    }

    pub fn get(&self, id: ToastId) -> Result<Option<ToastInfo>> {
        let inner = self.inner.borrow();
        inner.ensure_live()?;
        Ok(inner.items.get(&id).map(Item::info))
    }

    pub fn set_style(&self, severity: Severity, style: SeverityStyle) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_live()?;
        inner.styles.set(severity, style);
        Ok(())
    }

    pub fn get_style(&self, severity: Severity) -> Result<SeverityStyle> {
        let inner = self.inner.borrow();
        inner.ensure_live()?;
        Ok(inner.styles.get(severity))
    }

    /// Restore built-in styles; `None` resets every severity.
    pub fn reset_style(&self, severity: Option<Severity>) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_live()?;
        inner.styles.reset(severity);
        Ok(())
    }

    /// Dispatch an event from the parent surface.
    pub fn handle_event(&self, event: HostEvent) {
        if self.is_disposed() {
            log::debug!("Ignoring {event:?} on disposed manager");
            return;
        }
        match event {
            HostEvent::Destroyed => self.dispose(),
            HostEvent::Resized => {
                let mut inner = self.inner.borrow_mut();
                if let Some(host) = inner.host.upgrade() {
                    inner.parent = host.size();
                }
                for zone in Zone::ALL {
                    inner.reflow(zone);
                }
            }
            HostEvent::PointerEnter(id) => self.inner.borrow_mut().pointer_enter(id),
            HostEvent::PointerLeave(id) => self.inner.borrow_mut().pointer_leave(id),
            HostEvent::CloseClicked(id) => {
                let _ = self.close_with(id, CloseReason::Dismissed);
            }
            HostEvent::ContentResized(id) => {
                let mut inner = self.inner.borrow_mut();
                if let Some(zone) = inner.zone_of(id) {
                    inner.reflow(zone);
                }
            }
        }
    }

    fn enter_finished(&self, id: ToastId) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let Some(item) = inner.items.get_mut(&id) else {
            return;
        };
        if item.lifecycle != Lifecycle::AnimatingIn {
            return;
        }
        item.phase_done = None;
        item.lifecycle = match item.toast.timeout {
            Timeout::Never => Lifecycle::Visible(TimerState::None),
            Timeout::After(budget) => {
                let weak = inner.self_ref.clone();
                let on_expire: Rc<dyn Fn()> = Rc::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.borrow_mut().expire(id);
                    }
                });
                let mut timer = DismissTimer::new(budget, inner.event_loop.clone(), on_expire);
                let paused = item.hovered && inner.config.hover_pause;
                if !paused {
                    timer.resume();
                }
                item.timer = Some(timer);
                Lifecycle::Visible(if paused {
                    TimerState::Paused
                } else {
                    TimerState::Running
                })
            }
        };
        log::debug!("{id} visible: {:?}", item.lifecycle);
    }

    fn exit_finished(&self, id: ToastId) {
        let (item, reason) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            match inner.items.get(&id) {
                Some(item) if item.lifecycle == Lifecycle::AnimatingOut => {}
                _ => return,
            }
            let Some(mut item) = inner.items.remove(&id) else {
                return;
            };
            item.phase_done = None;
            let zone = item.toast.zone;
            if let Some(members) = inner.zones.get_mut(&zone) {
                members.retain(|member| *member != id);
            }
            inner.reflow(zone);
            log::info!(
                "Removed {id} from {zone}, {} left",
                inner.zones.get(&zone).map_or(0, Vec::len)
            );
            let reason = item.close_reason.unwrap_or(CloseReason::Closed);
            (item, reason)
        };
        item.finish(reason);
    }

    /// Parent destroyed: drop everything without animation and refuse further work.
    fn dispose(&self) {
        let items: Vec<Item> = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            if inner.disposed {
                return;
            }
            inner.disposed = true;
            let order: Vec<ToastId> = Zone::ALL
                .into_iter()
                .filter_map(|z| inner.zones.remove(&z))
                .flatten()
                .collect();
            log::info!("Parent {:?} destroyed, dropping {} notifications", inner.host_id, order.len());
            order
                .into_iter()
                .filter_map(|id| inner.items.remove(&id))
                .collect()
        };
        convenience::forget(self);
        for item in items {
            item.finish(CloseReason::ParentDestroyed);
        }
    }

    fn on_closed(&self, id: ToastId, listener: ClosedListener) -> Result<bool> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_live()?;
        match inner.items.get_mut(&id) {
            Some(item) => {
                item.listeners.push(listener);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Caller's reference to one notification. Does not keep the manager alive.
#[derive(Clone)]
pub struct ToastHandle {
    id: ToastId,
    manager: Weak<RefCell<Inner>>,
}

impl std::fmt::Debug for ToastHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastHandle").field("id", &self.id).finish()
    }
}

impl ToastHandle {
    pub fn id(&self) -> ToastId {
        self.id
    }

    fn manager(&self) -> Result<Manager> {
        self.manager
            .upgrade()
            .map(|inner| Manager { inner })
            .ok_or(ToastError::Disposed)
    }

    /// Start closing. Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        self.manager()?.close(self.id)
    }

    /// Register a listener fired once, right before the notification is destroyed.
    ///
    /// Returns false when the notification is already gone.
    pub fn on_closed(&self, listener: impl FnOnce(&ClosedEvent) + 'static) -> Result<bool> {
        self.manager()?.on_closed(self.id, Box::new(listener))
    }

    pub fn info(&self) -> Option<ToastInfo> {
        self.manager().ok()?.get(self.id).ok().flatten()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.info().map_or(Lifecycle::Destroyed, |info| info.lifecycle)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.info().and_then(|info| info.remaining)
    }
}
