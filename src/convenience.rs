//! One-call helpers that show a notification over a parent without the
//! caller holding a [`Manager`].
//!
//! Each parent gets one implicit manager, created on first use and reused
//! until the parent is destroyed. The cache does not keep parents alive; a
//! manager whose parent was dropped is released on the next lookup.

use crate::error::Result;
use crate::manager::{Manager, ToastHandle};
use crate::notification::ToastRequest;
use crate::style::Severity;
use crate::surface::{Host, HostId};
use crate::zone::Zone;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

thread_local! {
    static MANAGERS: RefCell<HashMap<HostId, Manager>> = RefCell::new(HashMap::new());
}

/// The implicit manager for `host`, creating it if needed.
pub fn manager_for(host: &Rc<dyn Host>) -> Manager {
    prune();
    let id = host.id();
    let cached = MANAGERS.with(|m| m.borrow().get(&id).cloned());
    if let Some(manager) = cached.filter(|m| !m.is_disposed()) {
        return manager;
    }
    log::debug!("Creating implicit manager for {id:?}");
    let manager = Manager::new(host.clone());
    MANAGERS.with(|m| m.borrow_mut().insert(id, manager.clone()));
    manager
}

/// Release managers whose parent was dropped without reporting destruction.
fn prune() {
    let stale: Vec<Manager> = MANAGERS.with(|m| {
        let mut cache = m.borrow_mut();
        let ids: Vec<HostId> = cache
            .iter()
            .filter(|(_, manager)| manager.is_disposed())
            .map(|(id, _)| *id)
            .collect();
        ids.iter().filter_map(|id| cache.remove(id)).collect()
    });
    if !stale.is_empty() {
        log::debug!("Releasing {} implicit managers of dropped parents", stale.len());
    }
    // surfaces are destroyed here, outside the cache borrow
    drop(stale);
}

/// Drop the cached entry if it is `manager`.
pub(crate) fn forget(manager: &Manager) {
    let removed = MANAGERS.with(|m| {
        let mut cache = m.borrow_mut();
        let id = manager.host_id();
        match cache.get(&id) {
            Some(cached) if cached.same_as(manager) => cache.remove(&id),
            _ => None,
        }
    });
    drop(removed);
}

fn show(
    host: &Rc<dyn Host>,
    severity: Severity,
    message: &str,
    title: &str,
    zone: Zone,
    duration_ms: Option<i64>,
) -> Result<ToastHandle> {
    let mut request = ToastRequest::new(message)
        .title(title)
        .severity(severity)
        .zone(zone);
    request.duration_ms = duration_ms;
    manager_for(host).show(request)
}

pub fn show_info(
    host: &Rc<dyn Host>,
    message: &str,
    title: &str,
    zone: Zone,
    duration_ms: Option<i64>,
) -> Result<ToastHandle> {
    show(host, Severity::Info, message, title, zone, duration_ms)
}

pub fn show_success(
    host: &Rc<dyn Host>,
    message: &str,
    title: &str,
    zone: Zone,
    duration_ms: Option<i64>,
) -> Result<ToastHandle> {
    show(host, Severity::Success, message, title, zone, duration_ms)
}

pub fn show_warning(
    host: &Rc<dyn Host>,
    message: &str,
    title: &str,
    zone: Zone,
    duration_ms: Option<i64>,
) -> Result<ToastHandle> {
    show(host, Severity::Warning, message, title, zone, duration_ms)
}

pub fn show_error(
    host: &Rc<dyn Host>,
    message: &str,
    title: &str,
    zone: Zone,
    duration_ms: Option<i64>,
) -> Result<ToastHandle> {
    show(host, Severity::Error, message, title, zone, duration_ms)
}

pub fn show_critical(
    host: &Rc<dyn Host>,
    message: &str,
    title: &str,
    zone: Zone,
    duration_ms: Option<i64>,
) -> Result<ToastHandle> {
    show(host, Severity::Critical, message, title, zone, duration_ms)
}
