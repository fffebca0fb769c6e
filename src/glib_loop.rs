use crate::event_loop::{Callback, EventLoop, TimeoutId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// [`EventLoop`] backed by the thread-default GLib main context, for GTK hosts.
///
/// Must be used from the thread that owns that context.
#[derive(Default)]
pub struct GlibLoop {
    sources: Rc<RefCell<HashMap<u64, glib2::SourceId>>>,
    next_id: Cell<u64>,
}

impl GlibLoop {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventLoop for GlibLoop {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn timeout_once(&self, delay: Duration, callback: Callback) -> TimeoutId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        // Forget the source before running; removing a fired source is a GLib critical.
        let sources = self.sources.clone();
        let source_id = glib2::timeout_add_local_once(delay, move || {
            sources.borrow_mut().remove(&id);
            callback();
        });
        self.sources.borrow_mut().insert(id, source_id);
        TimeoutId(id)
    }

    fn cancel(&self, id: TimeoutId) {
        let removed = self.sources.borrow_mut().remove(&id.0);
        if let Some(source_id) = removed {
            source_id.remove();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_pending_and_skips_cancelled() {
        let ctx = glib2::MainContext::new();
        ctx.with_thread_default(|| {
            let lp = GlibLoop::new();
            let fired = Rc::new(RefCell::new(Vec::new()));

            let f = fired.clone();
            let cancelled = lp.timeout_once(
                Duration::from_millis(1),
                Box::new(move || f.borrow_mut().push("cancelled")),
            );
            let f = fired.clone();
            lp.timeout_once(
                Duration::from_millis(20),
                Box::new(move || f.borrow_mut().push("kept")),
            );
            lp.cancel(cancelled);

            while fired.borrow().is_empty() {
                ctx.iteration(true);
            }
            assert_eq!(*fired.borrow(), vec!["kept"]);
            assert!(lp.sources.borrow().is_empty());
        })
        .expect("acquire main context");
    }
}
