//! The host main loop as seen by the notification engine.
//!
//! Everything runs on one thread: timeouts fire from the loop, never
//! synchronously from `timeout_once`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::{Duration, Instant};

pub type Callback = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeoutId(pub u64);

pub trait EventLoop {
    fn now(&self) -> Instant;

    /// Run `callback` once after `delay`. Must not invoke it before returning.
    fn timeout_once(&self, delay: Duration, callback: Callback) -> TimeoutId;

    /// Cancel a pending timeout. Unknown or already fired ids are ignored.
    fn cancel(&self, id: TimeoutId);
}

/// Pending timeout that is cancelled when dropped.
pub struct TimeoutGuard {
    id: TimeoutId,
    event_loop: Rc<dyn EventLoop>,
}

impl TimeoutGuard {
    pub fn schedule(event_loop: &Rc<dyn EventLoop>, delay: Duration, callback: Callback) -> Self {
        let id = event_loop.timeout_once(delay, callback);
        Self {
            id,
            event_loop: event_loop.clone(),
        }
    }

    pub fn id(&self) -> TimeoutId {
        self.id
    }
}

impl Drop for TimeoutGuard {
    fn drop(&mut self) {
        self.event_loop.cancel(self.id);
    }
}

/// Virtual-time loop for headless hosts and tests.
///
/// Time only moves when [`ManualLoop::advance`] is called; callbacks run in
/// due-time order, ties in scheduling order.
pub struct ManualLoop {
    state: RefCell<ManualState>,
}

struct ManualState {
    origin: Instant,
    elapsed: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Callback>,
    due: HashMap<u64, Duration>,
}

impl Default for ManualLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualLoop {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(ManualState {
                origin: Instant::now(),
                elapsed: Duration::ZERO,
                next_id: 1,
                queue: BTreeMap::new(),
                due: HashMap::new(),
            }),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.state.borrow().elapsed
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Move the clock forward by `by`, running every callback that comes due.
    pub fn advance(&self, by: Duration) {
        let target = self.state.borrow().elapsed + by;
        loop {
            let next = {
                let mut st = self.state.borrow_mut();
                let first = st.queue.keys().next().copied();
                match first {
                    Some((at, id)) if at <= target => {
                        let cb = st.queue.remove(&(at, id));
                        st.due.remove(&id);
                        st.elapsed = at;
                        cb
                    }
                    _ => None,
                }
            };
            match next {
                Some(cb) => cb(),
                None => break,
            }
        }
        self.state.borrow_mut().elapsed = target;
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl EventLoop for ManualLoop {
    fn now(&self) -> Instant {
        let st = self.state.borrow();
        st.origin + st.elapsed
    }

    fn timeout_once(&self, delay: Duration, callback: Callback) -> TimeoutId {
        let mut st = self.state.borrow_mut();
        let id = st.next_id;
        st.next_id += 1;
        let at = st.elapsed + delay;
        st.queue.insert((at, id), callback);
        st.due.insert(id, at);
        TimeoutId(id)
    }

    fn cancel(&self, id: TimeoutId) {
        let mut st = self.state.borrow_mut();
        if let Some(at) = st.due.remove(&id.0) {
            st.queue.remove(&(at, id.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Callback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log2 = log.clone();
        (log, move |tag: &'static str| {
            let log = log2.clone();
            Box::new(move || log.borrow_mut().push(tag)) as Callback
        })
    }

    #[test]
    fn runs_in_due_order() {
        let lp = ManualLoop::new();
        let (log, cb) = recorder();
        lp.timeout_once(Duration::from_millis(30), cb("c"));
        lp.timeout_once(Duration::from_millis(10), cb("a"));
        lp.timeout_once(Duration::from_millis(10), cb("b"));

        lp.advance_ms(9);
        assert!(log.borrow().is_empty());
        lp.advance_ms(1);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        lp.advance_ms(100);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(lp.elapsed(), Duration::from_millis(110));
    }

    #[test]
    fn cancelled_callbacks_never_run() {
        let lp = ManualLoop::new();
        let (log, cb) = recorder();
        let id = lp.timeout_once(Duration::from_millis(5), cb("x"));
        lp.cancel(id);
        lp.cancel(id);
        lp.advance_ms(10);
        assert!(log.borrow().is_empty());
        assert_eq!(lp.pending(), 0);
    }

    #[test]
    fn guard_cancels_on_drop() {
        let lp = Rc::new(ManualLoop::new());
        let dyn_loop: Rc<dyn EventLoop> = lp.clone();
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        let guard = TimeoutGuard::schedule(
            &dyn_loop,
            Duration::from_millis(5),
            Box::new(move || *h.borrow_mut() += 1),
        );
        assert_eq!(lp.pending(), 1);
        drop(guard);
        assert_eq!(lp.pending(), 0);
        lp.advance_ms(10);
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn callbacks_see_their_due_time_and_can_reschedule() {
        let lp = Rc::new(ManualLoop::new());
        let start = lp.now();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (lp2, seen2) = (lp.clone(), seen.clone());
        lp.timeout_once(
            Duration::from_millis(10),
            Box::new(move || {
                seen2.borrow_mut().push(lp2.now());
                let seen3 = seen2.clone();
                let lp3 = lp2.clone();
                lp2.timeout_once(
                    Duration::from_millis(5),
                    Box::new(move || seen3.borrow_mut().push(lp3.now())),
                );
            }),
        );
        lp.advance_ms(20);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0] - start, Duration::from_millis(10));
        assert_eq!(seen[1] - start, Duration::from_millis(15));
    }
}
