use crate::event_loop::{EventLoop, TimeoutGuard};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Pausable auto-dismiss countdown for one notification.
///
/// Created paused with the full budget. While paused the budget is frozen;
/// `on_expire` is invoked from the event loop once the budget runs out while
/// running. The owner confirms the expiry with [`DismissTimer::expire`], which
/// succeeds only once.
pub struct DismissTimer {
    total: Duration,
    remaining: Duration,
    running_since: Option<Instant>,
    pending: Option<TimeoutGuard>,
    expired: bool,
    event_loop: Rc<dyn EventLoop>,
    on_expire: Rc<dyn Fn()>,
}

impl DismissTimer {
    pub fn new(total: Duration, event_loop: Rc<dyn EventLoop>, on_expire: Rc<dyn Fn()>) -> Self {
        Self {
            total,
            remaining: total,
            running_since: None,
            pending: None,
            expired: false,
            event_loop,
            on_expire,
        }
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn remaining(&self) -> Duration {
        match self.running_since {
            Some(since) => {
                let spent = self.event_loop.now().saturating_duration_since(since);
                self.remaining.saturating_sub(spent)
            }
            None => self.remaining,
        }
    }

    /// Start or continue counting down. Returns false if already running or expired.
    pub fn resume(&mut self) -> bool {
        if self.expired || self.running_since.is_some() {
            return false;
        }
        self.running_since = Some(self.event_loop.now());
        let on_expire = self.on_expire.clone();
        self.pending = Some(TimeoutGuard::schedule(
            &self.event_loop,
            self.remaining,
            Box::new(move || on_expire()),
        ));
        true
    }

    /// Freeze the countdown. Returns false if it was not running.
    pub fn pause(&mut self) -> bool {
        if self.running_since.is_none() {
            return false;
        }
        self.remaining = self.remaining();
        self.running_since = None;
        self.pending = None;
        true
    }

    /// Mark the budget as spent. True only the first time.
    pub fn expire(&mut self) -> bool {
        if self.expired {
            return false;
        }
        self.expired = true;
        self.remaining = Duration::ZERO;
        self.running_since = None;
        self.pending = None;
        true
    }

    pub fn cancel(&mut self) {
        if self.running_since.is_some() {
            self.remaining = self.remaining();
        }
        self.running_since = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_loop::ManualLoop;
    use std::cell::Cell;

    fn timer(ms: u64) -> (Rc<ManualLoop>, DismissTimer, Rc<Cell<u32>>) {
        let lp = Rc::new(ManualLoop::new());
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        let t = DismissTimer::new(
            Duration::from_millis(ms),
            lp.clone(),
            Rc::new(move || f.set(f.get() + 1)),
        );
        (lp, t, fired)
    }

    #[test]
    fn counts_down_only_while_running() {
        let (lp, mut t, fired) = timer(3000);
        lp.advance_ms(500);
        assert_eq!(t.remaining(), Duration::from_millis(3000));

        assert!(t.resume());
        lp.advance_ms(1000);
        assert_eq!(t.remaining(), Duration::from_millis(2000));

        assert!(t.pause());
        lp.advance_ms(10_000);
        assert_eq!(t.remaining(), Duration::from_millis(2000));
        assert_eq!(fired.get(), 0);

        assert!(t.resume());
        lp.advance_ms(1999);
        assert_eq!(fired.get(), 0);
        lp.advance_ms(1);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let (lp, mut t, fired) = timer(1000);
        assert!(!t.pause());
        assert!(t.resume());
        assert!(!t.resume());
        lp.advance_ms(400);
        assert!(t.pause());
        assert!(!t.pause());
        assert_eq!(t.remaining(), Duration::from_millis(600));
        assert_eq!(lp.pending(), 0);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn expire_succeeds_once() {
        let (lp, mut t, fired) = timer(100);
        t.resume();
        lp.advance_ms(100);
        assert_eq!(fired.get(), 1);
        assert!(t.expire());
        assert!(!t.expire());
        assert!(t.is_expired());
        assert!(!t.resume());
        assert_eq!(t.remaining(), Duration::ZERO);
    }

    #[test]
    fn cancel_drops_pending_timeout() {
        let (lp, mut t, fired) = timer(100);
        t.resume();
        t.cancel();
        lp.advance_ms(1000);
        assert_eq!(fired.get(), 0);
        assert!(!t.is_running());
    }
}
