//! Stop conditions: the shared stop flag and the wall-clock budget.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// How often (in nodes) the clock is actually read. The stop flag itself is
/// checked on every node.
const CLOCK_CHECK_MASK: u64 = 1023;

/// Shared stop state for one search. Cloned by reference into every worker.
pub struct SearchControl {
    stop: Arc<AtomicBool>,
    start: Instant,
    budget: Duration,
}

impl SearchControl {
    /// Start the clock now against `budget`.
    pub fn new(stop: Arc<AtomicBool>, budget: Duration) -> SearchControl {
        SearchControl {
            stop,
            start: Instant::now(),
            budget,
        }
    }

    /// The abort test run at every node.
    ///
    /// Depth-1 iterations never stop: their result is the fallback that
    /// guarantees a legal bestmove no matter how little time was given.
    /// Past depth 1, the search stops when the flag is up or the budget has
    /// run out. Reading the clock is throttled; once it expires the flag is
    /// raised so every later check short-circuits.
    pub fn is_stopping(&self, starting_depth: i32, nodes: u64) -> bool {
        if starting_depth <= 1 {
            return false;
        }
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        if nodes & CLOCK_CHECK_MASK == 0 && self.elapsed() > self.budget {
            self.stop.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    /// Has anyone (GUI or the clock) asked us to stop?
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Raise the stop flag.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::SearchControl;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    fn control(budget_ms: u64) -> SearchControl {
        SearchControl::new(
            Arc::new(AtomicBool::new(false)),
            Duration::from_millis(budget_ms),
        )
    }

    #[test]
    fn depth_one_never_stops() {
        let c = control(0);
        std::thread::sleep(Duration::from_millis(2));
        // Budget long gone, but the first iteration must finish.
        assert!(!c.is_stopping(1, 0));
    }

    #[test]
    fn expired_budget_stops_deeper_iterations() {
        let c = control(0);
        std::thread::sleep(Duration::from_millis(2));
        assert!(c.is_stopping(2, 0));
        // And the flag latched, so off-mask nodes stop too.
        assert!(c.is_stopping(2, 5));
    }

    #[test]
    fn stop_flag_is_honored_immediately() {
        let c = control(10_000);
        assert!(!c.is_stopping(3, 1));
        c.request_stop();
        assert!(c.is_stopping(3, 1));
        assert!(c.stop_requested());
    }

    #[test]
    fn generous_budget_keeps_running() {
        let c = control(60_000);
        assert!(!c.is_stopping(5, 0));
        assert!(!c.is_stopping(5, 1024));
    }
}
