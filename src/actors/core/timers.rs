use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::mailbox::Addr;

// ============================================================================
// Keyed Timers
// ============================================================================
//
// Single-shot timers that post a message back into the owning actor's
// mailbox. Starting a timer under a key that is already active replaces the
// old one. The actor keeps processing messages while timers are pending.
//
// ============================================================================

pub struct Timers<M> {
    addr: Addr<M>,
    active: HashMap<String, JoinHandle<()>>,
}

impl<M: Send + 'static> Timers<M> {
    pub(crate) fn new(addr: Addr<M>) -> Self {
        Self {
            addr,
            active: HashMap::new(),
        }
    }

    /// Deliver `msg` to the owning actor once `delay` has elapsed
    pub fn start_single_timer(&mut self, key: impl Into<String>, msg: M, delay: Duration) {
        let key = key.into();
        self.cancel(&key);

        let addr = self.addr.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            addr.do_send(msg);
        });
        self.active.insert(key, handle);
    }
}

impl<M> Timers<M> {
    /// Cancel a pending timer. Returns false if no timer was registered under `key`.
    pub fn cancel(&mut self, key: &str) -> bool {
        match self.active.remove(key) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.active.drain() {
            handle.abort();
        }
    }
}

impl<M> Drop for Timers<M> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::core::probe::Probe;

    #[tokio::test]
    async fn test_timer_fires_once() {
        let mut probe = Probe::<&'static str>::new("timer-target");
        let mut timers = Timers::new(probe.addr());

        timers.start_single_timer("tick", "tick", Duration::from_millis(20));
        assert!(!timers.active["tick"].is_finished());

        assert_eq!(probe.expect_msg(Duration::from_secs(1)).await, "tick");
        probe.expect_no_msg(Duration::from_millis(50)).await;
        assert!(timers.active["tick"].is_finished());
    }

    #[tokio::test]
    async fn test_restarting_a_key_replaces_the_timer() {
        let mut probe = Probe::<&'static str>::new("timer-target");
        let mut timers = Timers::new(probe.addr());

        timers.start_single_timer("tick", "first", Duration::from_millis(30));
        timers.start_single_timer("tick", "second", Duration::from_millis(30));

        assert_eq!(probe.expect_msg(Duration::from_secs(1)).await, "second");
        probe.expect_no_msg(Duration::from_millis(60)).await;
    }

    #[tokio::test]
    async fn test_cancelled_timer_never_fires() {
        let mut probe = Probe::<&'static str>::new("timer-target");
        let mut timers = Timers::new(probe.addr());

        timers.start_single_timer("tick", "tick", Duration::from_millis(20));
        assert!(timers.cancel("tick"));
        assert!(!timers.cancel("tick"));

        probe.expect_no_msg(Duration::from_millis(60)).await;
    }
}
