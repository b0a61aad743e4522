use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::mailbox::{Addr, MailboxClosed};

// ============================================================================
// Round-Robin Router
// ============================================================================

/// Spreads messages over a fixed pool of identical actors
pub struct Router<M> {
    routees: Arc<[Addr<M>]>,
    next: Arc<AtomicUsize>,
}

impl<M> Router<M> {
    pub fn round_robin(routees: Vec<Addr<M>>) -> Self {
        Self {
            routees: routees.into(),
            next: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn tell(&self, msg: M) -> Result<(), MailboxClosed> {
        if self.routees.is_empty() {
            return Err(MailboxClosed("router".to_string()));
        }

        let slot = self.next.fetch_add(1, Ordering::Relaxed) % self.routees.len();
        self.routees[slot].tell(msg)
    }

    #[cfg(test)]
    pub fn routees(&self) -> &[Addr<M>] {
        &self.routees
    }

    pub fn len(&self) -> usize {
        self.routees.len()
    }

    pub fn stop_all(&self) {
        for routee in self.routees.iter() {
            routee.stop();
        }
    }
}

impl<M> Clone for Router<M> {
    fn clone(&self) -> Self {
        Self {
            routees: self.routees.clone(),
            next: self.next.clone(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::core::probe::Probe;
    use std::time::Duration;

    #[tokio::test]
    async fn test_messages_rotate_over_routees() {
        let mut first = Probe::<u32>::new("first");
        let mut second = Probe::<u32>::new("second");
        let router = Router::round_robin(vec![first.addr(), second.addr()]);

        for n in 0..4 {
            router.tell(n).unwrap();
        }

        let within = Duration::from_millis(100);
        assert_eq!(first.expect_msg(within).await, 0);
        assert_eq!(second.expect_msg(within).await, 1);
        assert_eq!(first.expect_msg(within).await, 2);
        assert_eq!(second.expect_msg(within).await, 3);
    }

    #[tokio::test]
    async fn test_clones_share_the_rotation() {
        let mut first = Probe::<u32>::new("first");
        let mut second = Probe::<u32>::new("second");
        let router = Router::round_robin(vec![first.addr(), second.addr()]);
        let clone = router.clone();

        router.tell(1).unwrap();
        clone.tell(2).unwrap();

        let within = Duration::from_millis(100);
        assert_eq!(first.expect_msg(within).await, 1);
        assert_eq!(second.expect_msg(within).await, 2);
    }

    #[test]
    fn test_empty_router_rejects_messages() {
        let router: Router<u32> = Router::round_robin(Vec::new());
        assert!(router.tell(1).is_err());
        assert_eq!(router.len(), 0);
    }
}
