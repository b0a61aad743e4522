use std::time::Duration;

use super::mailbox::{mailbox, Addr, Envelope, Inbox};

// ============================================================================
// Test Probe
// ============================================================================
//
// A bare mailbox standing in for a collaborator in tests. Hand out `addr()`
// wherever an actor expects an address, then assert on what arrives.
//
// ============================================================================

pub struct Probe<M> {
    addr: Addr<M>,
    inbox: Inbox<M>,
}

impl<M: Send + 'static> Probe<M> {
    pub fn new(name: &str) -> Self {
        let (addr, inbox) = mailbox(name);
        Self { addr, inbox }
    }

    pub fn addr(&self) -> Addr<M> {
        self.addr.clone()
    }

    /// Next message, failing the test if nothing arrives within `within`
    pub async fn expect_msg(&mut self, within: Duration) -> M {
        match tokio::time::timeout(within, self.inbox.recv()).await {
            Ok(Some(Envelope::Message(msg))) => msg,
            Ok(Some(Envelope::Stop)) => panic!("{}: expected a message, got a stop request", self.addr),
            Ok(None) => panic!("{}: mailbox closed", self.addr),
            Err(_) => panic!("{}: no message within {:?}", self.addr, within),
        }
    }

    /// Fail the test if any message arrives within `within`
    pub async fn expect_no_msg(&mut self, within: Duration) {
        if let Ok(Some(envelope)) = tokio::time::timeout(within, self.inbox.recv()).await {
            match envelope {
                Envelope::Message(_) => panic!("{}: unexpected message", self.addr),
                Envelope::Stop => panic!("{}: unexpected stop request", self.addr),
            }
        }
    }

    /// Expect someone to have asked this probe to stop
    pub async fn expect_stop(&mut self, within: Duration) {
        match tokio::time::timeout(within, self.inbox.recv()).await {
            Ok(Some(Envelope::Stop)) => {}
            Ok(Some(Envelope::Message(_))) => panic!("{}: expected a stop request, got a message", self.addr),
            Ok(None) => panic!("{}: mailbox closed", self.addr),
            Err(_) => panic!("{}: no stop request within {:?}", self.addr, within),
        }
    }
}

/// Wait until the actor behind `addr` has terminated
pub async fn expect_terminated<M>(addr: &Addr<M>, within: Duration) {
    if tokio::time::timeout(within, addr.closed()).await.is_err() {
        panic!("{} still running after {:?}", addr, within);
    }
}

/// Poll `condition` until it holds, failing the test after `within`
pub async fn eventually(within: Duration, mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + within;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not met within {:?}", within);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
