use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

// ============================================================================
// Mailboxes and Addresses
// ============================================================================
//
// Every actor owns exactly one unbounded mailbox. The receiving half (Inbox)
// lives inside the actor task; the sending half is wrapped in an Addr that
// can be cloned and handed to anyone who needs to talk to the actor.
//
// The mailbox outlives individual actor instances: a restarted actor keeps
// reading from the same Inbox, so every Addr handed out before the restart
// still reaches it.
//
// ============================================================================

/// Stable identity of an actor, preserved across restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0.as_fields().0)
    }
}

/// What actually travels through a mailbox
pub(crate) enum Envelope<M> {
    Message(M),
    Stop,
}

/// The target mailbox no longer accepts messages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("mailbox of `{0}` is closed")]
pub struct MailboxClosed(pub String);

/// Handle used to send messages of type `M` to an actor
pub struct Addr<M> {
    id: ActorId,
    name: Arc<str>,
    tx: mpsc::UnboundedSender<Envelope<M>>,
}

impl<M> Addr<M> {
    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue a message, failing if the actor has terminated
    pub fn tell(&self, msg: M) -> Result<(), MailboxClosed> {
        self.tx
            .send(Envelope::Message(msg))
            .map_err(|_| MailboxClosed(self.name.to_string()))
    }

    /// Fire and forget - a message to a terminated actor becomes a dead letter
    pub fn do_send(&self, msg: M) {
        if self.tell(msg).is_err() {
            tracing::debug!(actor = %self.name, id = %self.id, "Dead letter");
        }
    }

    /// Ask the actor to stop after the messages already queued ahead of this request
    pub fn stop(&self) {
        let _ = self.tx.send(Envelope::Stop);
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the actor has terminated
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    /// Type-erased handle accepting any message convertible into `M`
    pub fn recipient<T>(&self) -> Recipient<T>
    where
        T: 'static,
        M: From<T> + Send + 'static,
    {
        let tx = self.tx.clone();
        let name = self.name.clone();

        Recipient {
            id: self.id,
            name: self.name.clone(),
            deliver: Arc::new(move |msg: T| {
                tx.send(Envelope::Message(M::from(msg)))
                    .map_err(|_| MailboxClosed(name.to_string()))
            }),
        }
    }
}

impl<M> Clone for Addr<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<M> PartialEq for Addr<M> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<M> Eq for Addr<M> {}

impl<M> Hash for Addr<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<M> fmt::Debug for Addr<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addr({}#{})", self.name, self.id)
    }
}

impl<M> fmt::Display for Addr<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// Handle that only accepts one message type, whatever the actor behind it
pub struct Recipient<T> {
    id: ActorId,
    name: Arc<str>,
    deliver: Arc<dyn Fn(T) -> Result<(), MailboxClosed> + Send + Sync>,
}

impl<T> Recipient<T> {
    pub fn tell(&self, msg: T) -> Result<(), MailboxClosed> {
        (self.deliver)(msg)
    }
}

impl<T> Clone for Recipient<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            deliver: self.deliver.clone(),
        }
    }
}

impl<T> fmt::Debug for Recipient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Recipient({}#{})", self.name, self.id)
    }
}

/// Receiving half of a mailbox, owned by the actor task
pub(crate) struct Inbox<M> {
    rx: mpsc::UnboundedReceiver<Envelope<M>>,
}

impl<M> Inbox<M> {
    pub(crate) async fn recv(&mut self) -> Option<Envelope<M>> {
        self.rx.recv().await
    }

    pub(crate) fn close(&mut self) {
        self.rx.close();
    }
}

/// Create a fresh mailbox for an actor called `name`
pub(crate) fn mailbox<M>(name: &str) -> (Addr<M>, Inbox<M>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let addr = Addr {
        id: ActorId::new(),
        name: Arc::from(name),
        tx,
    };
    (addr, Inbox { rx })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Wide {
        Number(u32),
    }

    impl From<u32> for Wide {
        fn from(n: u32) -> Self {
            Wide::Number(n)
        }
    }

    #[tokio::test]
    async fn test_messages_arrive_in_send_order() {
        let (addr, mut inbox) = mailbox::<u32>("counter");
        for n in 0..5 {
            addr.tell(n).unwrap();
        }

        for expected in 0..5 {
            match inbox.recv().await {
                Some(Envelope::Message(n)) => assert_eq!(n, expected),
                _ => panic!("expected message {}", expected),
            }
        }
    }

    #[tokio::test]
    async fn test_tell_fails_once_inbox_is_closed() {
        let (addr, mut inbox) = mailbox::<u32>("closed");
        inbox.close();

        assert!(addr.is_closed());
        assert_eq!(addr.tell(1), Err(MailboxClosed("closed".to_string())));
    }

    #[tokio::test]
    async fn test_recipient_converts_into_actor_message() {
        let (addr, mut inbox) = mailbox::<Wide>("wide");
        let recipient: Recipient<u32> = addr.recipient();

        assert_eq!(format!("{:?}", recipient), format!("Recipient(wide#{})", addr.id()));
        recipient.tell(7).unwrap();

        match inbox.recv().await {
            Some(Envelope::Message(msg)) => assert_eq!(msg, Wide::Number(7)),
            _ => panic!("expected converted message"),
        }
    }

    #[test]
    fn test_addr_identity_survives_clone() {
        let (addr, _inbox) = mailbox::<u32>("guest");
        let (other, _other_inbox) = mailbox::<u32>("guest");

        assert_eq!(addr.clone(), addr);
        assert_ne!(addr, other);
        assert_eq!(addr.name(), "guest");
    }
}
