// ============================================================================
// Core Actor Abstractions
// ============================================================================
//
// A small tokio actor runtime: mailboxes and addresses, the Actor trait and
// its run loop, keyed timers, round-robin routing and parent supervision.
// Domain actors under `house/` are built only on these types.
//
// ============================================================================

mod actor;
mod mailbox;
mod router;
mod supervised;
mod timers;

#[cfg(test)]
pub(crate) mod probe;

// Re-export core types
pub use actor::*;
pub use mailbox::{ActorId, Addr, MailboxClosed};
pub use router::Router;
pub use supervised::*;
