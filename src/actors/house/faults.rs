use crate::actors::core::{ActorId, Addr, MailboxClosed};
use crate::models::Coffee;

use super::guest::GuestMsg;

/// Failures raised by coffee house actors and handled by the house's supervision
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    /// A guest drank more than its personal limit
    #[error("too much caffeine: guest {guest} had {drinks} coffees, limit is {limit}")]
    Caffeine { guest: ActorId, drinks: u32, limit: u32 },

    /// The waiter ran out of patience with complaints. Carries the order to redo.
    #[error("waiter frustrated by complaint about {coffee} from {guest}")]
    Frustrated { coffee: Coffee, guest: Addr<GuestMsg> },

    #[error(transparent)]
    Unreachable(#[from] MailboxClosed),
}

impl Fault {
    pub fn kind(&self) -> &'static str {
        match self {
            Fault::Caffeine { .. } => "caffeine",
            Fault::Frustrated { .. } => "frustrated",
            Fault::Unreachable(_) => "unreachable",
        }
    }
}
