// ============================================================================
// Actors Module
// ============================================================================
//
// Structure:
// - core/  - the actor runtime (mailboxes, timers, routing, supervision)
// - house/ - the coffee house actors (CoffeeHouse, Waiter, Barista, Guest)
//
// ============================================================================

mod core;
mod house;

// Re-export only what's needed in the public API
pub use self::core::{Addr, SupervisionStrategy};
pub use self::house::{CoffeeHouse, HouseMsg, Status};

#[cfg(test)]
pub(crate) use self::core::probe;
#[cfg(test)]
pub(crate) use self::house::Roster;
