// ============================================================================
// Coffee House Actors
// ============================================================================
//
// The domain actors and the messages they exchange:
//
//   Guest ──ServeCoffee──▶ Waiter ──ApproveCoffee──▶ CoffeeHouse
//     ▲                      ▲                            │
//     │                      │                      PrepareCoffee
//     └────CoffeeServed──────┴──CoffeePrepared──── Barista ◀┘
//
// With the direct topology the waiter sends PrepareCoffee itself.
//
// ============================================================================

mod barista;
mod coffee_house;
mod faults;
mod guest;
mod guest_book;
mod waiter;

pub use coffee_house::{CoffeeHouse, HouseMsg, Status};
#[cfg(test)]
pub use coffee_house::Roster;
