use async_trait::async_trait;
use std::time::Duration;

use crate::actors::core::{Actor, Addr, Context};
use crate::config::GuestSettings;
use crate::models::Coffee;

use super::faults::Fault;
use super::waiter::WaiterMsg;

// ============================================================================
// Guest Actor
// ============================================================================
//
// Orders its favourite coffee on arrival, drinks what it is served and
// orders again once the cup is empty. Drinking past the personal caffeine
// limit raises `Fault::Caffeine`, which ends the visit.
//
// ============================================================================

const FINISH_TIMER: &str = "coffee-finished";

pub enum GuestMsg {
    CoffeeServed(Coffee),
    CoffeeFinished,
    /// The house refused another drink
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestState {
    AwaitingDrink,
    Drinking,
}

pub struct Guest {
    waiter: Addr<WaiterMsg>,
    favorite_coffee: Coffee,
    finish_coffee_duration: Duration,
    caffeine_limit: u32,
    complain_on_wrong_coffee: bool,
    coffee_count: u32,
    state: GuestState,
}

impl Guest {
    pub fn new(
        waiter: Addr<WaiterMsg>,
        favorite_coffee: Coffee,
        caffeine_limit: u32,
        settings: &GuestSettings,
    ) -> Self {
        Self {
            waiter,
            favorite_coffee,
            finish_coffee_duration: settings.finish_coffee_duration,
            caffeine_limit,
            complain_on_wrong_coffee: settings.complain_on_wrong_coffee,
            coffee_count: 0,
            state: GuestState::AwaitingDrink,
        }
    }

    fn order_coffee(&mut self, ctx: &Context<Self>) -> Result<(), Fault> {
        self.waiter.tell(WaiterMsg::ServeCoffee {
            coffee: self.favorite_coffee,
            guest: ctx.address(),
        })?;
        self.state = GuestState::AwaitingDrink;
        Ok(())
    }
}

#[async_trait]
impl Actor for Guest {
    type Message = GuestMsg;
    type Fault = Fault;

    async fn started(&mut self, ctx: &mut Context<Self>) -> Result<(), Fault> {
        tracing::debug!(favorite = %self.favorite_coffee, limit = self.caffeine_limit, "Guest arrived");
        self.order_coffee(ctx)
    }

    async fn handle(&mut self, msg: GuestMsg, ctx: &mut Context<Self>) -> Result<(), Fault> {
        match msg {
            GuestMsg::CoffeeServed(coffee) if coffee != self.favorite_coffee && self.complain_on_wrong_coffee => {
                tracing::info!(expected = %self.favorite_coffee, served = %coffee, "Expected a {}, but got a {}!", self.favorite_coffee, coffee);
                self.waiter.tell(WaiterMsg::Complaint {
                    coffee: self.favorite_coffee,
                    guest: ctx.address(),
                })?;
            }
            GuestMsg::CoffeeServed(coffee) => {
                self.coffee_count += 1;
                tracing::info!("Enjoying my {} yummy {}!", self.coffee_count, coffee);
                ctx.timers().start_single_timer(
                    FINISH_TIMER,
                    GuestMsg::CoffeeFinished,
                    self.finish_coffee_duration,
                );
                self.state = GuestState::Drinking;
            }
            GuestMsg::CoffeeFinished => {
                if self.state == GuestState::AwaitingDrink {
                    tracing::warn!("Finished a coffee that was never served, ignoring");
                    return Ok(());
                }
                if self.coffee_count > self.caffeine_limit {
                    return Err(Fault::Caffeine {
                        guest: ctx.id(),
                        drinks: self.coffee_count,
                        limit: self.caffeine_limit,
                    });
                }
                self.order_coffee(ctx)?;
            }
            GuestMsg::Denied => {
                tracing::info!(drinks = self.coffee_count, "No more coffee for me");
            }
        }
        Ok(())
    }

    async fn stopped(&mut self, _ctx: &mut Context<Self>) {
        tracing::info!(drinks = self.coffee_count, "Goodbye!");
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
