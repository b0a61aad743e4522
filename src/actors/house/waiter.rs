use async_trait::async_trait;
use std::sync::Arc;

use crate::actors::core::{Actor, Addr, Context, Router};
use crate::metrics::Metrics;
use crate::models::Coffee;

use super::barista::{BaristaMsg, PrepareRequest, PrepareResult};
use super::coffee_house::{AdmissionRequest, HouseMsg};
use super::faults::Fault;
use super::guest::GuestMsg;

// ============================================================================
// Waiter Actor
// ============================================================================
//
// Relays orders from guests towards the baristas and prepared coffees back
// to the guests. Complaints are tolerated up to `max_complaint_count`; the
// next one raises `Fault::Frustrated`, and the house replaces the waiter.
//
// ============================================================================

pub enum WaiterMsg {
    ServeCoffee { coffee: Coffee, guest: Addr<GuestMsg> },
    CoffeePrepared(PrepareResult),
    Complaint { coffee: Coffee, guest: Addr<GuestMsg> },
}

/// Where the waiter takes a new order
#[derive(Debug, Clone)]
pub enum OrderRoute {
    /// Ask the house to approve the drink first
    Admission(Addr<HouseMsg>),
    /// Go straight to the baristas
    Direct,
}

pub struct Waiter {
    route: OrderRoute,
    baristas: Router<BaristaMsg>,
    max_complaint_count: u32,
    complaint_count: u32,
    metrics: Arc<Metrics>,
}

impl Waiter {
    pub fn new(
        route: OrderRoute,
        baristas: Router<BaristaMsg>,
        max_complaint_count: u32,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            route,
            baristas,
            max_complaint_count,
            complaint_count: 0,
            metrics,
        }
    }

    fn prepare(&self, coffee: Coffee, guest: Addr<GuestMsg>, ctx: &Context<Self>) -> Result<(), Fault> {
        self.baristas.tell(BaristaMsg::PrepareCoffee(PrepareRequest {
            coffee,
            guest,
            reply_to: ctx.address(),
        }))?;
        Ok(())
    }
}

#[async_trait]
impl Actor for Waiter {
    type Message = WaiterMsg;
    type Fault = Fault;

    async fn started(&mut self, _ctx: &mut Context<Self>) -> Result<(), Fault> {
        tracing::debug!(max_complaints = self.max_complaint_count, "Waiter on duty");
        Ok(())
    }

    async fn handle(&mut self, msg: WaiterMsg, ctx: &mut Context<Self>) -> Result<(), Fault> {
        match msg {
            WaiterMsg::ServeCoffee { coffee, guest } => match &self.route {
                OrderRoute::Admission(house) => {
                    house.tell(HouseMsg::ApproveCoffee(AdmissionRequest { coffee, guest }))?;
                }
                OrderRoute::Direct => self.prepare(coffee, guest, ctx)?,
            },
            WaiterMsg::CoffeePrepared(PrepareResult { coffee, guest }) => {
                let label = coffee.to_string();
                self.metrics
                    .coffees_served
                    .with_label_values(&[label.as_str()])
                    .inc();
                // A guest may have left while its coffee was being made
                guest.do_send(GuestMsg::CoffeeServed(coffee));
            }
            WaiterMsg::Complaint { coffee, guest } => {
                self.metrics.complaints.inc();

                if self.complaint_count == self.max_complaint_count {
                    tracing::warn!(guest = %guest, coffee = %coffee, "😤 Too many complaints");
                    return Err(Fault::Frustrated { coffee, guest });
                }

                self.complaint_count += 1;
                tracing::info!(
                    guest = %guest,
                    coffee = %coffee,
                    complaints = self.complaint_count,
                    "Complaint accepted, ordering a fresh coffee"
                );
                self.prepare(coffee, guest, ctx)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
