use async_trait::async_trait;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::actors::core::{Actor, Addr, Context};
use crate::config::BaristaSettings;
use crate::metrics::Metrics;
use crate::models::Coffee;

use super::faults::Fault;
use super::guest::GuestMsg;
use super::waiter::WaiterMsg;

// ============================================================================
// Barista Actor
// ============================================================================
//
// Prepares one coffee at a time. An order arriving while busy is stashed and
// picked up, oldest first, as soon as the current coffee is ready:
//
//   Ready ──PrepareCoffee──▶ Busy ──timer "coffee-prepared"──▶ Ready
//                              │                                 │
//                              └─PrepareCoffee: stash     unstash one
//
// Accuracy decides, per coffee, whether the guest gets what was ordered or a
// substitute.
//
// ============================================================================

const PREPARATION_TIMER: &str = "coffee-prepared";

pub enum BaristaMsg {
    PrepareCoffee(PrepareRequest),
    CoffeePrepared,
}

/// An order for the barista. The result goes to `reply_to` and names `guest`.
#[derive(Debug, Clone)]
pub struct PrepareRequest {
    pub coffee: Coffee,
    pub guest: Addr<GuestMsg>,
    pub reply_to: Addr<WaiterMsg>,
}

#[derive(Debug, Clone)]
pub struct PrepareResult {
    pub coffee: Coffee,
    pub guest: Addr<GuestMsg>,
}

enum BaristaState {
    Ready,
    Busy { request: PrepareRequest, since: Instant },
}

pub struct Barista {
    prepare_coffee_duration: Duration,
    accuracy: u8,
    state: BaristaState,
    stash: VecDeque<PrepareRequest>,
    metrics: Arc<Metrics>,
}

impl Barista {
    pub fn new(settings: &BaristaSettings, metrics: Arc<Metrics>) -> Self {
        Self {
            prepare_coffee_duration: settings.prepare_coffee_duration,
            accuracy: settings.accuracy,
            state: BaristaState::Ready,
            stash: VecDeque::new(),
            metrics,
        }
    }

    fn start_preparing(&mut self, request: PrepareRequest, ctx: &mut Context<Self>) {
        tracing::debug!(coffee = %request.coffee, guest = %request.guest, "Preparing coffee");
        ctx.timers().start_single_timer(
            PREPARATION_TIMER,
            BaristaMsg::CoffeePrepared,
            self.prepare_coffee_duration,
        );
        self.state = BaristaState::Busy {
            request,
            since: Instant::now(),
        };
    }

    /// Orders accepted but not yet handed over, the one in progress included
    fn pending(&self) -> impl Iterator<Item = &PrepareRequest> {
        let in_progress = match &self.state {
            BaristaState::Busy { request, .. } => Some(request),
            BaristaState::Ready => None,
        };
        in_progress.into_iter().chain(self.stash.iter())
    }

    fn update_stash_gauge(&self, ctx: &Context<Self>) {
        self.metrics
            .barista_stash_depth
            .with_label_values(&[ctx.name()])
            .set(self.stash.len() as i64);
    }
}

/// The coffee handed out for `requested`: the right one with probability `accuracy`%
pub fn pick_coffee<R: Rng>(requested: Coffee, accuracy: u8, rng: &mut R) -> Coffee {
    if rng.gen_range(0..100u32) < u32::from(accuracy) {
        requested
    } else {
        requested.substitute()
    }
}

#[async_trait]
impl Actor for Barista {
    type Message = BaristaMsg;
    type Fault = Fault;

    async fn started(&mut self, ctx: &mut Context<Self>) -> Result<(), Fault> {
        tracing::info!(accuracy = self.accuracy, "☕ Barista ready");
        self.update_stash_gauge(ctx);
        Ok(())
    }

    async fn handle(&mut self, msg: BaristaMsg, ctx: &mut Context<Self>) -> Result<(), Fault> {
        match msg {
            BaristaMsg::PrepareCoffee(request) => {
                if matches!(self.state, BaristaState::Ready) {
                    self.start_preparing(request, ctx);
                } else {
                    tracing::debug!(coffee = %request.coffee, stashed = self.stash.len() + 1, "Busy, stashing order");
                    self.stash.push_back(request);
                    self.update_stash_gauge(ctx);
                }
            }
            BaristaMsg::CoffeePrepared => {
                let BaristaState::Busy { request, since } =
                    std::mem::replace(&mut self.state, BaristaState::Ready)
                else {
                    tracing::warn!("Preparation finished while idle, ignoring");
                    return Ok(());
                };

                let coffee = pick_coffee(request.coffee, self.accuracy, &mut rand::thread_rng());
                self.metrics.record_preparation(
                    ctx.name(),
                    request.coffee,
                    coffee,
                    since.elapsed().as_secs_f64(),
                );
                if coffee != request.coffee {
                    tracing::debug!(ordered = %request.coffee, made = %coffee, "Got the order wrong");
                }

                let delivered = request.reply_to.tell(WaiterMsg::CoffeePrepared(PrepareResult {
                    coffee,
                    guest: request.guest,
                }));

                // The next order starts even if this one could not be handed over
                if let Some(next) = self.stash.pop_front() {
                    self.start_preparing(next, ctx);
                    self.update_stash_gauge(ctx);
                }

                if let Err(closed) = delivered {
                    tracing::warn!(
                        waiter = %closed.0,
                        coffee = %coffee,
                        pending = self.pending().count(),
                        "Could not hand over coffee"
                    );
                    return Err(closed.into());
                }
            }
        }
        Ok(())
    }

    async fn stopped(&mut self, ctx: &mut Context<Self>) {
        let dropped = self.pending().count();
        if dropped > 0 {
            for request in self.pending() {
                tracing::debug!(coffee = %request.coffee, guest = %request.guest, "Order dropped");
            }
            tracing::warn!(dropped, "Barista stopped with orders pending");
        }

        self.stash.clear();
        self.update_stash_gauge(ctx);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
