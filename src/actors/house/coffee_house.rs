use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::actors::core::{
    spawn, Actor, Addr, Context, Router, SupervisionEvent, SupervisionStrategy, Supervisor,
};
use crate::config::{Settings, Topology};
use crate::metrics::Metrics;
use crate::models::Coffee;

use super::barista::{Barista, BaristaMsg, PrepareRequest};
use super::faults::Fault;
use super::guest::{Guest, GuestMsg};
use super::guest_book::{Admission, GuestBook};
use super::waiter::{OrderRoute, Waiter, WaiterMsg};

// ============================================================================
// Coffee House Actor - Supervises staff and guests
// ============================================================================
//
// Responsibilities:
// - Hires the baristas and the waiter when it opens
// - Seats guests on request and keeps the guest book
// - Approves each coffee against the house-wide caffeine limit
// - Applies the supervision policy to every child
// - Sends everyone home when it closes
//
// Actor Hierarchy:
//   CoffeeHouse (Supervisor)
//   ├── barista-1 .. barista-N   (round-robin pool)
//   ├── waiter
//   └── guest-1 .. guest-M
//
// Supervision Policy:
//   Fault::Frustrated from the waiter  ──▶ Restart, order redelivered
//   any other fault, any child         ──▶ Stop
//
// ============================================================================

pub enum HouseMsg {
    CreateGuest {
        coffee: Coffee,
        count: u32,
        caffeine_limit: u32,
    },
    ApproveCoffee(AdmissionRequest),
    GetStatus(oneshot::Sender<Status>),
    Supervision(SupervisionEvent<Fault>),
    #[cfg(test)]
    GetRoster(oneshot::Sender<Roster>),
}

impl From<SupervisionEvent<Fault>> for HouseMsg {
    fn from(event: SupervisionEvent<Fault>) -> Self {
        HouseMsg::Supervision(event)
    }
}

/// A waiter asking whether `guest` may have another coffee
#[derive(Debug, Clone)]
pub struct AdmissionRequest {
    pub coffee: Coffee,
    pub guest: Addr<GuestMsg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub guest_count: usize,
}

/// Everyone the house currently supervises
#[cfg(test)]
pub struct Roster {
    pub waiter: Addr<WaiterMsg>,
    pub baristas: Vec<Addr<BaristaMsg>>,
    pub guests: Vec<Addr<GuestMsg>>,
}

struct Staff {
    waiter: Addr<WaiterMsg>,
    baristas: Router<BaristaMsg>,
}

pub struct CoffeeHouse {
    settings: Settings,
    metrics: Arc<Metrics>,
    guest_book: GuestBook,
    supervisor: Supervisor<Fault>,
    staff: Option<Staff>,
    guests_seated: u64,
}

fn stop_on_any_fault(_fault: &Fault) -> SupervisionStrategy {
    SupervisionStrategy::Stop
}

fn restart_when_frustrated(fault: &Fault) -> SupervisionStrategy {
    match fault {
        Fault::Frustrated { .. } => SupervisionStrategy::Restart,
        _ => SupervisionStrategy::Stop,
    }
}

/// `guest-3` -> `guest`, used as a metrics label
fn child_kind(name: &str) -> &str {
    name.split('-').next().unwrap_or(name)
}

impl CoffeeHouse {
    pub fn new(settings: Settings, metrics: Arc<Metrics>) -> Self {
        Self {
            settings,
            metrics,
            guest_book: GuestBook::new(),
            supervisor: Supervisor::new(),
            staff: None,
            guests_seated: 0,
        }
    }

    /// Open a coffee house. It hires its staff before handling any request.
    pub fn open(name: &str, settings: Settings, metrics: Arc<Metrics>) -> Addr<HouseMsg> {
        spawn(name, move || CoffeeHouse::new(settings.clone(), metrics.clone()))
    }

    fn hire_staff(&mut self, ctx: &mut Context<Self>) {
        let mut baristas = Vec::with_capacity(self.settings.barista.pool_size);
        for n in 1..=self.settings.barista.pool_size {
            let name = format!("barista-{}", n);
            let settings = self.settings.barista.clone();
            let metrics = self.metrics.clone();

            let barista = ctx.spawn_child(&name, move || Barista::new(&settings, metrics.clone()));
            self.supervisor.supervise(barista.id(), name, stop_on_any_fault);
            baristas.push(barista);
        }
        let baristas = Router::round_robin(baristas);

        let route = match self.settings.topology {
            Topology::AdmissionControlled => OrderRoute::Admission(ctx.address()),
            Topology::Direct => OrderRoute::Direct,
        };
        let waiter = {
            let baristas = baristas.clone();
            let metrics = self.metrics.clone();
            let max_complaint_count = self.settings.waiter.max_complaint_count;
            ctx.spawn_child("waiter", move || {
                Waiter::new(route.clone(), baristas.clone(), max_complaint_count, metrics.clone())
            })
        };
        self.supervisor.supervise(waiter.id(), "waiter", restart_when_frustrated);

        tracing::info!(
            baristas = baristas.len(),
            topology = %self.settings.topology,
            "✅ Staff hired"
        );
        self.staff = Some(Staff { waiter, baristas });
    }

    fn create_guests(&mut self, coffee: Coffee, count: u32, caffeine_limit: u32, ctx: &mut Context<Self>) {
        let Some(staff) = &self.staff else {
            tracing::warn!("No staff on duty, cannot seat guests");
            return;
        };

        for _ in 0..count {
            self.guests_seated += 1;
            let name = format!("guest-{}", self.guests_seated);
            let waiter = staff.waiter.clone();
            let settings = self.settings.guest.clone();

            let guest = ctx.spawn_child(&name, move || {
                Guest::new(waiter.clone(), coffee, caffeine_limit, &settings)
            });
            self.supervisor.supervise(guest.id(), name, stop_on_any_fault);
            self.guest_book.add(guest);
            self.metrics.record_guest_arrived();
        }

        tracing::info!(count, coffee = %coffee, guests = self.guest_book.len(), "Guests seated");
    }

    fn approve_coffee(&mut self, request: AdmissionRequest) -> Result<(), Fault> {
        let AdmissionRequest { coffee, guest } = request;
        let Some(staff) = &self.staff else {
            tracing::warn!(guest = %guest, "No staff on duty, order dropped");
            return Ok(());
        };

        match self.guest_book.admit(guest.id(), self.settings.caffeine_limit) {
            Admission::Granted(drinks) => {
                self.metrics.record_admission(true);
                tracing::debug!(guest = %guest, coffee = %coffee, drinks, "Coffee approved");
                staff.baristas.tell(BaristaMsg::PrepareCoffee(PrepareRequest {
                    coffee,
                    guest,
                    reply_to: staff.waiter.clone(),
                }))?;
            }
            Admission::Denied(drinks) => {
                self.metrics.record_admission(false);
                tracing::info!(drinks, "Sorry {}, but you have reached your limit.", guest.name());
                guest.do_send(GuestMsg::Denied);
                guest.stop();
            }
            Admission::Unknown => {
                tracing::warn!(guest = %guest, "Order from a guest who already left, ignoring");
            }
        }
        Ok(())
    }

    /// Put the order behind a frustrated waiter's fault back on a barista's counter
    fn redeliver(&self, fault: &Fault) -> Result<(), Fault> {
        let (Fault::Frustrated { coffee, guest }, Some(staff)) = (fault, &self.staff) else {
            return Ok(());
        };

        tracing::info!(guest = %guest, coffee = %coffee, "Redelivering order after waiter restart");
        staff.baristas.tell(BaristaMsg::PrepareCoffee(PrepareRequest {
            coffee: *coffee,
            guest: guest.clone(),
            reply_to: staff.waiter.clone(),
        }))?;
        Ok(())
    }

    fn on_supervision(&mut self, event: SupervisionEvent<Fault>) -> Result<(), Fault> {
        match event {
            SupervisionEvent::Failed {
                child,
                name,
                fault,
                decision,
            } => {
                let directive = self.supervisor.decide(child, &fault);
                self.metrics.record_directive(child_kind(&name), directive);
                tracing::info!(
                    child = %name,
                    fault = fault.kind(),
                    directive = directive.as_str(),
                    "{}", fault
                );

                let redelivery = match directive {
                    SupervisionStrategy::Restart => self.redeliver(&fault),
                    SupervisionStrategy::Stop => Ok(()),
                };
                let _ = decision.send(directive);
                redelivery
            }
            SupervisionEvent::Terminated { child, name } => {
                self.supervisor.release(child);
                if self.guest_book.remove(child).is_some() {
                    self.metrics.record_guest_departed();
                    tracing::info!("Thanks {}, for being our guest!", name);
                } else {
                    tracing::warn!(child = %name, "Staff member terminated");
                }
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Actor for CoffeeHouse {
    type Message = HouseMsg;
    type Fault = Fault;

    async fn started(&mut self, ctx: &mut Context<Self>) -> Result<(), Fault> {
        tracing::info!(caffeine_limit = self.settings.caffeine_limit, "🏠 Coffee house open");
        self.hire_staff(ctx);
        Ok(())
    }

    async fn handle(&mut self, msg: HouseMsg, ctx: &mut Context<Self>) -> Result<(), Fault> {
        match msg {
            HouseMsg::CreateGuest {
                coffee,
                count,
                caffeine_limit,
            } => self.create_guests(coffee, count, caffeine_limit, ctx),
            HouseMsg::ApproveCoffee(request) => self.approve_coffee(request)?,
            HouseMsg::GetStatus(reply) => {
                let _ = reply.send(Status {
                    guest_count: self.guest_book.len(),
                });
            }
            HouseMsg::Supervision(event) => self.on_supervision(event)?,
            #[cfg(test)]
            HouseMsg::GetRoster(reply) => {
                if let Some(staff) = &self.staff {
                    let _ = reply.send(Roster {
                        waiter: staff.waiter.clone(),
                        baristas: staff.baristas.routees().to_vec(),
                        guests: self.guest_book.guests().cloned().collect(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn stopped(&mut self, _ctx: &mut Context<Self>) {
        tracing::info!(guests = self.guest_book.len(), "🛑 Coffee house closing");

        for guest in self.guest_book.guests() {
            guest.stop();
        }
        if let Some(staff) = self.staff.take() {
            staff.waiter.stop();
            staff.baristas.stop_all();
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::core::probe::{eventually, expect_terminated};
    use std::time::Duration;

    const WITHIN: Duration = Duration::from_secs(3);

    fn fast_settings() -> Settings {
        let mut settings = Settings::default();
        settings.guest.finish_coffee_duration = Duration::from_millis(10);
        settings.barista.prepare_coffee_duration = Duration::from_millis(10);
        settings
    }

    fn open(settings: Settings) -> (Addr<HouseMsg>, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new().unwrap());
        let house = CoffeeHouse::open("coffee-house", settings, metrics.clone());
        (house, metrics)
    }

    fn create_guest(house: &Addr<HouseMsg>, count: u32, caffeine_limit: u32) {
        house
            .tell(HouseMsg::CreateGuest {
                coffee: Coffee::Akkaccino,
                count,
                caffeine_limit,
            })
            .unwrap();
    }

    async fn roster(house: &Addr<HouseMsg>) -> Roster {
        let (tx, rx) = oneshot::channel();
        house.tell(HouseMsg::GetRoster(tx)).unwrap();
        tokio::time::timeout(WITHIN, rx).await.unwrap().unwrap()
    }

    async fn status(house: &Addr<HouseMsg>) -> Status {
        let (tx, rx) = oneshot::channel();
        house.tell(HouseMsg::GetStatus(tx)).unwrap();
        tokio::time::timeout(WITHIN, rx).await.unwrap().unwrap()
    }

    #[test]
    fn test_child_kind() {
        assert_eq!(child_kind("guest-12"), "guest");
        assert_eq!(child_kind("barista-1"), "barista");
        assert_eq!(child_kind("waiter"), "waiter");
    }

    #[test]
    fn test_supervision_policy() {
        let fault = Fault::Caffeine {
            guest: crate::actors::core::ActorId::new(),
            drinks: 3,
            limit: 2,
        };
        assert_eq!(stop_on_any_fault(&fault), SupervisionStrategy::Stop);
        assert_eq!(restart_when_frustrated(&fault), SupervisionStrategy::Stop);
    }

    #[tokio::test]
    async fn test_status_counts_seated_guests() {
        let mut settings = Settings::default();
        settings.barista.prepare_coffee_duration = Duration::from_secs(10);
        let (house, metrics) = open(settings);

        assert_eq!(status(&house).await.guest_count, 0);
        create_guest(&house, 3, u32::MAX);
        assert_eq!(status(&house).await.guest_count, 3);
        assert_eq!(metrics.guests_current.get(), 3);

        house.stop();
        expect_terminated(&house, WITHIN).await;
    }

    #[tokio::test]
    async fn test_closing_house_stops_staff_and_guests() {
        let mut settings = Settings::default();
        settings.barista.pool_size = 2;
        settings.barista.prepare_coffee_duration = Duration::from_secs(10);
        let (house, metrics) = open(settings);

        create_guest(&house, 3, u32::MAX);
        let roster = roster(&house).await;
        assert_eq!(roster.baristas.len(), 2);
        assert_eq!(roster.guests.len(), 3);

        house.stop();
        expect_terminated(&house, WITHIN).await;
        expect_terminated(&roster.waiter, WITHIN).await;
        for barista in &roster.baristas {
            expect_terminated(barista, WITHIN).await;
        }
        for guest in &roster.guests {
            expect_terminated(guest, WITHIN).await;
        }
        assert_eq!(metrics.guests_created.get(), 3);
    }

    #[tokio::test]
    async fn test_house_caffeine_limit_grants_twice_then_denies() {
        let mut settings = fast_settings();
        settings.caffeine_limit = 2;
        let (house, metrics) = open(settings);

        create_guest(&house, 1, u32::MAX);
        eventually(WITHIN, || metrics.guests_departed.get() == 1).await;

        assert_eq!(metrics.admissions.with_label_values(&["granted"]).get(), 2);
        assert_eq!(metrics.admissions.with_label_values(&["denied"]).get(), 1);
        assert_eq!(status(&house).await.guest_count, 0);
        assert_eq!(metrics.guests_current.get(), 0);
    }

    #[tokio::test]
    async fn test_guest_past_personal_limit_is_stopped() {
        let (house, metrics) = open(fast_settings());

        create_guest(&house, 2, 1);
        eventually(WITHIN, || metrics.guests_departed.get() == 2).await;

        assert_eq!(
            metrics
                .supervision_directives
                .with_label_values(&["guest", "stop"])
                .get(),
            2
        );
        assert_eq!(metrics.admissions.with_label_values(&["granted"]).get(), 4);
        assert_eq!(status(&house).await.guest_count, 0);
    }

    #[tokio::test]
    async fn test_frustrated_waiter_is_restarted_and_order_redelivered() {
        let mut settings = fast_settings();
        settings.barista.accuracy = 0;
        settings.waiter.max_complaint_count = 1;
        let (house, metrics) = open(settings);

        create_guest(&house, 1, u32::MAX);

        // Two complaints per waiter lifetime; further complaints need the redelivered order
        eventually(WITHIN, || metrics.complaints.get() >= 4).await;
        assert!(
            metrics
                .supervision_directives
                .with_label_values(&["waiter", "restart"])
                .get()
                >= 1
        );
        assert_eq!(status(&house).await.guest_count, 1);

        house.stop();
        expect_terminated(&house, WITHIN).await;
    }

    #[tokio::test]
    async fn test_direct_topology_skips_admission() {
        let mut settings = fast_settings();
        settings.topology = Topology::Direct;
        settings.caffeine_limit = 0;
        let (house, metrics) = open(settings);

        create_guest(&house, 1, 1);
        eventually(WITHIN, || metrics.guests_departed.get() == 1).await;

        assert_eq!(metrics.admissions.with_label_values(&["granted"]).get(), 0);
        assert_eq!(metrics.admissions.with_label_values(&["denied"]).get(), 0);
        assert_eq!(metrics.coffees_served.with_label_values(&["Akkaccino"]).get(), 2);
    }

    #[tokio::test]
    async fn test_pool_of_baristas_share_the_work() {
        let mut settings = fast_settings();
        settings.barista.pool_size = 3;
        settings.caffeine_limit = 1;
        let (house, metrics) = open(settings);

        create_guest(&house, 6, u32::MAX);
        eventually(WITHIN, || metrics.guests_departed.get() == 6).await;

        assert_eq!(metrics.admissions.with_label_values(&["granted"]).get(), 6);
        for barista in ["barista-1", "barista-2", "barista-3"] {
            let prepared = metrics
                .preparation_duration
                .with_label_values(&[barista])
                .get_sample_count();
            assert_eq!(prepared, 2);
        }
    }
}
