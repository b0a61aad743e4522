use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::Instrument;

use super::mailbox::{mailbox, ActorId, Addr, Envelope, Inbox, Recipient};
use super::supervised::{SupervisionEvent, SupervisionStrategy};
use super::timers::Timers;

// ============================================================================
// Actor Runtime
// ============================================================================
//
// Each actor runs as its own tokio task and processes one message at a time
// from its mailbox. Handlers return `Result<(), Self::Fault>`; an `Err` is
// reported to the supervising parent, which answers Restart or Stop.
//
// Lifecycle:
//   factory() ─▶ started ─▶ handle* ─▶ stopped ─▶ Terminated sent to parent
//                  ▲           │
//                  └─Restart───┘ (fault, new instance, same mailbox)
//
// ============================================================================

#[async_trait]
pub trait Actor: Send + Sized + 'static {
    type Message: Send + 'static;
    type Fault: std::error::Error + Send + 'static;

    /// Called on every fresh instance, including after a restart
    async fn started(&mut self, _ctx: &mut Context<Self>) -> Result<(), Self::Fault> {
        Ok(())
    }

    async fn handle(
        &mut self,
        msg: Self::Message,
        ctx: &mut Context<Self>,
    ) -> Result<(), Self::Fault>;

    /// Called once, when the actor stops for good
    async fn stopped(&mut self, _ctx: &mut Context<Self>) {}
}

/// Execution context handed to every hook of an actor
pub struct Context<A: Actor> {
    addr: Addr<A::Message>,
    supervisor: Option<Recipient<SupervisionEvent<A::Fault>>>,
    timers: Timers<A::Message>,
}

impl<A: Actor> Context<A> {
    fn new(
        addr: Addr<A::Message>,
        supervisor: Option<Recipient<SupervisionEvent<A::Fault>>>,
    ) -> Self {
        Self {
            timers: Timers::new(addr.clone()),
            addr,
            supervisor,
        }
    }

    pub fn address(&self) -> Addr<A::Message> {
        self.addr.clone()
    }

    pub fn id(&self) -> ActorId {
        self.addr.id()
    }

    pub fn name(&self) -> &str {
        self.addr.name()
    }

    pub fn timers(&mut self) -> &mut Timers<A::Message> {
        &mut self.timers
    }

    /// Spawn a child whose faults and termination are reported to this actor
    pub fn spawn_child<C, F>(&self, name: &str, factory: F) -> Addr<C::Message>
    where
        C: Actor,
        F: FnMut() -> C + Send + 'static,
        A::Message: From<SupervisionEvent<C::Fault>>,
    {
        start(name, factory, Some(self.addr.recipient()))
    }
}

/// Spawn a top-level actor. Its faults stop it.
pub fn spawn<A, F>(name: &str, factory: F) -> Addr<A::Message>
where
    A: Actor,
    F: FnMut() -> A + Send + 'static,
{
    start(name, factory, None)
}

/// Spawn an actor reporting to an explicit supervisor
#[cfg(test)]
pub(crate) fn spawn_supervised<A, F>(
    name: &str,
    factory: F,
    supervisor: Recipient<SupervisionEvent<A::Fault>>,
) -> Addr<A::Message>
where
    A: Actor,
    F: FnMut() -> A + Send + 'static,
{
    start(name, factory, Some(supervisor))
}

fn start<A, F>(
    name: &str,
    factory: F,
    supervisor: Option<Recipient<SupervisionEvent<A::Fault>>>,
) -> Addr<A::Message>
where
    A: Actor,
    F: FnMut() -> A + Send + 'static,
{
    let (addr, inbox) = mailbox(name);
    let span = tracing::info_span!("actor", name = %name, id = %addr.id());
    let ctx = Context::new(addr.clone(), supervisor);

    tokio::spawn(run(factory, inbox, ctx).instrument(span));
    addr
}

async fn run<A, F>(mut factory: F, mut inbox: Inbox<A::Message>, mut ctx: Context<A>)
where
    A: Actor,
    F: FnMut() -> A + Send + 'static,
{
    let mut actor = factory();
    tracing::debug!("Actor started");
    let mut outcome = actor.started(&mut ctx).await;

    loop {
        if let Err(fault) = outcome {
            let directive = escalate(ctx.supervisor.clone(), ctx.id(), ctx.name().to_string(), fault).await;
            match directive {
                SupervisionStrategy::Restart => {
                    tracing::info!("🔄 Restarting actor");
                    ctx.timers.cancel_all();
                    actor = factory();
                    outcome = actor.started(&mut ctx).await;
                    continue;
                }
                SupervisionStrategy::Stop => break,
            }
        }

        outcome = match inbox.recv().await {
            Some(Envelope::Message(msg)) => actor.handle(msg, &mut ctx).await,
            Some(Envelope::Stop) | None => break,
        };
    }

    inbox.close();
    actor.stopped(&mut ctx).await;
    ctx.timers.cancel_all();
    tracing::debug!("Actor stopped");

    if let Some(supervisor) = ctx.supervisor.take() {
        let _ = supervisor.tell(SupervisionEvent::Terminated {
            child: ctx.id(),
            name: ctx.name().to_string(),
        });
    }
}

/// Hand a fault to the supervisor and wait for its directive
async fn escalate<F: std::error::Error + Send + 'static>(
    supervisor: Option<Recipient<SupervisionEvent<F>>>,
    child: ActorId,
    name: String,
    fault: F,
) -> SupervisionStrategy {
    tracing::warn!(error = %fault, "Actor failed");

    let Some(supervisor) = supervisor else {
        return SupervisionStrategy::Stop;
    };

    let (decision, directive) = oneshot::channel();
    let event = SupervisionEvent::Failed {
        child,
        name,
        fault,
        decision,
    };
    if supervisor.tell(event).is_err() {
        return SupervisionStrategy::Stop;
    }

    directive.await.unwrap_or(SupervisionStrategy::Stop)
}

// ============================================================================
// Unit Tests
// ============================================================================
