use std::collections::HashMap;
use tokio::sync::oneshot;

use super::mailbox::ActorId;

// ============================================================================
// Supervision
// ============================================================================
//
// A parent supervises its children through a table keyed by child id. When
// a child fails it reports the fault to its parent and suspends until the
// parent answers with a directive:
//
//   child ──Failed{fault, decision}──▶ parent
//   child ◀──────── Restart | Stop ─── parent
//
// Restart replaces the actor instance but keeps its mailbox, so the child's
// address and identity survive. Stop ends the child for good, after which the
// parent receives Terminated like for any other exit.
//
// ============================================================================

/// Supervision strategy for a failed actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionStrategy {
    /// Replace the instance with a fresh one, keeping the mailbox
    Restart,
    /// Stop the actor permanently
    Stop,
}

impl SupervisionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupervisionStrategy::Restart => "restart",
            SupervisionStrategy::Stop => "stop",
        }
    }
}

/// Lifecycle notifications a child sends to its parent
#[derive(Debug)]
pub enum SupervisionEvent<F> {
    /// The child raised a fault and waits for a directive
    Failed {
        child: ActorId,
        name: String,
        fault: F,
        decision: oneshot::Sender<SupervisionStrategy>,
    },
    /// The child has stopped and its mailbox is closed
    Terminated { child: ActorId, name: String },
}

/// Maps a fault to a directive for one child
pub type Decider<F> = fn(&F) -> SupervisionStrategy;

struct ChildRecord<F> {
    name: String,
    decider: Decider<F>,
    restarts: u32,
}

/// Parent-side table of supervised children
pub struct Supervisor<F> {
    children: HashMap<ActorId, ChildRecord<F>>,
}

impl<F> Supervisor<F> {
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
        }
    }

    pub fn supervise(&mut self, child: ActorId, name: impl Into<String>, decider: Decider<F>) {
        self.children.insert(
            child,
            ChildRecord {
                name: name.into(),
                decider,
                restarts: 0,
            },
        );
    }

    /// Pick the directive for a failed child. Children we do not know are stopped.
    pub fn decide(&mut self, child: ActorId, fault: &F) -> SupervisionStrategy {
        let Some(record) = self.children.get_mut(&child) else {
            tracing::warn!(child = %child, "Fault reported by unsupervised child");
            return SupervisionStrategy::Stop;
        };

        let directive = (record.decider)(fault);
        if directive == SupervisionStrategy::Restart {
            record.restarts += 1;
        }

        tracing::debug!(
            child = %record.name,
            directive = directive.as_str(),
            restarts = record.restarts,
            "Supervision directive"
        );
        directive
    }

    /// Forget a terminated child
    pub fn release(&mut self, child: ActorId) -> bool {
        self.children.remove(&child).is_some()
    }

}

impl<F> Default for Supervisor<F> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
