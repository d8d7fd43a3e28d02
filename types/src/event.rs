//! Events the service emits for off-chain operators and auditors.

use serde::{Deserialize, Serialize};

use crate::{BlockNumber, Digest, OperatorId, TaskIndex};

/// Observable outcome of a state-changing call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AvsEvent {
    /// A task was created; operators watch for this to start signing.
    TaskCreated {
        index: TaskIndex,
        payload: String,
        block: BlockNumber,
    },
    /// A response to a task was accepted or rejected.
    TaskResponded {
        index: TaskIndex,
        accepted: bool,
        reason: Option<String>,
        response_digest: Option<Digest>,
    },
    /// An operator completed registration.
    OperatorRegistered { operator: OperatorId },
    /// An operator left the operator set.
    OperatorDeregistered { operator: OperatorId },
}

/// Capability to publish [`AvsEvent`]s, injected into the task manager.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &AvsEvent);
}

/// Synchronous fan-out sink.
///
/// Listeners run inline on the emitting thread, inside the caller's
/// transaction; keep them short.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&AvsEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl Fn(&AvsEvent) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: &AvsEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
