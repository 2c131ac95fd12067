//! A synchronous ambient-observability seam for the dispatch loop.
//!
//! [`Monitor`](super::Monitor) is `async_trait`, which fits the rest of this
//! crate's collaborator-facing surfaces but not `Actor::resume` itself --
//! the dispatch loop is deliberately synchronous end to end and must
//! never `.await` to emit an event. `ActorEventSink` is the narrow,
//! non-async counterpart `Actor` calls directly; a sink that wants the
//! richer `Monitor<ActorEvent>` history/snapshot machinery forwards events
//! onto one via a channel rather than awaiting inline.

use chrono::Utc;
use std::collections::HashMap;

use crate::monitoring::types::{ActorEvent, ActorEventKind, MailboxEvent, MailboxEventKind};
use crate::util::ActorId;

/// Receives actor lifecycle events synchronously, from inside `Actor::resume`.
pub trait ActorEventSink: Send + Sync {
    fn record(&self, event: ActorEvent);

    fn spawned(&self, actor_id: ActorId) {
        self.record(ActorEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: ActorEventKind::Spawned,
            metadata: HashMap::new(),
        });
    }

    fn started(&self, actor_id: ActorId) {
        self.record(ActorEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: ActorEventKind::Started,
            metadata: HashMap::new(),
        });
    }

    fn message_received(&self, actor_id: ActorId, message_type: &'static str) {
        self.record(ActorEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: ActorEventKind::MessageReceived {
                message_type: message_type.to_string(),
            },
            metadata: HashMap::new(),
        });
    }

    fn message_processed(&self, actor_id: ActorId, message_type: &'static str, duration_micros: u64) {
        self.record(ActorEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: ActorEventKind::MessageProcessed {
                message_type: message_type.to_string(),
                duration_micros,
            },
            metadata: HashMap::new(),
        });
    }

    fn error_occurred(&self, actor_id: ActorId, error: String) {
        self.record(ActorEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: ActorEventKind::ErrorOccurred { error },
            metadata: HashMap::new(),
        });
    }

    fn stopped(&self, actor_id: ActorId) {
        self.record(ActorEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: ActorEventKind::Stopped,
            metadata: HashMap::new(),
        });
    }

    fn behavior_changed(&self, actor_id: ActorId, behavior_name: String, unbecome: bool) {
        self.record(ActorEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: ActorEventKind::BehaviorChanged { behavior_name, unbecome },
            metadata: HashMap::new(),
        });
    }

    fn resume_transition(&self, actor_id: ActorId, outcome: &'static str) {
        self.record(ActorEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: ActorEventKind::ResumeTransition { outcome },
            metadata: HashMap::new(),
        });
    }

    fn pending_response_timed_out(&self, actor_id: ActorId, mid: String) {
        self.record(ActorEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: ActorEventKind::PendingResponseTimedOut { mid },
            metadata: HashMap::new(),
        });
    }
}

/// Zero-cost default: every event is dropped immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl ActorEventSink for NoopEventSink {
    #[inline(always)]
    fn record(&self, _event: ActorEvent) {}
}

/// A bounded ring-buffer sink for when a system is configured with
/// `enable_metrics`, used in place of the `Monitor<ActorEvent>`/
/// `InMemoryMonitor` pair so `Actor::resume` never has to cross an `.await`
/// boundary just to record a lifecycle event.
#[derive(Debug)]
pub struct InMemoryEventSink {
    capacity: usize,
    events: parking_lot::Mutex<std::collections::VecDeque<ActorEvent>>,
}

impl InMemoryEventSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: parking_lot::Mutex::new(std::collections::VecDeque::new()),
        }
    }

    pub fn recent_events(&self) -> Vec<ActorEvent> {
        self.events.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActorEventSink for InMemoryEventSink {
    fn record(&self, event: ActorEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Receives mailbox-level events synchronously, from inside `Mailbox::enqueue`/
/// `try_pop`. Kept as a separate trait from `ActorEventSink` rather than folded
/// into it: a mailbox outlives no particular actor dispatch and is reachable
/// from sender threads that never touch `Actor::resume` at all.
pub trait MailboxEventSink: Send + Sync {
    fn record(&self, event: MailboxEvent);

    fn enqueued(&self, actor_id: ActorId, queue_size: usize) {
        self.record(MailboxEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: MailboxEventKind::MessageEnqueued { queue_size },
            metadata: HashMap::new(),
        });
    }

    fn dequeued(&self, actor_id: ActorId, queue_size: usize) {
        self.record(MailboxEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: MailboxEventKind::MessageDequeued { queue_size },
            metadata: HashMap::new(),
        });
    }

    fn backpressure_applied(&self, actor_id: ActorId, strategy: &'static str) {
        self.record(MailboxEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: MailboxEventKind::BackpressureApplied {
                strategy: strategy.to_string(),
            },
            metadata: HashMap::new(),
        });
    }

    fn capacity_reached(&self, actor_id: ActorId) {
        self.record(MailboxEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: MailboxEventKind::CapacityReached,
            metadata: HashMap::new(),
        });
    }

    fn message_dropped(&self, actor_id: ActorId, reason: String) {
        self.record(MailboxEvent {
            timestamp: Utc::now(),
            actor_id,
            event_kind: MailboxEventKind::MessageDropped { reason },
            metadata: HashMap::new(),
        });
    }
}

/// Zero-cost default: every mailbox event is dropped immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMailboxEventSink;

impl MailboxEventSink for NoopMailboxEventSink {
    #[inline(always)]
    fn record(&self, _event: MailboxEvent) {}
}

/// Bounded ring-buffer mailbox sink, the `MailboxEvent` counterpart to
/// `InMemoryEventSink`.
#[derive(Debug)]
pub struct InMemoryMailboxEventSink {
    capacity: usize,
    events: parking_lot::Mutex<std::collections::VecDeque<MailboxEvent>>,
}

impl InMemoryMailboxEventSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: parking_lot::Mutex::new(std::collections::VecDeque::new()),
        }
    }

    pub fn recent_events(&self) -> Vec<MailboxEvent> {
        self.events.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MailboxEventSink for InMemoryMailboxEventSink {
    fn record(&self, event: MailboxEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }
}
