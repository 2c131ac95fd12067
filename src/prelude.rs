//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits for
//! building actors with flywheel-rt. Import this module to get started
//! quickly:
//!
//! ```rust
//! use flywheel_rt::prelude::*;
//! ```

// Actor & behaviors
pub use crate::actor::{Actor, ActorContext, ExitReason, ExitSignal};
pub use crate::behavior::{Behavior, BehaviorBuilder, BehaviorStack, HandlerOutcome};

// Messaging
pub use crate::message::{AnyMessage, Message, MailboxElement, MessagePriority};

// Mailbox
pub use crate::mailbox::{Mailbox, MailboxCache, MailboxError};

// Scheduler
pub use crate::scheduler::{ResumeOutcome, Resumable};

// Monitoring
pub use crate::monitoring::{
    ActorEvent, ActorEventSink, EventSeverity, InMemoryEventSink, InMemoryMonitor, Monitor, MonitoringConfig,
    MonitoringEvent, NoopEventSink, NoopMonitor,
};

// System
pub use crate::system::{ActorSystem, RuntimeError, SpawnOptions, SystemConfig, SystemError};

// Utilities
pub use crate::util::{ActorAddress, ActorHandle, ActorId, MessageId};
