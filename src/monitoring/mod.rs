//! # Monitoring Module
//!
//! Universal monitoring infrastructure for observing and tracking events across all runtime components.
//!
//! ## Features
//! - **Generic Monitor<E> Trait**: Universal monitoring for any entity type
//! - **Zero-Cost Abstraction**: NoopMonitor compiles away when disabled
//! - **Lock-Free Recording**: Atomic counters for concurrent event tracking
//! - **Type Safety**: MonitoringEvent trait ensures compile-time correctness
//!
//! ## Event Types
//! - `ActorEvent`: Actor lifecycle and message processing
//! - `SystemEvent`: Actor system-level events
//! - `MailboxEvent`: Mailbox operations and backpressure
//!
//! The `async_trait`-based [`Monitor`] is the collaborator-facing surface for
//! anything that can wait on an `.await`; [`sink::ActorEventSink`] is the
//! synchronous counterpart the actor dispatch loop calls directly, since
//! `Actor::resume` never awaits (see `sink`'s module doc).
//!
//! ## Examples
//! ```
//! use flywheel_rt::monitoring::{InMemoryMonitor, MonitoringConfig, ActorEvent};
//!
//! let config = MonitoringConfig::default();
//! let monitor = InMemoryMonitor::<ActorEvent>::new(config);
//! ```

pub mod error;
pub mod in_memory;
pub mod noop;
pub mod sink;
pub mod traits;
pub mod types;

pub use error::MonitoringError;
pub use in_memory::InMemoryMonitor;
pub use noop::NoopMonitor;
pub use sink::{
    ActorEventSink, InMemoryEventSink, InMemoryMailboxEventSink, MailboxEventSink, NoopEventSink,
    NoopMailboxEventSink,
};
pub use traits::{EventSeverity, Monitor, MonitoringEvent};
pub use types::{
    ActorEvent, ActorEventKind, MailboxEvent, MailboxEventKind, MonitoringConfig, MonitoringSnapshot,
    SystemEvent, SystemEventKind,
};
