//! # flywheel-rt -- a CAF-inspired actor runtime core
//!
//! Mailboxes, `become`/`unbecome` behaviors, request/response multiplexing,
//! and a work-stealing scheduler, built the way C++ Actor Framework's
//! `local_actor` does it: a single synchronous `resume` loop per actor that
//! classifies each mailbox element before any user behavior sees it.
//!
//! # Quick Start
//!
//! ```rust
//! use flywheel_rt::prelude::*;
//!
//! #[derive(Debug)]
//! struct Add {
//!     x: i64,
//!     y: i64,
//! }
//! impl Message for Add {
//!     const MESSAGE_TYPE: &'static str = "add";
//! }
//!
//! #[derive(Debug)]
//! struct Sum(i64);
//! impl Message for Sum {
//!     const MESSAGE_TYPE: &'static str = "sum";
//! }
//!
//! let adder = Behavior::builder("adder")
//!     .on::<Add, _>(|ctx, msg| {
//!         let _ = ctx.reply(Sum(msg.x + msg.y));
//!         HandlerOutcome::Handled
//!     })
//!     .build();
//!
//! let system = ActorSystem::new(SystemConfig::default());
//! let _handle = system.spawn(adder, SpawnOptions::named("adder")).unwrap();
//! system.force_shutdown();
//! ```
//!
//! # Module Organization
//!
//! - [`actor`] -- `Actor`, the classify-dispatch loop, pending responses.
//! - [`behavior`] -- `Behavior`/`BehaviorStack`, the `become`/`unbecome` model.
//! - [`mailbox`] -- the priority-partitioned queue and actor-local skip cache.
//! - [`message`] -- `Message`/`AnyMessage`, `MailboxElement`, system tags.
//! - [`monitoring`] -- `Monitor<E>` and the synchronous `ActorEventSink`.
//! - [`scheduler`] -- `Resumable`, the work-stealing pool, the delayed-send timer.
//! - [`system`] -- `ActorSystem`, configuration, the registry, error taxonomy.
//! - [`util`] -- `ActorId`/`MessageId`/`ActorAddress`/`ActorHandle`.

pub mod actor;
pub mod behavior;
pub mod mailbox;
pub mod message;
pub mod monitoring;
pub mod prelude;
pub mod scheduler;
pub mod system;
pub mod util;

pub use actor::{Actor, ActorContext, ExitReason, ExitSignal, PendingResponses};
pub use behavior::{Behavior, BehaviorBuilder, BehaviorStack, HandlerOutcome};
pub use mailbox::{Mailbox, MailboxCache, MailboxError};
pub use message::{AnyMessage, Message, MailboxElement, MessagePriority};
pub use monitoring::{
    ActorEvent, ActorEventKind, ActorEventSink, EventSeverity, InMemoryEventSink, InMemoryMonitor, MailboxEvent,
    MailboxEventKind, Monitor, MonitoringConfig, MonitoringError, MonitoringEvent, MonitoringSnapshot, NoopEventSink,
    NoopMonitor, SystemEvent, SystemEventKind,
};
pub use scheduler::{ResumeOutcome, Resumable, Timer, WorkerPool};
pub use system::{ActorSystem, RuntimeError, SpawnOptions, SystemConfig, SystemError};
pub use util::{ActorAddress, ActorHandle, ActorId, MessageId};
