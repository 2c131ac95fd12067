//! Actor mailboxes: a shared, priority-partitioned MPSC queue (`Mailbox`) plus
//! an actor-local skip cache (`MailboxCache`) that lets a behavior decline a
//! message without losing it.
//!
//! # Design
//!
//! Earlier designs in this crate were generic over the message type and typed
//! end to end. The behavior-stack model this crate now implements needs a
//! single actor to receive different concrete message types across its
//! lifetime (a `become` can switch to a handler for an entirely different
//! message shape), so the mailbox itself is untyped: it stores
//! `Box<dyn AnyMessage>` via [`crate::message::MailboxElement`], and handlers
//! recover the concrete type by downcasting.
//!
//! `Mailbox` is the shared, lock-protected structure senders push onto.
//! `MailboxCache` is exclusively owned by the actor's own dispatch loop and
//! needs no synchronization at all.
//!
//! # Example
//!
//! ```rust
//! use flywheel_rt::mailbox::Mailbox;
//! use flywheel_rt::message::{Message, MailboxElement};
//! use flywheel_rt::util::MessageId;
//!
//! #[derive(Debug)]
//! struct Ping;
//! impl Message for Ping {
//!     const MESSAGE_TYPE: &'static str = "ping";
//! }
//!
//! let mailbox = Mailbox::new(false);
//! mailbox
//!     .enqueue(MailboxElement::new(Box::new(Ping), MessageId::NONE, None))
//!     .unwrap();
//! assert_eq!(mailbox.len(), 1);
//! ```

pub mod cache;
pub mod queue;
pub mod traits;

pub use cache::MailboxCache;
pub use queue::Mailbox;
pub use traits::MailboxError;
