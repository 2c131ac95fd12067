//! The actor: a mailbox, a behavior stack, pending responses, and the
//! synchronous classify-dispatch loop that drives them.
//!
//! # Module Organization
//!
//! - `cell.rs` -- [`Actor`], the `Resumable` that owns an actor's runtime
//!   state and its `resume` dispatch loop.
//! - `classify.rs` -- message classification ahead of the behavior stack.
//! - `context.rs` -- [`ActorContext`], the API surface a handler sees.
//! - `exit.rs` -- [`ExitReason`] and [`ExitSignal`].
//! - `responses.rs` -- [`PendingResponses`], the awaited/multiplexed
//!   request-response tables.

pub mod cell;
pub mod classify;
pub mod context;
pub mod exit;
pub mod responses;

pub use cell::Actor;
pub use classify::{classify, MessageClass};
pub use context::ActorContext;
pub use exit::{ExitReason, ExitSignal};
pub use responses::{PendingResponses, ResponseHandler};
