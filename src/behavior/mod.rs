//! CAF-style `become`/`unbecome` behaviors.
//!
//! A [`Behavior`] is an ordered set of type-directed message patterns; a
//! [`BehaviorStack`] is the per-actor stack `become`/`unbecome` push and pop.
//! Neither type has a counterpart in this crate's original generic-handler
//! design -- they're built fresh to support the composable, swappable message
//! handling CAF's actors use (`become(keep_behavior, ...)`, `unbecome()`,
//! `skip_message()`, `others >>`).

pub mod behavior;
pub mod stack;

pub use behavior::{Behavior, BehaviorBuilder, FallbackFn, HandlerOutcome, PatternFn, TimeoutHandler};
pub use stack::BehaviorStack;
