//! The scheduler's delayed-send facility: `ActorContext::delayed_send` and a
//! behavior's armed timeout both reduce to "enqueue this payload on that
//! mailbox after a delay, then wake the actor if it was blocked".
//!
//! Built around an atomic-bump timeout scheme: rather than tracking and
//! cancelling individual timer handles, every `become` bumps a per-actor
//! token counter and arms a fresh delayed send of a `TimeoutMarker` carrying
//! the new token. A marker that arrives after the actor has moved on again
//! simply fails the token comparison in `actor::classify` and is dropped.
//!
//! Timers are the one place this crate reaches for `tokio`: the dispatch
//! loop itself is synchronous, but "wait, then deliver a message" maps
//! naturally onto a background task on tokio's timer wheel.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::message::{AnyMessage, Message, MailboxElement, MessagePriority};
use crate::util::{ActorAddress, ActorId, MessageId};

/// A scheduled timeout, matched against an actor's current
/// `timeout_token_counter` by the classifier.
///
/// Carries `MessagePriority::High` so a timeout for a behavior that's about
/// to be replaced is still seen promptly rather than stuck behind a burst of
/// normal-priority mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutMarker {
    pub token: u64,
}

impl Message for TimeoutMarker {
    const MESSAGE_TYPE: &'static str = "sys::timeout_marker";

    fn priority(&self) -> MessagePriority {
        MessagePriority::High
    }
}

/// Callback invoked after a delayed send lands on a mailbox that was
/// `BLOCKED`, so the scheduler can re-enqueue the actor. Boxed rather than
/// generic so `Timer` itself stays a plain, non-generic struct that
/// `ActorSystem` can hold directly.
pub type WakeupFn = Arc<dyn Fn(ActorId) + Send + Sync>;

/// Owns the tokio runtime handle backing every delayed send in the system.
///
/// One `Timer` per `ActorSystem`; cloning it is cheap (the handle is itself a
/// cheap, reference-counted handle to the runtime).
#[derive(Clone)]
pub struct Timer {
    handle: Handle,
}

impl Timer {
    /// Build a timer driven by the given runtime handle. Callers typically
    /// pass `Handle::current()` from inside the async context that owns the
    /// `ActorSystem`, or the handle of a runtime dedicated to timers.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Schedule `payload` for delivery to `target` after `delay`, notifying
    /// `wakeup` if the enqueue woke a blocked mailbox.
    ///
    /// Silently drops the send if `target` has terminated by the time the
    /// delay elapses -- a dead letter, not an error, since nothing is
    /// awaiting this specific delivery.
    pub fn schedule(
        &self,
        target: ActorAddress,
        payload: Box<dyn AnyMessage>,
        mid: MessageId,
        delay: Duration,
        wakeup: WakeupFn,
    ) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(mailbox) = target.upgrade() else {
                return;
            };
            let element = MailboxElement::new(payload, mid, None);
            if let Ok(true) = mailbox.enqueue(element) {
                wakeup(target.id());
            }
        });
    }

    /// Convenience wrapper for arming a behavior-level timeout: schedules a
    /// `TimeoutMarker` carrying `token` at `target`'s own address.
    pub fn schedule_timeout(&self, target: ActorAddress, token: u64, delay: Duration, wakeup: WakeupFn) {
        self.schedule(target, Box::new(TimeoutMarker { token }), MessageId::NONE, delay, wakeup);
    }
}
