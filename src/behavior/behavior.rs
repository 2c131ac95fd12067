//! A `Behavior` is an ordered set of type-directed message patterns, the unit
//! `become`/`unbecome` push and pop on an actor's behavior stack.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::actor::context::ActorContext;
use crate::message::{AnyMessage, Message};
use crate::util::ActorAddress;

/// What a single pattern did with the message it was offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The pattern matched the payload's type and ran its handler.
    Handled,
    /// Either the payload didn't match this pattern's type, or the handler
    /// explicitly declined via `ActorContext::skip`. Either way the message
    /// moves on to the next pattern, then to the behavior's fallback, then
    /// into the mailbox cache to be retried against a different behavior.
    Skip,
    /// The message under dispatch should be re-sent to `ActorAddress`
    /// unchanged, preserving its request id, via
    /// `ActorContext::forward_current_message`. `Actor::resume` performs the
    /// actual re-send since it still owns the payload box.
    Forward(ActorAddress),
}

/// A behavior-level timeout: fires if no message matching this behavior
/// arrives within `duration` of it becoming the top of the stack.
pub type TimeoutHandler = Arc<dyn Fn(&mut ActorContext) + Send + Sync>;

/// A type-erased pattern: attempts to downcast the payload to a concrete
/// `Message` type and, on success, invokes the user handler. `None` means the
/// payload's type didn't match this pattern at all -- the dispatch loop moves
/// on to the next pattern rather than treating it as an engaged `Skip`.
pub type PatternFn = Arc<dyn Fn(&mut ActorContext, &dyn AnyMessage) -> Option<HandlerOutcome> + Send + Sync>;

/// A catch-all fallback: unlike a `PatternFn` it always engages, so it
/// returns `HandlerOutcome` directly rather than an `Option`.
pub type FallbackFn = Arc<dyn Fn(&mut ActorContext, &dyn AnyMessage) -> HandlerOutcome + Send + Sync>;

/// An ordered set of message patterns plus an optional fallback ("others"),
/// evaluated top to bottom. The first pattern that both matches the payload's
/// type and returns `Handled` wins; if none do, the behavior reports `Skip`
/// and the dispatch loop holds the message in the mailbox cache.
///
/// Built once via [`Behavior::builder`] and shared as an `Arc` across every
/// frame of the behavior stack that references it -- cloning an `Arc<Behavior>`
/// off the stack (rather than holding a live borrow into the stack) is what
/// lets a handler call back into `ActorContext::become_behavior` without
/// fighting the borrow checker over the same stack it's currently being
/// dispatched from.
#[derive(Clone)]
pub struct Behavior {
    name: &'static str,
    patterns: Vec<PatternFn>,
    fallback: Option<FallbackFn>,
    timeout: Option<Duration>,
    timeout_handler: Option<TimeoutHandler>,
}

impl Behavior {
    /// Start building a named behavior. The name shows up in monitoring events
    /// and panic messages; it has no effect on dispatch.
    pub fn builder(name: &'static str) -> BehaviorBuilder {
        BehaviorBuilder::new(name)
    }

    /// The behavior's name, as given to `builder`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The behavior-level timeout armed while this behavior is on top of the
    /// stack, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run the behavior's timeout callback, if one was registered.
    pub fn fire_timeout(&self, ctx: &mut ActorContext) {
        if let Some(handler) = &self.timeout_handler {
            handler(ctx);
        }
    }

    /// Offer a message to this behavior: try every registered pattern in
    /// order, then the fallback if none matched.
    ///
    /// Returns `None` if no pattern's type matched the payload *and* no
    /// fallback is installed -- this behavior has no opinion at all about a
    /// message of this shape, as distinct from a pattern or fallback that
    /// matched and explicitly returned `HandlerOutcome::Skip` to defer it.
    /// `Actor::resume` treats the two differently: a `None` from every
    /// installed behavior escalates to `unexpected_message` for a request
    /// (CAF's default handler for an unrecognized message type), while
    /// `Some(Skip)` always means "hold in the cache, retry after `become`".
    pub fn dispatch(&self, ctx: &mut ActorContext, payload: &dyn AnyMessage) -> Option<HandlerOutcome> {
        for pattern in &self.patterns {
            if let Some(outcome) = pattern(ctx, payload) {
                return Some(outcome);
            }
        }
        self.fallback.as_ref().map(|fallback| fallback(ctx, payload))
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("name", &self.name)
            .field("pattern_count", &self.patterns.len())
            .field("has_fallback", &self.fallback.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`Behavior`], registering one type-directed pattern per `on`
/// call in the order they should be tried.
pub struct BehaviorBuilder {
    name: &'static str,
    patterns: Vec<PatternFn>,
    fallback: Option<FallbackFn>,
    timeout: Option<Duration>,
    timeout_handler: Option<TimeoutHandler>,
}

impl BehaviorBuilder {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            patterns: Vec::new(),
            fallback: None,
            timeout: None,
            timeout_handler: None,
        }
    }

    /// Register a handler for a concrete message type `M`. Payloads of any
    /// other type fall through to the next pattern untouched.
    pub fn on<M, F>(mut self, handler: F) -> Self
    where
        M: Message,
        F: Fn(&mut ActorContext, &M) -> HandlerOutcome + Send + Sync + 'static,
    {
        let pattern: PatternFn = Arc::new(move |ctx, payload| {
            payload.downcast_ref::<M>().map(|typed| handler(ctx, typed))
        });
        self.patterns.push(pattern);
        self
    }

    /// Register a catch-all handler run when no typed pattern matched,
    /// equivalent to CAF's `others >>` fallback. Unlike `on`, this handler
    /// sees the still-erased payload and must decide for itself whether to
    /// treat it as handled or skip it.
    pub fn on_others<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut ActorContext, &dyn AnyMessage) -> HandlerOutcome + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// Arm a behavior-level timeout: if no message matching this
    /// behavior arrives within `duration` of it becoming current, `handler`
    /// fires once. Replaced wholesale by a later `with_timeout` call; cleared
    /// entirely once the behavior is replaced by `become`.
    pub fn with_timeout<F>(mut self, duration: Duration, handler: F) -> Self
    where
        F: Fn(&mut ActorContext) + Send + Sync + 'static,
    {
        self.timeout = Some(duration);
        self.timeout_handler = Some(Arc::new(handler));
        self
    }

    /// Finalize the behavior into a shareable `Arc`.
    pub fn build(self) -> Arc<Behavior> {
        Arc::new(Behavior {
            name: self.name,
            patterns: self.patterns,
            fallback: self.fallback,
            timeout: self.timeout,
            timeout_handler: self.timeout_handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::exit::ExitReason;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug)]
    struct Ping;
    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "ping";
    }

    #[derive(Debug)]
    struct Pong;
    impl Message for Pong {
        const MESSAGE_TYPE: &'static str = "pong";
    }

    fn test_ctx() -> ActorContext {
        ActorContext::for_test()
    }

    #[test]
    fn first_matching_pattern_wins() {
        let seen = Arc::new(AtomicBool::new(false));
        let seen_clone = seen.clone();
        let behavior = Behavior::builder("pinger")
            .on::<Ping, _>(move |_ctx, _msg| {
                seen_clone.store(true, Ordering::SeqCst);
                HandlerOutcome::Handled
            })
            .build();

        let mut ctx = test_ctx();
        let outcome = behavior.dispatch(&mut ctx, &Ping);
        assert_eq!(outcome, Some(HandlerOutcome::Handled));
        assert!(seen.load(Ordering::SeqCst));
    }

    #[test]
    fn non_matching_type_skips_through_to_fallback() {
        let behavior = Behavior::builder("pinger")
            .on::<Ping, _>(|_ctx, _msg| HandlerOutcome::Handled)
            .on_others(|_ctx, _payload| HandlerOutcome::Handled)
            .build();

        let mut ctx = test_ctx();
        let outcome = behavior.dispatch(&mut ctx, &Pong);
        assert_eq!(outcome, Some(HandlerOutcome::Handled));
    }

    #[test]
    fn no_match_and_no_fallback_reports_no_opinion() {
        let behavior = Behavior::builder("pinger")
            .on::<Ping, _>(|_ctx, _msg| HandlerOutcome::Handled)
            .build();

        let mut ctx = test_ctx();
        let outcome = behavior.dispatch(&mut ctx, &Pong);
        assert_eq!(outcome, None);
    }

    #[test]
    fn handler_can_explicitly_skip_despite_type_match() {
        let behavior = Behavior::builder("picky")
            .on::<Ping, _>(|_ctx, _msg| HandlerOutcome::Skip)
            .build();

        let mut ctx = test_ctx();
        let outcome = behavior.dispatch(&mut ctx, &Ping);
        assert_eq!(outcome, Some(HandlerOutcome::Skip));
    }

    #[test]
    fn exit_reason_is_reachable_from_behavior_tests() {
        // Sanity check that the module wiring between behavior/ and actor/
        // compiles cleanly from both directions.
        let _ = ExitReason::Normal;
    }
}
