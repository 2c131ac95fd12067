//! The API surface a behavior handler sees: sending, requesting, becoming,
//! and quitting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::actor::exit::ExitReason;
use crate::actor::responses::PendingResponses;
use crate::behavior::{Behavior, HandlerOutcome};
use crate::message::{AnyMessage, Message, MessageId};
use crate::system::actor_system::ActorSystem;
use crate::system::errors::RuntimeError;
use crate::util::{ActorAddress, ActorId};

/// A mutation a handler requested that only takes effect once the handler
/// returns, applied by `Actor::resume` after `Behavior::dispatch` is done.
///
/// Deferring these (rather than mutating the actor's behavior stack directly
/// from inside the handler) is what lets a handler call `become`/`unbecome`
/// on the very stack frame it is currently running under without the borrow
/// checker objecting -- `Actor::resume` already cloned the `Arc<Behavior>` it
/// is dispatching off the stack before calling in, so the stack itself is
/// free to mutate once the call returns.
pub(crate) enum ContextEffect {
    Become {
        behavior: Arc<Behavior>,
        keep_current: bool,
    },
    Unbecome,
    Quit(ExitReason),
}

/// Per-dispatch context handed to a behavior's handlers.
///
/// Built fresh by `Actor::resume` for each mailbox element and consumed
/// immediately after: the `pending` table and `next_request_seq` counter are
/// moved in by value and moved back out once dispatch returns, so this type
/// never needs a lifetime parameter even though it temporarily owns
/// actor-lifetime state.
pub struct ActorContext {
    id: ActorId,
    name: Option<String>,
    self_address: ActorAddress,
    system: Option<ActorSystem>,
    current_sender: Option<ActorAddress>,
    current_mid: MessageId,
    pub(crate) pending: PendingResponses,
    pub(crate) next_request_seq: u64,
    pub(crate) effects: Vec<ContextEffect>,
}

impl ActorContext {
    pub(crate) fn new(
        id: ActorId,
        name: Option<String>,
        self_address: ActorAddress,
        system: Option<ActorSystem>,
        current_sender: Option<ActorAddress>,
        current_mid: MessageId,
        pending: PendingResponses,
        next_request_seq: u64,
    ) -> Self {
        Self {
            id,
            name,
            self_address,
            system,
            current_sender,
            current_mid,
            pending,
            next_request_seq,
            effects: Vec::new(),
        }
    }

    /// A minimal context for unit-testing behaviors in isolation, with no
    /// backing runtime: sends and requests fail with `RuntimeError::no_system`
    /// rather than reaching a real mailbox.
    pub fn for_test() -> Self {
        Self::new(
            ActorId::new(),
            None,
            ActorAddress::new(ActorId::new(), None, std::sync::Weak::new()),
            None,
            None,
            MessageId::NONE,
            PendingResponses::new(),
            0,
        )
    }

    /// This actor's id.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// This actor's registered name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// This actor's own address, for handing out to others or using as a
    /// reply-to target.
    pub fn address(&self) -> ActorAddress {
        self.self_address.clone()
    }

    /// The sender of the message currently being handled, if it came from
    /// another actor.
    pub fn sender(&self) -> Option<&ActorAddress> {
        self.current_sender.as_ref()
    }

    /// The request/response id of the message currently being handled.
    pub fn current_mid(&self) -> MessageId {
        self.current_mid
    }

    fn next_request_id(&mut self, high_priority: bool) -> MessageId {
        self.next_request_seq += 1;
        MessageId::new_request(self.next_request_seq, high_priority)
    }

    fn send_raw(
        &self,
        target: &ActorAddress,
        payload: Box<dyn AnyMessage>,
        mid: MessageId,
    ) -> Result<(), RuntimeError> {
        let mailbox = target
            .upgrade()
            .ok_or_else(|| RuntimeError::actor_not_found(target.id()))?;
        let element = crate::message::MailboxElement::new(payload, mid, Some(self.self_address.clone()));
        let woke = mailbox.enqueue(element)?;
        if woke {
            if let Some(system) = &self.system {
                system.notify_wakeup(target.id());
            }
        }
        Ok(())
    }

    /// Send a fire-and-forget message at its own declared priority.
    pub fn send<M: Message>(&self, target: &ActorAddress, message: M) -> Result<(), RuntimeError> {
        self.send_raw(target, Box::new(message), MessageId::NONE)
    }

    /// Send a fire-and-forget message, forcing high-priority routing
    /// regardless of the message's own declared priority.
    pub fn send_high<M: Message>(&self, target: &ActorAddress, message: M) -> Result<(), RuntimeError> {
        self.send_raw(target, Box::new(message), MessageId::HIGH_PRIORITY_CAST)
    }

    /// Reply to the sender of the message currently being handled.
    ///
    /// Fails with `RuntimeError::no_sender` if the current message didn't
    /// come from another actor (e.g. it was injected by test code or
    /// external non-actor code).
    pub fn reply<M: Message>(&self, message: M) -> Result<(), RuntimeError> {
        let sender = self
            .current_sender
            .clone()
            .ok_or_else(RuntimeError::no_sender)?;
        self.send_raw(&sender, Box::new(message), self.current_mid.response_id())
    }

    /// Reply to the sender with the explicit "no value" sentinel: unlike
    /// simply not replying, this resolves the requester's pending entry with
    /// `RuntimeError::unexpected_response`.
    pub fn reply_none(&self) -> Result<(), RuntimeError> {
        self.reply(crate::message::NoneResponse)
    }

    /// Send a request and register a FIFO-ordered ("awaited") handler: if
    /// more than one awaited request is outstanding, their responses are
    /// consumed strictly in send order, serializing this actor's progress on
    /// them the way CAF's synchronous `request(...).then(...)` does.
    ///
    /// `on_response` always runs, success or failure. If the caller's
    /// handler doesn't recover from a failure on its own, a failure still
    /// escalates to `quit(unhandled_exception)` afterward once the handler
    /// has had its chance to react; pass `auto_quit_on_error: false` when
    /// `on_response` fully handles its `Err` branch itself.
    pub fn request<M, F>(
        &mut self,
        target: &ActorAddress,
        message: M,
        timeout: Option<Duration>,
        auto_quit_on_error: bool,
        on_response: F,
    ) -> Result<(), RuntimeError>
    where
        M: Message,
        F: FnOnce(Result<Box<dyn AnyMessage>, RuntimeError>) + Send + 'static,
    {
        let mid = self.next_request_id(false);
        let deadline = timeout.map(|d| Instant::now() + d);
        self.pending
            .register_awaited(mid, deadline, Box::new(on_response), auto_quit_on_error);
        self.arm_response_timeout(mid, timeout);
        self.send_raw(target, Box::new(message), mid)
    }

    /// Send a request whose response may be handled whenever it arrives,
    /// independent of any other outstanding request. See `request` for
    /// `auto_quit_on_error`.
    pub fn request_multiplexed<M, F>(
        &mut self,
        target: &ActorAddress,
        message: M,
        timeout: Option<Duration>,
        auto_quit_on_error: bool,
        on_response: F,
    ) -> Result<(), RuntimeError>
    where
        M: Message,
        F: FnOnce(Result<Box<dyn AnyMessage>, RuntimeError>) + Send + 'static,
    {
        let mid = self.next_request_id(false);
        let deadline = timeout.map(|d| Instant::now() + d);
        self.pending
            .register_multiplexed(mid, deadline, Box::new(on_response), auto_quit_on_error);
        self.arm_response_timeout(mid, timeout);
        self.send_raw(target, Box::new(message), mid)
    }

    /// Schedule a `SystemMessage::ResponseTimeout` back to this actor's own
    /// mailbox so an unanswered request's deadline actually fires instead of
    /// only ever being checked reactively.
    fn arm_response_timeout(&self, mid: MessageId, timeout: Option<Duration>) {
        let (Some(system), Some(delay)) = (&self.system, timeout) else {
            return;
        };
        system.schedule_delayed_send(
            self.self_address.clone(),
            Box::new(crate::message::SystemMessage::ResponseTimeout(mid)),
            delay,
        );
    }

    /// Schedule a message for delivery after `delay`, via the scheduler's
    /// timer facility.
    pub fn delayed_send<M: Message>(
        &self,
        target: ActorAddress,
        message: M,
        delay: Duration,
    ) -> Result<(), RuntimeError> {
        let system = self.system.as_ref().ok_or_else(RuntimeError::no_system)?;
        system.schedule_delayed_send(target, Box::new(message), delay);
        Ok(())
    }

    /// Forward the message currently being handled to `target` unchanged,
    /// preserving its original request id so the eventual response still
    /// resolves the original requester's pending entry.
    ///
    /// Returns the `HandlerOutcome` a handler should return directly; the
    /// actual re-send happens in `Actor::resume`, which still owns the
    /// message's payload box (a handler only ever sees a borrow of it).
    pub fn forward_current_message(&self, target: ActorAddress) -> HandlerOutcome {
        HandlerOutcome::Forward(target)
    }

    /// Decline to handle the current message; it moves to the mailbox cache
    /// to be retried against a later behavior. Equivalent to returning
    /// `HandlerOutcome::Skip` directly -- provided for call-site symmetry
    /// with `forward_current_message`.
    pub fn skip(&self) -> HandlerOutcome {
        HandlerOutcome::Skip
    }

    /// Push a new behavior onto the stack, or swap the current one out.
    ///
    /// `keep_current = true` preserves the current behavior beneath the new
    /// one so `unbecome` can restore it later; `false` discards it.
    pub fn become_behavior(&mut self, next: Arc<Behavior>, keep_current: bool) {
        self.effects.push(ContextEffect::Become {
            behavior: next,
            keep_current,
        });
    }

    /// Pop the current behavior and resume whatever was beneath it.
    pub fn unbecome(&mut self) {
        self.effects.push(ContextEffect::Unbecome);
    }

    /// Request that the actor stop after this dispatch completes.
    pub fn quit(&mut self, reason: ExitReason) {
        self.effects.push(ContextEffect::Quit(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_to_a_dead_address_fails_with_actor_not_found() {
        let ctx = ActorContext::for_test();
        let dead = ActorAddress::new(ActorId::new(), None, std::sync::Weak::new());

        #[derive(Debug)]
        struct Ping;
        impl Message for Ping {
            const MESSAGE_TYPE: &'static str = "ping";
        }

        let result = ctx.send(&dead, Ping);
        assert!(result.is_err());
    }

    #[test]
    fn reply_without_a_sender_fails() {
        let ctx = ActorContext::for_test();

        #[derive(Debug)]
        struct Pong;
        impl Message for Pong {
            const MESSAGE_TYPE: &'static str = "pong";
        }

        assert!(ctx.reply(Pong).is_err());
    }

    #[test]
    fn become_and_quit_queue_effects_for_later_application() {
        let mut ctx = ActorContext::for_test();
        ctx.become_behavior(Behavior::builder("next").build(), true);
        ctx.quit(ExitReason::Normal);
        assert_eq!(ctx.effects.len(), 2);
    }

    #[test]
    fn skip_and_forward_return_the_expected_outcomes() {
        let ctx = ActorContext::for_test();
        assert_eq!(ctx.skip(), HandlerOutcome::Skip);
        let target = ActorAddress::new(ActorId::new(), None, std::sync::Weak::new());
        assert!(matches!(
            ctx.forward_current_message(target),
            HandlerOutcome::Forward(_)
        ));
    }
}
