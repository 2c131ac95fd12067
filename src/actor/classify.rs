//! Message classification: deciding what kind of mailbox element this is
//! before any user behavior ever sees it.
//!
//! Grounded directly on CAF's `local_actor.cpp` `filter_msg`/`msg_type`
//! machinery: exit signals and system tags are peeled off and handled inline,
//! responses are routed to the pending-response tables, and only what's left
//! ("ordinary") reaches the behavior stack.

use crate::actor::exit::ExitSignal;
use crate::message::{MailboxElement, SystemMessage};

/// The outcome of classifying one `MailboxElement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    /// An `ExitSignal` carrying `ExitReason::Normal`.
    NormalExit,
    /// An `ExitSignal` carrying any other reason.
    NonNormalExit,
    /// A scheduled timeout whose token no longer matches what the actor is
    /// currently waiting for (a stale timeout from a behavior that has since
    /// moved on).
    ExpiredTimeout,
    /// A scheduled timeout whose token matches the actor's current
    /// expectation.
    Timeout,
    /// A response to a previously sent request.
    Response,
    /// A `SystemMessage` control-plane tag, answered inline by `Actor::resume`
    /// without involving the behavior stack.
    SysMessage,
    /// Everything else: dispatched to the current behavior.
    Ordinary,
}

/// Classify a mailbox element.
///
/// `expected_timeout_token` is `Some(token)` while the actor's current
/// behavior is waiting on a specific scheduled timeout (see
/// `ActorContext::after`); any `TimeoutMarker` whose token doesn't match is
/// `ExpiredTimeout` rather than `Timeout`.
///
/// `trap_exit` mirrors the actor's own flag: while set, exit signals
/// are handed to the behavior stack as `Ordinary` data instead of being
/// consumed by the runtime.
pub fn classify(
    element: &MailboxElement,
    expected_timeout_token: Option<u64>,
    trap_exit: bool,
) -> MessageClass {
    if let Some(exit) = element.payload().downcast_ref::<ExitSignal>() {
        if !trap_exit {
            return if exit.reason.is_normal() {
                MessageClass::NormalExit
            } else {
                MessageClass::NonNormalExit
            };
        }
        if matches!(exit.reason, crate::actor::exit::ExitReason::Killed) {
            return MessageClass::NonNormalExit;
        }
        return MessageClass::Ordinary;
    }

    if let Some(timeout) = element
        .payload()
        .downcast_ref::<crate::scheduler::timer::TimeoutMarker>()
    {
        return match expected_timeout_token {
            Some(token) if token == timeout.token => MessageClass::Timeout,
            _ => MessageClass::ExpiredTimeout,
        };
    }

    if element.payload().downcast_ref::<SystemMessage>().is_some() {
        return MessageClass::SysMessage;
    }

    if element.mid().is_response() {
        return MessageClass::Response;
    }

    MessageClass::Ordinary
}
