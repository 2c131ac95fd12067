//! Control-plane messages recognized by the classifier before user behaviors
//! ever see them (spec: "sys_message" classification).

use super::traits::{Message, MessagePriority};
use crate::util::{ActorAddress, MessageId};

/// Administrative queries/commands handled directly by `Actor::resume`, never
/// forwarded to user behavior handlers.
///
/// Modeled on the `{sys, get, "info"}` tag CAF's actors answer inline: a caller
/// `request`s this message the same way it would request any other, and the
/// actor's dispatch loop replies through the ordinary response-promise path
/// bound to the request's `MessageId`, without waking a behavior handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemMessage {
    /// Request a snapshot of the actor's runtime info (id, name, mailbox depth).
    Info,
    /// Ask the actor to begin a graceful shutdown (see `ExitReason::Normal`).
    Terminate,
    /// Register `watcher` to receive an `ExitSignal` when this actor
    /// terminates, for any reason, regardless of `trap_exit`. Unifies CAF's
    /// separate link and monitor primitives into the one-directional case;
    /// nothing here ever propagates a failure back onto the watcher itself.
    Monitor(ActorAddress),
    /// A system tag the inline handler doesn't recognize. Still classified as
    /// `SysMessage` (it carries the `sys` tag), but `Actor::resume` answers it
    /// with `RuntimeError::invalid_sys_key` rather than routing it anywhere.
    Unknown(String),
    /// Delivered to self by the timer facility when a request's deadline
    /// (`ActorContext::request`'s `timeout`) elapses. A no-op if the request
    /// already resolved by the time this arrives.
    ResponseTimeout(MessageId),
}

impl Message for SystemMessage {
    const MESSAGE_TYPE: &'static str = "sys::control";

    fn priority(&self) -> MessagePriority {
        MessagePriority::Critical
    }
}

/// Response payload for `SystemMessage::Info`.
#[derive(Debug, Clone)]
pub struct ActorInfo {
    pub id: crate::util::ActorId,
    pub name: Option<String>,
    pub mailbox_len: usize,
}

impl Message for ActorInfo {
    const MESSAGE_TYPE: &'static str = "sys::info_response";
}

/// Sentinel a handler replies with to mean "explicitly no value", distinct
/// from simply not replying. A response resolving to `NoneResponse` is folded
/// into `RuntimeError::unexpected_response` by the pending-response matcher
/// instead of being delivered to the handler's success branch, matching a
/// divider-by-zero request that has nothing to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoneResponse;

impl Message for NoneResponse {
    const MESSAGE_TYPE: &'static str = "sys::none_response";
}

/// Wire envelope for a failure response. A target actor's dispatch loop
/// sends this back (instead of a value) when it decided the request itself
/// couldn't be satisfied -- an unrecognized `sys` key, a request that
/// matched no handler. `Actor::resume`'s response handling folds it into
/// the pending entry's error branch rather than its success branch.
#[derive(Debug, Clone)]
pub struct ErrorResponse(pub crate::system::errors::RuntimeError);

impl Message for ErrorResponse {
    const MESSAGE_TYPE: &'static str = "sys::error_response";

    fn priority(&self) -> MessagePriority {
        MessagePriority::Critical
    }
}
