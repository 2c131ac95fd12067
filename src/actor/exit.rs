//! Termination reasons and the signal sent to actors monitoring one another.

use std::fmt;

use crate::message::{Message, MessagePriority};
use crate::util::ActorId;

/// Why an actor stopped.
///
/// Mirrors CAF's `exit_reason`: a plain `Normal` stop versus everything else,
/// which downstream monitors treat as a failure worth propagating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The actor finished its work and returned cleanly, or was asked to quit
    /// via `ActorContext::quit` / `SystemMessage::Terminate`.
    Normal,
    /// A handler panicked. The payload is the panic message, best-effort.
    Panicked(String),
    /// A pattern match failed to find a handler for an ordinary message and no
    /// fallback behavior covered it (the Adder scenario: reply
    /// `unexpected_message`, then terminate).
    UnhandledMessage(String),
    /// A requested response resolved to an error the behavior's error
    /// callback didn't recognize (the Divider scenario: sentinel response,
    /// then terminate with `unexpected_response`).
    UnexpectedResponse(String),
    /// A pending request failed (timeout, dead receiver, or an explicit
    /// error reply) and the registering call provided no recovery beyond
    /// its single response handler, so `PendingResponses::fail`'s
    /// `auto_quit_on_error` escalated this failure into termination.
    UnhandledException(String),
    /// Killed by a supervisor or explicit external request, bypassing normal
    /// shutdown.
    Killed,
}

impl ExitReason {
    /// True for `Normal`; every other variant is a non-normal exit for
    /// classification and monitoring purposes.
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Panicked(msg) => write!(f, "panicked: {msg}"),
            Self::UnhandledMessage(msg) => write!(f, "unhandled_message: {msg}"),
            Self::UnexpectedResponse(msg) => write!(f, "unexpected_response: {msg}"),
            Self::UnhandledException(msg) => write!(f, "unhandled_exception: {msg}"),
            Self::Killed => write!(f, "killed"),
        }
    }
}

/// Delivered to actors that are monitoring a terminated actor.
///
/// Classified as `normal_exit`/`non_normal_exit` ahead of ordinary dispatch
/// (see `actor::classify`), so a monitoring actor's behavior never needs an
/// explicit pattern for it unless it wants one.
#[derive(Debug, Clone)]
pub struct ExitSignal {
    pub who: ActorId,
    pub reason: ExitReason,
}

impl Message for ExitSignal {
    const MESSAGE_TYPE: &'static str = "sys::exit_signal";

    fn priority(&self) -> MessagePriority {
        MessagePriority::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_normal_reports_is_normal() {
        assert!(ExitReason::Normal.is_normal());
        assert!(!ExitReason::Killed.is_normal());
        assert!(!ExitReason::Panicked("boom".into()).is_normal());
    }

    #[test]
    fn display_includes_the_variant_detail() {
        let reason = ExitReason::UnhandledMessage("Divide".into());
        assert!(format!("{reason}").contains("Divide"));
    }
}
