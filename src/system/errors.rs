//! Error taxonomy: `RuntimeError` for per-operation failures a behavior
//! handler or request caller can see, `SystemError` for failures at the
//! actor-system lifecycle level (spawn, shutdown, configuration).

use std::time::Duration;

use thiserror::Error;

use crate::mailbox::MailboxError;
use crate::util::{ActorId, MessageId};

/// Errors a behavior handler, a `request` caller, or the system-tag protocol
/// can observe. Grounded on CAF's response/error-promise failure modes and
/// the administrative-channel error the `sys` tag reports for an
/// unrecognized key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A sync-timeout fired before a matching response arrived.
    #[error("request {0} timed out waiting for a response")]
    RequestTimeout(MessageId),

    /// The target actor terminated while a request addressed to it was
    /// still outstanding.
    #[error("the receiver for request {0} is no longer alive")]
    RequestReceiverDown(MessageId),

    /// A response resolved to the `NoneResponse` sentinel: the handler that
    /// produced it explicitly declined to answer.
    #[error("response to {0} carried no value")]
    UnexpectedResponse(MessageId),

    /// A message reached the current behavior (or, for a blocking receive,
    /// an explicit pattern set) and matched nothing, including any fallback.
    #[error("message of type {0} matched no handler")]
    UnexpectedMessage(&'static str),

    /// The `sys` administrative channel received a tag it doesn't recognize.
    #[error("unrecognized system key: {0}")]
    InvalidSysKey(String),

    /// A migrate was attempted on an actor whose state cannot be captured.
    #[error("actor state is not serializable: {0}")]
    StateNotSerializable(String),

    /// A handler panicked (or raised with no explicit exit reason) and no
    /// custom exception handler accepted it.
    #[error("unhandled exception: {0}")]
    UnhandledException(String),

    /// `send`/`request` addressed an `ActorAddress` whose mailbox has
    /// already been dropped.
    #[error("actor {0} not found")]
    ActorNotFound(ActorId),

    /// `ActorContext::reply` was called while handling a message that
    /// carried no sender (e.g. injected directly by test code).
    #[error("the current message has no sender to reply to")]
    NoSender,

    /// A context built via `ActorContext::for_test` attempted an operation
    /// that requires a live `ActorSystem` (delayed sends, spawning).
    #[error("this context has no backing actor system")]
    NoSystem,

    /// The target mailbox has been closed and will accept no further mail.
    #[error("mailbox is closed")]
    MailboxClosed,

    /// The target mailbox is bounded and already holds as many elements as
    /// its configured capacity allows.
    #[error("mailbox is at capacity")]
    MailboxAtCapacity,
}

impl RuntimeError {
    pub fn response_timeout(mid: MessageId) -> Self {
        Self::RequestTimeout(mid)
    }

    pub fn request_receiver_down(mid: MessageId) -> Self {
        Self::RequestReceiverDown(mid)
    }

    pub fn unexpected_response(mid: MessageId) -> Self {
        Self::UnexpectedResponse(mid)
    }

    pub fn unexpected_message(message_type: &'static str) -> Self {
        Self::UnexpectedMessage(message_type)
    }

    pub fn invalid_sys_key(key: impl Into<String>) -> Self {
        Self::InvalidSysKey(key.into())
    }

    pub fn state_not_serializable(reason: impl Into<String>) -> Self {
        Self::StateNotSerializable(reason.into())
    }

    pub fn unhandled_exception(reason: impl Into<String>) -> Self {
        Self::UnhandledException(reason.into())
    }

    pub fn actor_not_found(id: ActorId) -> Self {
        Self::ActorNotFound(id)
    }

    pub fn no_sender() -> Self {
        Self::NoSender
    }

    pub fn no_system() -> Self {
        Self::NoSystem
    }

    /// True for failures produced without a pending request attached (a
    /// `send` to a dead mailbox, a bad context), which the dispatch loop
    /// forwards to the actor's default error handler rather than to any
    /// `PendingResponses` entry.
    pub fn is_request_scoped(&self) -> bool {
        matches!(
            self,
            Self::RequestTimeout(_) | Self::RequestReceiverDown(_) | Self::UnexpectedResponse(_)
        )
    }
}

impl From<MailboxError> for RuntimeError {
    fn from(err: MailboxError) -> Self {
        match err {
            MailboxError::Closed => Self::MailboxClosed,
            MailboxError::ConcurrentUnblock => Self::MailboxClosed,
            MailboxError::CapacityReached => Self::MailboxAtCapacity,
        }
    }
}

/// Errors surfaced by `ActorSystem` itself: spawning, shutdown, and
/// configuration, as opposed to the per-message `RuntimeError`s a running
/// actor produces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SystemError {
    /// No actor with the given id is registered.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// The actor's `start` hook (or factory) failed.
    #[error("failed to spawn actor: {0}")]
    SpawnFailed(String),

    /// `spawn` was called after `ActorSystem::shutdown` began.
    #[error("system shutdown in progress")]
    ShuttingDown,

    /// `SystemConfig` validation failed.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The system's `max_actors` bound would be exceeded by this spawn.
    #[error("actor limit exceeded: current {current}, max {max}")]
    ActorLimitExceeded { current: usize, max: usize },

    /// `shutdown` did not observe every actor finish within its deadline.
    #[error("shutdown timeout exceeded after {0:?}")]
    ShutdownTimeout(Duration),
}

impl SystemError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ActorLimitExceeded { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ShuttingDown | Self::ShutdownTimeout(_))
    }

    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_timeout_display_names_the_id() {
        let mid = MessageId::new_request(1, false).response_id();
        let err = RuntimeError::response_timeout(mid);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn mailbox_closed_converts_from_mailbox_error() {
        let err: RuntimeError = MailboxError::Closed.into();
        assert_eq!(err, RuntimeError::MailboxClosed);
    }

    #[test]
    fn mailbox_capacity_reached_converts_from_mailbox_error() {
        let err: RuntimeError = MailboxError::CapacityReached.into();
        assert_eq!(err, RuntimeError::MailboxAtCapacity);
    }

    #[test]
    fn request_scoped_errors_are_flagged() {
        let mid = MessageId::new_request(1, false).response_id();
        assert!(RuntimeError::response_timeout(mid).is_request_scoped());
        assert!(!RuntimeError::no_sender().is_request_scoped());
    }

    #[test]
    fn invalid_sys_key_carries_the_unrecognized_key() {
        let err = RuntimeError::invalid_sys_key("frobnicate");
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn system_error_shutdown_states_are_fatal_not_recoverable() {
        let err = SystemError::ShuttingDown;
        assert!(err.is_fatal());
        assert!(!err.is_recoverable());

        let timeout = SystemError::ShutdownTimeout(Duration::from_secs(30));
        assert!(timeout.is_fatal());
    }

    #[test]
    fn system_error_actor_limit_is_transient() {
        let err = SystemError::ActorLimitExceeded { current: 10, max: 10 };
        assert!(err.is_transient());
        assert!(err.is_recoverable());
    }
}
