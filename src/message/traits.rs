// Layer 1: Standard library imports
use std::fmt::Debug;

// Layer 2: Third-party crate imports
use downcast_rs::{impl_downcast, Downcast};

// Layer 3: Internal module imports
// (none)

/// Marker trait for user-defined message payloads.
///
/// # Design
/// The mailbox itself is untyped -- it stores `Box<dyn AnyMessage>`, not a generic
/// `M: Message`, so a single actor can receive payloads of different concrete types
/// across its lifetime (a requirement once behaviors can `become` a handler for a
/// completely different message shape). `Message` is the ergonomic trait application
/// code implements; a blanket impl lifts every `Message` into the type-erased
/// `AnyMessage` the mailbox actually deals in.
///
/// # Example
/// ```rust
/// use flywheel_rt::message::{Message, MessagePriority};
///
/// #[derive(Debug)]
/// struct Greet {
///     who: String,
/// }
///
/// impl Message for Greet {
///     const MESSAGE_TYPE: &'static str = "greet";
///
///     fn priority(&self) -> MessagePriority {
///         MessagePriority::Normal
///     }
/// }
/// ```
pub trait Message: Send + Sync + Debug + 'static {
    /// Unique message type identifier, used in monitoring events and panics.
    const MESSAGE_TYPE: &'static str;

    /// Message routing priority (default: Normal). Only the priority bit of the
    /// request id actually affects ordering; this is the ergonomic, per-payload
    /// way to set it when sending via `ActorContext::send`.
    fn priority(&self) -> MessagePriority {
        MessagePriority::Normal
    }
}

/// Message priority levels for routing and processing.
///
/// # Priority Ordering
/// Critical > High > Normal > Low. Only `Critical`/`High` map onto the mailbox's
/// high-priority queue; `Normal`/`Low` both land in the regular FIFO queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessagePriority {
    /// Background processing (lowest priority).
    Low = 0,
    /// Default priority for normal messages.
    Normal = 1,
    /// High priority; routed ahead of normal mail.
    High = 2,
    /// Highest priority; reserved for control-plane traffic (system tags, resume
    /// signals piggy-backed as messages).
    Critical = 3,
}

impl MessagePriority {
    /// True for `High`/`Critical`, the priorities that route to the mailbox's
    /// high-priority queue.
    pub fn is_high(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl Default for MessagePriority {
    fn default() -> Self {
        Self::Normal
    }
}

/// Type-erased message payload stored in the mailbox.
///
/// Every `Message` implementation gets this via the blanket impl below; callers
/// never implement `AnyMessage` directly. Handlers recover the concrete type with
/// `downcast_rs`'s `downcast_ref`/`downcast` before pattern-matching on it.
pub trait AnyMessage: Downcast + Send + Sync + Debug {
    /// The concrete message's `Message::MESSAGE_TYPE`.
    fn message_type(&self) -> &'static str;

    /// The concrete message's priority, as reported by `Message::priority`.
    fn dyn_priority(&self) -> MessagePriority;
}
impl_downcast!(AnyMessage);

impl<T: Message> AnyMessage for T {
    fn message_type(&self) -> &'static str {
        T::MESSAGE_TYPE
    }

    fn dyn_priority(&self) -> MessagePriority {
        Message::priority(self)
    }
}
