// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::mailbox::Mailbox;

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for actors in the system.
///
/// # Design
/// A departure from UUID-based identity: ids are allocated from a process-wide
/// monotonic counter rather than randomness. Cheap to generate, cheap to compare,
/// and ordering reflects spawn order, which the registry and scheduler both rely on
/// when they need a tie-breaker. Never reused within a process.
///
/// # Example
/// ```rust
/// use flywheel_rt::util::ActorId;
///
/// let id1 = ActorId::new();
/// let id2 = ActorId::new();
/// assert_ne!(id1, id2);
/// assert!(id2.as_u64() > id1.as_u64());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Allocate the next id from the process-wide counter.
    pub fn new() -> Self {
        Self(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the underlying numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Reconstruct an id from a raw value (test fixtures, persistence round-trips).
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// 64-bit message/request identifier with encoded control bits.
///
/// Layout (high bit to low bit): `priority:1 | response:1 | answered:1 | sequence:61`.
/// `MessageId::NONE` (all zero bits) means "asynchronous, no reply expected" -- it is
/// never a valid request or response id. A response id is a request id with the
/// response bit flipped on; the `answered` bit is set by the pending-response tables
/// once a handler or timeout has consumed the slot, guarding against double-fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    const PRIORITY_BIT: u64 = 1 << 63;
    const RESPONSE_BIT: u64 = 1 << 62;
    const ANSWERED_BIT: u64 = 1 << 61;
    const SEQUENCE_MASK: u64 = (1 << 61) - 1;

    /// The "no reply expected" sentinel.
    pub const NONE: MessageId = MessageId(0);

    /// A priority-tagged fire-and-forget cast: carries only the priority bit,
    /// no sequence number. Used by `ActorContext::send_high` to force routing
    /// to the mailbox's high-priority queue for a message whose own
    /// `Message::priority()` doesn't already request it. Never register this
    /// id in a `PendingResponses` table -- it is not a request id in that
    /// sense, even though `is_request` reports `true` for it.
    pub const HIGH_PRIORITY_CAST: MessageId = MessageId(Self::PRIORITY_BIT);

    /// Build a fresh request id from a per-actor monotonic sequence number.
    ///
    /// `sequence` is truncated to 61 bits and floored at 1; callers source it from
    /// an actor-local counter (see `ActorContext::next_request_id`), not a global one.
    pub fn new_request(sequence: u64, high_priority: bool) -> Self {
        let mut bits = (sequence & Self::SEQUENCE_MASK).max(1);
        if high_priority {
            bits |= Self::PRIORITY_BIT;
        }
        Self(bits)
    }

    /// True for `MessageId::NONE`: no response is expected for this element.
    pub fn is_async(&self) -> bool {
        self.0 == 0
    }

    /// True when this id identifies an outstanding request (not a response, not async).
    pub fn is_request(&self) -> bool {
        !self.is_async() && !self.is_response()
    }

    /// True when the response bit is set.
    pub fn is_response(&self) -> bool {
        self.0 & Self::RESPONSE_BIT != 0
    }

    /// True when the priority bit is set (routed ahead of normal-priority mail).
    pub fn is_high_priority(&self) -> bool {
        self.0 & Self::PRIORITY_BIT != 0
    }

    /// True once the pending-response table has resolved this id.
    pub fn is_answered(&self) -> bool {
        self.0 & Self::ANSWERED_BIT != 0
    }

    /// The 61-bit sequence component, stripped of control bits.
    pub fn sequence(&self) -> u64 {
        self.0 & Self::SEQUENCE_MASK
    }

    /// Derive the response id that answers this request: same bits, response bit set.
    pub fn response_id(&self) -> MessageId {
        Self(self.0 | Self::RESPONSE_BIT)
    }

    /// Mark this id as answered (idempotent).
    pub fn mark_answered(&self) -> MessageId {
        Self(self.0 | Self::ANSWERED_BIT)
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::NONE
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mid({:#018x})", self.0)
    }
}

/// Weak handle to an actor, used for addressing and for back-edges (monitors,
/// links, subscriptions) that must not keep the target alive.
///
/// Resolving an `ActorAddress` to a live mailbox may fail if the actor has already
/// terminated; callers treat that as a send to a dead letter.
#[derive(Clone)]
pub struct ActorAddress {
    id: ActorId,
    name: Option<String>,
    mailbox: Weak<Mailbox>,
}

impl ActorAddress {
    pub(crate) fn new(id: ActorId, name: Option<String>, mailbox: Weak<Mailbox>) -> Self {
        Self { id, name, mailbox }
    }

    /// The stable identity of the target actor.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// The registered name, if the actor was spawned with one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Attempt to resolve this address to a live mailbox.
    ///
    /// Returns `None` if the target actor has already terminated and its mailbox
    /// has been dropped.
    pub fn upgrade(&self) -> Option<std::sync::Arc<Mailbox>> {
        self.mailbox.upgrade()
    }

    /// True if the target actor is (at this instant) still resolvable.
    pub fn is_alive(&self) -> bool {
        self.mailbox.strong_count() > 0
    }
}

impl fmt::Debug for ActorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorAddress")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

impl Display for ActorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}@{}", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

impl PartialEq for ActorAddress {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for ActorAddress {}

impl std::hash::Hash for ActorAddress {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Strong handle to an actor: keeps the actor's mailbox alive for as long as the
/// handle is held. Returned from `ActorSystem::spawn`.
#[derive(Clone)]
pub struct ActorHandle {
    id: ActorId,
    name: Option<String>,
    mailbox: std::sync::Arc<Mailbox>,
}

impl ActorHandle {
    pub(crate) fn new(id: ActorId, name: Option<String>, mailbox: std::sync::Arc<Mailbox>) -> Self {
        Self { id, name, mailbox }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Derive a weak address from this handle.
    pub fn address(&self) -> ActorAddress {
        ActorAddress::new(
            self.id,
            self.name.clone(),
            std::sync::Arc::downgrade(&self.mailbox),
        )
    }

    pub(crate) fn mailbox(&self) -> &std::sync::Arc<Mailbox> {
        &self.mailbox
    }
}

impl fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

impl PartialEq for ActorHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for ActorHandle {}

impl std::hash::Hash for ActorHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
