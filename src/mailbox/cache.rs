//! The actor-local skip cache: messages a behavior declined to handle, held so
//! they can be retried against a later behavior without re-entering the shared
//! mailbox queue.

use std::collections::VecDeque;

use crate::message::MailboxElement;

/// Two-segment holding area for skipped mail, owned exclusively by the actor
/// that is currently executing -- no locking needed, since only one worker
/// ever drives a given actor's `resume` at a time.
///
/// The **current segment** accumulates elements skipped by the behavior that
/// is active *right now* (via `ActorContext::skip` or an unmatched pattern
/// that falls through to `others`). The **previous segment** holds elements
/// that were skipped under an *earlier* behavior, before the most recent
/// `become`; they are retried once that behavior is back on top of the stack.
///
/// On `become`, the current segment is promoted into the previous segment
/// (see `promote_on_become`) so the new behavior gets first crack at fresh
/// mailbox elements before falling back to anything the old behavior
/// couldn't handle.
#[derive(Debug, Default)]
pub struct MailboxCache {
    current: VecDeque<MailboxElement>,
    previous: VecDeque<MailboxElement>,
}

impl MailboxCache {
    /// Build an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an element the active behavior declined to handle.
    pub fn push_skipped(&mut self, element: MailboxElement) {
        self.current.push_back(element);
    }

    /// Take the next candidate to retry: current-segment elements first
    /// (oldest skip first), then previous-segment elements.
    ///
    /// Not safe to call in an unbounded loop: a message that keeps getting
    /// skipped is pushed back onto `current` and would be handed right back
    /// out on the very next call. `Actor::drain_cache_after_dispatch` bounds
    /// each round to the cache's length at the start of that round instead
    /// of looping on this alone; `Actor::resume`'s own candidate selection
    /// uses [`Self::take_previous`] for the same reason.
    pub fn take_next(&mut self) -> Option<MailboxElement> {
        self.current.pop_front().or_else(|| self.previous.pop_front())
    }

    /// Take the next candidate from the previous segment only, leaving
    /// `current` untouched. Mail skipped under the behavior active *right
    /// now* waits in `current` until the next `become` promotes it, so one
    /// skip never causes another within the same generation.
    pub fn take_previous(&mut self) -> Option<MailboxElement> {
        self.previous.pop_front()
    }

    /// Drain both segments, current first, for a terminating actor to bounce
    /// back to their senders.
    pub fn drain(&mut self) -> Vec<MailboxElement> {
        self.current.drain(..).chain(self.previous.drain(..)).collect()
    }

    /// Move everything in the current segment into the previous segment,
    /// preserving order. Called exactly once per `become`/`unbecome`
    /// transition, so mail skipped under the outgoing behavior gets replayed
    /// against the incoming one.
    pub fn promote_on_become(&mut self) {
        while let Some(element) = self.current.pop_front() {
            self.previous.push_back(element);
        }
    }

    /// Combined depth of both segments.
    pub fn len(&self) -> usize {
        self.current.len() + self.previous.len()
    }

    /// True if both segments are empty.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.previous.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::util::MessageId;

    #[derive(Debug)]
    struct Tagged(&'static str);
    impl Message for Tagged {
        const MESSAGE_TYPE: &'static str = "tagged";
    }

    fn elem(tag: &'static str) -> MailboxElement {
        MailboxElement::new(Box::new(Tagged(tag)), MessageId::NONE, None)
    }

    fn tag(element: &MailboxElement) -> &'static str {
        element
            .payload()
            .downcast_ref::<Tagged>()
            .expect("tagged payload")
            .0
    }

    #[test]
    fn take_next_drains_current_before_previous() {
        let mut cache = MailboxCache::new();
        cache.push_skipped(elem("a"));
        cache.promote_on_become();
        cache.push_skipped(elem("b"));

        assert_eq!(tag(&cache.take_next().unwrap()), "b");
        assert_eq!(tag(&cache.take_next().unwrap()), "a");
        assert!(cache.take_next().is_none());
    }

    #[test]
    fn promote_preserves_fifo_order_within_a_segment() {
        let mut cache = MailboxCache::new();
        cache.push_skipped(elem("first"));
        cache.push_skipped(elem("second"));
        cache.promote_on_become();

        assert_eq!(tag(&cache.take_next().unwrap()), "first");
        assert_eq!(tag(&cache.take_next().unwrap()), "second");
    }

    #[test]
    fn empty_cache_reports_len_zero() {
        let cache = MailboxCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
    }
}
