//! Pending response bookkeeping: matching incoming replies to outstanding
//! requests.
//!
//! Grounded on CAF's `local_actor` response-handling machinery
//! (`awaits`/`mark_awaited_arrived`/`find_multiplexed_response`): a `request`
//! made with `ActorContext::request` (a synchronous-style await, blocking
//! further ordinary mail until it resolves) goes in the FIFO `awaited` queue
//! and is matched *only at the front*; a `request` made with
//! `ActorContext::request_multiplexed` (fire off many concurrent requests,
//! handle replies as they arrive in any order) goes in the `multiplexed` map.
//! Mixing the two policies per actor is intentional and mirrors the original.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use crate::message::AnyMessage;
use crate::system::errors::RuntimeError;
use crate::util::MessageId;

/// Invoked exactly once with either the downcastable response payload or the
/// failure that prevented one from arriving (timeout, receiver gone, or an
/// explicit error reply).
pub type ResponseHandler = Box<dyn FnOnce(Result<Box<dyn AnyMessage>, RuntimeError>) + Send>;

struct PendingEntry {
    mid: MessageId,
    handler: ResponseHandler,
    deadline: Option<Instant>,
    /// No error branch was registered alongside `handler`: a
    /// failure delivered to this entry should additionally escalate to
    /// `quit(unhandled_exception)` after the handler runs.
    auto_quit_on_error: bool,
}

/// Per-actor table of outstanding requests.
#[derive(Default)]
pub struct PendingResponses {
    awaited: VecDeque<PendingEntry>,
    multiplexed: HashMap<MessageId, PendingEntry>,
}

impl PendingResponses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a FIFO-ordered ("awaited") pending request.
    ///
    /// `auto_quit_on_error`: if the caller registered no meaningful error
    /// recovery (see `ActorContext::request`'s default), a failure delivered
    /// to this entry escalates to `quit(unhandled_exception)` once `handler`
    /// returns.
    pub fn register_awaited(
        &mut self,
        mid: MessageId,
        deadline: Option<Instant>,
        handler: ResponseHandler,
        auto_quit_on_error: bool,
    ) {
        self.awaited.push_back(PendingEntry {
            mid,
            handler,
            deadline,
            auto_quit_on_error,
        });
    }

    /// Register a request whose response may arrive out of order.
    pub fn register_multiplexed(
        &mut self,
        mid: MessageId,
        deadline: Option<Instant>,
        handler: ResponseHandler,
        auto_quit_on_error: bool,
    ) {
        self.multiplexed.insert(
            mid,
            PendingEntry {
                mid,
                handler,
                deadline,
                auto_quit_on_error,
            },
        );
    }

    /// Resolve an incoming response. Returns `true` if some pending entry
    /// consumed it.
    ///
    /// Checked against `multiplexed` first, then `awaited`. An awaited
    /// entry only matches at the front of the queue -- a response for a
    /// *later* awaited request arriving before an earlier one is not a match
    /// here; it waits in the mailbox like any other message until the front
    /// entry resolves, exactly as CAF serializes synchronous awaits.
    pub fn resolve(&mut self, mid: MessageId, payload: Box<dyn AnyMessage>) -> bool {
        if let Some(entry) = self.multiplexed.remove(&mid) {
            (entry.handler)(Ok(payload));
            return true;
        }
        if matches!(self.awaited.front(), Some(entry) if entry.mid == mid) {
            if let Some(entry) = self.awaited.pop_front() {
                (entry.handler)(Ok(payload));
                return true;
            }
        }
        false
    }

    /// Fail a pending request (timeout, dead receiver, or an explicit error
    /// reply the caller chose to fold into an error rather than a value).
    ///
    /// Returns `None` if no entry matched `mid`; otherwise `Some(auto_quit)`,
    /// where `auto_quit` tells the caller (`Actor::resume`) whether it must
    /// additionally escalate to `quit(unhandled_exception)`.
    pub fn fail(&mut self, mid: MessageId, err: RuntimeError) -> Option<bool> {
        if let Some(entry) = self.multiplexed.remove(&mid) {
            let auto_quit = entry.auto_quit_on_error;
            (entry.handler)(Err(err));
            return Some(auto_quit);
        }
        if let Some(pos) = self.awaited.iter().position(|entry| entry.mid == mid) {
            if let Some(entry) = self.awaited.remove(pos) {
                let auto_quit = entry.auto_quit_on_error;
                (entry.handler)(Err(err));
                return Some(auto_quit);
            }
        }
        None
    }

    /// True while a synchronous await is blocking ordinary mail (non-empty
    /// awaited queue).
    pub fn has_awaited(&self) -> bool {
        !self.awaited.is_empty()
    }

    /// True if some pending entry (either kind) is registered for `mid`,
    /// regardless of queue position. Used to distinguish a response that's
    /// merely waiting behind an earlier awaited entry from one that has no
    /// registered entry at all (truly expired).
    pub fn contains(&self, mid: MessageId) -> bool {
        self.awaited.iter().any(|entry| entry.mid == mid) || self.multiplexed.contains_key(&mid)
    }

    /// True if `mid` is registered in the awaited queue but is not at the
    /// front -- a response that has arrived out of the program order the
    /// caller's nested requests were issued in, and so must wait in the
    /// mailbox cache until the front entry resolves.
    pub fn is_awaited_pending_non_front(&self, mid: MessageId) -> bool {
        self.awaited
            .iter()
            .enumerate()
            .any(|(index, entry)| entry.mid == mid && index > 0)
    }

    /// True if no requests of either kind are outstanding.
    pub fn is_empty(&self) -> bool {
        self.awaited.is_empty() && self.multiplexed.is_empty()
    }

    /// Fail every outstanding request, awaited entries first in FIFO order,
    /// then multiplexed entries in arbitrary order. Called once when an actor
    /// terminates, so every handler still gets to observe the failure
    /// (`RuntimeError::no_system`, typically) instead of being silently
    /// dropped with the rest of the actor's state.
    pub fn fail_all(&mut self, err: RuntimeError) {
        while let Some(entry) = self.awaited.pop_front() {
            (entry.handler)(Err(err.clone()));
        }
        for (_, entry) in self.multiplexed.drain() {
            (entry.handler)(Err(err.clone()));
        }
    }

    /// Ids of every pending entry (either kind) whose deadline has passed.
    /// The caller (the scheduler's timer-driven sweep) fails each with
    /// `RuntimeError::response_timeout` after collecting them.
    pub fn expired(&self, now: Instant) -> Vec<MessageId> {
        let mut expired = Vec::new();
        for entry in &self.awaited {
            if matches!(entry.deadline, Some(deadline) if deadline <= now) {
                expired.push(entry.mid);
            }
        }
        for entry in self.multiplexed.values() {
            if matches!(entry.deadline, Some(deadline) if deadline <= now) {
                expired.push(entry.mid);
            }
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Reply(u32);
    impl Message for Reply {
        const MESSAGE_TYPE: &'static str = "reply";
    }

    #[test]
    fn awaited_only_matches_at_the_front() {
        let mut pending = PendingResponses::new();
        let first = MessageId::new_request(1, false).response_id();
        let second = MessageId::new_request(2, false).response_id();

        let first_fired = Arc::new(AtomicBool::new(false));
        let second_fired = Arc::new(AtomicBool::new(false));
        let (ff, sf) = (first_fired.clone(), second_fired.clone());

        pending.register_awaited(first, None, Box::new(move |_| ff.store(true, Ordering::SeqCst)), true);
        pending.register_awaited(second, None, Box::new(move |_| sf.store(true, Ordering::SeqCst)), true);

        let matched = pending.resolve(second, Box::new(Reply(2)));
        assert!(!matched, "response for a non-front awaited request must not match");
        assert!(!second_fired.load(Ordering::SeqCst));

        let matched = pending.resolve(first, Box::new(Reply(1)));
        assert!(matched);
        assert!(first_fired.load(Ordering::SeqCst));

        let matched = pending.resolve(second, Box::new(Reply(2)));
        assert!(matched);
        assert!(second_fired.load(Ordering::SeqCst));
    }

    #[test]
    fn multiplexed_matches_in_any_order() {
        let mut pending = PendingResponses::new();
        let a = MessageId::new_request(1, false).response_id();
        let b = MessageId::new_request(2, false).response_id();

        pending.register_multiplexed(a, None, Box::new(|_| {}), true);
        pending.register_multiplexed(b, None, Box::new(|_| {}), true);

        assert!(pending.resolve(b, Box::new(Reply(2))));
        assert!(pending.resolve(a, Box::new(Reply(1))));
    }

    #[test]
    fn fail_delivers_an_error_to_the_handler() {
        let mut pending = PendingResponses::new();
        let mid = MessageId::new_request(1, false).response_id();
        let got_error = Arc::new(AtomicBool::new(false));
        let flag = got_error.clone();

        pending.register_multiplexed(
            mid,
            None,
            Box::new(move |result| flag.store(result.is_err(), Ordering::SeqCst)),
            true,
        );

        assert_eq!(pending.fail(mid, RuntimeError::response_timeout(mid)), Some(true));
        assert!(got_error.load(Ordering::SeqCst));
    }

    #[test]
    fn fail_reports_none_when_no_entry_is_registered_for_the_id() {
        let mut pending = PendingResponses::new();
        let mid = MessageId::new_request(1, false).response_id();
        assert_eq!(pending.fail(mid, RuntimeError::response_timeout(mid)), None);
    }

    #[test]
    fn expired_collects_only_entries_past_their_deadline() {
        let mut pending = PendingResponses::new();
        let now = Instant::now();
        let soon = MessageId::new_request(1, false).response_id();
        let later = MessageId::new_request(2, false).response_id();

        pending.register_awaited(soon, Some(now), Box::new(|_| {}), true);
        pending.register_multiplexed(
            later,
            Some(now + std::time::Duration::from_secs(60)),
            Box::new(|_| {}),
            true,
        );

        let expired = pending.expired(now);
        assert_eq!(expired, vec![soon]);
    }
}
