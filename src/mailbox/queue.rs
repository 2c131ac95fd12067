//! The actor-facing mailbox: a priority-partitioned MPSC queue with an explicit
//! open/blocked/closed state machine the scheduler uses to decide whether an
//! actor needs to be rescheduled.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use std::collections::VecDeque;

use super::traits::MailboxError;
use crate::message::MailboxElement;
use crate::monitoring::{MailboxEventSink, NoopMailboxEventSink};
use crate::util::ActorId;

const OPEN: u8 = 0;
const BLOCKED: u8 = 1;
const CLOSED: u8 = 2;

/// The queue backing a single actor's inbox.
///
/// Any number of senders may call `enqueue` concurrently; exactly one consumer
/// (the actor's own `resume` invocation, run by at most one scheduler worker at
/// a time) calls `try_pop`/`try_block`. Two `VecDeque`s back the queue -- one for
/// high-priority mail, one for everything else -- and high-priority mail always
/// drains first.
///
/// `status` tracks whether the mailbox is actively draining (`OPEN`), has told
/// the scheduler there is nothing left to do (`BLOCKED`), or will never accept
/// more mail (`CLOSED`). The `BLOCKED -> OPEN` transition on `enqueue` is the
/// signal a scheduler uses to know an idle actor needs to be woken up again.
pub struct Mailbox {
    actor_id: ActorId,
    status: AtomicU8,
    high: Mutex<VecDeque<MailboxElement>>,
    normal: Mutex<VecDeque<MailboxElement>>,
    detached: bool,
    priority_aware: bool,
    capacity: Option<usize>,
    event_sink: Arc<dyn MailboxEventSink>,
}

impl Mailbox {
    /// Create a new, open, empty, unbounded mailbox with priority-aware
    /// draining and no event observation. Used by tests and call sites that
    /// don't need backpressure or monitoring; `ActorSystem::spawn*` builds
    /// its mailboxes via [`Self::bounded`] instead.
    ///
    /// `detached` marks mailboxes owned by actors that run on their own OS
    /// thread rather than the work-stealing pool (see `scheduler::detached`);
    /// the queue behaves identically either way, but the scheduler consults the
    /// flag to decide whether a wakeup needs to go through the pool at all.
    pub fn new(detached: bool) -> Self {
        Self::with_priority_awareness(detached, true)
    }

    /// Create a mailbox, choosing whether high-priority mail actually jumps
    /// the queue. A system-wide `priority_aware = false` still routes mail
    /// into the same two partitions but `try_pop` drains strict FIFO across
    /// both, which matters for tests and deployments that want arrival order
    /// preserved regardless of [`MailboxElement::is_high_priority`].
    pub fn with_priority_awareness(detached: bool, priority_aware: bool) -> Self {
        Self {
            actor_id: ActorId::new(),
            status: AtomicU8::new(OPEN),
            high: Mutex::new(VecDeque::new()),
            normal: Mutex::new(VecDeque::new()),
            detached,
            priority_aware,
            capacity: None,
            event_sink: Arc::new(NoopMailboxEventSink),
        }
    }

    /// Create a mailbox bound to `actor_id`, rejecting `enqueue` once it
    /// holds `capacity` elements and reporting every enqueue/dequeue/
    /// backpressure transition to `event_sink`.
    pub fn bounded(
        detached: bool,
        priority_aware: bool,
        actor_id: ActorId,
        capacity: Option<usize>,
        event_sink: Arc<dyn MailboxEventSink>,
    ) -> Self {
        Self {
            actor_id,
            status: AtomicU8::new(OPEN),
            high: Mutex::new(VecDeque::new()),
            normal: Mutex::new(VecDeque::new()),
            detached,
            priority_aware,
            capacity,
            event_sink,
        }
    }

    /// True if this mailbox belongs to a detached (non-pooled) actor.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Enqueue an element, routing it to the high or normal queue based on
    /// [`MailboxElement::is_high_priority`].
    ///
    /// Returns `Ok(true)` if this call observed the mailbox transition from
    /// `BLOCKED` to `OPEN` -- the caller (an `ActorContext::send`/`request`
    /// implementation) must notify the scheduler to reschedule the actor in
    /// that case, since the actor had declared itself idle.
    ///
    /// Once `len()` reaches `capacity` (if bounded), the element is rejected
    /// rather than queued -- the only backpressure strategy a synchronous,
    /// non-blocking `enqueue` can apply without stalling the sender.
    pub fn enqueue(&self, element: MailboxElement) -> Result<bool, MailboxError> {
        if self.status.load(Ordering::Acquire) == CLOSED {
            return Err(MailboxError::Closed);
        }
        if let Some(capacity) = self.capacity {
            if self.len() >= capacity {
                self.event_sink.capacity_reached(self.actor_id);
                self.event_sink.backpressure_applied(self.actor_id, "error");
                self.event_sink
                    .message_dropped(self.actor_id, "mailbox at capacity".to_string());
                return Err(MailboxError::CapacityReached);
            }
        }
        if self.priority_aware && element.is_high_priority() {
            self.high.lock().push_back(element);
        } else {
            self.normal.lock().push_back(element);
        }
        self.event_sink.enqueued(self.actor_id, self.len());
        match self
            .status
            .compare_exchange(BLOCKED, OPEN, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    /// Pop the next element, high-priority queue first. Does not block.
    pub fn try_pop(&self) -> Option<MailboxElement> {
        let popped = self
            .high
            .lock()
            .pop_front()
            .or_else(|| self.normal.lock().pop_front());
        if popped.is_some() {
            self.event_sink.dequeued(self.actor_id, self.len());
        }
        popped
    }

    /// Attempt to mark the mailbox `BLOCKED`, telling the scheduler this actor
    /// has no more work and can be parked until the next `enqueue`.
    ///
    /// Both queues are locked and checked for emptiness before the transition,
    /// closing the race where a sender enqueues between the caller's last
    /// `try_pop` and this call: if either queue is non-empty, returns
    /// [`MailboxError::ConcurrentUnblock`] so the caller re-drains instead of
    /// parking with unread mail sitting in the queue.
    pub fn try_block(&self) -> Result<(), MailboxError> {
        let high = self.high.lock();
        let normal = self.normal.lock();
        if !high.is_empty() || !normal.is_empty() {
            return Err(MailboxError::ConcurrentUnblock);
        }
        match self
            .status
            .compare_exchange(OPEN, BLOCKED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) | Err(BLOCKED) => Ok(()),
            Err(_) => Err(MailboxError::Closed),
        }
    }

    /// Permanently close the mailbox. Further `enqueue` calls fail.
    pub fn close(&self) {
        self.status.store(CLOSED, Ordering::Release);
    }

    /// Close the mailbox and drain whatever mail was still sitting in it,
    /// high-priority first, for a terminating actor to bounce back to
    /// senders or dead-letter.
    pub fn close_and_drain(&self) -> Vec<MailboxElement> {
        self.status.store(CLOSED, Ordering::Release);
        let mut high = self.high.lock();
        let mut normal = self.normal.lock();
        high.drain(..).chain(normal.drain(..)).collect()
    }

    /// True once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.status.load(Ordering::Acquire) == CLOSED
    }

    /// True while the mailbox has told the scheduler it has no pending work.
    pub fn is_blocked(&self) -> bool {
        self.status.load(Ordering::Acquire) == BLOCKED
    }

    /// Approximate combined queue depth across both priority partitions.
    pub fn len(&self) -> usize {
        self.high.lock().len() + self.normal.lock().len()
    }

    /// True if both priority partitions are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
