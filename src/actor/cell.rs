//! `Actor`: the concrete `Resumable` that owns a mailbox, a behavior stack,
//! and the pending-response tables, and drives the classify-dispatch loop
//! covering mailbox delivery, classification, behavior dispatch, pending
//! responses, timeouts, and scheduling.
//!
//! Grounded on CAF's `local_actor::resume`: a single synchronous loop that
//! pops, classifies, and routes each mailbox element without ever blocking
//! the calling worker thread on anything but the mailbox's own lock-light
//! `try_block` check.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::actor::classify::{classify, MessageClass};
use crate::actor::context::{ActorContext, ContextEffect};
use crate::actor::exit::{ExitReason, ExitSignal};
use crate::actor::responses::PendingResponses;
use crate::behavior::{Behavior, BehaviorStack, HandlerOutcome};
use crate::mailbox::{Mailbox, MailboxCache, MailboxError};
use crate::message::{ActorInfo, AnyMessage, ErrorResponse, MailboxElement, NoneResponse, SystemMessage};
use crate::monitoring::ActorEventSink;
use crate::scheduler::resumable::{ResumeOutcome, Resumable};
use crate::system::actor_system::ActorSystem;
use crate::system::errors::RuntimeError;
use crate::util::{ActorAddress, ActorId, MessageId};

/// `MessageId::is_request` reports `true` for `MessageId::HIGH_PRIORITY_CAST`
/// even though it tags a fire-and-forget cast (see its doc comment) -- this
/// excludes that sentinel so casts sent via `ActorContext::send_high` never
/// get bounced back to their sender as if they were unanswered requests.
fn expects_reply(mid: MessageId) -> bool {
    mid.is_request() && mid != MessageId::HIGH_PRIORITY_CAST
}

/// The runtime control block for a single actor.
///
/// Every field besides the immutable identity fields is reached only through
/// interior mutability (`Mutex`/`Atomic*`): `Resumable::resume` takes `&self`
/// because the scheduler holds actors behind `Arc<dyn Resumable>`, but the
/// run-queue discipline guarantees at most one worker ever calls `resume` on
/// a given actor concurrently, so none of these locks are ever
/// contended in practice -- they exist for `Send + Sync`, not for real
/// synchronization.
pub struct Actor {
    id: ActorId,
    name: Option<String>,
    self_address: ActorAddress,
    mailbox: Arc<Mailbox>,
    system: ActorSystem,
    detached: bool,
    event_sink: Arc<dyn ActorEventSink>,

    cache: Mutex<MailboxCache>,
    behavior_stack: Mutex<BehaviorStack>,
    pending: Mutex<PendingResponses>,
    trap_exit: AtomicBool,
    timeout_token_counter: AtomicU64,
    expected_timeout_token: Mutex<Option<u64>>,
    next_request_seq: AtomicU64,
    terminated: AtomicBool,
    exit_reason: Mutex<Option<ExitReason>>,
    monitors: Mutex<Vec<ActorAddress>>,
}

impl Actor {
    /// Build a new actor control block and arm its initial behavior's
    /// timeout, if any. Does not register or schedule it -- the caller
    /// (`ActorSystem::spawn*`) does that once it holds the `Arc`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: ActorId,
        name: Option<String>,
        self_address: ActorAddress,
        mailbox: Arc<Mailbox>,
        initial_behavior: Arc<Behavior>,
        system: ActorSystem,
        trap_exit: bool,
        detached: bool,
    ) -> Arc<Self> {
        let event_sink = system.event_sink();
        let actor = Arc::new(Self {
            id,
            name,
            self_address,
            mailbox,
            system,
            detached,
            event_sink,
            cache: Mutex::new(MailboxCache::new()),
            behavior_stack: Mutex::new(BehaviorStack::new(initial_behavior)),
            pending: Mutex::new(PendingResponses::new()),
            trap_exit: AtomicBool::new(trap_exit),
            timeout_token_counter: AtomicU64::new(0),
            expected_timeout_token: Mutex::new(None),
            next_request_seq: AtomicU64::new(0),
            terminated: AtomicBool::new(false),
            exit_reason: Mutex::new(None),
            monitors: Mutex::new(Vec::new()),
        });
        actor.event_sink.spawned(actor.id);
        actor.event_sink.started(actor.id);
        actor.rearm_timeout();
        actor
    }

    /// This actor's own weak address.
    pub fn address(&self) -> ActorAddress {
        self.self_address.clone()
    }

    fn build_context(&self, sender: Option<ActorAddress>, mid: MessageId) -> ActorContext {
        let pending = std::mem::take(&mut *self.pending.lock());
        let next_seq = self.next_request_seq.load(Ordering::Relaxed);
        ActorContext::new(
            self.id,
            self.name.clone(),
            self.self_address.clone(),
            Some(self.system.clone()),
            sender,
            mid,
            pending,
            next_seq,
        )
    }

    /// Move the context's request bookkeeping back into the actor and
    /// return the queued effects for `apply_effects`.
    fn finish_context(&self, ctx: ActorContext) -> Vec<ContextEffect> {
        let ActorContext {
            pending,
            next_request_seq,
            effects,
            ..
        } = ctx;
        *self.pending.lock() = pending;
        self.next_request_seq.store(next_request_seq, Ordering::Relaxed);
        effects
    }

    fn apply_effects(&self, effects: Vec<ContextEffect>) {
        for effect in effects {
            match effect {
                ContextEffect::Become { behavior, keep_current } => {
                    self.behavior_stack.lock().become_behavior(behavior, keep_current);
                    self.cache.lock().promote_on_become();
                    self.rearm_timeout();
                    let name = self.behavior_stack.lock().current().name();
                    self.event_sink.behavior_changed(self.id, name.to_string(), false);
                }
                ContextEffect::Unbecome => {
                    self.behavior_stack.lock().unbecome();
                    self.cache.lock().promote_on_become();
                    self.rearm_timeout();
                    let name = self.behavior_stack.lock().current().name();
                    self.event_sink.behavior_changed(self.id, name.to_string(), true);
                }
                ContextEffect::Quit(reason) => self.request_quit(reason),
            }
        }
    }

    /// Bump the timeout token and arm the current behavior's timeout, if it
    /// has one; otherwise clear the expectation entirely.
    fn rearm_timeout(&self) {
        let behavior = self.behavior_stack.lock().current();
        match behavior.timeout() {
            Some(duration) => {
                let token = self.timeout_token_counter.fetch_add(1, Ordering::SeqCst) + 1;
                *self.expected_timeout_token.lock() = Some(token);
                self.system.schedule_timeout(self.self_address.clone(), token, duration);
            }
            None => {
                *self.expected_timeout_token.lock() = None;
            }
        }
    }

    fn reply_raw(&self, sender: Option<ActorAddress>, mid: MessageId, payload: Box<dyn AnyMessage>) {
        if !expects_reply(mid) {
            return;
        }
        let Some(sender) = sender else { return };
        let Some(mailbox) = sender.upgrade() else { return };
        let element = MailboxElement::new(payload, mid.response_id(), Some(self.self_address.clone()));
        if let Ok(true) = mailbox.enqueue(element) {
            self.system.notify_wakeup(sender.id());
        }
    }

    /// Record the first termination reason seen and mark the actor for
    /// shutdown at the end of the current `resume` iteration. Later calls
    /// (e.g. a `quit` queued the same dispatch as an unhandled exception)
    /// don't overwrite the original reason.
    fn request_quit(&self, reason: ExitReason) {
        let mut slot = self.exit_reason.lock();
        if slot.is_none() {
            if !reason.is_normal() {
                self.event_sink.error_occurred(self.id, reason.to_string());
            }
            *slot = Some(reason);
        }
        self.terminated.store(true, Ordering::Release);
    }

    fn handle_sys(&self, element: MailboxElement) {
        let mid = element.mid();
        let sender = element.sender().cloned();
        let Some(sys) = element.payload().downcast_ref::<SystemMessage>() else {
            return;
        };
        match sys {
            SystemMessage::Info => {
                let info = ActorInfo {
                    id: self.id,
                    name: self.name.clone(),
                    mailbox_len: self.mailbox.len(),
                };
                self.reply_raw(sender, mid, Box::new(info));
            }
            SystemMessage::Terminate => self.request_quit(ExitReason::Normal),
            SystemMessage::Monitor(watcher) => {
                self.monitors.lock().push(watcher.clone());
            }
            SystemMessage::Unknown(key) => {
                let err = RuntimeError::invalid_sys_key(key.clone());
                self.reply_raw(sender, mid, Box::new(ErrorResponse(err)));
            }
            SystemMessage::ResponseTimeout(timed_out_mid) => {
                let timed_out_mid = *timed_out_mid;
                let mut pending = self.pending.lock();
                if !pending.contains(timed_out_mid) {
                    return;
                }
                let auto_quit = pending.fail(timed_out_mid, RuntimeError::response_timeout(timed_out_mid));
                drop(pending);
                self.event_sink
                    .pending_response_timed_out(self.id, timed_out_mid.to_string());
                if auto_quit == Some(true) {
                    self.request_quit(ExitReason::UnhandledException(format!(
                        "request {timed_out_mid} timed out with no recovering handler"
                    )));
                }
            }
        }
    }

    /// Route an incoming response: multiplexed first, then the front
    /// of the awaited queue. A response pending behind an earlier awaited
    /// entry is cached for retry once that entry resolves; a response with
    /// no registered entry at all is a truly expired match and is dropped.
    fn handle_response(&self, element: MailboxElement) {
        let mid = element.mid();
        let mut pending = self.pending.lock();
        if pending.is_awaited_pending_non_front(mid) {
            drop(pending);
            self.cache.lock().push_skipped(element);
            return;
        }
        if !pending.contains(mid) {
            return;
        }

        let payload = element.into_payload();
        let error_override = if let Some(err_resp) = payload.downcast_ref::<ErrorResponse>() {
            Some(err_resp.0.clone())
        } else if payload.downcast_ref::<NoneResponse>().is_some() {
            Some(RuntimeError::unexpected_response(mid))
        } else {
            None
        };

        let auto_quit = match error_override {
            Some(err) => pending.fail(mid, err),
            None => {
                pending.resolve(mid, payload);
                None
            }
        };
        drop(pending);

        if auto_quit == Some(true) {
            self.request_quit(ExitReason::UnhandledException(format!(
                "request {mid} failed with no recovering handler"
            )));
        }
    }

    /// Fire the current behavior's timeout handler, unless the actor is
    /// currently blocked on an awaited response -- async timeouts are
    /// ignored while a synchronous-style receive is in progress.
    fn handle_timeout(&self) {
        if self.pending.lock().has_awaited() {
            return;
        }
        let behavior = self.behavior_stack.lock().current();
        let mut ctx = self.build_context(None, MessageId::NONE);
        behavior.fire_timeout(&mut ctx);
        let effects = self.finish_context(ctx);
        *self.expected_timeout_token.lock() = None;
        self.apply_effects(effects);
    }

    /// Dispatch an ordinary element against the current top behavior. The
    /// top-level call (from `handle_element`) drains the cache afterward on
    /// a successful dispatch; retries issued from inside that drain pass
    /// `drain_after: false` so the drain loop itself -- not recursion --
    /// accounts for any further progress they make.
    fn dispatch_ordinary(&self, element: MailboxElement, drain_after: bool) {
        let mid = element.mid();
        let sender = element.sender().cloned();
        let behavior = self.behavior_stack.lock().current();
        let mut ctx = self.build_context(sender.clone(), mid);
        let outcome = behavior.dispatch(&mut ctx, element.payload());
        let effects = self.finish_context(ctx);
        let mut dispatched = false;

        match outcome {
            None => {
                if expects_reply(mid) {
                    let message_type = element.payload().message_type();
                    self.reply_raw(
                        sender,
                        mid,
                        Box::new(ErrorResponse(RuntimeError::unexpected_message(message_type))),
                    );
                    self.request_quit(ExitReason::UnhandledMessage(message_type.to_string()));
                } else {
                    // No pattern or fallback had an opinion about a
                    // fire-and-forget message: hold it for a future
                    // behavior rather than treating it as an error. Spec is
                    // silent on this exact sub-case; this mirrors how an
                    // explicit `Skip` is handled.
                    self.cache.lock().push_skipped(element);
                }
            }
            Some(HandlerOutcome::Handled) => dispatched = true,
            Some(HandlerOutcome::Skip) => {
                self.cache.lock().push_skipped(element);
            }
            Some(HandlerOutcome::Forward(target)) => {
                let payload = element.into_payload();
                if let Some(mailbox) = target.upgrade() {
                    let forwarded = MailboxElement::new(payload, mid, sender);
                    if let Ok(true) = mailbox.enqueue(forwarded) {
                        self.system.notify_wakeup(target.id());
                    }
                }
                dispatched = true;
            }
        }

        self.apply_effects(effects);

        if drain_after && dispatched {
            self.drain_cache_after_dispatch();
        }
    }

    fn handle_ordinary(&self, element: MailboxElement) {
        self.dispatch_ordinary(element, true);
    }

    /// After a successful ordinary dispatch, re-attempt every cached element
    /// against the (possibly new) top behavior, in full rounds, until a
    /// round makes no progress. A cached element isn't necessarily ordinary
    /// mail -- `handle_response` also caches a response that arrived out of
    /// order -- so each retry goes back through full classification rather
    /// than assuming it's still the same kind of message.
    fn drain_cache_after_dispatch(&self) {
        loop {
            let round_len = self.cache.lock().len();
            if round_len == 0 {
                return;
            }
            let mut progressed = false;
            for _ in 0..round_len {
                let Some(element) = self.cache.lock().take_next() else {
                    break;
                };
                let before = self.cache.lock().len();
                self.retry_cached_element(element);
                if self.cache.lock().len() <= before {
                    progressed = true;
                }
            }
            if !progressed {
                return;
            }
        }
    }

    fn retry_cached_element(&self, element: MailboxElement) {
        let expected_token = *self.expected_timeout_token.lock();
        let trap_exit = self.trap_exit.load(Ordering::Relaxed);
        match classify(&element, expected_token, trap_exit) {
            MessageClass::NormalExit | MessageClass::NonNormalExit | MessageClass::ExpiredTimeout => {}
            MessageClass::Timeout => self.handle_timeout(),
            MessageClass::Response => self.handle_response(element),
            MessageClass::SysMessage => self.handle_sys(element),
            MessageClass::Ordinary => self.dispatch_ordinary(element, false),
        }
    }

    fn handle_element(&self, element: MailboxElement) {
        let expected_token = *self.expected_timeout_token.lock();
        let trap_exit = self.trap_exit.load(Ordering::Relaxed);
        match classify(&element, expected_token, trap_exit) {
            MessageClass::NormalExit | MessageClass::NonNormalExit | MessageClass::ExpiredTimeout => {
                // Monitor notifications never propagate back onto the
                // watcher's own lifecycle (see `message::system::SystemMessage::Monitor`);
                // an expired timeout is simply stale.
            }
            MessageClass::Timeout => self.handle_timeout(),
            MessageClass::Response => self.handle_response(element),
            MessageClass::SysMessage => self.handle_sys(element),
            MessageClass::Ordinary => self.handle_ordinary(element),
        }
    }

    /// Close the mailbox, bounce whatever mail is still in flight, fail
    /// every pending request, and notify monitors -- run exactly once, at
    /// the moment `resume` observes `terminated`.
    fn terminate(&self) {
        let reason = self.exit_reason.lock().take().unwrap_or(ExitReason::Normal);

        self.pending.lock().fail_all(RuntimeError::no_system());

        let bounced = self.mailbox.close_and_drain();
        let cached = self.cache.lock().drain();
        for element in bounced.into_iter().chain(cached) {
            let sender = element.sender().cloned();
            let mid = element.mid();
            self.reply_raw(sender, mid, Box::new(ErrorResponse(RuntimeError::request_receiver_down(mid))));
        }

        let monitors = std::mem::take(&mut *self.monitors.lock());
        for watcher in monitors {
            if let Some(mailbox) = watcher.upgrade() {
                let signal = ExitSignal {
                    who: self.id,
                    reason: reason.clone(),
                };
                let element = MailboxElement::new(Box::new(signal), MessageId::NONE, Some(self.self_address.clone()));
                if let Ok(true) = mailbox.enqueue(element) {
                    self.system.notify_wakeup(watcher.id());
                }
            }
        }

        self.event_sink.stopped(self.id);
        self.system.deregister(self.id);
    }
}

impl Resumable for Actor {
    fn resume(&self, max_throughput: usize) -> ResumeOutcome {
        let mut processed = 0usize;
        loop {
            if processed >= max_throughput {
                self.event_sink.resume_transition(self.id, "resume_later");
                return ResumeOutcome::ResumeLater;
            }

            let element = self.cache.lock().take_previous().or_else(|| self.mailbox.try_pop());
            let Some(element) = element else {
                match self.mailbox.try_block() {
                    Ok(()) => {
                        self.event_sink.resume_transition(self.id, "awaiting_message");
                        return ResumeOutcome::AwaitingMessage;
                    }
                    Err(MailboxError::ConcurrentUnblock) => continue,
                    Err(MailboxError::Closed) => {
                        self.terminated.store(true, Ordering::Release);
                        self.terminate();
                        self.event_sink.resume_transition(self.id, "done");
                        return ResumeOutcome::Done;
                    }
                }
            };

            let message_type = element.payload().message_type();
            self.event_sink.message_received(self.id, message_type);
            let started_at = std::time::Instant::now();
            self.handle_element(element);
            self.event_sink
                .message_processed(self.id, message_type, started_at.elapsed().as_micros() as u64);
            processed += 1;

            if self.terminated.load(Ordering::Acquire) {
                self.terminate();
                self.event_sink.resume_transition(self.id, "done");
                return ResumeOutcome::Done;
            }
        }
    }

    fn id(&self) -> ActorId {
        self.id
    }

    fn is_detached(&self) -> bool {
        self.detached
    }

    /// Force termination even if the actor is currently idle/blocked: a
    /// flag-only `request_quit` wouldn't be observed until the next
    /// `resume` call, so this also enqueues a `SystemMessage::Terminate`
    /// that `handle_sys` would process anyway, purely to guarantee a
    /// `resume` call happens and notices `terminated`.
    fn request_shutdown(&self) {
        self.request_quit(ExitReason::Killed);
        let element = MailboxElement::new(Box::new(SystemMessage::Terminate), MessageId::NONE, None);
        if let Ok(true) = self.mailbox.enqueue(element) {
            self.system.notify_wakeup(self.id);
        }
    }
}
