//! `ActorSystem`: the handle applications hold to spawn actors and shut the
//! runtime down. Owns the registry, the work-stealing pool, the timer, and
//! (for `enable_metrics` deployments) the synchronous event sink every
//! `Actor` reports lifecycle events to.
//!
//! Avoids implicit singletons: nothing here is global --
//! every actor holds its own clone of the `ActorSystem` that spawned it, and
//! every test builds its own system rather than reaching for a process-wide
//! instance.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::actor::cell::Actor;
use crate::behavior::Behavior;
use crate::mailbox::Mailbox;
use crate::message::AnyMessage;
use crate::monitoring::{
    ActorEventSink, InMemoryEventSink, InMemoryMailboxEventSink, MailboxEventSink, NoopEventSink,
    NoopMailboxEventSink,
};
use crate::scheduler::resumable::Resumable;
use crate::scheduler::timer::{Timer, WakeupFn};
use crate::scheduler::worker::WorkerPool;
use crate::system::config::SystemConfig;
use crate::system::errors::SystemError;
use crate::system::registry::Registry;
use crate::util::{ActorAddress, ActorHandle, ActorId, MessageId};

/// Options controlling how a single actor is spawned, independent of the
/// system-wide `SystemConfig` defaults.
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    /// Register the actor under this name in addition to its id.
    pub name: Option<String>,
    /// Start the actor with `trap_exit` enabled (exit signals delivered as
    /// ordinary messages instead of terminating the receiver).
    pub trap_exit: bool,
    /// Override `SystemConfig::priority_aware` for this actor's mailbox.
    pub priority_aware: Option<bool>,
}

impl SpawnOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_trap_exit(mut self, trap_exit: bool) -> Self {
        self.trap_exit = trap_exit;
        self
    }
}

struct Inner {
    config: SystemConfig,
    registry: Registry,
    pool: Mutex<Option<WorkerPool>>,
    timer: Timer,
    event_sink: Arc<dyn ActorEventSink>,
    mailbox_event_sink: Arc<dyn MailboxEventSink>,
    // Kept alive for as long as the system exists: `Timer` only holds a
    // `tokio::runtime::Handle`, which becomes useless once its runtime drops.
    _runtime: Option<tokio::runtime::Runtime>,
    actor_count: AtomicUsize,
    shutting_down: AtomicBool,
    // Dedicated OS threads for spawn_detached/spawn_blocking actors,
    // parked between resume calls; notify_wakeup unparks the matching entry
    // instead of handing the actor to the pool.
    detached_threads: dashmap::DashMap<ActorId, std::thread::Thread>,
}

/// The shared handle to a running actor runtime.
///
/// Cloning an `ActorSystem` is cheap (an `Arc` clone) and is how an actor
/// holds onto the system that spawned it without owning it outright.
#[derive(Clone)]
pub struct ActorSystem {
    inner: Arc<Inner>,
}

impl ActorSystem {
    /// Build a system from `config`, spawning its worker pool and a
    /// dedicated background tokio runtime to drive the timer facility.
    ///
    /// Infallible by construction (the scheduler's own worker threads use
    /// the same "spawning a thread is an unrecoverable environment failure"
    /// idiom as `WorkerPool::start`); a `SystemConfig` is validated ahead of
    /// time by `SystemConfig::builder().build()` if the caller wants a
    /// fallible path.
    pub fn new(config: SystemConfig) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .thread_name("flywheel-timer")
            .build()
            // Runtime construction only fails if the OS can't give us a
            // thread; nothing upstream of `ActorSystem::new` can recover
            // from that.
            #[allow(clippy::expect_used)]
            .expect("failed to start the background timer runtime");
        let handle = runtime.handle().clone();

        let event_sink: Arc<dyn ActorEventSink> = if config.enable_metrics {
            Arc::new(InMemoryEventSink::new(config.default_mailbox_capacity.max(64)))
        } else {
            Arc::new(NoopEventSink)
        };
        let mailbox_event_sink: Arc<dyn MailboxEventSink> = if config.enable_metrics {
            Arc::new(InMemoryMailboxEventSink::new(config.default_mailbox_capacity.max(64)))
        } else {
            Arc::new(NoopMailboxEventSink)
        };

        let pool = WorkerPool::start(config.worker_threads, config.max_throughput);

        let inner = Arc::new(Inner {
            pool: Mutex::new(Some(pool)),
            timer: Timer::new(handle),
            event_sink,
            mailbox_event_sink,
            _runtime: Some(runtime),
            actor_count: AtomicUsize::new(0),
            shutting_down: AtomicBool::new(false),
            detached_threads: dashmap::DashMap::new(),
            registry: Registry::new(),
            config,
        });

        Self { inner }
    }

    /// A system sized for unit tests: a single worker thread, no metrics.
    /// Actors built directly with `Actor::new` (rather than through `spawn`)
    /// use this to get a working `ActorSystem` for their timer/wakeup calls.
    pub fn for_test() -> Self {
        Self::new(SystemConfig {
            worker_threads: 1,
            ..SystemConfig::default()
        })
    }

    pub fn config(&self) -> &SystemConfig {
        &self.inner.config
    }

    pub fn event_sink(&self) -> Arc<dyn ActorEventSink> {
        self.inner.event_sink.clone()
    }

    pub fn mailbox_event_sink(&self) -> Arc<dyn MailboxEventSink> {
        self.inner.mailbox_event_sink.clone()
    }

    pub fn actor_count(&self) -> usize {
        self.inner.actor_count.load(Ordering::Acquire)
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::Acquire)
    }

    fn wakeup_fn(&self) -> WakeupFn {
        let system = self.clone();
        Arc::new(move |id| system.notify_wakeup(id))
    }

    fn build_actor(
        &self,
        behavior: Arc<Behavior>,
        options: SpawnOptions,
        detached: bool,
    ) -> Result<(Arc<Actor>, ActorHandle), SystemError> {
        if self.is_shutting_down() {
            return Err(SystemError::ShuttingDown);
        }
        if self.inner.config.max_actors > 0 {
            let current = self.actor_count();
            if current >= self.inner.config.max_actors {
                return Err(SystemError::ActorLimitExceeded {
                    current,
                    max: self.inner.config.max_actors,
                });
            }
        }

        let priority_aware = options.priority_aware.unwrap_or(self.inner.config.priority_aware);
        let id = ActorId::new();
        let mailbox = Arc::new(Mailbox::bounded(
            detached,
            priority_aware,
            id,
            Some(self.inner.config.default_mailbox_capacity),
            self.inner.mailbox_event_sink.clone(),
        ));
        let address = ActorAddress::new(id, options.name.clone(), Arc::downgrade(&mailbox));
        let handle = ActorHandle::new(id, options.name.clone(), mailbox.clone());

        let actor = Actor::new(
            id,
            options.name.clone(),
            address,
            mailbox,
            behavior,
            self.clone(),
            options.trap_exit,
            detached,
        );

        self.inner
            .registry
            .insert(id, options.name.as_deref(), actor.clone());
        self.inner.actor_count.fetch_add(1, Ordering::AcqRel);

        self.inner.event_sink.spawned(id);

        Ok((actor, handle))
    }

    /// Spawn an actor onto the cooperative work-stealing pool.
    pub fn spawn(&self, behavior: Arc<Behavior>, options: SpawnOptions) -> Result<ActorHandle, SystemError> {
        let (actor, handle) = self.build_actor(behavior, options, false)?;
        self.schedule(actor);
        Ok(handle)
    }

    /// Spawn an actor that owns its own OS thread rather than sharing the
    /// pool, looping on `resume` with unbounded throughput and parking
    /// between mailbox drains. Intended for actors whose handlers do
    /// blocking I/O that would stall a pooled worker.
    pub fn spawn_detached(&self, behavior: Arc<Behavior>, options: SpawnOptions) -> Result<ActorHandle, SystemError> {
        let (actor, handle) = self.build_actor(behavior, options, true)?;
        self.launch_detached(actor);
        Ok(handle)
    }

    /// Alias for `spawn_detached`: callers distinguish "detached" (long-lived,
    /// self-scheduling) from "blocking" (a single blocking call) actors, but
    /// both bypass the pool identically here.
    pub fn spawn_blocking(&self, behavior: Arc<Behavior>, options: SpawnOptions) -> Result<ActorHandle, SystemError> {
        self.spawn_detached(behavior, options)
    }

    fn launch_detached(&self, actor: Arc<Actor>) {
        let id = actor.id();
        let max_throughput = self.inner.config.max_throughput;
        let system = self.clone();
        let thread = std::thread::Builder::new()
            .name(format!("flywheel-detached-{id}"))
            .spawn(move || {
                use crate::scheduler::resumable::ResumeOutcome;
                loop {
                    match actor.resume(max_throughput.max(1)) {
                        ResumeOutcome::Done => break,
                        ResumeOutcome::ResumeLater => continue,
                        ResumeOutcome::AwaitingMessage => {
                            std::thread::park_timeout(Duration::from_millis(100));
                        }
                    }
                }
                system.inner.detached_threads.remove(&id);
            })
            // Same unrecoverable-environment-failure idiom as `WorkerPool::start`.
            #[allow(clippy::expect_used)]
            .expect("failed to spawn detached actor thread");
        self.inner.detached_threads.insert(id, thread.thread().clone());
    }

    /// Make `actor` runnable on the pool. Called from `spawn` and from a
    /// mailbox wakeup that fires while the actor isn't already scheduled.
    fn schedule(&self, actor: Arc<Actor>) {
        let pool = self.inner.pool.lock();
        if let Some(pool) = pool.as_ref() {
            pool.schedule(actor, self.inner.config.max_throughput);
        }
    }

    /// Reschedule `id` after a mailbox observed a `BLOCKED -> OPEN`
    /// transition. A no-op for an id the registry no longer knows about
    /// (the actor already terminated and was deregistered).
    pub fn notify_wakeup(&self, id: ActorId) {
        if let Some(thread) = self.inner.detached_threads.get(&id) {
            thread.unpark();
            return;
        }
        if let Some(actor) = self.inner.registry.get(id) {
            let pool = self.inner.pool.lock();
            if let Some(pool) = pool.as_ref() {
                pool.schedule(actor, self.inner.config.max_throughput);
            }
        }
    }

    /// Drop the registry's reference to a terminated actor. Called exactly
    /// once, from `Actor::terminate`.
    pub fn deregister(&self, id: ActorId) {
        self.inner.registry.remove(id);
        self.inner.actor_count.fetch_sub(1, Ordering::AcqRel);
    }

    /// Arm a behavior-level timeout for `target`, carrying `token`.
    pub fn schedule_timeout(&self, target: ActorAddress, token: u64, delay: Duration) {
        self.inner.timer.schedule_timeout(target, token, delay, self.wakeup_fn());
    }

    /// Schedule a delayed send on behalf of `ActorContext::delayed_send`.
    pub fn schedule_delayed_send(&self, target: ActorAddress, payload: Box<dyn AnyMessage>, delay: Duration) {
        self.inner
            .timer
            .schedule(target, payload, MessageId::NONE, delay, self.wakeup_fn());
    }

    /// Ask every registered actor to terminate, then wait (up to
    /// `SystemConfig::shutdown_timeout`) for the registry to drain before
    /// joining the worker pool. Returns `SystemError::ShutdownTimeout` if
    /// actors are still alive once the deadline passes -- the pool is left
    /// running in that case so in-flight work can still complete.
    pub fn shutdown(&self) -> Result<(), SystemError> {
        if self.inner.shutting_down.swap(true, Ordering::AcqRel) {
            return Err(SystemError::ShuttingDown);
        }
        self.broadcast_shutdown();

        let deadline = std::time::Instant::now() + self.inner.config.shutdown_timeout;
        while self.actor_count() > 0 {
            if std::time::Instant::now() >= deadline {
                return Err(SystemError::ShutdownTimeout(self.inner.config.shutdown_timeout));
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        self.join_pool();
        Ok(())
    }

    /// Signal every actor to terminate and join the pool immediately,
    /// without waiting for the registry to drain first.
    pub fn force_shutdown(&self) {
        self.inner.shutting_down.store(true, Ordering::Release);
        self.broadcast_shutdown();
        self.join_pool();
    }

    fn broadcast_shutdown(&self) {
        for id in self.inner.registry.ids() {
            if let Some(actor) = self.inner.registry.get(id) {
                actor.request_shutdown();
            }
        }
    }

    fn join_pool(&self) {
        if let Some(pool) = self.inner.pool.lock().take() {
            pool.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::HandlerOutcome;
    use crate::message::Message;

    #[derive(Debug)]
    struct Ping;
    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "ping";
    }

    fn noop_behavior() -> Arc<Behavior> {
        Behavior::builder("noop")
            .on::<Ping, _>(|_ctx, _msg| HandlerOutcome::Handled)
            .build()
    }

    #[test]
    fn for_test_builds_a_usable_system() {
        let system = ActorSystem::for_test();
        assert_eq!(system.actor_count(), 0);
        assert!(!system.is_shutting_down());
    }

    #[test]
    fn spawn_registers_the_actor_and_bumps_the_count() {
        let system = ActorSystem::for_test();
        let handle = system.spawn(noop_behavior(), SpawnOptions::named("pinger")).unwrap();
        assert_eq!(system.actor_count(), 1);
        assert_eq!(handle.name(), Some("pinger"));
    }

    #[test]
    fn spawn_after_shutdown_is_rejected() {
        let system = ActorSystem::for_test();
        system.force_shutdown();
        let err = system.spawn(noop_behavior(), SpawnOptions::default()).unwrap_err();
        assert_eq!(err, SystemError::ShuttingDown);
    }

    #[test]
    fn spawn_rejects_once_max_actors_is_reached() {
        let config = SystemConfig {
            worker_threads: 1,
            max_actors: 1,
            ..SystemConfig::default()
        };
        let system = ActorSystem::new(config);
        system.spawn(noop_behavior(), SpawnOptions::default()).unwrap();
        let err = system.spawn(noop_behavior(), SpawnOptions::default()).unwrap_err();
        assert!(matches!(err, SystemError::ActorLimitExceeded { current: 1, max: 1 }));
    }

    #[test]
    fn shutdown_drains_the_registry_and_is_idempotent_in_failure() {
        let system = ActorSystem::for_test();
        let _handle = system.spawn(noop_behavior(), SpawnOptions::default()).unwrap();

        system.shutdown().unwrap();
        assert_eq!(system.actor_count(), 0);
        assert!(system.is_shutting_down());

        let err = system.shutdown().unwrap_err();
        assert_eq!(err, SystemError::ShuttingDown);
    }

    #[test]
    fn force_shutdown_returns_without_waiting_for_drain() {
        let system = ActorSystem::for_test();
        let _handle = system.spawn(noop_behavior(), SpawnOptions::default()).unwrap();
        system.force_shutdown();
        assert!(system.is_shutting_down());
    }
}
