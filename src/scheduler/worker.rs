//! Work-stealing pool of worker threads that run `Resumable`s to completion
//! of their throughput quota, yielding and re-queuing whatever still has
//! work.
//!
//! Each worker owns a `crossbeam::deque::Worker` (its local run queue) and
//! can steal from any other worker's `Stealer`, plus the pool-wide
//! `Injector` new spawns and wakeups land on. A worker with an empty local
//! queue tries the injector first, then picks a peer at random (`rand`) and
//! steals a batch from it -- the classic Chase-Lev work-stealing recipe
//! `crossbeam::deque` is built for.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam::deque::{Injector, Steal, Stealer, Worker as LocalQueue};
use dashmap::DashMap;
use rand::seq::SliceRandom;

use crate::scheduler::resumable::{ResumeOutcome, Resumable};
use crate::util::ActorId;

/// A runnable unit in the scheduler: the actor plus the throughput budget
/// its next `resume` call gets.
struct ScheduledActor {
    actor: Arc<dyn Resumable>,
    max_throughput: usize,
}

/// The shared state every worker thread holds a clone of.
struct Shared {
    injector: Injector<ScheduledActor>,
    stealers: Vec<Stealer<ScheduledActor>>,
    /// Actors currently registered with the pool, keyed by id. Consulted so
    /// a wakeup that arrives for an actor already sitting in a run queue
    /// doesn't enqueue it twice (`pending` tracks that).
    pending: DashMap<ActorId, ()>,
    shutdown: AtomicBool,
}

/// A running pool of worker threads.
///
/// Owned by `ActorSystem`; dropping it (after `shutdown`) joins every
/// worker thread.
pub struct WorkerPool {
    shared: Arc<Shared>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `worker_count` OS threads (at least 1), each running the
    /// cooperative loop in `run_worker`.
    pub fn start(worker_count: usize, max_throughput: usize) -> Self {
        let worker_count = worker_count.max(1);
        let locals: Vec<LocalQueue<ScheduledActor>> =
            (0..worker_count).map(|_| LocalQueue::new_fifo()).collect();
        let stealers = locals.iter().map(LocalQueue::stealer).collect();

        let shared = Arc::new(Shared {
            injector: Injector::new(),
            stealers,
            pending: DashMap::new(),
            shutdown: AtomicBool::new(false),
        });

        let handles = locals
            .into_iter()
            .enumerate()
            .map(|(index, local)| {
                let shared = shared.clone();
                std::thread::Builder::new()
                    .name(format!("flywheel-worker-{index}"))
                    .spawn(move || run_worker(shared, local, max_throughput))
                    // Thread spawn failure means the OS is out of resources;
                    // there is no caller here to hand a `Result` back to.
                    #[allow(clippy::expect_used)]
                    .expect("failed to spawn scheduler worker thread")
            })
            .collect();

        Self { shared, handles }
    }

    /// Make `actor` runnable. Idempotent: re-scheduling an actor already
    /// pending in a run queue is a no-op.
    pub fn schedule(&self, actor: Arc<dyn Resumable>, max_throughput: usize) {
        let id = actor.id();
        if self.shared.pending.insert(id, ()).is_some() {
            return;
        }
        self.shared
            .injector
            .push(ScheduledActor { actor, max_throughput });
    }

    /// Stop accepting new work and join every worker thread.
    pub fn shutdown(mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn run_worker(shared: Arc<Shared>, local: LocalQueue<ScheduledActor>, default_throughput: usize) {
    loop {
        let scheduled = local.pop().or_else(|| steal_one(&shared, &local));
        let Some(scheduled) = scheduled else {
            if shared.shutdown.load(Ordering::SeqCst) {
                return;
            }
            std::thread::yield_now();
            continue;
        };

        let budget = if scheduled.max_throughput == 0 {
            default_throughput.max(1)
        } else {
            scheduled.max_throughput
        };
        let id = scheduled.actor.id();
        shared.pending.remove(&id);

        match scheduled.actor.resume(budget) {
            ResumeOutcome::Done => {}
            ResumeOutcome::AwaitingMessage => {
                // The actor itself re-enters the pool later, via the
                // mailbox's `unblocked_reader` wakeup calling
                // `WorkerPool::schedule` again.
            }
            ResumeOutcome::ResumeLater => {
                if shared.pending.insert(id, ()).is_none() {
                    local.push(ScheduledActor {
                        actor: scheduled.actor,
                        max_throughput: budget,
                    });
                }
            }
        }

        if shared.shutdown.load(Ordering::SeqCst) && local.is_empty() {
            return;
        }
    }
}

fn steal_one(
    shared: &Shared,
    local: &LocalQueue<ScheduledActor>,
) -> Option<ScheduledActor> {
    loop {
        match shared.injector.steal_batch_and_pop(local) {
            Steal::Success(item) => return Some(item),
            Steal::Retry => continue,
            Steal::Empty => break,
        }
    }

    let mut order: Vec<usize> = (0..shared.stealers.len()).collect();
    order.shuffle(&mut rand::thread_rng());
    for index in order {
        loop {
            match shared.stealers[index].steal_batch_and_pop(local) {
                Steal::Success(item) => return Some(item),
                Steal::Retry => continue,
                Steal::Empty => break,
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct CountingActor {
        id: ActorId,
        remaining: AtomicUsize,
        done: Arc<Mutex<Vec<ActorId>>>,
    }

    impl Resumable for CountingActor {
        fn resume(&self, max_throughput: usize) -> ResumeOutcome {
            let take = max_throughput.min(self.remaining.load(Ordering::SeqCst));
            self.remaining.fetch_sub(take, Ordering::SeqCst);
            if self.remaining.load(Ordering::SeqCst) == 0 {
                self.done.lock().unwrap().push(self.id);
                ResumeOutcome::Done
            } else {
                ResumeOutcome::ResumeLater
            }
        }

        fn id(&self) -> ActorId {
            self.id
        }
    }

    #[test]
    fn schedules_and_runs_an_actor_to_completion() {
        let pool = WorkerPool::start(2, 4);
        let done = Arc::new(Mutex::new(Vec::new()));
        let actor = Arc::new(CountingActor {
            id: ActorId::new(),
            remaining: AtomicUsize::new(10),
            done: done.clone(),
        });
        let id = actor.id();

        pool.schedule(actor, 4);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        while done.lock().unwrap().is_empty() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        assert_eq!(*done.lock().unwrap(), vec![id]);
        pool.shutdown();
    }
}
