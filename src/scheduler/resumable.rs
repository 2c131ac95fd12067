//! The scheduler-facing protocol an actor implements so a worker can run it,
//! yield it, and resume it later without ever blocking on a response.

use crate::util::ActorId;

/// What happened to a `Resumable` during one call to `resume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// The actor has terminated; the worker drops its reference.
    Done,
    /// The mailbox drained and the actor transitioned to the blocked state.
    /// It will not run again until a future enqueue reports a wakeup.
    AwaitingMessage,
    /// The actor consumed its throughput quota but still has work; the
    /// worker re-enqueues it at the tail of its run queue.
    ResumeLater,
}

/// Implemented by `Actor`. A worker holds an `Arc<dyn Resumable>` and calls
/// `resume` until it returns anything other than `ResumeLater`; the
/// scheduler's run-queue discipline guarantees at most one worker ever calls
/// `resume` on a given actor concurrently.
pub trait Resumable: Send + Sync {
    /// Process up to `max_throughput` mailbox elements.
    fn resume(&self, max_throughput: usize) -> ResumeOutcome;

    /// The identity of the actor behind this `Resumable`, for registry
    /// bookkeeping and steal-target logging.
    fn id(&self) -> ActorId;

    /// True for actors that bypass the cooperative pool entirely (their own
    /// `resume` loop runs on a dedicated OS thread via
    /// `scheduler::worker::run_detached`).
    fn is_detached(&self) -> bool {
        false
    }

    /// Force termination regardless of what the actor's own handlers would
    /// decide, used by `ActorSystem::shutdown`/`force_shutdown` to broadcast
    /// to every registered actor. A blocked or idle `Resumable` must still
    /// observe this on its next `resume` call; implementations that can sit
    /// parked need to wake themselves.
    fn request_shutdown(&self) {}
}
