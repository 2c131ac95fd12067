//! The scheduler: a `Resumable` protocol actors implement, a work-stealing
//! pool of worker threads that drive them, and a timer facility for delayed
//! sends and behavior-level timeouts.

pub mod resumable;
pub mod timer;
pub mod worker;

pub use resumable::{ResumeOutcome, Resumable};
pub use timer::{TimeoutMarker, Timer, WakeupFn};
pub use worker::WorkerPool;
