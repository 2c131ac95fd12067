//! The behavior stack: CAF-style `become`/`unbecome` over a `Vec<Arc<Behavior>>`.

use std::sync::Arc;

use super::behavior::Behavior;

/// An actor's current and suspended behaviors.
///
/// Represented as a stack of `Arc<Behavior>` rather than a single mutable
/// slot so `unbecome` can restore whatever was active before the most recent
/// `become(keep_current = true)`. Cloning the top `Arc` before dispatch (see
/// `Actor::resume`) is what lets a handler mutate the stack it is itself being
/// invoked from without the borrow checker objecting: the clone detaches the
/// handler call from any live borrow of `stack`.
///
/// The stack is never empty: the behavior an actor is spawned with sits at
/// index 0 for its entire lifetime and can be replaced but never fully popped.
pub struct BehaviorStack {
    frames: Vec<Arc<Behavior>>,
}

impl BehaviorStack {
    /// Start a stack with a single base behavior.
    pub fn new(initial: Arc<Behavior>) -> Self {
        Self {
            frames: vec![initial],
        }
    }

    /// The behavior that should handle the next message.
    ///
    /// Returns a cheap `Arc` clone, not a borrow, specifically so callers can
    /// drop their hold on `&BehaviorStack` before invoking the handler.
    pub fn current(&self) -> Arc<Behavior> {
        self.frames
            .last()
            .cloned()
            .unwrap_or_else(|| unreachable!("behavior stack is never empty"))
    }

    /// Push or swap in a new behavior.
    ///
    /// `keep_current`: if `true`, the current behavior is preserved beneath
    /// the new one and `unbecome` will restore it; if `false`, the current
    /// behavior is discarded first, so there is nothing left to `unbecome` to
    /// until a later `become(keep_current = true)` happens.
    pub fn become_behavior(&mut self, next: Arc<Behavior>, keep_current: bool) {
        if !keep_current {
            self.frames.pop();
        }
        self.frames.push(next);
    }

    /// Pop the current behavior and resume whatever was beneath it.
    ///
    /// Returns `false` and leaves the stack untouched if only the base
    /// behavior remains -- there is nothing to unbecome to.
    pub fn unbecome(&mut self) -> bool {
        if self.frames.len() > 1 {
            self.frames.pop();
            true
        } else {
            false
        }
    }

    /// Number of frames currently on the stack (always >= 1).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
