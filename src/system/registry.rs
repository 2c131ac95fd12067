//! The actor registry: `ActorId -> Arc<dyn Resumable>` and `name -> ActorId`,
//! the lookup `ActorSystem` consults to resolve a wakeup, a scheduled
//! timeout, or a delayed send back to a live actor.
//!
//! Back-edges in the actor graph are relations, not ownership, and resolve
//! through the registry. Everything an actor hands out externally (`ActorAddress`) is
//! already weak, so the registry is the only place in the system that holds
//! a strong reference to each actor, keeping it alive between `resume` calls
//! while it sits blocked on its own mailbox.

use dashmap::DashMap;

use crate::scheduler::resumable::Resumable;
use crate::util::ActorId;
use std::sync::Arc;

/// Concurrent lock-free registry backing `ActorSystem`'s routing.
#[derive(Default)]
pub struct Registry {
    by_id: DashMap<ActorId, Arc<dyn Resumable>>,
    names: DashMap<String, ActorId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: ActorId, name: Option<&str>, actor: Arc<dyn Resumable>) {
        self.by_id.insert(id, actor);
        if let Some(name) = name {
            self.names.insert(name.to_string(), id);
        }
    }

    pub fn get(&self, id: ActorId) -> Option<Arc<dyn Resumable>> {
        self.by_id.get(&id).map(|entry| entry.clone())
    }

    pub fn resolve_name(&self, name: &str) -> Option<ActorId> {
        self.names.get(name).map(|entry| *entry)
    }

    /// Drop the registry's strong reference to a terminated actor. Called
    /// once from `Actor::terminate`; any name binding is dropped alongside
    /// it since a dead name should not resolve to a stale id.
    pub fn remove(&self, id: ActorId) {
        if let Some((_, actor)) = self.by_id.remove(&id) {
            drop(actor);
        }
        self.names.retain(|_, bound_id| *bound_id != id);
    }

    /// Every currently-registered actor id, snapshotted for a broadcast
    /// (e.g. system shutdown). Order is unspecified.
    pub fn ids(&self) -> Vec<ActorId> {
        self.by_id.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
