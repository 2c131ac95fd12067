//! The actor system: configuration, the actor registry, and `ActorSystem`
//! itself -- the handle applications hold to spawn actors and shut the
//! runtime down.

pub mod actor_system;
pub mod config;
pub mod errors;
pub mod registry;

pub use actor_system::{ActorSystem, SpawnOptions};
pub use config::{
    SystemConfig, SystemConfigBuilder, DEFAULT_ENABLE_METRICS, DEFAULT_MAILBOX_CAPACITY, DEFAULT_MAX_ACTORS,
    DEFAULT_MAX_THROUGHPUT, DEFAULT_PRIORITY_AWARE, DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_SPAWN_TIMEOUT,
    DEFAULT_WORKER_THREADS,
};
pub use errors::{RuntimeError, SystemError};
pub use registry::Registry;
