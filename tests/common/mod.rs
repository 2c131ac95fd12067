//! Shared harness for the end-to-end scenario tests: a polling helper (the
//! real scheduler runs on background worker threads, so nothing here is
//! synchronous) and a way to mint an `ActorAddress` to use as an external
//! "client" reply target without reaching into crate-private constructors.

use std::sync::Arc;
use std::time::{Duration, Instant};

use flywheel_rt::prelude::*;

pub fn poll_until<T>(timeout: Duration, mut attempt: impl FnMut() -> Option<T>) -> Option<T> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = attempt() {
            return Some(value);
        }
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
}

/// A spawned actor with no behavior of its own, used purely as an external
/// test's own address/mailbox for sends and replies to land on.
pub fn spawn_client(system: &ActorSystem) -> ActorHandle {
    system
        .spawn(Behavior::builder("test-client").build(), SpawnOptions::default())
        .expect("spawn test client")
}

pub fn send(system: &ActorSystem, target: &ActorAddress, element: MailboxElement) {
    let mailbox = target.upgrade().expect("target actor is alive");
    mailbox.enqueue(element).expect("enqueue onto target mailbox");
    system.notify_wakeup(target.id());
}

pub fn mailbox_of(address: &ActorAddress) -> Arc<Mailbox> {
    address.upgrade().expect("actor still alive")
}
