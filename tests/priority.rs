//! End-to-end: with priority-aware mode on, a high-priority message
//! enqueued behind a run of normal messages is still dispatched first.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use flywheel_rt::prelude::*;

#[derive(Debug)]
struct Tagged(i32);
impl Message for Tagged {
    const MESSAGE_TYPE: &'static str = "priority_test::tagged";
}

fn recorder_behavior(order: Arc<Mutex<Vec<i32>>>) -> Arc<Behavior> {
    Behavior::builder("recorder")
        .on::<Tagged, _>(move |_ctx, msg| {
            order.lock().expect("lock poisoned").push(msg.0);
            HandlerOutcome::Handled
        })
        .build()
}

#[test]
fn a_high_priority_message_queued_behind_normal_mail_dispatches_first() {
    let system = ActorSystem::new(SystemConfig {
        worker_threads: 1,
        priority_aware: true,
        ..SystemConfig::default()
    });

    let order = Arc::new(Mutex::new(Vec::new()));
    let actor = system.spawn(recorder_behavior(order.clone()), SpawnOptions::default()).unwrap();
    let address = actor.address();
    let mailbox = common::mailbox_of(&address);

    // Wait for the scheduler's first (empty-mailbox) resume to park the
    // actor before enqueueing the batch, so none of it can be picked up
    // one message at a time while this loop is still running.
    common::poll_until(Duration::from_secs(1), || mailbox.is_blocked().then_some(()));

    for i in 0..5 {
        mailbox
            .enqueue(MailboxElement::new(Box::new(Tagged(i)), MessageId::NONE, None))
            .unwrap();
    }
    mailbox
        .enqueue(MailboxElement::new(
            Box::new(Tagged(-1)),
            MessageId::HIGH_PRIORITY_CAST,
            None,
        ))
        .unwrap();
    system.notify_wakeup(address.id());

    let recorded = common::poll_until(Duration::from_secs(2), || {
        let seen = order.lock().expect("lock poisoned").clone();
        (seen.len() == 6).then_some(seen)
    })
    .expect("all six messages should eventually dispatch");

    assert_eq!(recorded.first(), Some(&-1), "the high-priority message must dispatch first");

    system.force_shutdown();
}
