//! End-to-end: a client's outstanding request is still queued when its
//! receiver dies; the receiver's termination bounces back
//! `request_receiver_down` instead of silently dropping it. The same
//! request, rebound to a freshly spawned receiver, then succeeds.

mod common;

use std::sync::Arc;
use std::time::Duration;

use flywheel_rt::message::{ErrorResponse, SystemMessage};
use flywheel_rt::prelude::*;

#[derive(Debug)]
struct Ask;
impl Message for Ask {
    const MESSAGE_TYPE: &'static str = "reconnect_test::ask";
}

#[derive(Debug)]
struct Answer;
impl Message for Answer {
    const MESSAGE_TYPE: &'static str = "reconnect_test::answer";
}

fn receiver_behavior() -> Arc<Behavior> {
    Behavior::builder("receiver")
        .on::<Ask, _>(|ctx, _msg| {
            let _ = ctx.reply(Answer);
            HandlerOutcome::Handled
        })
        .build()
}

#[test]
fn receiver_death_bounces_request_receiver_down_and_a_rebind_succeeds() {
    let system = ActorSystem::for_test();

    let client = common::spawn_client(&system);
    let client_address = client.address();
    let client_mailbox = common::mailbox_of(&client_address);

    let dying = system.spawn(receiver_behavior(), SpawnOptions::default()).unwrap();
    let dying_address = dying.address();
    let dying_mailbox = common::mailbox_of(&dying_address);

    // Wait for the scheduler's first (empty-mailbox) resume to park the
    // receiver, then queue the request without waking it, so it's still
    // sitting unprocessed in the mailbox when `Terminate` arrives.
    common::poll_until(Duration::from_secs(1), || dying_mailbox.is_blocked().then_some(()));
    let held_request = MailboxElement::new(Box::new(Ask), MessageId::new_request(1, false), Some(client_address.clone()));
    dying_mailbox.enqueue(held_request).unwrap();

    let terminate = MailboxElement::new(Box::new(SystemMessage::Terminate), MessageId::NONE, None);
    common::send(&system, &dying_address, terminate);

    let bounced =
        common::poll_until(Duration::from_secs(2), || client_mailbox.try_pop()).expect("dying receiver bounces the held request");
    let err = bounced
        .payload()
        .downcast_ref::<ErrorResponse>()
        .expect("expected an ErrorResponse");
    assert!(matches!(err.0, RuntimeError::RequestReceiverDown(_)));

    let replacement = system.spawn(receiver_behavior(), SpawnOptions::default()).unwrap();
    let replacement_address = replacement.address();
    let rebind_request = MailboxElement::new(Box::new(Ask), MessageId::new_request(2, false), Some(client_address));
    common::send(&system, &replacement_address, rebind_request);

    let answer = common::poll_until(Duration::from_secs(2), || client_mailbox.try_pop())
        .expect("the rebound request succeeds against the replacement receiver");
    assert!(answer.payload().downcast_ref::<Answer>().is_some());

    system.force_shutdown();
}
