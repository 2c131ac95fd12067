//! End-to-end: an actor whose sole handler maps `{add, x, y} -> x + y`.
//! A request of a type it has no pattern for bounces with
//! `unexpected_message` and the actor terminates.

mod common;

use std::time::Duration;

use flywheel_rt::message::ErrorResponse;
use flywheel_rt::prelude::*;

#[derive(Debug)]
struct Add {
    x: i64,
    y: i64,
}
impl Message for Add {
    const MESSAGE_TYPE: &'static str = "adder_test::add";
}

#[derive(Debug)]
struct Mul {
    #[allow(dead_code)]
    x: i64,
    #[allow(dead_code)]
    y: i64,
}
impl Message for Mul {
    const MESSAGE_TYPE: &'static str = "adder_test::mul";
}

#[derive(Debug)]
struct Sum(i64);
impl Message for Sum {
    const MESSAGE_TYPE: &'static str = "adder_test::sum";
}

fn adder_behavior() -> std::sync::Arc<Behavior> {
    Behavior::builder("adder")
        .on::<Add, _>(|ctx, msg| {
            let _ = ctx.reply(Sum(msg.x + msg.y));
            HandlerOutcome::Handled
        })
        .build()
}

#[test]
fn adder_answers_add_and_terminates_on_an_unrecognized_request() {
    let system = ActorSystem::for_test();
    let adder = system.spawn(adder_behavior(), SpawnOptions::default()).unwrap();
    let adder_address = adder.address();

    let client = common::spawn_client(&system);
    let client_address = client.address();
    let client_mailbox = common::mailbox_of(&client_address);

    let add_request = MailboxElement::new(
        Box::new(Add { x: 10, y: 20 }),
        MessageId::new_request(1, false),
        Some(client_address.clone()),
    );
    common::send(&system, &adder_address, add_request);

    let reply = common::poll_until(Duration::from_secs(2), || client_mailbox.try_pop()).expect("adder replied to add");
    let sum = reply.payload().downcast_ref::<Sum>().expect("expected a Sum reply");
    assert_eq!(sum.0, 30);

    let mul_request = MailboxElement::new(
        Box::new(Mul { x: 2, y: 3 }),
        MessageId::new_request(2, false),
        Some(client_address.clone()),
    );
    common::send(&system, &adder_address, mul_request);

    let error_reply =
        common::poll_until(Duration::from_secs(2), || client_mailbox.try_pop()).expect("adder bounced the mul request");
    let err = error_reply
        .payload()
        .downcast_ref::<ErrorResponse>()
        .expect("expected an ErrorResponse");
    assert!(matches!(err.0, RuntimeError::UnexpectedMessage(_)));

    let closed = common::poll_until(Duration::from_secs(2), || {
        adder_address.upgrade().filter(|mailbox| mailbox.is_closed())
    });
    assert!(closed.is_some(), "adder must terminate after the unhandled request");

    system.force_shutdown();
}
