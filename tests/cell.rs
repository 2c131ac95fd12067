//! End-to-end: a cell actor holding a single integer, answering `{get}`
//! and `{put, v}`. `get -> put 1024 -> get` returns `0, unit, 1024`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use flywheel_rt::prelude::*;
use parking_lot::Mutex;

#[derive(Debug)]
struct Get;
impl Message for Get {
    const MESSAGE_TYPE: &'static str = "cell_test::get";
}

#[derive(Debug)]
struct Put(i64);
impl Message for Put {
    const MESSAGE_TYPE: &'static str = "cell_test::put";
}

#[derive(Debug)]
struct Value(i64);
impl Message for Value {
    const MESSAGE_TYPE: &'static str = "cell_test::value";
}

#[derive(Debug)]
struct Stored;
impl Message for Stored {
    const MESSAGE_TYPE: &'static str = "cell_test::stored";
}

fn cell_behavior() -> Arc<Behavior> {
    let state = Arc::new(Mutex::new(0i64));
    let read = state.clone();
    let write = state;
    Behavior::builder("cell")
        .on::<Get, _>(move |ctx, _msg| {
            let _ = ctx.reply(Value(*read.lock()));
            HandlerOutcome::Handled
        })
        .on::<Put, _>(move |ctx, msg| {
            *write.lock() = msg.0;
            let _ = ctx.reply(Stored);
            HandlerOutcome::Handled
        })
        .build()
}

#[test]
fn get_put_get_observes_the_updated_state() {
    let system = ActorSystem::for_test();
    let cell = system.spawn(cell_behavior(), SpawnOptions::default()).unwrap();
    let cell_address = cell.address();

    let client = common::spawn_client(&system);
    let client_address = client.address();
    let client_mailbox = common::mailbox_of(&client_address);

    let get_request = MailboxElement::new(Box::new(Get), MessageId::new_request(1, false), Some(client_address.clone()));
    common::send(&system, &cell_address, get_request);
    let reply = common::poll_until(Duration::from_secs(2), || client_mailbox.try_pop()).expect("initial get replied");
    assert_eq!(reply.payload().downcast_ref::<Value>().unwrap().0, 0);

    let put_request =
        MailboxElement::new(Box::new(Put(1024)), MessageId::new_request(2, false), Some(client_address.clone()));
    common::send(&system, &cell_address, put_request);
    let reply = common::poll_until(Duration::from_secs(2), || client_mailbox.try_pop()).expect("put acknowledged");
    assert!(reply.payload().downcast_ref::<Stored>().is_some());

    let get_request = MailboxElement::new(Box::new(Get), MessageId::new_request(3, false), Some(client_address));
    common::send(&system, &cell_address, get_request);
    let reply = common::poll_until(Duration::from_secs(2), || client_mailbox.try_pop()).expect("final get replied");
    assert_eq!(reply.payload().downcast_ref::<Value>().unwrap().0, 1024);

    system.force_shutdown();
}
