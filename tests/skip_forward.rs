//! End-to-end: a server's first behavior accepts `{idle, worker}` and
//! becomes a forwarding behavior that relays one `{request}` to the named
//! worker, then pops back. A `{request}` that arrives before any `{idle}`
//! sits cached until the server has somewhere to send it.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use flywheel_rt::prelude::*;

#[derive(Debug)]
struct Request;
impl Message for Request {
    const MESSAGE_TYPE: &'static str = "skip_forward_test::request";
}

#[derive(Debug)]
struct IdleAnnounce {
    worker: ActorAddress,
}
impl Message for IdleAnnounce {
    const MESSAGE_TYPE: &'static str = "skip_forward_test::idle";
}

fn forwarding_behavior(worker: ActorAddress) -> Arc<Behavior> {
    Behavior::builder("forwarding")
        .on::<Request, _>(move |ctx, _msg| {
            ctx.unbecome();
            ctx.forward_current_message(worker.clone())
        })
        .on::<IdleAnnounce, _>(|ctx, _msg| ctx.skip())
        .build()
}

fn waiting_behavior() -> Arc<Behavior> {
    Behavior::builder("waiting")
        .on::<IdleAnnounce, _>(|ctx, msg| {
            ctx.become_behavior(forwarding_behavior(msg.worker.clone()), false);
            HandlerOutcome::Handled
        })
        .build()
}

#[test]
fn request_sent_before_idle_is_cached_then_forwarded_exactly_once() {
    let system = ActorSystem::for_test();

    let received = Arc::new(AtomicUsize::new(0));
    let received_clone = received.clone();
    let worker_behavior = Behavior::builder("worker")
        .on::<Request, _>(move |_ctx, _msg| {
            received_clone.fetch_add(1, Ordering::SeqCst);
            HandlerOutcome::Handled
        })
        .build();
    let worker = system.spawn(worker_behavior, SpawnOptions::default()).unwrap();
    let worker_address = worker.address();

    let server = system.spawn(waiting_behavior(), SpawnOptions::default()).unwrap();
    let server_address = server.address();

    let request = MailboxElement::new(Box::new(Request), MessageId::NONE, None);
    common::send(&system, &server_address, request);

    let idle = MailboxElement::new(
        Box::new(IdleAnnounce {
            worker: worker_address,
        }),
        MessageId::NONE,
        None,
    );
    common::send(&system, &server_address, idle);

    let delivered = common::poll_until(Duration::from_secs(2), || {
        let count = received.load(Ordering::SeqCst);
        (count >= 1).then_some(count)
    });
    assert_eq!(delivered, Some(1), "exactly one forward should reach the worker");

    system.force_shutdown();
}
