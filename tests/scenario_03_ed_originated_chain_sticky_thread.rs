//! An ED-originated chain (outer -> TD middle ->
//! nested ED middle2 -> TD inner) and an unrelated direct TD call
//! (`inner2`) both land on the same sticky worker thread, which differs
//! from the thread driving the enclosing ED task.

mod common;

use discipline_bridge::{call_blocking_from_event, to_sync, BridgeError};
use pretty_assertions::{assert_eq, assert_ne};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

fn inner(slot: Arc<Mutex<Option<ThreadId>>>) -> Result<(), BridgeError> {
    *slot.lock().unwrap() = Some(std::thread::current().id());
    Ok(())
}

async fn middle2(slot: Arc<Mutex<Option<ThreadId>>>) -> Result<(), BridgeError> {
    call_blocking_from_event(move || inner(slot), true, None).await
}

fn middle(slot: Arc<Mutex<Option<ThreadId>>>) -> Result<(), BridgeError> {
    to_sync(middle2).call(slot)
}

async fn outer(slot: Arc<Mutex<Option<ThreadId>>>) -> Result<(), BridgeError> {
    call_blocking_from_event(move || middle(slot), true, None).await
}

fn inner2(slot: Arc<Mutex<Option<ThreadId>>>) -> Result<(), BridgeError> {
    *slot.lock().unwrap() = Some(std::thread::current().id());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial_test::serial(sensitive_worker)]
async fn ed_originated_chain_and_direct_call_share_one_sticky_thread() {
    common::init_tracing();
    let test_thread = std::thread::current().id();
    let inner_slot = Arc::new(Mutex::new(None));
    let inner2_slot = Arc::new(Mutex::new(None));

    let (outer_res, inner2_res) = tokio::join!(
        outer(inner_slot.clone()),
        call_blocking_from_event(
            {
                let inner2_slot = inner2_slot.clone();
                move || inner2(inner2_slot)
            },
            true,
            None
        ),
    );

    outer_res.expect("outer chain should succeed");
    inner2_res.expect("direct call should succeed");

    let inner_thread = inner_slot.lock().unwrap().expect("inner should have recorded a thread");
    let inner2_thread = inner2_slot.lock().unwrap().expect("inner2 should have recorded a thread");

    assert_eq!(inner_thread, inner2_thread, "both should land on the same sticky worker thread");
    assert_ne!(inner_thread, test_thread, "sticky worker thread must differ from the ED task's own thread");
}
