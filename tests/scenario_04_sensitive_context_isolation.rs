//! Inside a `SensitiveContext`, concurrent TD jobs
//! share one worker thread, distinct from the thread driving the ED task.

use discipline_bridge::{call_blocking_from_event, BridgeError, SensitiveContext};
use pretty_assertions::{assert_eq, assert_ne};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

fn record(slot: Arc<Mutex<Option<ThreadId>>>) -> Result<(), BridgeError> {
    *slot.lock().unwrap() = Some(std::thread::current().id());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_jobs_inside_one_scope_share_a_thread() {
    let test_thread = std::thread::current().id();
    let a = Arc::new(Mutex::new(None));
    let b = Arc::new(Mutex::new(None));

    let scoped = SensitiveContext::scope(async {
        tokio::join!(
            call_blocking_from_event({ let a = a.clone(); move || record(a) }, true, None),
            call_blocking_from_event({ let b = b.clone(); move || record(b) }, true, None),
        )
    })
    .await
    .expect("scope should start its worker successfully");

    scoped.0.expect("first job should succeed");
    scoped.1.expect("second job should succeed");

    let thread_a = a.lock().unwrap().expect("a should have recorded a thread");
    let thread_b = b.lock().unwrap().expect("b should have recorded a thread");

    assert_eq!(thread_a, thread_b, "both jobs must run on the scope's single sticky worker");
    assert_ne!(thread_a, test_thread);
}
