//! A custom executor is used exactly once per call,
//! and the result equals the callable's return value.

use discipline_bridge::{call_blocking_from_event, BridgeError, ExecutorPool};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn custom_executor_runs_the_callable_exactly_once() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build custom executor runtime");
    let pool = ExecutorPool::from_handle(rt.handle().clone());

    let calls = Arc::new(AtomicU32::new(0));
    let calls_inner = calls.clone();
    let result = call_blocking_from_event(
        move || {
            calls_inner.fetch_add(1, Ordering::SeqCst);
            Ok::<_, BridgeError>(42)
        },
        false,
        Some(pool),
    )
    .await
    .expect("call should succeed");

    assert_eq!(result, 42);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
