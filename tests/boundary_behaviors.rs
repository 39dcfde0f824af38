//! Boundary behaviors not already exercised by one of the `scenario_*`
//! files: the `to_async(to_sync(g))` round trip and `to_async`/`to_sync`'s
//! dynamic `InvalidKind` check.

mod common;

use discipline_bridge::{
    call_blocking_from_event, call_event_from_blocking, to_async, to_async_dyn, to_sync,
    to_sync_dyn, BoxAny, BridgeError, DynCallable, Message, SensitiveContext,
};
use pretty_assertions::assert_eq;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn invalid_context_when_called_from_inside_a_running_loop() {
    async fn misuse() -> Result<(), BridgeError> {
        let err = call_event_from_blocking(|| async { Ok::<(), BridgeError>(()) });
        assert!(matches!(err, Err(BridgeError::InvalidContext)), "got {err:?}");
        Ok(())
    }
    call_event_from_blocking(misuse).expect("outer call should itself succeed");
}

#[tokio::test]
async fn sensitive_with_explicit_executor_is_invalid_config() {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build throwaway runtime");
    let pool = discipline_bridge::ExecutorPool::from_handle(rt.handle().clone());
    let err = call_blocking_from_event(|| Ok::<(), BridgeError>(()), true, Some(pool))
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidConfig));
}

#[tokio::test]
async fn cancelling_the_awaiter_discards_the_result_but_the_job_still_runs() {
    common::init_tracing();
    let ran = Arc::new(AtomicBool::new(false));
    let ran_in_job = ran.clone();
    let handle = tokio::spawn(call_blocking_from_event(
        move || {
            std::thread::sleep(Duration::from_millis(100));
            ran_in_job.store(true, Ordering::SeqCst);
            Ok::<(), BridgeError>(())
        },
        true,
        None,
    ));

    tokio::time::sleep(Duration::from_millis(10)).await;
    handle.abort();
    let _ = handle.await;

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(ran.load(Ordering::SeqCst), "the job must still run to completion even though its awaiter was cancelled");
}

#[tokio::test]
async fn empty_scope_is_a_noop_beyond_resource_lifecycle() {
    let value = SensitiveContext::scope(async { 7 }).await.expect("scope should start and stop cleanly");
    assert_eq!(value, 7);
}

#[test]
fn dyn_kind_mismatch_is_invalid_kind() {
    let sync_callable: DynCallable = DynCallable::Sync(Box::new(|| Box::new(()) as BoxAny));
    let err = to_sync_dyn(sync_callable).expect_err("a sync callable cannot be wrapped by to_sync");
    assert!(matches!(err, BridgeError::InvalidKind { name: "to_sync", expected: "async" }));

    let async_callable: DynCallable = DynCallable::Async(Box::new(|| {
        Box::pin(async { Ok(Box::new(()) as BoxAny) })
            as Pin<Box<dyn Future<Output = Result<BoxAny, BridgeError>> + Send>>
    }));
    let err = to_async_dyn(async_callable, false, None)
        .expect_err("an async callable cannot be wrapped by to_async");
    assert!(matches!(err, BridgeError::InvalidKind { name: "to_async", expected: "sync" }));
}

async fn g(x: i32) -> Result<i32, BridgeError> {
    if x < 0 {
        Err(Message::bridge_error("g does not accept negative input"))
    } else {
        Ok(x * 2)
    }
}

#[tokio::test]
async fn to_async_of_to_sync_matches_the_original_coroutine() {
    let sync_version = to_sync(g);
    let roundtrip = to_async(move |x: i32| sync_version.call(x), true, None);

    let direct_ok = g(5).await;
    let roundtrip_ok = roundtrip.call(5).await;
    assert_eq!(direct_ok.unwrap(), roundtrip_ok.unwrap());

    let direct_err = g(-1).await;
    let roundtrip_err = roundtrip.call(-1).await;
    assert!(direct_err.is_err());
    assert!(roundtrip_err.is_err());
}
