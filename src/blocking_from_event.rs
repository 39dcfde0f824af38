// Copyright (c) 2026 discipline_bridge contributors. Licensed under Apache License, Version 2.0.

//! ED -> TD bridge: `call_blocking_from_event` / `to_async`.
//!
//! An event-driven task wants to run a blocking callable without parking
//! its own OS thread (which would stall every other task sharing that
//! loop). Two dispatch disciplines are offered: `sensitive = true` routes
//! the callable through a single FIFO sticky worker, for callees that rely
//! on thread-local state surviving across calls; `sensitive = false` spreads
//! work across an executor pool, for callees with no such requirement.

use crate::config::{default_executor_pool, ExecutorPool};
use crate::context;
use crate::error::BridgeError;
use crate::job::Job;
use crate::registry;
use crate::sensitive_worker::global_sensitive_worker;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Runs `callable` off the calling task's event loop.
///
/// # Errors
///
/// Returns [`BridgeError::InvalidConfig`] if `sensitive` is `true` and
/// `executor` is `Some` (an explicit executor only makes sense
/// for the pooled discipline). Otherwise propagates whatever `callable`
/// itself returns, a [`BridgeError::WorkerPanicked`] if it panics, or
/// [`BridgeError::Cancelled`] if the awaiting task is dropped first.
pub async fn call_blocking_from_event<F, T>(
    callable: F,
    sensitive: bool,
    executor: Option<ExecutorPool>,
) -> Result<T, BridgeError>
where
    F: FnOnce() -> Result<T, BridgeError> + Send + 'static,
    T: Send + 'static,
{
    if sensitive && executor.is_some() {
        return Err(BridgeError::InvalidConfig);
    }

    if sensitive {
        run_sensitive(callable).await
    } else {
        run_pooled(callable, executor).await
    }
}

/// Dispatch precedence mirrors a `CurrentThreadExecutor`-style lookup
/// chain: an active `SensitiveContext` override wins outright; failing
/// that, if this task exists to serve a `call_event_from_blocking` call,
/// the callable runs back on that same thread-driven caller's thread (so a
/// TD -> ED -> TD chain keeps its sync work on the thread that started it,
/// not some unrelated sticky worker); only with neither does it fall back
/// to the process-global sensitive worker `W0`.
async fn run_sensitive<F, T>(callable: F) -> Result<T, BridgeError>
where
    F: FnOnce() -> Result<T, BridgeError> + Send + 'static,
    T: Send + 'static,
{
    let ctx = context::current();
    let (job, result_rx, cancelled) = Job::new(callable);
    let _cancel_guard = CancelOnDrop(cancelled);

    if let Some(worker) = ctx.sensitive_worker_override {
        tracing::trace!("discipline_bridge: dispatching to scoped sensitive worker");
        worker.submit(job);
    } else if let Some(parent) = ctx.parent_blocking_thread {
        match registry::mailbox_sender_for(parent) {
            Some(sender) => match sender.send(job) {
                Ok(()) => {
                    tracing::trace!(?parent, "discipline_bridge: dispatching to parent blocking thread");
                }
                Err(tokio::sync::mpsc::error::SendError(job)) => {
                    global_sensitive_worker().submit(job);
                }
            },
            None => global_sensitive_worker().submit(job),
        }
    } else {
        global_sensitive_worker().submit(job);
    }

    match result_rx.await {
        Err(_recv_error) => Err(BridgeError::Cancelled),
        Ok(Err(panicked)) => Err(panicked),
        Ok(Ok(boxed)) => *boxed
            .downcast::<Result<T, BridgeError>>()
            .expect("job result type mismatch: Job<T> invariant violated"),
    }
}

async fn run_pooled<F, T>(callable: F, executor: Option<ExecutorPool>) -> Result<T, BridgeError>
where
    F: FnOnce() -> Result<T, BridgeError> + Send + 'static,
    T: Send + 'static,
{
    let pool = executor.unwrap_or_else(default_executor_pool);
    let join = pool.handle().spawn_blocking(move || {
        panic::catch_unwind(AssertUnwindSafe(callable)).map_err(BridgeError::from_panic_payload)
    });
    match join.await {
        Ok(outcome) => outcome?,
        Err(join_err) if join_err.is_cancelled() => Err(BridgeError::Cancelled),
        Err(join_err) => Err(BridgeError::from_panic_payload(join_err.into_panic())),
    }
}

/// An async-callable wrapper around a sync function, built by [`to_async`].
pub struct ToAsync<F> {
    inner: Arc<F>,
    name: &'static str,
    sensitive: bool,
    executor: Option<ExecutorPool>,
}

impl<F> std::fmt::Debug for ToAsync<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToAsync")
            .field("name", &self.name)
            .field("sensitive", &self.sensitive)
            .finish_non_exhaustive()
    }
}

impl<F> Clone for ToAsync<F> {
    fn clone(&self) -> Self {
        ToAsync {
            inner: self.inner.clone(),
            name: self.name,
            sensitive: self.sensitive,
            executor: self.executor.clone(),
        }
    }
}

impl<F> ToAsync<F> {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<F, Args, T> ToAsync<F>
where
    F: Fn(Args) -> Result<T, BridgeError> + Send + Sync + 'static,
    Args: Send + 'static,
    T: Send + 'static,
{
    /// Calls the wrapped sync function with `args` without blocking the
    /// calling task's event loop.
    ///
    /// # Errors
    ///
    /// See [`call_blocking_from_event`].
    pub fn call(&self, args: Args) -> impl Future<Output = Result<T, BridgeError>> + Send + 'static {
        let inner = self.inner.clone();
        let sensitive = self.sensitive;
        let executor = self.executor.clone();
        call_blocking_from_event(move || (*inner)(args), sensitive, executor)
    }
}

/// Wraps a sync function `fn_` so it can be awaited from event-driven code
/// ("to_async"). `sensitive` selects the dispatch discipline;
/// `executor` optionally overrides the pool used when `sensitive` is
/// `false` (passing one alongside `sensitive: true` is an
/// [`BridgeError::InvalidConfig`] at call time, not construction time,
/// since both are only known together here).
pub fn to_async<F, Args, T>(fn_: F, sensitive: bool, executor: Option<ExecutorPool>) -> ToAsync<F>
where
    F: Fn(Args) -> Result<T, BridgeError> + Send + Sync + 'static,
    Args: Send + 'static,
    T: Send + 'static,
{
    ToAsync { inner: Arc::new(fn_), name: std::any::type_name::<F>(), sensitive, executor }
}
