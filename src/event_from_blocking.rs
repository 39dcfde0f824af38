// Copyright (c) 2026 discipline_bridge contributors. Licensed under Apache License, Version 2.0.

//! TD -> ED bridge: `call_event_from_blocking` / `to_sync`.
//!
//! A thread-driven caller wants to run a coroutine to completion and get its
//! result back synchronously. We build the coroutine, register this thread
//! as a mailbox target (so any TD work it spawns via the ED -> TD bridge
//! lands back on this same thread, preserving affinity), and drive it with
//! whichever poll loop this call's nesting depth calls for.

use crate::context::{self, TaskContext};
use crate::error::BridgeError;
use crate::job::{self, Job};
use crate::registry::{self, DepthGuard};
use crate::waker;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskCx, Poll};
use std::thread::ThreadId;
use tokio::sync::mpsc;

/// Drives the user coroutine to completion while also draining this
/// thread's mailbox of any jobs dispatched onto it by nested ED tasks
/// arriving on this thread's mailbox while awaiting the coroutine's own
/// result.
struct DrainLoop<T> {
    coro: Pin<Box<dyn Future<Output = Result<T, BridgeError>> + Send>>,
    thread: ThreadId,
}

impl<T> Future for DrainLoop<T> {
    type Output = Result<T, BridgeError>;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskCx<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        loop {
            registry::mark_dispatching(this.thread, true);
            let polled = this.coro.as_mut().poll(cx);
            registry::mark_dispatching(this.thread, false);
            if let Poll::Ready(out) = polled {
                return Poll::Ready(out);
            }
            match registry::poll_mailbox_recv(cx) {
                Poll::Ready(Some(job)) => {
                    job.run();
                    // The job may have woken the coroutine (e.g. it was
                    // awaiting this job's own result); loop straight back
                    // into polling it instead of waiting for a spurious
                    // extra wake-up.
                    continue;
                }
                Poll::Ready(None) => return Poll::Pending,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Runs `make_coro()`'s result to completion from thread-driven code,
/// returning its value (or the error it failed with).
///
/// `make_coro` takes the place of a separate `(coro_fn, *args)` pair,
/// a single `FnOnce`: callers capture whatever arguments they need in the
/// closure, matching how `std::thread::spawn` and
/// `tokio::task::spawn_blocking` already take their work in this crate's
/// ecosystem.
///
/// # Errors
///
/// Returns [`BridgeError::InvalidContext`] if called from a thread that is
/// currently dispatching an event loop: this bridge is
/// for thread-driven code only, and a loop trying to block on itself would
/// deadlock the one thread driving it.
pub fn call_event_from_blocking<Fut, T>(make_coro: impl FnOnce() -> Fut) -> Result<T, BridgeError>
where
    Fut: Future<Output = Result<T, BridgeError>> + Send + 'static,
    T: Send + 'static,
{
    let this_thread = std::thread::current().id();
    if registry::is_event_loop_thread(this_thread) {
        return Err(BridgeError::InvalidContext);
    }

    let _depth_guard = DepthGuard::enter();
    let nested = registry::event_from_blocking_depth() > 1;

    if !nested {
        let (tx, rx) = mpsc::unbounded_channel();
        registry::register_mailbox(this_thread, tx);
        registry::install_mailbox_receiver(rx);
    }

    // If this call is itself running as thread-affine job code dispatched
    // by an ancestor ED task (a TD->ED->TD->ED chain), inherit that
    // ancestor task's sensitive-worker override so nested
    // TD work keeps using the same sticky worker.
    let origin = job::current_job_context();
    let task_ctx = TaskContext {
        sensitive_worker_override: origin.and_then(|c| c.sensitive_worker_override),
        parent_blocking_thread: Some(this_thread),
    };

    let coro = make_coro();
    let scoped: Pin<Box<dyn Future<Output = Result<T, BridgeError>> + Send>> =
        Box::pin(context::with_context(task_ctx, coro));
    let drain_loop = DrainLoop { coro: scoped, thread: this_thread };

    let result = if nested {
        waker::block_on_manual(drain_loop)
    } else if registry::is_root_thread(this_thread) {
        registry::root_main_loop().block_on(drain_loop)
    } else {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BridgeError::ThreadSpawn)?;
        runtime.block_on(drain_loop)
    };

    if !nested {
        registry::unregister_mailbox(this_thread);
        registry::uninstall_mailbox_receiver();
    }

    result
}

/// A sync-callable wrapper around an async function, built by [`to_sync`].
///
/// Preserves the wrapped function's name for diagnostics, mirroring
/// an attribute-preservation contract analogous to `functools.wraps`.
pub struct ToSync<F> {
    inner: std::sync::Arc<F>,
    name: &'static str,
}

impl<F> std::fmt::Debug for ToSync<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToSync").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<F> Clone for ToSync<F> {
    fn clone(&self) -> Self {
        ToSync { inner: self.inner.clone(), name: self.name }
    }
}

impl<F> ToSync<F> {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<F, Args, Fut, T> ToSync<F>
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Args: Send + 'static,
    Fut: Future<Output = Result<T, BridgeError>> + Send + 'static,
    T: Send + 'static,
{
    /// Calls the wrapped coroutine function with `args`, blocking this
    /// thread until it completes.
    ///
    /// # Errors
    ///
    /// Propagates whatever `Err` the coroutine resolves to, plus
    /// [`BridgeError::InvalidContext`] if called from an event-loop thread.
    pub fn call(&self, args: Args) -> Result<T, BridgeError> {
        let inner = self.inner.clone();
        call_event_from_blocking(move || (*inner)(args))
    }
}

/// Wraps an async function `coro_fn` so it can be called from thread-driven
/// code ("to_sync").
///
/// The compile-time bound `Fut: Future<Output = Result<T, BridgeError>>`
/// rejects non-coroutine functions at the call site, which is the idiomatic
/// Rust replacement for a runtime `InvalidKind` check (see
/// `to_sync_dyn` for the dynamically-typed equivalent, where that check is
/// still a real runtime concern).
pub fn to_sync<F, Args, Fut, T>(coro_fn: F) -> ToSync<F>
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Args: Send + 'static,
    Fut: Future<Output = Result<T, BridgeError>> + Send + 'static,
    T: Send + 'static,
{
    ToSync { inner: std::sync::Arc::new(coro_fn), name: std::any::type_name::<F>() }
}
