// Copyright (c) 2026 discipline_bridge contributors. Licensed under Apache License, Version 2.0.

//! The unit of work that crosses from ED to TD: see [`Job`].

use crate::context::TaskContext;
use crate::error::BridgeError;
use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use tokio::sync::oneshot;

/// A boxed `T`, used as the payload type for jobs whose concrete output type
/// is erased once they're queued (the typed [`oneshot::Sender`] recovers it
/// on the way out).
pub type BoxAny = Box<dyn Any + Send>;

/// A boxed, pinned, owned future -- used by the dynamic (type-erased)
/// callable API in `dyn_callable.rs`.
pub type BoxFuture<T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send>>;

/// A blocking job crossing the ED -> TD boundary: a callable, its result
/// slot, and whether it's still wanted.
///
/// Arguments are captures of the `FnOnce` closure (the idiomatic Rust
/// shape, matching `std::thread::spawn`/`tokio::task::spawn_blocking`'s own
/// signatures) rather than a separate positional-args field. The
/// originating task handle is implicit: it's whoever holds the matching
/// [`oneshot::Receiver`].
pub struct Job {
    callable: Box<dyn FnOnce() -> BoxAny + Send>,
    result_tx: oneshot::Sender<Result<BoxAny, BridgeError>>,
    cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>,
    /// A snapshot of the originating ED task's context, taken at the moment
    /// the job was built (while that task's `TaskContext` was still in
    /// scope). TD worker code has no task poll of its own to read this from
    /// ambiently, so `run` installs it in [`CURRENT_JOB_CONTEXT`] for the
    /// duration of the callable -- this is how a nested
    /// `call_event_from_blocking` invoked from inside that callable finds
    /// out which sensitive worker override and which thread it's nested
    /// under.
    origin_ctx: TaskContext,
}

thread_local! {
    static CURRENT_JOB_CONTEXT: RefCell<Option<TaskContext>> = const { RefCell::new(None) };
}

/// The context snapshot of the job currently running on this thread, if any.
/// Valid only while a [`Job::run`] callable is executing on this thread.
pub fn current_job_context() -> Option<TaskContext> {
    CURRENT_JOB_CONTEXT.with(|cell| cell.borrow().clone())
}

impl Job {
    /// Builds a job from a typed closure and returns it paired with the
    /// receiver the caller should await.
    pub fn new<F, T>(
        f: F,
    ) -> (
        Self,
        oneshot::Receiver<Result<BoxAny, BridgeError>>,
        std::sync::Arc<std::sync::atomic::AtomicBool>,
    )
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let cancelled = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let job = Job {
            callable: Box::new(move || Box::new(f()) as BoxAny),
            result_tx,
            cancelled: cancelled.clone(),
            origin_ctx: crate::context::current(),
        };
        (job, result_rx, cancelled)
    }

    /// Runs the job's callable, capturing panics, and sends the result down
    /// the one-shot result slot.
    ///
    /// If `cancelled` is already set by the time the worker picks this job
    /// up, the job was cancelled before it started: the callable is dropped
    /// unrun. Once `run` has decided to invoke the callable, the callable is
    /// no longer preemptible -- a cancellation that arrives mid-flight just
    /// means the result is discarded (the send silently fails because the
    /// receiver is gone), not that the callable stops running.
    pub fn run(self) {
        if self.cancelled.load(std::sync::atomic::Ordering::Acquire) {
            tracing::trace!("discipline_bridge: job cancelled before start, dropping unrun");
            return;
        }
        let previous = CURRENT_JOB_CONTEXT.with(|cell| cell.borrow_mut().replace(self.origin_ctx.clone()));
        let result = panic::catch_unwind(AssertUnwindSafe(self.callable))
            .map_err(BridgeError::from_panic_payload);
        CURRENT_JOB_CONTEXT.with(|cell| *cell.borrow_mut() = previous);
        // Ignore send errors: the receiver may have been dropped by a
        // cancelled awaiting task after the callable had already started.
        let _ = self.result_tx.send(result);
    }
}
