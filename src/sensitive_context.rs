// Copyright (c) 2026 discipline_bridge contributors. Licensed under Apache License, Version 2.0.

//! Scoped sensitive-worker override: `SensitiveContext`.
//!
//! Spawning a dedicated sticky worker per call site defeats the point of
//! thread affinity when several independent call sites are meant to share
//! one logical "thread-sensitive" callee across a single request or test.
//! `SensitiveContext::scope` spins up one such worker for the extent of an
//! async block and installs it as every nested `call_blocking_from_event(
//! sensitive: true)`'s target, superseding both the parent-blocking-thread
//! lookup and the global `W0` fallback (see `blocking_from_event`'s
//! dispatch precedence).

use crate::context::{self, TaskContext};
use crate::error::BridgeError;
use crate::sensitive_worker::SensitiveWorker;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

fn next_worker_name() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!("discipline-bridge-ctx-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// A scope establishing a fresh sticky worker as the sensitive-dispatch
/// target for everything awaited inside it.
///
/// There is no persistent `SensitiveContext` value to hold onto between
/// calls (unlike a context-manager instance callers keep around and
/// re-enter): the worker's lifetime is exactly the scoped future's
/// lifetime, entered and torn down by [`SensitiveContext::scope`] alone.
/// Sharing one override across independently-scheduled tasks means awaiting
/// them inside the same `scope` call, e.g. via `tokio::join!`.
#[derive(Debug)]
pub struct SensitiveContext {
    _private: (),
}

impl SensitiveContext {
    /// Runs `fut` with a freshly spawned sticky worker installed as the
    /// sensitive-dispatch target for its whole duration, then shuts that
    /// worker down.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ThreadSpawn`] if the scoped worker thread
    /// can't be started; `fut` never runs in that case.
    pub async fn scope<F: Future>(fut: F) -> Result<F::Output, BridgeError> {
        let worker = SensitiveWorker::spawn(next_worker_name())?;
        let ctx: TaskContext = context::current().with_override(worker.clone());
        let output = context::with_context(ctx, fut).await;
        worker.shutdown();
        Ok(output)
    }
}
