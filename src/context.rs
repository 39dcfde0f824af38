// Copyright (c) 2026 discipline_bridge contributors. Licensed under Apache License, Version 2.0.

//! Per-ED-task context that must propagate across suspension points.
//!
//! The kind of implicit, thread-local context variables a dynamic language
//! gives you for free become an explicit, immutable [`TaskContext`] value
//! here, threaded through `tokio::task_local!`, which copies the scoped
//! value onto the thread-local stack for the dynamic extent of every poll
//! of the future it wraps -- including across `.await` points within that
//! future -- which is exactly "propagates across suspension" for the single
//! task that owns it. A task we spawn ourselves (never done on the hot path
//! here, but true in general) would need to capture and re-`scope` a clone
//! explicitly; nothing is inherited automatically by unrelated tasks.

use crate::sensitive_worker::SensitiveWorker;
use std::future::Future;
use std::sync::Arc;
use std::thread::ThreadId;

/// Immutable snapshot of the context-local state for the currently
/// executing ED task.
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    /// Which sticky worker TD work initiated in this subtree should use,
    /// if any (set by an active `SensitiveContext`).
    pub sensitive_worker_override: Option<Arc<SensitiveWorker>>,
    /// If this task exists to serve a `call_event_from_blocking` call, the
    /// TD thread that is blocked awaiting it.
    pub parent_blocking_thread: Option<ThreadId>,
}

impl TaskContext {
    pub fn with_override(&self, worker: Arc<SensitiveWorker>) -> Self {
        TaskContext {
            sensitive_worker_override: Some(worker),
            parent_blocking_thread: self.parent_blocking_thread,
        }
    }

    pub fn with_parent_blocking_thread(&self, thread: ThreadId) -> Self {
        TaskContext {
            sensitive_worker_override: self.sensitive_worker_override.clone(),
            parent_blocking_thread: Some(thread),
        }
    }
}

tokio::task_local! {
    static TASK_CTX: TaskContext;
}

/// Reads the current task's context, or the default (no override, no
/// parent) if this code isn't running inside a `scope`d task -- which is
/// the case for plain TD code that hasn't gone through one of this crate's
/// bridges yet.
pub fn current() -> TaskContext {
    TASK_CTX
        .try_with(Clone::clone)
        .unwrap_or_default()
}

/// Runs `fut` with `ctx` installed as the current task's context for the
/// duration of every poll.
pub async fn with_context<F: Future>(ctx: TaskContext, fut: F) -> F::Output {
    TASK_CTX.scope(ctx, fut).await
}
