// Copyright (c) 2026 discipline_bridge contributors. Licensed under Apache License, Version 2.0.

//! Error types surfaced across the ED/TD boundary. See [`BridgeError`].

use std::fmt;

/// Errors produced by this crate's bridges.
///
/// Each variant pins down a distinct failure mode, in the same spirit as
/// a small, typed set of error variants: validation failures are
/// distinguished from runtime-context failures, and user errors are kept
/// separate from both so callers can match on them precisely.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum BridgeError {
    /// An adapter was applied to a callable of the wrong kind (e.g. `to_async`
    /// given a function that already returns a future, or `to_sync` given one
    /// that doesn't).
    #[error("{name} can only be applied to {expected} functions.")]
    #[diagnostic(code(discipline_bridge::invalid_kind))]
    InvalidKind {
        /// Name of the adapter (`"to_async"` or `"to_sync"`).
        name: &'static str,
        /// What the adapter expects (`"sync"` or `"async"`).
        expected: &'static str,
    },

    /// `sensitive = true` was combined with an explicit executor.
    #[error("an executor may only be supplied when sensitive = false")]
    #[diagnostic(
        code(discipline_bridge::invalid_config),
        help("drop the executor argument, or pass sensitive: false")
    )]
    InvalidConfig,

    /// `to_sync`/`call_event_from_blocking` was invoked on a thread that is
    /// currently dispatching an event loop.
    #[error("cannot block on a coroutine from inside a running event loop")]
    #[diagnostic(
        code(discipline_bridge::invalid_context),
        help("call this from thread-driven code, not from within an ED task")
    )]
    InvalidContext,

    /// The ED task awaiting a blocking job was cancelled before the job
    /// settled.
    #[error("the awaiting task was cancelled")]
    #[diagnostic(code(discipline_bridge::cancelled))]
    Cancelled,

    /// The sensitive worker thread could not be started.
    #[error("failed to spawn sensitive worker thread")]
    #[diagnostic(
        code(discipline_bridge::thread_spawn),
        help("the system may have reached its OS thread limit")
    )]
    ThreadSpawn(#[source] std::io::Error),

    /// The user callable or coroutine panicked instead of returning/raising
    /// normally.
    #[error("callable panicked: {message}")]
    #[diagnostic(code(discipline_bridge::worker_panicked))]
    WorkerPanicked {
        /// Best-effort panic message extracted from the payload.
        message: String,
    },

    /// An error raised by the user's callable or coroutine, propagated
    /// across the bridge unchanged.
    #[error(transparent)]
    #[diagnostic(code(discipline_bridge::propagated))]
    Propagated(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BridgeError {
    /// Builds a [`BridgeError::WorkerPanicked`] from a `catch_unwind` payload.
    pub fn from_panic_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        BridgeError::WorkerPanicked { message }
    }
}

/// Helper so call sites can write `BridgeError::propagated(err)` instead of
/// repeating the boxing dance.
pub fn propagated<E>(err: E) -> BridgeError
where
    E: std::error::Error + Send + Sync + 'static,
{
    BridgeError::Propagated(Box::new(err))
}

/// A minimal string-only error for tests and simple user callables that
/// don't want to define their own error type.
#[derive(Debug)]
pub struct Message(pub String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Message {}

impl Message {
    /// Builds a [`BridgeError::Propagated`] wrapping a [`Message`].
    pub fn bridge_error(text: impl Into<String>) -> BridgeError {
        propagated(Message(text.into()))
    }
}
