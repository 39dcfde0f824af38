// Copyright (c) 2026 discipline_bridge contributors. Licensed under Apache License, Version 2.0.

//! Type-erased callables, for hosts that only have a callable's identity at
//! runtime (plugin registries, a WSGI-style adapter boundary) and can't lean
//! on the compile-time kind check `to_async`/`to_sync` give statically typed
//! callers. This is the one place `InvalidKind` is a real
//! runtime concern in this crate rather than something the type system
//! already rejected at compile time: once a callable is erased behind
//! `Box<dyn Fn(..)>`, Rust can no longer tell a sync one from an async one
//! for you.

use crate::blocking_from_event::call_blocking_from_event;
use crate::config::ExecutorPool;
use crate::error::BridgeError;
use crate::event_from_blocking::call_event_from_blocking;
use crate::job::{BoxAny, BoxFuture};
use std::sync::Arc;

/// A callable whose kind (sync or async) is only known at runtime.
pub enum DynCallable {
    Sync(Box<dyn Fn() -> BoxAny + Send + Sync>),
    Async(Box<dyn Fn() -> BoxFuture<Result<BoxAny, BridgeError>> + Send + Sync>),
}

impl std::fmt::Debug for DynCallable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DynCallable").field(&self.kind()).finish()
    }
}

impl DynCallable {
    pub fn kind(&self) -> &'static str {
        match self {
            DynCallable::Sync(_) => "sync",
            DynCallable::Async(_) => "async",
        }
    }
}

/// An async-callable handle around a type-erased sync callable, built by
/// [`to_async_dyn`].
#[derive(Clone)]
pub struct DynToAsync {
    callable: Arc<dyn Fn() -> BoxAny + Send + Sync>,
    sensitive: bool,
    executor: Option<ExecutorPool>,
}

impl std::fmt::Debug for DynToAsync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynToAsync").field("sensitive", &self.sensitive).finish_non_exhaustive()
    }
}

impl DynToAsync {
    /// Calls the wrapped sync callable without blocking the current task's
    /// event loop. See [`call_blocking_from_event`].
    pub async fn call(&self) -> Result<BoxAny, BridgeError> {
        let callable = self.callable.clone();
        call_blocking_from_event(move || Ok((*callable)()), self.sensitive, self.executor.clone()).await
    }
}

/// Wraps `callable` for use from event-driven code.
///
/// # Errors
///
/// Returns [`BridgeError::InvalidKind`] if `callable` is
/// [`DynCallable::Async`]: `to_async` only wraps sync callables.
pub fn to_async_dyn(
    callable: DynCallable,
    sensitive: bool,
    executor: Option<ExecutorPool>,
) -> Result<DynToAsync, BridgeError> {
    match callable {
        DynCallable::Sync(f) => {
            Ok(DynToAsync { callable: Arc::from(f), sensitive, executor })
        }
        DynCallable::Async(_) => Err(BridgeError::InvalidKind { name: "to_async", expected: "sync" }),
    }
}

/// A sync-callable handle around a type-erased async callable, built by
/// [`to_sync_dyn`].
#[derive(Clone)]
pub struct DynToSync {
    callable: Arc<dyn Fn() -> BoxFuture<Result<BoxAny, BridgeError>> + Send + Sync>,
}

impl std::fmt::Debug for DynToSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynToSync").finish_non_exhaustive()
    }
}

impl DynToSync {
    /// Calls the wrapped async callable to completion from thread-driven
    /// code. See [`call_event_from_blocking`].
    pub fn call(&self) -> Result<BoxAny, BridgeError> {
        let callable = self.callable.clone();
        call_event_from_blocking(move || (*callable)())
    }
}

/// Wraps `callable` for use from thread-driven code.
///
/// # Errors
///
/// Returns [`BridgeError::InvalidKind`] if `callable` is
/// [`DynCallable::Sync`]: `to_sync` only wraps async callables.
pub fn to_sync_dyn(callable: DynCallable) -> Result<DynToSync, BridgeError> {
    match callable {
        DynCallable::Async(f) => Ok(DynToSync { callable: Arc::from(f) }),
        DynCallable::Sync(_) => Err(BridgeError::InvalidKind { name: "to_sync", expected: "async" }),
    }
}
