// Copyright (c) 2026 discipline_bridge contributors. Licensed under Apache License, Version 2.0.

//! Host-facing configuration surface. The host controls the non-sensitive
//! pool's worker count indirectly, by building its own [`ExecutorPool`] and
//! installing it with [`set_default_executor_pool`] -- there is no separate
//! worker-count knob. Deliberately tiny otherwise: no files, no CLI, no wire
//! protocol.

use std::sync::{OnceLock, RwLock};

/// The non-sensitive executor pool: a thin newtype around a
/// [`tokio::runtime::Handle`] whose `spawn_blocking` backs
/// `call_blocking_from_event(sensitive: false)`.
#[derive(Clone)]
pub struct ExecutorPool {
    handle: tokio::runtime::Handle,
}

impl std::fmt::Debug for ExecutorPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorPool").finish_non_exhaustive()
    }
}

impl ExecutorPool {
    /// Wraps an existing runtime handle as a pool.
    pub fn from_handle(handle: tokio::runtime::Handle) -> Self {
        ExecutorPool { handle }
    }

    pub(crate) fn handle(&self) -> &tokio::runtime::Handle {
        &self.handle
    }
}

fn default_pool_runtime() -> &'static tokio::runtime::Runtime {
    static POOL: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
    POOL.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .thread_name("discipline-bridge-pool")
            .enable_all()
            .build()
            .expect("failed to build the default executor pool")
    })
}

fn default_pool_slot() -> &'static RwLock<Option<ExecutorPool>> {
    static SLOT: OnceLock<RwLock<Option<ExecutorPool>>> = OnceLock::new();
    SLOT.get_or_init(|| RwLock::new(None))
}

/// The process-global default executor pool `E`, replaceable by the host
/// via [`set_default_executor_pool`].
pub fn default_executor_pool() -> ExecutorPool {
    if let Some(pool) = default_pool_slot()
        .read()
        .expect("default pool slot poisoned")
        .clone()
    {
        return pool;
    }
    let pool = ExecutorPool::from_handle(default_pool_runtime().handle().clone());
    *default_pool_slot().write().expect("default pool slot poisoned") = Some(pool.clone());
    pool
}

/// Replaces the process-global default executor pool. Affects every future
/// `call_blocking_from_event(sensitive: false)` call that doesn't pass its
/// own executor.
pub fn set_default_executor_pool(pool: ExecutorPool) {
    *default_pool_slot().write().expect("default pool slot poisoned") = Some(pool);
}

/// Host-level knobs for this crate. Zero-config by default.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    thread_name_prefix: Option<String>,
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name prefix used for sticky worker threads this crate
    /// spawns (diagnostics only).
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = Some(prefix.into());
        self
    }

    pub fn thread_name_prefix(&self) -> &str {
        self.thread_name_prefix.as_deref().unwrap_or("discipline-bridge")
    }
}
