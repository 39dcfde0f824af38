// Copyright (c) 2026 discipline_bridge contributors. Licensed under Apache License, Version 2.0.

//! A single, long-lived worker thread processing a FIFO queue of blocking
//! jobs. One process-global instance (`W0`, see
//! [`global_sensitive_worker`]); one more per active `SensitiveContext`.

use crate::error::BridgeError;
use crate::job::Job;
use std::sync::mpsc;
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;

/// A dedicated OS thread draining a FIFO queue of [`Job`]s. Jobs run one at
/// a time, in submission order, on the same fixed thread for the worker's
/// whole lifetime -- this is what gives callees thread-local-state affinity
/// across bridges.
pub struct SensitiveWorker {
    sender: mpsc::Sender<WorkerMsg>,
    handle: std::sync::Mutex<Option<JoinHandle<()>>>,
}

enum WorkerMsg {
    Run(Job),
    Shutdown,
}

impl std::fmt::Debug for SensitiveWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensitiveWorker").finish_non_exhaustive()
    }
}

impl SensitiveWorker {
    /// Spawns a new sticky worker thread named `name` (diagnostics only --
    /// shows up in debuggers/`ps`/panic messages).
    pub fn spawn(name: impl Into<String>) -> Result<Arc<Self>, BridgeError> {
        let (sender, receiver) = mpsc::channel::<WorkerMsg>();
        let handle = std::thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                for msg in receiver {
                    match msg {
                        WorkerMsg::Run(job) => job.run(),
                        WorkerMsg::Shutdown => break,
                    }
                }
                tracing::trace!("discipline_bridge: sensitive worker thread exiting");
            })
            .map_err(BridgeError::ThreadSpawn)?;
        Ok(Arc::new(SensitiveWorker {
            sender,
            handle: std::sync::Mutex::new(Some(handle)),
        }))
    }

    /// Enqueues `job`. Never blocks the caller; the job runs asynchronously
    /// on the worker thread and the result arrives through `job`'s own
    /// one-shot slot.
    pub fn submit(&self, job: Job) {
        // A send error means the worker thread already exited (e.g. racing
        // with `shutdown`); there is nobody left to run the job, so it is
        // simply dropped along with its result slot, and the awaiting side
        // observes a closed channel.
        let _ = self.sender.send(WorkerMsg::Run(job));
    }

    /// Drains pending jobs, then stops the worker thread. Used only by
    /// context-scoped workers -- the global worker `W0` is
    /// never explicitly shut down, relying on process exit instead.
    pub fn shutdown(&self) {
        let _ = self.sender.send(WorkerMsg::Shutdown);
        if let Some(handle) = self.handle.lock().expect("worker handle poisoned").take() {
            let _ = handle.join();
        }
    }
}

/// The process-global sensitive worker `W0`. Lazily started on first use;
/// lives until process exit.
pub fn global_sensitive_worker() -> Arc<SensitiveWorker> {
    static W0: OnceLock<Arc<SensitiveWorker>> = OnceLock::new();
    W0.get_or_init(|| {
        SensitiveWorker::spawn("discipline-bridge-w0")
            .expect("failed to spawn the global sensitive worker")
    })
    .clone()
}
