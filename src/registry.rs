// Copyright (c) 2026 discipline_bridge contributors. Licensed under Apache License, Version 2.0.

//! Thread registry: tracks which OS threads are running event loops, and
//! which of those are reachable as thread-affine mailbox targets.
//!
//! Generalizes a single dedicated-thread bookkeeping pattern to an
//! arbitrary number of event-loop threads rather than one fixed thread.

use crate::job::Job;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{OnceLock, RwLock};
use std::task::{Context, Poll};
use std::thread::ThreadId;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

struct ThreadEntry {
    /// Set while this thread is literally inside `Future::poll` of the ED
    /// task it's driving (not merely "has a loop somewhere up the stack").
    /// This is what `is_event_loop_thread` answers: "already inside an event
    /// loop", not "ever hosted one".
    dispatching: AtomicBool,
    /// Sender side of this thread's thread-affine mailbox, present for the
    /// whole lifetime of its outermost `call_event_from_blocking` (including
    /// while nested bridges run on it).
    mailbox: Option<UnboundedSender<Job>>,
}

/// O(1) lookups, short critical sections: a `RwLock<HashMap<..>>` matches
/// the synchronization granularity of the `OnceLock`/`Mutex`-guarded
/// singleton state elsewhere in this crate, rather than reaching for a
/// lock-free map this crate has no real need for.
fn registry() -> &'static RwLock<HashMap<ThreadId, ThreadEntry>> {
    static REGISTRY: OnceLock<RwLock<HashMap<ThreadId, ThreadEntry>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

fn with_entry_mut<R>(thread: ThreadId, f: impl FnOnce(&mut ThreadEntry) -> R) -> R {
    let mut guard = registry().write().expect("thread registry poisoned");
    let entry = guard.entry(thread).or_insert_with(|| ThreadEntry {
        dispatching: AtomicBool::new(false),
        mailbox: None,
    });
    f(entry)
}

/// Marks `thread` as currently dispatching (polling its ED task) or not.
/// Called by the drain loop around every poll of the user coroutine.
pub fn mark_dispatching(thread: ThreadId, dispatching: bool) {
    let guard = registry().read().expect("thread registry poisoned");
    if let Some(entry) = guard.get(&thread) {
        entry.dispatching.store(dispatching, Ordering::Release);
    } else {
        drop(guard);
        with_entry_mut(thread, |e| e.dispatching.store(dispatching, Ordering::Release));
    }
}

/// Answers "is `thread` currently inside a running event loop's dispatch?"
pub fn is_event_loop_thread(thread: ThreadId) -> bool {
    registry()
        .read()
        .expect("thread registry poisoned")
        .get(&thread)
        .is_some_and(|e| e.dispatching.load(Ordering::Acquire))
}

/// Registers (or reuses, for nested invocations on the same thread) a
/// mailbox sender for `thread`, returning a clone of it.
pub fn register_mailbox(thread: ThreadId, sender: UnboundedSender<Job>) {
    with_entry_mut(thread, |e| {
        if e.mailbox.is_none() {
            tracing::trace!(?thread, "discipline_bridge: mailbox registered");
            e.mailbox = Some(sender);
        }
    });
}

/// Removes `thread`'s mailbox entry. Called once the outermost
/// `call_event_from_blocking` on that thread returns.
pub fn unregister_mailbox(thread: ThreadId) {
    tracing::trace!(?thread, "discipline_bridge: mailbox unregistered");
    with_entry_mut(thread, |e| e.mailbox = None);
}

/// Looks up the mailbox sender for `thread`, if it's currently the parked
/// thread of an ancestor `call_event_from_blocking`.
pub fn mailbox_sender_for(thread: ThreadId) -> Option<UnboundedSender<Job>> {
    registry()
        .read()
        .expect("thread registry poisoned")
        .get(&thread)
        .and_then(|e| e.mailbox.clone())
}

/// Thread-local depth counter of nested `call_event_from_blocking` calls on
/// the current thread. Zero means the next call is the outermost one and
/// should build a real `tokio::runtime::Runtime`; nonzero means the caller
/// is itself running as thread-affine job code dispatched from an ancestor,
/// so a real `Runtime::block_on` would panic (tokio disallows nesting it on
/// one OS thread) and we must drive the nested coroutine with a manual,
/// thread-parking poll loop instead (see `waker.rs`).
pub fn event_from_blocking_depth() -> usize {
    DEPTH.with(|d| d.get())
}

/// RAII guard bumping/restoring the depth counter for the extent of one
/// `call_event_from_blocking` invocation.
pub struct DepthGuard;

impl DepthGuard {
    pub fn enter() -> Self {
        DEPTH.with(|d| d.set(d.get() + 1));
        DepthGuard
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get() - 1));
    }
}

thread_local! {
    static DEPTH: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

thread_local! {
    /// The receiving half of this thread's mailbox, installed once for the
    /// extent of its outermost `call_event_from_blocking` call and reused by
    /// any nested calls on the same thread. Thread-local (never shared
    /// across threads) so borrowing it is always uncontended: the outer
    /// drain loop and any nested one only ever touch it sequentially, since
    /// nesting means the outer one is synchronously blocked inside a job's
    /// callable while the nested one runs.
    static MAILBOX_RX: RefCell<Option<UnboundedReceiver<Job>>> = const { RefCell::new(None) };
}

/// Installs the receiving half of a freshly created mailbox for the current
/// thread. Called once, by the outermost `call_event_from_blocking` on this
/// thread.
pub fn install_mailbox_receiver(rx: UnboundedReceiver<Job>) {
    MAILBOX_RX.with(|cell| *cell.borrow_mut() = Some(rx));
}

/// Tears down the current thread's mailbox receiver. Called once the
/// outermost `call_event_from_blocking` on this thread returns.
pub fn uninstall_mailbox_receiver() {
    MAILBOX_RX.with(|cell| *cell.borrow_mut() = None);
}

/// Polls the current thread's installed mailbox receiver for the next job,
/// registering `cx`'s waker for wake-up on the next send.
///
/// # Panics
///
/// Panics if no mailbox receiver is installed on this thread. Only the
/// drain loop calls this, and only after installing (or inheriting, for
/// nested calls) one.
pub fn poll_mailbox_recv(cx: &mut Context<'_>) -> Poll<Option<Job>> {
    MAILBOX_RX.with(|cell| {
        let mut guard = cell.borrow_mut();
        let rx = guard
            .as_mut()
            .expect("poll_mailbox_recv called without an installed mailbox");
        rx.poll_recv(cx)
    })
}

/// The process's root thread: the thread that first touched this crate.
/// Privileged for main-loop reuse.
pub fn root_thread() -> ThreadId {
    static ROOT: OnceLock<ThreadId> = OnceLock::new();
    *ROOT.get_or_init(|| std::thread::current().id())
}

pub fn is_root_thread(thread: ThreadId) -> bool {
    thread == root_thread()
}

/// The cached root-thread main loop, reused across sequential (non-nested)
/// top-level `call_event_from_blocking` calls from the root thread.
/// Never torn down; outlives every individual call.
pub fn root_main_loop() -> &'static tokio::runtime::Runtime {
    static ROOT_LOOP: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
    ROOT_LOOP.get_or_init(|| {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build root main loop runtime")
    })
}
