// Copyright (c) 2026 discipline_bridge contributors. Licensed under Apache License, Version 2.0.

//! A minimal thread-parking executor for nested (nestable) bridge calls.
//!
//! `tokio::runtime::Runtime::block_on` refuses to run on a thread that is
//! already inside another `block_on` call on the same thread ("Cannot start
//! a runtime from within a runtime"). That's exactly the shape of a
//! TD -> ED -> TD -> ED chain: the innermost `call_event_from_blocking` runs
//! on a thread that is, a few stack frames up, already parked inside the
//! outermost one's `block_on`. [`block_on_manual`] drives a future with a
//! hand-rolled, thread-parking waker instead, sidestepping that guard.
//! tokio's own sync primitives (the mailbox channel, oneshot result slots)
//! don't need a live reactor to be polled, only a waker, so this is safe to
//! use even though no `Runtime` owns this particular poll loop; any
//! `tokio::time`/`tokio::spawn` used *inside* the nested coroutine still
//! resolves against the ambient runtime context the outer `block_on`
//! established on this thread, since we never exit it.

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};
use std::thread::{self, Thread};

struct ThreadWaker(Thread);

impl Wake for ThreadWaker {
    fn wake(self: Arc<Self>) {
        self.0.unpark();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.0.unpark();
    }
}

/// Polls `fut` to completion on the current thread using `thread::park` to
/// wait between wake-ups, without starting (or re-entering) a tokio
/// `Runtime`.
pub fn block_on_manual<F: Future>(fut: F) -> F::Output {
    let mut fut = pin!(fut);
    let waker = Waker::from(Arc::new(ThreadWaker(thread::current())));
    let mut cx = Context::from_waker(&waker);
    loop {
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(out) => return out,
            Poll::Pending => thread::park(),
        }
    }
}
