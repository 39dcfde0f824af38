/*
 *   Copyright (c) 2026 discipline_bridge contributors
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! Bridges between event-driven (ED) and thread-driven (TD) concurrency
//! disciplines, letting code written for one call into code written for the
//! other without either side changing its own concurrency model.
//!
//! - [`to_sync`]/[`call_event_from_blocking`]: run an async function from
//!   thread-driven code, blocking the calling thread until it completes.
//! - [`to_async`]/[`call_blocking_from_event`]: run a sync function from an
//!   event-driven task without blocking the task's own event loop thread.
//! - [`SensitiveContext`]: scope a group of `to_async(.., sensitive: true)`
//!   calls onto one shared sticky worker thread.
//!
//! Dispatch correctly handles chains that cross the boundary more than once
//! on the same call stack (TD -> ED -> TD -> ED, ...): see
//! `event_from_blocking` and `blocking_from_event` for how thread affinity
//! and nesting depth are tracked.
//!
//! # Dynamic callables
//!
//! [`to_async`] and [`to_sync`] reject the wrong kind of callable at
//! compile time (a function that doesn't return the right kind of value
//! simply won't satisfy the generic bound). Code that only has a
//! type-erased callable at hand -- e.g. dispatching on a registry of
//! plugins -- should use [`DynCallable`]/[`to_async_dyn`]/[`to_sync_dyn`]
//! instead, which perform that check at runtime and return
//! [`BridgeError::InvalidKind`] on mismatch.

mod blocking_from_event;
mod config;
mod context;
mod dyn_callable;
mod error;
mod event_from_blocking;
mod job;
mod registry;
mod sensitive_context;
mod sensitive_worker;
mod waker;

pub use blocking_from_event::{call_blocking_from_event, to_async, ToAsync};
pub use config::{default_executor_pool, set_default_executor_pool, BridgeConfig, ExecutorPool};
pub use dyn_callable::{to_async_dyn, to_sync_dyn, DynCallable, DynToAsync, DynToSync};
pub use error::{propagated, BridgeError, Message};
pub use event_from_blocking::{call_event_from_blocking, to_sync, ToSync};
pub use job::BoxAny;
pub use sensitive_context::SensitiveContext;
pub use sensitive_worker::{global_sensitive_worker, SensitiveWorker};
