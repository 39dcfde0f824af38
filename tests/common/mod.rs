// Copyright (c) 2026 discipline_bridge contributors. Licensed under Apache License, Version 2.0.

//! Shared test scaffolding: tracing setup for scenarios that want the
//! crate's internal `tracing::trace!` dispatch logging visible when a test
//! fails (`RUST_LOG=discipline_bridge=trace cargo test -- --nocapture`).

use tracing_subscriber::EnvFilter;

/// Installs a compact `tracing_subscriber::fmt` subscriber driven by
/// `RUST_LOG`, defaulting to silent. Safe to call from multiple tests in
/// the same binary (and across binaries): `try_init` no-ops if a global
/// subscriber is already set rather than panicking.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
        .with_test_writer()
        .try_init();
}
