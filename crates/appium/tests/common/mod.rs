// Shared helpers for integration tests
#![allow(dead_code)]

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs a tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to `appium_rs=debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("appium_rs=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
