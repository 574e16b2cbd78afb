//! Tracing initialization for processes embedding the library.

use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Respects `RUST_LOG`; defaults to `mindshift=info`. Safe to call more
/// than once - later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mindshift=info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
