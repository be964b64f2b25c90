//! `tracing` subscriber initialization for CLI front-ends.
//!
//! Library crates only ever emit `tracing` events (§2.1); only a binary
//! entry point should call [`init`].

/// Installs a `tracing-subscriber` fmt layer driven by `RUST_LOG`, defaulting
/// to `info` for this crate family and `warn` for everything else.
pub fn init() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "tsdoc=info,warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}
