//! Logger setup for native embedders and tests.
//!
//! Messages go through the `log` facade with a bracketed component prefix
//! (`[CAPTURE]`, `[OVERLAY]`, `[MENU]` ...). The browser binding installs
//! its own console logger instead.

/// Initialize logging (reads `RUST_LOG`, defaults to `warn`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .try_init();
}

/// Logger for unit tests: everything at debug, captured by the test harness.
pub fn init_test_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
