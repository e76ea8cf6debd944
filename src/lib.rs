//! CDP Browser domain conformance checks
//!
//! A thin session harness plus end-to-end scenarios exercising the `Browser.*`
//! commands of the Chrome DevTools Protocol through chromiumoxide. The harness
//! owns the session lifecycle from launch through guaranteed teardown and
//! serves the local fixture pages the scenarios navigate to; the scenario
//! catalog itself lives under `tests/`.

pub mod fixtures;
pub mod harness;

use std::path::PathBuf;

pub use fixtures::FixtureServer;
pub use harness::{
    run_scenario, Expectation, HarnessError, Outcome, ScenarioReport, ScenarioState, Session,
    SessionConfig,
};

/// Get log directory path, if file logging was requested via `CDP_LOG_DIR`.
pub fn log_dir() -> Option<PathBuf> {
    std::env::var_os("CDP_LOG_DIR").map(PathBuf::from)
}

/// Initialize logging. Console output is always on; a daily-rolling log file
/// is added when `CDP_LOG_DIR` points at a directory.
pub fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    if let Some(log_dir) = log_dir() {
        let _ = std::fs::create_dir_all(&log_dir);
        let file_appender = tracing_appender::rolling::daily(&log_dir, "cdp-conformance.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();

        None
    }
}

/// Best-effort logging init for tests. Safe to call from every test; the
/// first caller installs the subscriber and later calls are no-ops.
pub fn try_init_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}
