#![allow(dead_code)]

use cdp_conformance::{FixtureServer, SessionConfig};

/// Skip the current test unless `CDP_E2E=1`. The browser scenarios need a
/// real Chrome install, so plain `cargo test` runs only the hermetic tests.
macro_rules! require_chrome {
    () => {
        if !std::env::var("CDP_E2E").map(|v| v == "1").unwrap_or(false) {
            eprintln!("SKIP: set CDP_E2E=1 (and optionally CHROME_PATH) to run browser scenarios");
            return;
        }
    };
}
pub(crate) use require_chrome;

pub fn init() {
    cdp_conformance::try_init_logging();
}

pub async fn fixture() -> FixtureServer {
    FixtureServer::start()
        .await
        .expect("fixture server should bind a localhost port")
}

/// Scenario config pointed at the fixture server's landing page.
pub fn session_config(fx: &FixtureServer) -> SessionConfig {
    SessionConfig::from_env().baseline_url(fx.url("/"))
}
