//! Session harness module
//!
//! Owns the browser session lifecycle and the scenario runner that the
//! end-to-end tests drive their protocol commands through.

mod chrome;
mod config;
mod errors;
mod predicate;
mod scenario;
mod session;

pub use chrome::{find_chrome, resolve_chrome};
pub use config::SessionConfig;
pub use errors::HarnessError;
pub use predicate::{expect_contains, expect_eq, expect_non_empty, expect_positive};
pub use scenario::{run_scenario, Expectation, Outcome, ScenarioReport, ScenarioState};
pub use session::Session;
