//! Harness error types

use thiserror::Error;

/// Errors surfaced by the session harness and the scenario runner.
///
/// `ChannelUnreachable` is the terminal state of a session whose browser
/// process went away; its message always contains "not reachable" so
/// scenarios that deliberately take the browser down can assert on it.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Failed to start browser session: {0}")]
    SessionStart(String),

    #[error("Browser not reachable: {0}")]
    ChannelUnreachable(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Assertion {check:?} failed: expected {expected}, actual {actual}")]
    AssertionMismatch {
        check: String,
        expected: String,
        actual: String,
    },

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// True for the assertion variant, which scenario classification treats
    /// as a failed check rather than a harness fault.
    pub fn is_assertion(&self) -> bool {
        matches!(self, HarnessError::AssertionMismatch { .. })
    }
}
