//! Scenario runner
//!
//! Wraps a scenario body with session acquire, outcome classification and
//! teardown that runs no matter how the body ends.

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};

use super::config::SessionConfig;
use super::errors::HarnessError;
use super::session::Session;

/// Lifecycle stages a scenario moves through, in order. `Passed`, `Failed`
/// and `Errored` live on [`Outcome`]; the path records which stages were
/// actually reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    NotStarted,
    SessionAcquired,
    CommandsIssued,
    Asserted,
    TornDown,
}

/// Terminal verdict of one scenario run. `Failed` means a check did not hold,
/// `Errored` means the harness could not even get a session up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(String),
    Errored(String),
}

/// What the scenario body is expected to produce. Most scenarios expect
/// `Success`; the shutdown scenarios expect the probe to fail with a message
/// containing a given fragment.
#[derive(Debug, Clone, Copy)]
pub enum Expectation {
    Success,
    ErrorContaining(&'static str),
}

enum BodyResult {
    Completed(Result<(), HarnessError>),
    Panicked(String),
}

/// Map the body result against the expectation. The second value says
/// whether the assertion stage was reached: panics and pre-assertion harness
/// failures never get there, everything else does.
fn classify(expect: &Expectation, result: BodyResult) -> (Outcome, bool) {
    match (expect, result) {
        (_, BodyResult::Panicked(msg)) => (
            Outcome::Failed(format!("scenario body panicked: {msg}")),
            false,
        ),
        (Expectation::Success, BodyResult::Completed(Ok(()))) => (Outcome::Passed, true),
        (Expectation::Success, BodyResult::Completed(Err(e))) => {
            let asserted = e.is_assertion();
            (Outcome::Failed(e.to_string()), asserted)
        }
        (Expectation::ErrorContaining(needle), BodyResult::Completed(Err(e))) => {
            let msg = e.to_string();
            if msg.contains(needle) {
                (Outcome::Passed, true)
            } else {
                (
                    Outcome::Failed(format!("error {msg:?} does not contain {needle:?}")),
                    true,
                )
            }
        }
        (Expectation::ErrorContaining(needle), BodyResult::Completed(Ok(()))) => (
            Outcome::Failed(format!(
                "expected an error containing {needle:?}, scenario succeeded"
            )),
            true,
        ),
    }
}

/// What one scenario run did: the stages it reached and how it ended.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub name: String,
    pub path: Vec<ScenarioState>,
    pub outcome: Outcome,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed)
    }

    pub fn reached(&self, state: ScenarioState) -> bool {
        self.path.contains(&state)
    }
}

/// Run one scenario end to end: acquire a session, hand it to the body,
/// judge the result against the expectation, and always tear the session
/// down. The body runs in its own task so a panic cannot skip teardown.
pub async fn run_scenario<F, Fut>(
    name: &str,
    config: SessionConfig,
    expect: Expectation,
    body: F,
) -> ScenarioReport
where
    F: FnOnce(Arc<Session>) -> Fut,
    Fut: Future<Output = Result<(), HarnessError>> + Send + 'static,
{
    let mut path = vec![ScenarioState::NotStarted];
    info!("Scenario {} starting", name);

    let session = match Session::acquire(config).await {
        Ok(session) => Arc::new(session),
        Err(e) => {
            error!("Scenario {} could not acquire a session: {}", name, e);
            path.push(ScenarioState::TornDown);
            return ScenarioReport {
                name: name.to_string(),
                path,
                outcome: Outcome::Errored(e.to_string()),
            };
        }
    };
    path.push(ScenarioState::SessionAcquired);

    let body_task = tokio::spawn(body(session.clone()));
    let result = match body_task.await {
        Ok(result) => BodyResult::Completed(result),
        Err(e) => BodyResult::Panicked(e.to_string()),
    };

    if session.commands_issued() {
        path.push(ScenarioState::CommandsIssued);
    }

    let (outcome, asserted) = classify(&expect, result);
    if asserted {
        path.push(ScenarioState::Asserted);
    }

    session.release_quietly().await;
    path.push(ScenarioState::TornDown);

    match &outcome {
        Outcome::Passed => info!("Scenario {} passed", name),
        Outcome::Failed(msg) => error!("Scenario {} failed: {}", name, msg),
        Outcome::Errored(msg) => error!("Scenario {} errored: {}", name, msg),
    }

    ScenarioReport {
        name: name.to_string(),
        path,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mismatch() -> HarnessError {
        HarnessError::AssertionMismatch {
            check: "windowWidth".to_string(),
            expected: "1200".to_string(),
            actual: "1024".to_string(),
        }
    }

    #[test]
    fn test_success_ok_passes() {
        let (outcome, asserted) =
            classify(&Expectation::Success, BodyResult::Completed(Ok(())));
        assert_eq!(outcome, Outcome::Passed);
        assert!(asserted);
    }

    #[test]
    fn test_success_with_assertion_mismatch_fails_after_asserting() {
        let (outcome, asserted) =
            classify(&Expectation::Success, BodyResult::Completed(Err(mismatch())));
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(asserted);
    }

    #[test]
    fn test_success_with_harness_error_fails_before_asserting() {
        let err = HarnessError::Timeout("sample.bin never appeared".to_string());
        let (outcome, asserted) =
            classify(&Expectation::Success, BodyResult::Completed(Err(err)));
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(!asserted);
    }

    #[test]
    fn test_expected_error_with_matching_message_passes() {
        let err = HarnessError::ChannelUnreachable("event handler ended".to_string());
        let (outcome, asserted) = classify(
            &Expectation::ErrorContaining("not reachable"),
            BodyResult::Completed(Err(err)),
        );
        assert_eq!(outcome, Outcome::Passed);
        assert!(asserted);
    }

    #[test]
    fn test_expected_error_with_wrong_message_fails() {
        let err = HarnessError::Command("unrelated failure".to_string());
        let (outcome, asserted) = classify(
            &Expectation::ErrorContaining("not reachable"),
            BodyResult::Completed(Err(err)),
        );
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(asserted);
    }

    #[test]
    fn test_expected_error_but_body_succeeded_fails() {
        let (outcome, asserted) = classify(
            &Expectation::ErrorContaining("not reachable"),
            BodyResult::Completed(Ok(())),
        );
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(asserted);
    }

    #[test]
    fn test_panic_fails_without_asserting() {
        let (outcome, asserted) = classify(
            &Expectation::Success,
            BodyResult::Panicked("task panicked".to_string()),
        );
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(!asserted);
    }

    #[test]
    fn test_report_reached() {
        let report = ScenarioReport {
            name: "sample".to_string(),
            path: vec![ScenarioState::NotStarted, ScenarioState::TornDown],
            outcome: Outcome::Errored("no chrome".to_string()),
        };
        assert!(report.reached(ScenarioState::TornDown));
        assert!(!report.reached(ScenarioState::SessionAcquired));
        assert!(!report.passed());
    }
}
