use serde::Serialize;

use crate::engine::MatcherResult;
use crate::errors::MatchError;

/// Final status of one spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SpecOutcome {
    Passed,
    /// Every failure message, in the order recorded.
    Failed(Vec<String>),
    Pending(String),
}

impl SpecOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, SpecOutcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SpecOutcome::Failed(_))
    }
}

/// What the runner hands to a reporter for one spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecReport {
    pub description: String,
    pub outcome: SpecOutcome,
    pub results: Vec<MatcherResult>,
}

/// Verdicts collected while one spec body runs. `finalize` consumes it, so a
/// finished spec cannot be appended to.
#[derive(Debug, Clone, Default)]
pub struct SpecResult {
    description: String,
    results: Vec<MatcherResult>,
    failures: Vec<String>,
    // errors already recorded by the expectation that raised them
    raised: Vec<MatchError>,
    pending: Option<String>,
}

impl SpecResult {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), ..Self::default() }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn record(&mut self, verdict: MatcherResult) {
        if !verdict.pass {
            self.failures.push(verdict.message.clone());
        }
        self.results.push(verdict);
    }

    /// A structural error raised in the spec body.
    pub fn record_error(&mut self, err: &MatchError) {
        self.failures.push(err.to_string());
    }

    /// An error raised by an expectation. It fails the spec even when the
    /// body discards the `Err`.
    pub fn record_raised(&mut self, err: &MatchError) {
        self.record_error(err);
        self.raised.push(err.clone());
    }

    /// Whether `err` was recorded when it was raised. A match is consumed, so
    /// an identical error returned later by other code is still recorded.
    pub fn take_raised(&mut self, err: &MatchError) -> bool {
        match self.raised.iter().position(|e| e == err) {
            Some(i) => {
                self.raised.remove(i);
                true
            }
            None => false,
        }
    }

    /// A failure that did not come from a matcher, e.g. a panic message.
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
    }

    pub fn mark_pending(&mut self, reason: impl Into<String>) {
        self.pending = Some(reason.into());
    }

    pub fn results(&self) -> &[MatcherResult] {
        &self.results
    }

    pub fn finalize(self) -> SpecOutcome {
        self.into_report().outcome
    }

    pub fn into_report(self) -> SpecReport {
        let outcome = match (self.pending, self.failures.is_empty()) {
            (Some(reason), _) => SpecOutcome::Pending(reason),
            (None, true) => SpecOutcome::Passed,
            (None, false) => SpecOutcome::Failed(self.failures),
        };
        SpecReport {
            description: self.description,
            outcome,
            results: self.results,
        }
    }
}
