//! Scope stack and per-spec bookkeeping driven by an external spec runner.

use std::ops::{Deref, DerefMut};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, info_span, warn};

use crate::context::Config;
use crate::equality::{CustomEqualityTester, MatchersUtil};
use crate::errors::{MatchError, Result};
use crate::expectation::Expectation;
use crate::matchers::{MatcherFactory, Registry};
use crate::result::{SpecReport, SpecResult};
use crate::value::Value;

/// Everything an executing scope chain owns: the layered registry, the
/// comparison toolkit and the spec currently collecting verdicts.
pub struct Environment {
    pub(crate) registry: Registry,
    pub(crate) util: MatchersUtil,
    current: Option<SpecResult>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Environment {
    pub fn new(config: Config) -> Self {
        Self::with_registry(Registry::with_builtins(), config)
    }

    pub fn with_registry(registry: Registry, config: Config) -> Self {
        Self {
            registry,
            util: MatchersUtil::new(Arc::new(config)),
            current: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn util(&self) -> &MatchersUtil {
        &self.util
    }

    /// Wrap `actual` for a matcher call in the current scope.
    pub fn expect(&mut self, actual: impl Into<Value>) -> Expectation<'_> {
        Expectation::new(self, actual.into())
    }

    /// Register matchers in the innermost scope.
    pub fn add_matchers<I, S>(&mut self, matchers: I)
    where
        I: IntoIterator<Item = (S, Arc<dyn MatcherFactory>)>,
        S: Into<String>,
    {
        for (name, f) in matchers {
            self.registry.register(name, f);
        }
    }

    pub fn add_custom_equality_tester<T>(&mut self, tester: T)
    where
        T: CustomEqualityTester + 'static,
    {
        self.registry.add_custom_equality_tester(Arc::new(tester));
    }

    /// Enter a nested scope. It is exited when the guard drops, including
    /// during unwinding.
    pub fn enter_scope(&mut self, label: &str) -> ScopeGuard<'_> {
        self.registry.push_scope(label);
        ScopeGuard { env: self }
    }

    /// Run `body` in its own scope (a describe block).
    pub fn describe<R>(&mut self, label: &str, body: impl FnOnce(&mut Environment) -> R) -> R {
        let _span = info_span!("describe", label).entered();
        let mut scope = self.enter_scope(label);
        body(&mut scope)
    }

    /// Run one spec: push a scope, collect verdicts, record a returned error
    /// or panic after whatever was recorded before it, and pop the scope.
    pub fn run_spec<F>(&mut self, description: &str, body: F) -> SpecReport
    where
        F: FnOnce(&mut Environment) -> Result<()>,
    {
        let _span = info_span!("spec", description).entered();
        let mut scope = self.enter_scope(description);
        let outer = scope.current.replace(SpecResult::new(description));

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut scope)));

        let mut spec = scope.current.take().unwrap_or_else(|| SpecResult::new(description));
        scope.current = outer;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(error = %err, "spec body returned an error");
                if !spec.take_raised(&err) {
                    spec.record_error(&err);
                }
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "spec panicked".to_string());
                warn!(%message, "spec body panicked");
                spec.record_failure(message);
            }
        }
        let report = spec.into_report();
        debug!(outcome = ?report.outcome, "spec finished");
        report
    }

    /// Mark the running spec pending. Outside a spec this does nothing.
    pub fn pending(&mut self, reason: &str) {
        if let Some(spec) = self.current.as_mut() {
            spec.mark_pending(reason);
        }
    }

    /// Record a structural error against the running spec.
    pub fn record_error(&mut self, err: &MatchError) {
        if let Some(spec) = self.current.as_mut() {
            spec.record_error(err);
        }
    }

    pub(crate) fn current_spec(&mut self) -> Option<&mut SpecResult> {
        self.current.as_mut()
    }
}

/// Exclusive handle on a nested scope; derefs to the environment.
pub struct ScopeGuard<'e> {
    env: &'e mut Environment,
}

impl Deref for ScopeGuard<'_> {
    type Target = Environment;

    fn deref(&self) -> &Environment {
        self.env
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Environment {
        self.env
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.env.registry.pop_scope() {
            warn!(error = %err, "scope guard found no scope to exit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::{factory, matcher, Comparison};
    use crate::result::SpecOutcome;
    use pretty_assertions::assert_eq;

    fn always_true() -> Arc<dyn MatcherFactory> {
        factory(|_| matcher(|_, _| Ok(Comparison::new(true))))
    }

    #[test]
    fn guard_pops_on_drop() {
        let mut env = Environment::default();
        {
            let mut scope = env.enter_scope("outer");
            scope.add_matchers([("toBeFine", always_true())]);
            assert_eq!(scope.registry().depth(), 1);
            assert!(scope.registry().contains("toBeFine"));
        }
        assert_eq!(env.registry().depth(), 0);
        assert!(!env.registry().contains("toBeFine"));
    }

    #[test]
    fn guard_pops_during_unwinding() {
        let mut env = Environment::default();
        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut scope = env.enter_scope("doomed");
            scope.add_matchers([("toLeak", always_true())]);
            panic!("abort");
        }));
        assert!(caught.is_err());
        assert_eq!(env.registry().depth(), 0);
        assert!(!env.registry().contains("toLeak"));
    }

    #[test]
    fn spec_records_verdicts_then_body_error() {
        let mut env = Environment::default();
        let report = env.run_spec("mixed", |env| {
            env.expect(1).to_be(2)?;
            env.expect(1).to_be(1)?;
            env.expect(1).to("toBeFrobnicated", vec![])?;
            env.expect(5).to_be(6)?;
            Ok(())
        });
        assert_eq!(report.results.len(), 2);
        assert_eq!(
            report.outcome,
            SpecOutcome::Failed(vec!["Expected 1 to be 2.".into(), "unknown matcher: toBeFrobnicated".into()])
        );
    }

    #[test]
    fn discarded_unknown_matcher_still_fails() {
        let mut env = Environment::default();
        let report = env.run_spec("swallowed", |env| {
            let _ = env.expect(1).to("toBeFrobnicated", vec![]);
            env.expect(2).to_be(2)?;
            Ok(())
        });
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.outcome, SpecOutcome::Failed(vec!["unknown matcher: toBeFrobnicated".into()]));
    }

    #[test]
    fn body_error_not_raised_by_an_expectation_is_recorded() {
        let mut env = Environment::default();
        let report = env.run_spec("manual", |_| Err(MatchError::UnknownMatcher("toBeMissing".into())));
        assert_eq!(report.outcome, SpecOutcome::Failed(vec!["unknown matcher: toBeMissing".into()]));
    }

    #[test]
    fn runner_errors_are_recorded_on_the_running_spec() {
        let mut env = Environment::default();
        let report = env.run_spec("setup failed", |env| {
            env.record_error(&MatchError::Config("missing fixture".into()));
            Ok(())
        });
        assert_eq!(report.outcome, SpecOutcome::Failed(vec!["config error: missing fixture".into()]));
    }

    #[test]
    fn spec_panic_keeps_earlier_results() {
        let mut env = Environment::default();
        let report = env.run_spec("panics", |env| {
            env.expect(1).to_be(1)?;
            panic!("body blew up");
        });
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.outcome, SpecOutcome::Failed(vec!["body blew up".into()]));
        assert_eq!(env.registry().depth(), 0);
    }

    #[test]
    fn pending_spec() {
        let mut env = Environment::default();
        let report = env.run_spec("later", |env| {
            env.pending("not implemented");
            Ok(())
        });
        assert_eq!(report.outcome, SpecOutcome::Pending("not implemented".into()));
    }

    #[test]
    fn verdicts_outside_a_spec_are_not_recorded() {
        let mut env = Environment::default();
        let r = env.expect(3).to_be(3).unwrap();
        assert!(r.pass);
        env.pending("ignored");
        let report = env.run_spec("fresh", |_| Ok(()));
        assert_eq!(report.outcome, SpecOutcome::Passed);
        assert!(report.results.is_empty());
    }
}
