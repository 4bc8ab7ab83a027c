//! Expectation evaluation: resolve, compare, negate, phrase.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, warn};

use crate::context::ComparisonContext;
use crate::equality::MatchersUtil;
use crate::errors::{MatchError, Result};
use crate::matchers::{Comparison, Registry};
use crate::value::Value;

/// Verdict of one matcher invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatcherResult {
    pub matcher_name: String,
    pub pass: bool,
    pub message: String,
    pub negated: bool,
    pub actual: String,
    pub expected: Vec<String>,
    /// The matcher raised instead of answering.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub errored: bool,
}

/// Evaluate `actual <matcher_name>(expected...)` against `registry`.
///
/// A failing comparison is returned as data. A factory that panics, or a
/// matcher that errors or panics, yields a failing result carrying the error
/// text. Only an unresolvable
/// matcher name is returned as `Err`.
pub fn evaluate(
    registry: &Registry,
    util: &MatchersUtil,
    actual: &Value,
    matcher_name: &str,
    expected: &[Value],
    negate: bool,
) -> Result<MatcherResult> {
    let factory = registry.resolve(matcher_name)?;
    let ctx = ComparisonContext::new(util.clone(), registry.custom_equality_testers());
    let run = || factory.create(&ctx).compare(actual, expected);

    let outcome = if util.config().catch_matcher_panics {
        panic::catch_unwind(AssertUnwindSafe(run))
            .unwrap_or_else(|payload| Err(MatchError::execution(matcher_name, panic_message(payload))))
    } else {
        run()
    };

    let mut result = MatcherResult {
        matcher_name: matcher_name.to_string(),
        pass: false,
        message: String::new(),
        negated: negate,
        actual: util.pp(actual),
        expected: expected.iter().map(|e| util.pp(e)).collect(),
        errored: false,
    };

    match outcome {
        Ok(Comparison { pass, message }) => {
            result.pass = pass != negate;
            result.message = message
                .unwrap_or_else(|| util.build_failure_message(matcher_name, negate, actual, expected));
        }
        Err(err) => {
            let err = match err {
                e @ MatchError::MatcherExecution { .. } => e,
                other => MatchError::execution(matcher_name, other.to_string()),
            };
            warn!(matcher = %matcher_name, error = %err, "matcher raised");
            result.errored = true;
            result.message = err.to_string();
        }
    }

    debug!(matcher = %matcher_name, negate, pass = result.pass, "evaluated");
    Ok(result)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Config;
    use crate::matchers::{factory, matcher};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn eval(registry: &Registry, actual: impl Into<Value>, name: &str, expected: &[Value], negate: bool) -> Result<MatcherResult> {
        evaluate(registry, &MatchersUtil::default(), &actual.into(), name, expected, negate)
    }

    #[test]
    fn default_messages_follow_negation() {
        let registry = Registry::with_builtins();
        let r = eval(&registry, 1, "toBe", &[Value::from(2)], false).unwrap();
        assert!(!r.pass);
        assert_eq!(r.message, "Expected 1 to be 2.");
        let r = eval(&registry, 2, "toBe", &[Value::from(2)], true).unwrap();
        assert!(!r.pass);
        assert_eq!(r.message, "Expected 2 not to be 2.");
    }

    #[test]
    fn negation_flips_only_pass() {
        let registry = Registry::with_builtins();
        let plain = eval(&registry, -2, "toBeGreaterThan", &[Value::from(0)], false).unwrap();
        let negated = eval(&registry, -2, "toBeGreaterThan", &[Value::from(0)], true).unwrap();
        assert!(!plain.pass);
        assert!(negated.pass);
        assert_eq!(plain.actual, negated.actual);
        assert_eq!(plain.expected, negated.expected);
    }

    #[test]
    fn user_message_takes_precedence() {
        let mut registry = Registry::new();
        registry.register(
            "toBeEven",
            factory(|_| matcher(|actual, _| {
                let even = actual.as_f64().is_some_and(|n| n % 2.0 == 0.0);
                Ok(Comparison::with_message(even, format!("Expected {actual} to be even")))
            })),
        );
        let r = eval(&registry, 8, "toBeEven", &[], true).unwrap();
        assert!(!r.pass);
        assert_eq!(r.message, "Expected 8 to be even");
    }

    #[test]
    fn unknown_matcher_propagates() {
        let registry = Registry::with_builtins();
        let err = eval(&registry, 1, "toBeFrobnicated", &[], false).unwrap_err();
        assert_eq!(err, MatchError::UnknownMatcher("toBeFrobnicated".into()));
    }

    #[test]
    fn matcher_error_becomes_failing_result() {
        let registry = Registry::with_builtins();
        for negate in [false, true] {
            let r = eval(&registry, Value::Null, "toBeCloseTo", &[Value::from(1)], negate).unwrap();
            assert!(!r.pass);
            assert!(r.errored);
            assert!(r.message.starts_with("matcher 'toBeCloseTo' failed"), "{}", r.message);
        }
        let r = eval(&registry, "x", "toMatch", &[Value::from("[")], false).unwrap();
        assert!(r.errored);
        assert!(r.message.contains("invalid pattern"), "{}", r.message);
    }

    #[test]
    fn matcher_panic_becomes_failing_result() {
        let mut registry = Registry::new();
        registry.register("toExplode", factory(|_| matcher(|_, _| panic!("boom"))));
        let r = eval(&registry, 1, "toExplode", &[], false).unwrap();
        assert!(!r.pass);
        assert_eq!(r.message, "matcher 'toExplode' failed: panicked: boom");
    }

    #[test]
    fn factory_panic_becomes_failing_result() {
        let mut registry = Registry::with_builtins();
        registry.register("toBeBroken", factory(|_| panic!("bad factory")));
        let r = eval(&registry, 1, "toBeBroken", &[], true).unwrap();
        assert!(!r.pass);
        assert!(r.errored);
        assert_eq!(r.message, "matcher 'toBeBroken' failed: panicked: bad factory");
    }

    #[test]
    fn context_carries_scope_testers() {
        let mut registry = Registry::with_builtins();
        registry.push_scope("spec");
        registry.add_custom_equality_tester(Arc::new(|a: &Value, b: &Value| match (a, b) {
            (Value::Number(_), Value::String(_)) => Some(true),
            _ => None,
        }));
        let r = eval(&registry, 1, "toEqual", &[Value::from("one")], false).unwrap();
        assert!(r.pass);
        registry.pop_scope().unwrap();
        let r = eval(&registry, 1, "toEqual", &[Value::from("one")], false).unwrap();
        assert!(!r.pass);
    }

    #[test]
    fn messages_use_configured_printer() {
        let registry = Registry::with_builtins();
        let util = MatchersUtil::new(Arc::new(Config { max_pretty_print_array_length: 1, ..Config::default() }));
        let actual = Value::from(serde_json::json!([1, 2]));
        let r = evaluate(&registry, &util, &actual, "toEqual", &[Value::from(serde_json::json!([1]))], false).unwrap();
        assert_eq!(r.message, "Expected [ 1, ... ] to equal [ 1 ].");
    }
}
