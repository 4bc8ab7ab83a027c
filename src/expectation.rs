use crate::engine::{evaluate, MatcherResult};
use crate::errors::Result;
use crate::scope::Environment;
use crate::value::Value;

/// `expect(actual)`: an actual value waiting for a matcher.
///
/// Every matcher method evaluates in the environment's current scope and,
/// inside `run_spec`, records the verdict on the running spec. A failing
/// verdict is `Ok` with `pass == false`; `Err` means the matcher name did
/// not resolve, and that error is recorded as a failure of the running spec
/// as well.
pub struct Expectation<'e> {
    env: &'e mut Environment,
    actual: Value,
    negate: bool,
}

impl<'e> Expectation<'e> {
    pub(crate) fn new(env: &'e mut Environment, actual: Value) -> Self {
        Self { env, actual, negate: false }
    }

    /// Invert the next matcher's verdict.
    #[allow(clippy::should_implement_trait)]
    pub fn not(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    pub fn actual(&self) -> &Value {
        &self.actual
    }

    /// Run any registered matcher by name, e.g. a custom one.
    pub fn to(self, matcher_name: &str, expected: Vec<Value>) -> Result<MatcherResult> {
        let evaluated = evaluate(
            &self.env.registry,
            &self.env.util,
            &self.actual,
            matcher_name,
            &expected,
            self.negate,
        );
        if let Some(spec) = self.env.current_spec() {
            match &evaluated {
                Ok(result) => spec.record(result.clone()),
                Err(err) => spec.record_raised(err),
            }
        }
        evaluated
    }

    pub fn to_be(self, expected: impl Into<Value>) -> Result<MatcherResult> {
        self.to("toBe", vec![expected.into()])
    }

    pub fn to_equal(self, expected: impl Into<Value>) -> Result<MatcherResult> {
        self.to("toEqual", vec![expected.into()])
    }

    pub fn to_be_greater_than(self, expected: impl Into<Value>) -> Result<MatcherResult> {
        self.to("toBeGreaterThan", vec![expected.into()])
    }

    pub fn to_be_greater_than_or_equal(self, expected: impl Into<Value>) -> Result<MatcherResult> {
        self.to("toBeGreaterThanOrEqual", vec![expected.into()])
    }

    pub fn to_be_less_than(self, expected: impl Into<Value>) -> Result<MatcherResult> {
        self.to("toBeLessThan", vec![expected.into()])
    }

    pub fn to_be_less_than_or_equal(self, expected: impl Into<Value>) -> Result<MatcherResult> {
        self.to("toBeLessThanOrEqual", vec![expected.into()])
    }

    pub fn to_be_undefined(self) -> Result<MatcherResult> {
        self.to("toBeUndefined", Vec::new())
    }

    pub fn to_be_defined(self) -> Result<MatcherResult> {
        self.to("toBeDefined", Vec::new())
    }

    pub fn to_be_null(self) -> Result<MatcherResult> {
        self.to("toBeNull", Vec::new())
    }

    pub fn to_be_nan(self) -> Result<MatcherResult> {
        self.to("toBeNaN", Vec::new())
    }

    pub fn to_be_truthy(self) -> Result<MatcherResult> {
        self.to("toBeTruthy", Vec::new())
    }

    pub fn to_be_falsy(self) -> Result<MatcherResult> {
        self.to("toBeFalsy", Vec::new())
    }

    /// `precision` defaults to the configured number of decimal digits.
    pub fn to_be_close_to(self, expected: f64, precision: Option<i32>) -> Result<MatcherResult> {
        let mut args = vec![Value::from(expected)];
        if let Some(p) = precision {
            args.push(Value::from(p));
        }
        self.to("toBeCloseTo", args)
    }

    pub fn to_contain(self, expected: impl Into<Value>) -> Result<MatcherResult> {
        self.to("toContain", vec![expected.into()])
    }

    pub fn to_match(self, pattern: &str) -> Result<MatcherResult> {
        self.to("toMatch", vec![Value::from(pattern)])
    }
}

#[cfg(test)]
mod tests {
    use crate::scope::Environment;
    use serde_json::json;

    #[test]
    fn double_not_cancels() {
        let mut env = Environment::default();
        let e = env.expect(1).not().not();
        assert!(!e.is_negated());
        assert!(e.to_be(1).unwrap().pass);
    }

    #[test]
    fn typed_methods_route_to_builtins() {
        let mut env = Environment::default();
        assert!(env.expect(json!([1, 2])).to_contain(2).unwrap().pass);
        assert!(env.expect("abc").to_match("b").unwrap().pass);
        assert!(env.expect(3.14159).to_be_close_to(3.14, None).unwrap().pass);
        assert!(env.expect(3.14159).not().to_be_close_to(3.14, Some(4)).unwrap().pass);
        assert!(env.expect(json!(null)).to_be_null().unwrap().pass);
        assert!(env.expect(json!(null)).to_be_defined().unwrap().pass);
        assert!(env.expect(2).to_be_less_than_or_equal(2).unwrap().pass);
    }
}
