//! Values that decide equality themselves.
//!
//! An asymmetric tester may appear on either side of `toEqual` (or inside a
//! `toContain` haystack) and is asked whether the other side matches,
//! e.g. `expect(obj).toEqual(object_containing(json!({"id": 7})))`.

use std::rc::Rc;
use std::sync::Arc;

use regex::Regex;

use crate::context::Config;
use crate::equality::{CustomEqualityTester, MatchersUtil};
use crate::errors::{MatchError, Result};
use crate::pretty::pretty_print;
use crate::value::{Kind, Value};

pub trait AsymmetricTester {
    fn asymmetric_match(&self, other: &Value, util: &MatchersUtil, testers: &[Arc<dyn CustomEqualityTester>]) -> bool;

    /// Text shown in messages in place of the value.
    fn describe(&self, config: &Config) -> String;
}

/// Matches any value of `kind`. `Object` also accepts arrays.
pub fn any(kind: Kind) -> Value {
    Value::Asymmetric(Rc::new(Any(kind)))
}

/// Matches everything except `null` and `undefined`.
pub fn anything() -> Value {
    Value::Asymmetric(Rc::new(Anything))
}

/// Matches objects having at least the members of `sample`.
pub fn object_containing(sample: impl Into<Value>) -> Value {
    Value::Asymmetric(Rc::new(ObjectContaining(sample.into())))
}

/// Matches arrays containing every element of `sample`, in any order.
pub fn array_containing(sample: impl Into<Value>) -> Value {
    Value::Asymmetric(Rc::new(ArrayContaining(sample.into())))
}

/// Matches strings in which `pattern` finds a match.
pub fn string_matching(pattern: &str) -> Result<Value> {
    let re = Regex::new(pattern).map_err(|e| MatchError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;
    Ok(Value::Asymmetric(Rc::new(StringMatching(re))))
}

struct Any(Kind);

impl AsymmetricTester for Any {
    fn asymmetric_match(&self, other: &Value, _: &MatchersUtil, _: &[Arc<dyn CustomEqualityTester>]) -> bool {
        match self.0 {
            Kind::Object => matches!(other.kind(), Kind::Object | Kind::Array),
            kind => other.kind() == kind,
        }
    }

    fn describe(&self, _: &Config) -> String {
        format!("<any({})>", self.0)
    }
}

struct Anything;

impl AsymmetricTester for Anything {
    fn asymmetric_match(&self, other: &Value, _: &MatchersUtil, _: &[Arc<dyn CustomEqualityTester>]) -> bool {
        !matches!(other, Value::Undefined | Value::Null)
    }

    fn describe(&self, _: &Config) -> String {
        "<anything>".to_string()
    }
}

struct ObjectContaining(Value);

impl AsymmetricTester for ObjectContaining {
    fn asymmetric_match(&self, other: &Value, util: &MatchersUtil, testers: &[Arc<dyn CustomEqualityTester>]) -> bool {
        let (Value::Object(sample), Value::Object(_)) = (&self.0, other) else {
            return false;
        };
        let sample = sample.borrow().clone();
        sample.iter().all(|(key, expected)| match other.get(key) {
            Some(actual) => util.equals(expected, &actual, testers),
            None => false,
        })
    }

    fn describe(&self, config: &Config) -> String {
        format!("<objectContaining({})>", pretty_print(&self.0, config))
    }
}

struct ArrayContaining(Value);

impl AsymmetricTester for ArrayContaining {
    fn asymmetric_match(&self, other: &Value, util: &MatchersUtil, testers: &[Arc<dyn CustomEqualityTester>]) -> bool {
        let (Value::Array(sample), Value::Array(_)) = (&self.0, other) else {
            return false;
        };
        let sample = sample.borrow().clone();
        sample.iter().all(|item| util.contains(other, item, testers))
    }

    fn describe(&self, config: &Config) -> String {
        format!("<arrayContaining({})>", pretty_print(&self.0, config))
    }
}

struct StringMatching(Regex);

impl AsymmetricTester for StringMatching {
    fn asymmetric_match(&self, other: &Value, _: &MatchersUtil, _: &[Arc<dyn CustomEqualityTester>]) -> bool {
        other.as_str().is_some_and(|s| self.0.is_match(s))
    }

    fn describe(&self, _: &Config) -> String {
        format!("<stringMatching(/{}/)>", self.0.as_str())
    }
}
