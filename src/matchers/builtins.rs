//! Matchers every root scope starts with.

use std::cmp::Ordering;
use std::sync::Arc;

use regex::Regex;

use super::{arg, factory, Comparison, Matcher, MatcherFactory};
use crate::comparison::{cmp_values, strict_equals};
use crate::context::ComparisonContext;
use crate::errors::{MatchError, Result};
use crate::value::Value;

pub fn all() -> Vec<(&'static str, Arc<dyn MatcherFactory>)> {
    vec![
        ("toBe", factory(|_| boxed(ToBe))),
        ("toEqual", factory(|ctx| boxed(ToEqual(ctx.clone())))),
        ("toBeUndefined", factory(|_| boxed(ToBeUndefined))),
        ("toBeDefined", factory(|_| boxed(ToBeDefined))),
        ("toBeNull", factory(|_| boxed(ToBeNull))),
        ("toBeNaN", factory(|_| boxed(ToBeNaN))),
        ("toBeTruthy", factory(|_| boxed(ToBeTruthy))),
        ("toBeFalsy", factory(|_| boxed(ToBeFalsy))),
        ("toBeGreaterThan", factory(|_| boxed(Relational(|o| o == Ordering::Greater)))),
        ("toBeLessThan", factory(|_| boxed(Relational(|o| o == Ordering::Less)))),
        ("toBeGreaterThanOrEqual", factory(|_| boxed(Relational(|o| o != Ordering::Less)))),
        ("toBeLessThanOrEqual", factory(|_| boxed(Relational(|o| o != Ordering::Greater)))),
        ("toBeCloseTo", factory(|ctx| boxed(ToBeCloseTo { default_precision: ctx.util.config().default_close_to_precision }))),
        ("toContain", factory(|ctx| boxed(ToContain(ctx.clone())))),
        ("toMatch", factory(|_| boxed(ToMatch))),
    ]
}

fn boxed<M: Matcher + 'static>(m: M) -> Box<dyn Matcher> {
    Box::new(m)
}

/// Strict equality: scalars by value, composites by identity.
pub struct ToBe;
impl Matcher for ToBe {
    fn compare(&self, actual: &Value, expected: &[Value]) -> Result<Comparison> {
        Ok(strict_equals(actual, &arg(expected, 0)).into())
    }
}

/// Deep equality through the scope's custom equality testers.
pub struct ToEqual(ComparisonContext);
impl Matcher for ToEqual {
    fn compare(&self, actual: &Value, expected: &[Value]) -> Result<Comparison> {
        Ok(self.0.equals(actual, &arg(expected, 0)).into())
    }
}

pub struct ToBeUndefined;
impl Matcher for ToBeUndefined {
    fn compare(&self, actual: &Value, _: &[Value]) -> Result<Comparison> {
        Ok(actual.is_undefined().into())
    }
}

pub struct ToBeDefined;
impl Matcher for ToBeDefined {
    fn compare(&self, actual: &Value, _: &[Value]) -> Result<Comparison> {
        Ok((!actual.is_undefined()).into())
    }
}

pub struct ToBeNull;
impl Matcher for ToBeNull {
    fn compare(&self, actual: &Value, _: &[Value]) -> Result<Comparison> {
        Ok(actual.is_null().into())
    }
}

pub struct ToBeNaN;
impl Matcher for ToBeNaN {
    fn compare(&self, actual: &Value, _: &[Value]) -> Result<Comparison> {
        Ok(actual.as_f64().is_some_and(f64::is_nan).into())
    }
}

pub struct ToBeTruthy;
impl Matcher for ToBeTruthy {
    fn compare(&self, actual: &Value, _: &[Value]) -> Result<Comparison> {
        Ok(actual.is_truthy().into())
    }
}

pub struct ToBeFalsy;
impl Matcher for ToBeFalsy {
    fn compare(&self, actual: &Value, _: &[Value]) -> Result<Comparison> {
        Ok((!actual.is_truthy()).into())
    }
}

/// `actual <op> expected` for the ordering predicate it wraps.
pub struct Relational(fn(Ordering) -> bool);
impl Matcher for Relational {
    fn compare(&self, actual: &Value, expected: &[Value]) -> Result<Comparison> {
        Ok(cmp_values(actual, &arg(expected, 0), self.0).into())
    }
}

/// `|expected - actual| < 10^-precision / 2`.
pub struct ToBeCloseTo {
    default_precision: i32,
}
impl Matcher for ToBeCloseTo {
    fn compare(&self, actual: &Value, expected: &[Value]) -> Result<Comparison> {
        let (Some(a), Some(e)) = (actual.as_f64(), arg(expected, 0).as_f64()) else {
            return Err(MatchError::execution(
                "toBeCloseTo",
                format!("expected and actual must both be numbers, got {actual} and {}", arg(expected, 0)),
            ));
        };
        let precision = arg(expected, 1)
            .as_f64()
            .map(|p| p.clamp(-300.0, 300.0) as i32)
            .unwrap_or(self.default_precision);
        let tolerance = 10f64.powi(precision.saturating_neg()) / 2.0;
        Ok(((e - a).abs() < tolerance).into())
    }
}

pub struct ToContain(ComparisonContext);
impl Matcher for ToContain {
    fn compare(&self, actual: &Value, expected: &[Value]) -> Result<Comparison> {
        Ok(self.0.contains(actual, &arg(expected, 0)).into())
    }
}

/// Regex search of a string; the expected argument is the pattern.
pub struct ToMatch;
impl Matcher for ToMatch {
    fn compare(&self, actual: &Value, expected: &[Value]) -> Result<Comparison> {
        let pattern = arg(expected, 0);
        let Some(pattern) = pattern.as_str() else {
            return Err(MatchError::execution("toMatch", format!("expected a pattern string, got {pattern}")));
        };
        let re = Regex::new(pattern).map_err(|e| MatchError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(actual.as_str().is_some_and(|s| re.is_match(s)).into())
    }
}
