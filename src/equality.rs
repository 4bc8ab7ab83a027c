//! Deep equality and the comparison toolkit handed to matchers.

use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use itertools::Itertools;

use crate::context::Config;
use crate::pretty::pretty_print;
use crate::value::Value;

/// A user override of deep equality. `None` means "no opinion": the next
/// tester, and finally structural equality, decides.
pub trait CustomEqualityTester: Send + Sync {
    fn test(&self, a: &Value, b: &Value) -> Option<bool>;
}

impl<F> CustomEqualityTester for F
where
    F: Fn(&Value, &Value) -> Option<bool> + Send + Sync,
{
    fn test(&self, a: &Value, b: &Value) -> Option<bool> {
        self(a, b)
    }
}

/// Identity pairs already under comparison.
type Visited = HashSet<(usize, usize)>;

/// Comparison toolkit (`util` in a matcher factory).
#[derive(Clone, Default)]
pub struct MatchersUtil {
    config: Arc<Config>,
}

impl MatchersUtil {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pp(&self, value: &Value) -> String {
        pretty_print(value, &self.config)
    }

    /// Deep equality with `testers` consulted first at every level.
    pub fn equals(&self, a: &Value, b: &Value, testers: &[Arc<dyn CustomEqualityTester>]) -> bool {
        let mut visited = Visited::new();
        self.eq(a, b, testers, &mut visited)
    }

    /// Arrays: some element `equals` the needle. Strings: substring.
    pub fn contains(&self, haystack: &Value, needle: &Value, testers: &[Arc<dyn CustomEqualityTester>]) -> bool {
        match (haystack, needle) {
            (Value::Array(items), _) => {
                let items = items.borrow().clone();
                items.iter().any(|item| self.equals(item, needle, testers))
            }
            (Value::String(s), Value::String(sub)) => s.contains(sub.as_str()),
            _ => false,
        }
    }

    /// Default message for a matcher, e.g.
    /// `Expected 3 not to be greater than 0.`
    pub fn build_failure_message(&self, matcher_name: &str, is_not: bool, actual: &Value, expected: &[Value]) -> String {
        let mut message = format!(
            "Expected {}{}{}",
            self.pp(actual),
            if is_not { " not " } else { " " },
            matcher_words(matcher_name)
        );
        if !expected.is_empty() {
            message.push(' ');
            message.push_str(&expected.iter().map(|e| self.pp(e)).join(", "));
        }
        message.push('.');
        message
    }

    fn eq(&self, a: &Value, b: &Value, testers: &[Arc<dyn CustomEqualityTester>], visited: &mut Visited) -> bool {
        match (a, b) {
            (Value::Asymmetric(x), Value::Asymmetric(y)) => return Rc::ptr_eq(x, y),
            (Value::Asymmetric(x), other) | (other, Value::Asymmetric(x)) => {
                return x.asymmetric_match(other, self, testers);
            }
            _ => {}
        }

        if let Some(verdict) = testers.iter().find_map(|t| t.test(a, b)) {
            return verdict;
        }

        match (a, b) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => numbers_equal(*x, *y),
            (Value::String(x), Value::String(y)) => x == y,
            (Value::Array(x), Value::Array(y)) => {
                if Rc::ptr_eq(x, y) {
                    return true;
                }
                let key = (Rc::as_ptr(x) as usize, Rc::as_ptr(y) as usize);
                if !visited.insert(key) {
                    return true;
                }
                let (xs, ys) = (x.borrow(), y.borrow());
                xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(p, q)| self.eq(p, q, testers, visited))
            }
            (Value::Object(x), Value::Object(y)) => {
                if Rc::ptr_eq(x, y) {
                    return true;
                }
                let key = (Rc::as_ptr(x) as usize, Rc::as_ptr(y) as usize);
                if !visited.insert(key) {
                    return true;
                }
                let (xs, ys) = (x.borrow(), y.borrow());
                xs.len() == ys.len()
                    && xs.iter().all(|(k, p)| match ys.get(k) {
                        Some(q) => self.eq(p, q, testers, visited),
                        None => false,
                    })
            }
            _ => false,
        }
    }
}

/// `NaN` equals `NaN`; `0` and `-0` differ.
fn numbers_equal(x: f64, y: f64) -> bool {
    if x.is_nan() || y.is_nan() {
        return x.is_nan() && y.is_nan();
    }
    if x == 0.0 && y == 0.0 {
        return x.is_sign_negative() == y.is_sign_negative();
    }
    x == y
}

/// `toBeGreaterThan` -> `to be greater than`.
pub fn matcher_words(matcher_name: &str) -> String {
    let mut out = String::with_capacity(matcher_name.len() + 4);
    for c in matcher_name.chars() {
        if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
