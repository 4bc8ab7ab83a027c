use std::cmp::Ordering;
use std::rc::Rc;

use crate::value::Value;

/// Relational comparison the way `<`/`>` behave in a scripting language:
/// two strings compare lexicographically, everything else is coerced to a
/// number. `pred_on_ord` is only consulted when the operands are ordered, so
/// `NaN` (or an uncoercible composite) on either side yields `false`.
pub fn cmp_values<F>(a: &Value, b: &Value, pred_on_ord: F) -> bool
where
    F: Fn(Ordering) -> bool,
{
    match (a, b) {
        (Value::String(sa), Value::String(sb)) => pred_on_ord(sa.cmp(sb)),
        _ => match (to_number(a), to_number(b)) {
            (Some(da), Some(db)) => da.partial_cmp(&db).map(pred_on_ord).unwrap_or(false),
            _ => false,
        },
    }
}

/// Numeric coercion for relational operators. Composites have no useful
/// numeric reading here and return `None`.
pub fn to_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => Some(*n),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Undefined => Some(f64::NAN),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                Some(0.0)
            } else {
                Some(t.parse::<f64>().unwrap_or(f64::NAN))
            }
        }
        Value::Array(_) | Value::Object(_) | Value::Asymmetric(_) => None,
    }
}

/// Strict equality (`===`): scalars by value with IEEE number semantics
/// (`NaN !== NaN`, `0 === -0`), composites by identity.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Asymmetric(x), Value::Asymmetric(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings() {
        assert!(cmp_values(&Value::from(3), &Value::from(2), |o| o == Ordering::Greater));
        assert!(cmp_values(&Value::from("10"), &Value::from(9), |o| o == Ordering::Greater));
        assert!(!cmp_values(&Value::from(-2), &Value::from(0), |o| o == Ordering::Greater));
    }

    #[test]
    fn strings_compare_lexicographically() {
        assert!(cmp_values(&Value::from("b"), &Value::from("a"), |o| o == Ordering::Greater));
        assert!(cmp_values(&Value::from("10"), &Value::from("9"), |o| o == Ordering::Less));
    }

    #[test]
    fn nan_is_unordered() {
        let nan = Value::Number(f64::NAN);
        assert!(!cmp_values(&nan, &Value::from(1), |o| o != Ordering::Equal));
        assert!(!cmp_values(&Value::Undefined, &Value::from(1), |_| true));
        assert!(!cmp_values(&Value::from(json!([1])), &Value::from(0), |_| true));
    }

    #[test]
    fn strict_equality() {
        assert!(strict_equals(&Value::Number(0.0), &Value::Number(-0.0)));
        assert!(!strict_equals(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
        let a = Value::from(json!([1]));
        assert!(strict_equals(&a, &a.clone()));
        assert!(!strict_equals(&a, &Value::from(json!([1]))));
        assert!(!strict_equals(&Value::from(1), &Value::from("1")));
    }
}
