//! Human-readable rendering of values for matcher messages.

use std::collections::HashSet;

use itertools::Itertools;

use crate::context::Config;
use crate::value::Value;

/// Render `value` the way failure messages show it, e.g.
/// `Object({ a: [ 1, 'x' ] })`.
pub fn pretty_print(value: &Value, config: &Config) -> String {
    let mut printer = Printer {
        config,
        in_progress: HashSet::new(),
    };
    printer.format(value, 0)
}

/// Numbers as a scripting language prints them: `8`, not `8.0`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{n}")
    }
}

struct Printer<'a> {
    config: &'a Config,
    // composites on the current path; a repeat is a cycle
    in_progress: HashSet<usize>,
}

impl Printer<'_> {
    fn format(&mut self, value: &Value, depth: usize) -> String {
        match value {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => format!("'{s}'"),
            Value::Asymmetric(tester) => tester.describe(self.config),
            Value::Array(_) | Value::Object(_) => self.format_composite(value, depth),
        }
    }

    fn format_composite(&mut self, value: &Value, depth: usize) -> String {
        let kind = value.kind();
        let Some(id) = value.identity() else {
            return kind.name().to_string();
        };
        if self.in_progress.contains(&id) {
            return format!("<circular reference: {kind}>");
        }
        if depth >= self.config.max_pretty_print_depth {
            return kind.name().to_string();
        }
        self.in_progress.insert(id);
        let out = match value {
            Value::Array(items) => {
                let items = items.borrow();
                let limit = self.config.max_pretty_print_array_length;
                let mut parts = items
                    .iter()
                    .take(limit)
                    .map(|item| self.format(item, depth + 1))
                    .collect::<Vec<_>>();
                if items.len() > limit {
                    parts.push("...".to_string());
                }
                if parts.is_empty() {
                    "[  ]".to_string()
                } else {
                    format!("[ {} ]", parts.join(", "))
                }
            }
            Value::Object(members) => {
                let members = members.borrow();
                let limit = self.config.max_pretty_print_object_keys;
                let mut parts = members
                    .iter()
                    .take(limit)
                    .map(|(k, v)| format!("{k}: {}", self.format(v, depth + 1)))
                    .collect::<Vec<_>>();
                if members.len() > limit {
                    parts.push("...".to_string());
                }
                format!("Object({{ {} }})", parts.iter().join(", "))
            }
            _ => kind.name().to_string(),
        };
        self.in_progress.remove(&id);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pp(v: &Value) -> String {
        pretty_print(v, &Config::default())
    }

    #[test]
    fn scalars() {
        assert_eq!(pp(&Value::from(8)), "8");
        assert_eq!(pp(&Value::from(0.5)), "0.5");
        assert_eq!(pp(&Value::Number(-0.0)), "-0");
        assert_eq!(pp(&Value::Number(f64::NAN)), "NaN");
        assert_eq!(pp(&Value::Number(f64::NEG_INFINITY)), "-Infinity");
        assert_eq!(pp(&Value::from("hi")), "'hi'");
        assert_eq!(pp(&Value::Undefined), "undefined");
    }

    #[test]
    fn composites() {
        assert_eq!(pp(&Value::from(json!([1, "x", null]))), "[ 1, 'x', null ]");
        assert_eq!(pp(&Value::from(json!([]))), "[  ]");
        assert_eq!(pp(&Value::from(json!({"a": 1, "b": [true]}))), "Object({ a: 1, b: [ true ] })");
        assert_eq!(pp(&Value::from(json!({}))), "Object({  })");
    }

    #[test]
    fn cycles_are_marked() {
        let a = Value::array(vec![Value::from(1)]);
        a.push(a.clone());
        assert_eq!(pp(&a), "[ 1, <circular reference: Array> ]");
    }

    #[test]
    fn shared_but_acyclic_is_printed_twice() {
        let shared = Value::from(json!([1]));
        let outer = Value::array(vec![shared.clone(), shared]);
        assert_eq!(pp(&outer), "[ [ 1 ], [ 1 ] ]");
    }

    #[test]
    fn respects_limits() {
        let config = Config {
            max_pretty_print_depth: 1,
            max_pretty_print_array_length: 2,
            ..Config::default()
        };
        let v = Value::from(json!([1, 2, 3]));
        assert_eq!(pretty_print(&v, &config), "[ 1, 2, ... ]");
        let nested = Value::from(json!([[1]]));
        assert_eq!(pretty_print(&nested, &config), "[ Array ]");
    }
}
