// src/expression.rs
//! Textual expectations, e.g. `expect([1, 2]).not.toEqual([1, 3])`.
//!
//! Values are JSON literals plus `undefined`, `NaN`, `Infinity`, single-quoted
//! strings, bare object keys and the asymmetric testers `any(Number)`,
//! `anything()`, `objectContaining({..})`, `arrayContaining([..])` and
//! `stringMatching('re')`.

use crate::asymmetric::{any, anything, array_containing, object_containing, string_matching};
use crate::engine::MatcherResult;
use crate::errors::Result;
use crate::parser::Parser;
use crate::scope::Environment;
use crate::value::{Kind, Value};

#[derive(Debug, Clone)]
pub struct ExpectExpr {
    pub actual: Value,
    pub negate: bool,
    pub matcher: String,
    pub args: Vec<Value>,
}

impl ExpectExpr {
    /// Evaluate in `env`'s current scope (and spec, if one is running).
    pub fn apply(self, env: &mut Environment) -> Result<MatcherResult> {
        let mut expectation = env.expect(self.actual);
        if self.negate {
            expectation = expectation.not();
        }
        expectation.to(&self.matcher, self.args)
    }
}

pub fn parse_expectation(input: &str) -> Result<ExpectExpr> {
    let mut p = EParser::new(input);
    let expr = p.parse_expectation()?;
    p.parser.skip_ws();
    p.parser.consume_char(';');
    p.parser.skip_ws();
    if !p.parser.eof() {
        return Err(p.parser.error("trailing input"));
    }
    Ok(expr)
}

/// Parse a single value literal.
pub fn parse_value(input: &str) -> Result<Value> {
    let mut p = EParser::new(input);
    let value = p.parse_value()?;
    p.parser.skip_ws();
    if !p.parser.eof() {
        return Err(p.parser.error("trailing input"));
    }
    Ok(value)
}

struct EParser<'a> {
    parser: Parser<'a>,
}

impl<'a> EParser<'a> {
    fn new(s: &'a str) -> Self {
        Self { parser: Parser::new(s) }
    }

    fn parse_expectation(&mut self) -> Result<ExpectExpr> {
        self.parser.skip_ws();
        let head = self.parser.parse_identifier()?;
        if head != "expect" {
            return Err(self.parser.error(format!("expected 'expect', found '{head}'")));
        }
        self.parser.skip_ws();
        self.parser.expect('(')?;
        let actual = self.parse_value()?;
        self.parser.skip_ws();
        self.parser.expect(')')?;

        let mut negate = false;
        loop {
            self.parser.skip_ws();
            self.parser.expect('.')?;
            self.parser.skip_ws();
            let name = self.parser.parse_identifier()?;
            self.parser.skip_ws();
            if name == "not" && !self.parser.peek_str("(") {
                negate = !negate;
                continue;
            }
            let args = self.parse_args()?;
            return Ok(ExpectExpr { actual, negate, matcher: name, args });
        }
    }

    /// `( value, ... )`
    fn parse_args(&mut self) -> Result<Vec<Value>> {
        self.parser.expect('(')?;
        let args = self.parse_list(')')?;
        Ok(args)
    }

    /// Comma-separated values up to `close`, which is consumed.
    fn parse_list(&mut self, close: char) -> Result<Vec<Value>> {
        let mut out = Vec::new();
        self.parser.skip_ws();
        if self.parser.consume_char(close) {
            return Ok(out);
        }
        loop {
            out.push(self.parse_value()?);
            self.parser.skip_ws();
            if self.parser.consume_char(',') {
                continue;
            }
            self.parser.expect(close)?;
            return Ok(out);
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.parser.skip_ws();
        match self.parser.peek_char() {
            Some('[') => {
                self.parser.expect('[')?;
                Ok(Value::array(self.parse_list(']')?))
            }
            Some('{') => self.parse_object(),
            Some('\'') | Some('"') => Ok(Value::String(self.parser.parse_quoted_string()?)),
            Some('-') if self.parser.peek_str("-Infinity") => {
                self.parser.expect('-')?;
                self.parser.parse_identifier()?;
                Ok(Value::Number(f64::NEG_INFINITY))
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                Ok(Value::Number(self.parser.parse_number_literal()?))
            }
            Some(_) => self.parse_word(),
            None => Err(self.parser.error("value expected")),
        }
    }

    fn parse_object(&mut self) -> Result<Value> {
        self.parser.expect('{')?;
        let object = Value::empty_object();
        self.parser.skip_ws();
        if self.parser.consume_char('}') {
            return Ok(object);
        }
        loop {
            self.parser.skip_ws();
            let key = match self.parser.peek_char() {
                Some('\'') | Some('"') => self.parser.parse_quoted_string()?,
                _ => self.parser.parse_identifier()?,
            };
            self.parser.skip_ws();
            self.parser.expect(':')?;
            let value = self.parse_value()?;
            object.insert(key, value);
            self.parser.skip_ws();
            if self.parser.consume_char(',') {
                continue;
            }
            self.parser.expect('}')?;
            return Ok(object);
        }
    }

    /// Keyword literals and asymmetric tester calls.
    fn parse_word(&mut self) -> Result<Value> {
        let word = self.parser.parse_identifier()?;
        match word.as_str() {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            "null" => return Ok(Value::Null),
            "undefined" => return Ok(Value::Undefined),
            "NaN" => return Ok(Value::Number(f64::NAN)),
            "Infinity" => return Ok(Value::Number(f64::INFINITY)),
            _ => {}
        }
        self.parser.skip_ws();
        self.parser.expect('(')?;
        self.parser.skip_ws();
        let value = match word.as_str() {
            "any" => {
                let name = match self.parser.peek_char() {
                    Some('\'') | Some('"') => self.parser.parse_quoted_string()?,
                    _ => self.parser.parse_identifier()?,
                };
                let kind = Kind::from_name(&name).ok_or_else(|| self.parser.error(format!("unknown kind '{name}'")))?;
                any(kind)
            }
            "anything" => anything(),
            "objectContaining" => object_containing(self.parse_value()?),
            "arrayContaining" => array_containing(self.parse_value()?),
            "stringMatching" => string_matching(&self.parser.parse_quoted_string()?)?,
            other => return Err(self.parser.error(format!("unknown function '{other}'"))),
        };
        self.parser.skip_ws();
        self.parser.expect(')')?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MatchError;
    use crate::result::SpecOutcome;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_negated_matcher_call() {
        let e = parse_expectation("expect(-2).not.toBeGreaterThan(0)").unwrap();
        assert!(e.negate);
        assert_eq!(e.matcher, "toBeGreaterThan");
        assert_eq!(e.args.len(), 1);
        assert_eq!(e.actual.as_f64(), Some(-2.0));
    }

    #[test]
    fn parses_nested_literals() {
        let v = parse_value("{a: [1, 'two', undefined], \"b\": {c: null}}").unwrap();
        assert_eq!(v.to_string(), "Object({ a: [ 1, 'two', undefined ], b: Object({ c: null }) })");
    }

    #[test]
    fn parses_asymmetric_testers() {
        let v = parse_value("{id: any(Number), tags: arrayContaining(['x']), name: stringMatching('^a')}").unwrap();
        assert_eq!(
            v.to_string(),
            "Object({ id: <any(Number)>, name: <stringMatching(/^a/)>, tags: <arrayContaining([ 'x' ])> })"
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_expectation("assert(1).toBe(1)"), Err(MatchError::Parse(_))));
        assert!(matches!(parse_expectation("expect(1).toBe(1) extra"), Err(MatchError::Parse(_))));
        assert!(matches!(parse_value("frob(1)"), Err(MatchError::Parse(_))));
        assert!(matches!(parse_value("any(Function)"), Err(MatchError::Parse(_))));
    }

    #[test]
    fn applies_in_a_spec() {
        let mut env = Environment::default();
        let exprs = [
            "expect(3).toBe(3)",
            "expect([1,2,3]).toEqual([1,2,3]);",
            "expect({a: 1, b: 2}).toEqual(objectContaining({a: 1}))",
            "expect(undefined).toBeUndefined()",
        ];
        let report = env.run_spec("cli", |env| {
            for text in exprs {
                parse_expectation(text)?.apply(env)?;
            }
            Ok(())
        });
        assert_eq!(report.outcome, SpecOutcome::Passed);
        assert_eq!(report.results.len(), 4);
    }
}
