// src/parser.rs
use crate::errors::MatchError;

/// Character cursor shared by the expression grammar.
pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// A parse error annotated with the current byte offset.
    pub fn error(&self, msg: impl AsRef<str>) -> MatchError {
        MatchError::Parse(format!("{} at offset {}", msg.as_ref(), self.i))
    }

    pub fn parse_identifier(&mut self) -> Result<String, MatchError> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '_' || c == '$' || c.is_ascii_alphanumeric() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
        if self.i == start {
            return Err(self.error("identifier expected"));
        }
        Ok(self.s[start..self.i].to_string())
    }

    /// Decimal number with optional sign, fraction and exponent.
    pub fn parse_number_literal(&mut self) -> Result<f64, MatchError> {
        let start = self.i;
        if self.peek_char() == Some('-') || self.peek_char() == Some('+') {
            self.i += 1;
        }
        self.skip_digits();
        if self.peek_char() == Some('.') {
            self.i += 1;
            self.skip_digits();
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            self.i += 1;
            if matches!(self.peek_char(), Some('-') | Some('+')) {
                self.i += 1;
            }
            self.skip_digits();
        }
        let s = &self.s[start..self.i];
        s.parse::<f64>()
            .map_err(|_| MatchError::Parse(format!("bad number '{s}' at offset {start}")))
    }

    pub fn parse_quoted_string(&mut self) -> Result<String, MatchError> {
        let quote = self.peek_char().ok_or_else(|| self.error("string expected"))?;
        if quote != '\'' && quote != '"' {
            return Err(self.error("expected quoted string"));
        }
        self.i += 1;
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            self.i += c.len_utf8();
            if c == quote {
                return Ok(out);
            }
            if c == '\\' {
                if let Some(nc) = self.peek_char() {
                    self.i += nc.len_utf8();
                    match nc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        '\'' => out.push('\''),
                        _ => {
                            out.push('\\');
                            out.push(nc);
                        }
                    }
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        Err(self.error("unterminated string"))
    }

    pub fn expect(&mut self, c: char) -> Result<(), MatchError> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}'")))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn peek_str(&self, lit: &str) -> bool {
        self.s[self.i..].starts_with(lit)
    }

    pub fn skip_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    fn skip_digits(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        for (text, n) in [("42", 42.0), ("-2", -2.0), ("0.5", 0.5), ("1e3", 1000.0), ("-1.5E-1", -0.15)] {
            assert_eq!(Parser::new(text).parse_number_literal().unwrap(), n, "{text}");
        }
        assert!(Parser::new("-").parse_number_literal().is_err());
    }

    #[test]
    fn quoted_strings() {
        let mut p = Parser::new(r#"'it\'s' "tab\t""#);
        assert_eq!(p.parse_quoted_string().unwrap(), "it's");
        p.skip_ws();
        assert_eq!(p.parse_quoted_string().unwrap(), "tab\t");
        assert!(p.eof());
        assert!(Parser::new("'open").parse_quoted_string().is_err());
    }

    #[test]
    fn identifiers_and_errors_carry_offset() {
        let mut p = Parser::new("toBeGreaterThan(");
        assert_eq!(p.parse_identifier().unwrap(), "toBeGreaterThan");
        assert!(p.consume_char('('));
        let err = p.expect(')').unwrap_err();
        assert_eq!(err, MatchError::Parse("expected ')' at offset 16".into()));
    }
}
