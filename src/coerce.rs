//! Text-mode value coercion.
//!
//! Flat text formats (INI) deliver every leaf as a string. Before such a value
//! can be type-checked it is converted according to the field's declared
//! type: string-like fields keep the trimmed text, everything else is parsed
//! as a constant literal. Nested-schema fields parse mapping literals and
//! otherwise keep the text for the type check to reject.
//!
//! The literal grammar is closed. It accepts `None`, `True`/`False` (and the
//! lowercase spellings), signed decimal/hex/octal/binary integers, floats
//! (including `nan`/`inf`), single- or double-quoted strings with escapes,
//! lists `[..]`, tuples `(..)` (read as lists) and `{'key': value}` mappings
//! with string keys. Names, calls, operators and sets are rejected, so
//! configuration text can never evaluate anything.

use thiserror::Error;

use crate::error::InputError;
use crate::schema::TypeSpec;
use crate::value::{Kind, Record, Value};

/// Nesting limit for list/tuple/mapping literals.
const MAX_DEPTH: usize = 64;

/// Why a piece of text is not a valid literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at offset {offset}")]
pub struct LiteralError {
    pub offset: usize,
    pub reason: String,
}

/// Coerce a text-origin value to the field's declared type.
///
/// Values that are not strings are already typed and pass through unchanged,
/// which makes coercion idempotent.
pub fn coerce(value: Value, spec: &TypeSpec, path: &str) -> Result<Value, InputError> {
    let Value::String(text) = value else {
        return Ok(value);
    };
    let trimmed = || Value::String(text.trim().to_string());

    let coerced = match spec {
        TypeSpec::Any => trimmed(),
        // Flat formats write sections nested below the first level as
        // `{'key': value}` literals.
        TypeSpec::Nested(_) if text.trim_start().starts_with('{') => {
            parse_literal(&text).map_err(|e| malformed(path, &text, &e))?
        }
        TypeSpec::Nested(_) => trimmed(),
        TypeSpec::OneOf(kinds) if *kinds == [Kind::String] => trimmed(),
        TypeSpec::OneOf(kinds) => match parse_literal(&text) {
            Ok(v) => v,
            Err(_) if kinds.contains(&Kind::String) => trimmed(),
            Err(e) => return Err(malformed(path, &text, &e)),
        },
        TypeSpec::ListOf(_) => parse_literal(&text).map_err(|e| malformed(path, &text, &e))?,
    };
    tracing::trace!(key = path, raw = %text, value = %coerced, "coerced text value");
    Ok(coerced)
}

fn malformed(path: &str, text: &str, e: &LiteralError) -> InputError {
    tracing::debug!(key = path, error = %e, "rejected literal");
    InputError::MalformedLiteral {
        key: path.to_string(),
        raw: text.to_string(),
    }
}

/// Parse `text` as a single constant literal.
pub fn parse_literal(text: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser {
        chars: text.chars().collect(),
        pos: 0,
        depth: 0,
    };
    parser.skip_ws();
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn error(&self, reason: &str) -> LiteralError {
        LiteralError {
            offset: self.pos,
            reason: reason.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            None => Err(self.error("expected a value")),
            Some('\'' | '"') => self.string().map(Value::String),
            Some('[') => self.collection('[', ']'),
            Some('(') => self.tuple(),
            Some('{') => self.mapping(),
            Some(c) if c == '+' || c == '-' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.name(),
            Some(_) => Err(self.error("unexpected character")),
        }
    }

    fn enter(&mut self) -> Result<(), LiteralError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("literal nested too deeply"));
        }
        Ok(())
    }

    fn name(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "None" => Ok(Value::Null),
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "nan" => Ok(Value::Float(f64::NAN)),
            "inf" => Ok(Value::Float(f64::INFINITY)),
            _ => {
                self.pos = start;
                Err(self.error(&format!("'{word}' is not a literal")))
            }
        }
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let negative = if self.eat('-') {
            true
        } else {
            self.eat('+');
            false
        };
        self.skip_ws();

        if self.peek().is_some_and(char::is_alphabetic) {
            return match self.name()? {
                Value::Float(f) if f.is_infinite() => {
                    Ok(Value::Float(if negative { -f } else { f }))
                }
                _ => Err(self.error("sign must be followed by a number")),
            };
        }

        if let Some(radix) = self.radix_prefix() {
            let digits = self.digits(|c| c.is_digit(radix));
            if digits.is_empty() {
                return Err(self.error("missing digits after radix prefix"));
            }
            let signed = if negative {
                format!("-{digits}")
            } else {
                digits
            };
            return i64::from_str_radix(&signed, radix)
                .map(Value::Integer)
                .map_err(|_| self.error("integer out of range"));
        }

        let int_part = self.digits(|c| c.is_ascii_digit());
        let mut is_float = false;
        let mut text = int_part.clone();
        if self.eat('.') {
            is_float = true;
            text.push('.');
            text.push_str(&self.digits(|c| c.is_ascii_digit()));
        }
        if text.is_empty() || text == "." {
            return Err(self.error("expected digits"));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.pos += 1;
            text.push('e');
            if let Some(sign @ ('+' | '-')) = self.peek() {
                self.pos += 1;
                text.push(sign);
            }
            let exp = self.digits(|c| c.is_ascii_digit());
            if exp.is_empty() {
                return Err(self.error("missing exponent digits"));
            }
            text.push_str(&exp);
        }
        if self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            return Err(self.error("invalid numeric literal"));
        }

        if is_float {
            let f: f64 = text.parse().map_err(|_| self.error("invalid float"))?;
            return Ok(Value::Float(if negative { -f } else { f }));
        }
        if int_part.len() > 1 && int_part.starts_with('0') && int_part.bytes().any(|b| b != b'0') {
            return Err(self.error("leading zeros are not permitted"));
        }
        let signed = if negative {
            format!("-{int_part}")
        } else {
            int_part
        };
        signed
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| self.error("integer out of range"))
    }

    fn radix_prefix(&mut self) -> Option<u32> {
        if self.peek() != Some('0') {
            return None;
        }
        let radix = match self.chars.get(self.pos + 1) {
            Some('x' | 'X') => 16,
            Some('o' | 'O') => 8,
            Some('b' | 'B') => 2,
            _ => return None,
        };
        self.pos += 2;
        Some(radix)
    }

    /// Collect digits accepted by `accept`, skipping `_` separators.
    fn digits(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if accept(c) {
                out.push(c);
            } else if c != '_' || out.is_empty() {
                break;
            }
            self.pos += 1;
        }
        out
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let Some(quote) = self.bump() else {
            return Err(self.error("expected a string"));
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\n') => return Err(self.error("newline in string")),
                Some('\\') => out.push(self.escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char, LiteralError> {
        let c = match self.bump() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('\\') => '\\',
            Some('\'') => '\'',
            Some('"') => '"',
            Some('x') => self.hex_escape(2)?,
            Some('u') => self.hex_escape(4)?,
            _ => return Err(self.error("invalid escape sequence")),
        };
        Ok(c)
    }

    fn hex_escape(&mut self, len: usize) -> Result<char, LiteralError> {
        let end = self.pos + len;
        if end > self.chars.len() {
            return Err(self.error("truncated escape sequence"));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        let code = u32::from_str_radix(&hex, 16).map_err(|_| self.error("invalid hex escape"))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.error("invalid code point"))
    }

    /// Comma-separated values between `open` and `close`; trailing comma allowed.
    fn items(&mut self, open: char, close: char) -> Result<(Vec<Value>, bool), LiteralError> {
        self.enter()?;
        if !self.eat(open) {
            return Err(self.error("expected a collection"));
        }
        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            self.skip_ws();
            if self.eat(close) {
                break;
            }
            items.push(self.value()?);
            self.skip_ws();
            if self.eat(',') {
                saw_comma = true;
                continue;
            }
            if self.eat(close) {
                break;
            }
            return Err(self.error(&format!("expected ',' or '{close}'")));
        }
        self.depth -= 1;
        Ok((items, saw_comma))
    }

    fn collection(&mut self, open: char, close: char) -> Result<Value, LiteralError> {
        let (items, _) = self.items(open, close)?;
        Ok(Value::List(items))
    }

    /// `()` is empty, `(x)` is just `x`, `(x,)` and `(x, y)` are lists.
    fn tuple(&mut self) -> Result<Value, LiteralError> {
        let (mut items, saw_comma) = self.items('(', ')')?;
        if items.len() == 1 && !saw_comma {
            return Ok(items.remove(0));
        }
        Ok(Value::List(items))
    }

    fn mapping(&mut self) -> Result<Value, LiteralError> {
        self.enter()?;
        self.bump();
        let mut record = Record::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                break;
            }
            if !matches!(self.peek(), Some('\'' | '"')) {
                return Err(self.error("mapping keys must be strings"));
            }
            let key = self.string()?;
            self.skip_ws();
            if !self.eat(':') {
                return Err(self.error("expected ':' after mapping key"));
            }
            self.skip_ws();
            let value = self.value()?;
            record.insert(key, value);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                break;
            }
            return Err(self.error("expected ',' or '}'"));
        }
        self.depth -= 1;
        Ok(Value::Map(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use proptest::prelude::*;

    fn lit(s: &str) -> Value {
        parse_literal(s).unwrap()
    }

    #[test]
    fn scalars() {
        assert_eq!(lit("0"), Value::Integer(0));
        assert_eq!(lit(" -42 "), Value::Integer(-42));
        assert_eq!(lit("+7"), Value::Integer(7));
        assert_eq!(lit("1_000"), Value::Integer(1000));
        assert_eq!(lit("0x1F"), Value::Integer(31));
        assert_eq!(lit("-0b101"), Value::Integer(-5));
        assert_eq!(lit("200.123"), Value::Float(200.123));
        assert_eq!(lit(".5"), Value::Float(0.5));
        assert_eq!(lit("1e3"), Value::Float(1000.0));
        assert_eq!(lit("-inf"), Value::Float(f64::NEG_INFINITY));
        assert_eq!(lit("True"), Value::Bool(true));
        assert_eq!(lit("false"), Value::Bool(false));
        assert_eq!(lit("None"), Value::Null);
    }

    #[test]
    fn strings_and_escapes() {
        assert_eq!(lit("'abc'"), Value::from("abc"));
        assert_eq!(lit(r#""it's""#), Value::from("it's"));
        assert_eq!(lit(r"'a\nb\x41é'"), Value::from("a\nbAé"));
    }

    #[test]
    fn collections() {
        assert_eq!(lit("[1, 2, 3]"), Value::from(vec![1, 2, 3]));
        assert_eq!(lit("[1, 2, 3,]"), Value::from(vec![1, 2, 3]));
        assert_eq!(lit("[]"), Value::List(vec![]));
        assert_eq!(lit("(1, 'a')"), Value::List(vec![1.into(), "a".into()]));
        assert_eq!(lit("(5,)"), Value::from(vec![5]));
        assert_eq!(lit("(5)"), Value::Integer(5));
        assert_eq!(lit("()"), Value::List(vec![]));
        let map = lit("{'name': 'x', 'sizes': [1, (2, 3)]}");
        assert_eq!(map.get("name"), Some(&Value::from("x")));
        assert_eq!(
            map.get("sizes"),
            Some(&Value::List(vec![1.into(), vec![2, 3].into()]))
        );
    }

    #[test]
    fn rejects_non_literals() {
        for bad in [
            "",
            "os.system('ls')",
            "__import__('os')",
            "1 + 2",
            "[1, 2",
            "{1, 2}",
            "{1: 'a'}",
            "'unterminated",
            "abc",
            "007",
            "1.2.3",
            "12abc",
            "- x",
            "[1] [2]",
        ] {
            assert!(parse_literal(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn depth_is_bounded() {
        let deep = "[".repeat(MAX_DEPTH + 1) + &"]".repeat(MAX_DEPTH + 1);
        assert!(parse_literal(&deep).is_err());
        let ok = "[".repeat(MAX_DEPTH) + &"]".repeat(MAX_DEPTH);
        assert!(parse_literal(&ok).is_ok());
    }

    #[test]
    fn string_fields_keep_trimmed_text() {
        let spec = TypeSpec::OneOf(vec![Kind::String]);
        let v = coerce(Value::from("  myname "), &spec, "name").unwrap();
        assert_eq!(v, Value::from("myname"));
        let v = coerce(Value::from(" 'quoted' "), &TypeSpec::Any, "name").unwrap();
        assert_eq!(v, Value::from("'quoted'"));
    }

    #[test]
    fn typed_fields_parse_literals() {
        let int = TypeSpec::OneOf(vec![Kind::Integer]);
        assert_eq!(coerce("0".into(), &int, "k").unwrap(), Value::Integer(0));
        let boolean = TypeSpec::OneOf(vec![Kind::Bool]);
        assert_eq!(coerce("True".into(), &boolean, "k").unwrap(), Value::Bool(true));
        let list = TypeSpec::OneOf(vec![Kind::List]);
        assert_eq!(
            coerce("[1, 2, 3]".into(), &list, "k").unwrap(),
            Value::from(vec![1, 2, 3])
        );
        let rows = TypeSpec::ListOf(Schema::empty());
        assert!(coerce("[{'a': 1}]".into(), &rows, "k").is_ok());
    }

    #[test]
    fn malformed_literal_reports_key_and_text() {
        let int = TypeSpec::OneOf(vec![Kind::Integer]);
        match coerce("twelve".into(), &int, "default.intval").unwrap_err() {
            InputError::MalformedLiteral { key, raw } => {
                assert_eq!(key, "default.intval");
                assert_eq!(raw, "twelve");
            }
            other => panic!("Expected MalformedLiteral, got: {other:?}"),
        }
    }

    #[test]
    fn string_among_kinds_falls_back_to_text() {
        let spec = TypeSpec::OneOf(vec![Kind::Integer, Kind::String]);
        assert_eq!(coerce("12".into(), &spec, "k").unwrap(), Value::Integer(12));
        assert_eq!(coerce(" auto ".into(), &spec, "k").unwrap(), Value::from("auto"));
    }

    #[test]
    fn nested_fields_parse_mapping_literals() {
        let nested = TypeSpec::Nested(Schema::empty());
        let v = coerce(" {'x': 1, 'y': 'b'} ".into(), &nested, "sec.inner").unwrap();
        let expected: Record = [("x", Value::from(1)), ("y", Value::from("b"))]
            .into_iter()
            .collect();
        assert_eq!(v, Value::Map(expected));
        assert_eq!(coerce(" flat ".into(), &nested, "k").unwrap(), Value::from("flat"));
        assert!(matches!(
            coerce("{'x': }".into(), &nested, "sec.inner").unwrap_err(),
            InputError::MalformedLiteral { key, .. } if key == "sec.inner"
        ));
    }

    #[test]
    fn typed_values_pass_through() {
        let int = TypeSpec::OneOf(vec![Kind::Integer]);
        assert_eq!(coerce(Value::Integer(5), &int, "k").unwrap(), Value::Integer(5));
        assert_eq!(coerce(Value::Null, &int, "k").unwrap(), Value::Null);
    }

    fn literal_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            (-1.0e12f64..1.0e12).prop_map(Value::Float),
            "[ -~]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..4)
                    .prop_map(|pairs| Value::Map(pairs.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn rendered_literals_parse_back(value in literal_value()) {
            prop_assert_eq!(parse_literal(&value.to_literal()).unwrap(), value);
        }

        #[test]
        fn coercion_is_idempotent(value in literal_value()) {
            let spec = TypeSpec::OneOf(vec![Kind::List, Kind::Map, Kind::Integer]);
            let once = coerce(Value::String(value.to_literal()), &spec, "k");
            // Strings are the one kind text mode re-parses.
            if let Ok(once) = once
                && !matches!(once, Value::String(_))
            {
                prop_assert_eq!(coerce(once.clone(), &spec, "k").unwrap(), once);
            }
        }
    }
}
