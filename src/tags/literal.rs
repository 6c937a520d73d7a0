//! Literal grammar for exchange-file cells
//!
//! Recognizes only integers, floats, quoted strings and bracketed lists of
//! those scalars. Everything else is rejected and the caller keeps the cell
//! text as-is.

use super::TagValue;
use regex::Regex;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::OnceLock;
use thiserror::Error;

static INTEGER: OnceLock<Regex> = OnceLock::new();
static FLOAT: OnceLock<Regex> = OnceLock::new();

fn integer_pattern() -> &'static Regex {
    // leading zeros are not an integer literal ("01" stays text)
    INTEGER.get_or_init(|| Regex::new(r"^[+-]?(?:0+|[1-9][0-9]*)$").unwrap())
}

fn float_pattern() -> &'static Regex {
    FLOAT.get_or_init(|| {
        // a float needs a decimal point or an exponent
        Regex::new(
            r"^[+-]?(?:(?:[0-9]+\.[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+)$",
        )
        .unwrap()
    })
}

/// Why a cell is not a literal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("empty input")]
    Empty,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated list")]
    UnterminatedList,
    #[error("nested lists are not supported")]
    NestedList,
    #[error("invalid token '{0}'")]
    InvalidToken(String),
    #[error("unexpected character '{0}'")]
    Unexpected(char),
    #[error("trailing input after literal")]
    Trailing,
}

/// Parse a cell as a literal value
pub fn parse_literal(input: &str) -> Result<TagValue, LiteralError> {
    let mut parser = Parser {
        chars: input.chars().peekable(),
    };

    parser.skip_whitespace();
    let value = match parser.chars.peek() {
        None => return Err(LiteralError::Empty),
        Some('[') => parser.list()?,
        Some(_) => parser.scalar()?,
    };

    parser.skip_whitespace();
    if parser.chars.peek().is_some() {
        return Err(LiteralError::Trailing);
    }
    Ok(value)
}

/// Effective value of an exchange-file cell
///
/// Empty cells yield `None` (the field is left untouched). Lists collapse to
/// their first element, so an empty list also yields `None`. Cells that are
/// not literals are used verbatim as text.
pub fn coerce_cell(cell: &str) -> Option<TagValue> {
    if cell.is_empty() {
        return None;
    }

    match parse_literal(cell) {
        Ok(TagValue::List(items)) => items.into_iter().next(),
        Ok(value) => Some(value),
        Err(_) => Some(TagValue::Text(cell.to_string())),
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn list(&mut self) -> Result<TagValue, LiteralError> {
        self.chars.next();
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                None => return Err(LiteralError::UnterminatedList),
                Some(']') => {
                    self.chars.next();
                    return Ok(TagValue::List(items));
                }
                Some('[') => return Err(LiteralError::NestedList),
                Some(_) => items.push(self.scalar()?),
            }

            self.skip_whitespace();
            match self.chars.next() {
                Some(',') => {}
                Some(']') => return Ok(TagValue::List(items)),
                Some(c) => return Err(LiteralError::Unexpected(c)),
                None => return Err(LiteralError::UnterminatedList),
            }
        }
    }

    fn scalar(&mut self) -> Result<TagValue, LiteralError> {
        match self.chars.peek() {
            Some('\'') | Some('"') => self.string(),
            _ => self.number(),
        }
    }

    fn string(&mut self) -> Result<TagValue, LiteralError> {
        let quote = self.chars.next().ok_or(LiteralError::UnterminatedString)?;
        let mut text = String::new();

        loop {
            match self.chars.next() {
                None => return Err(LiteralError::UnterminatedString),
                Some(c) if c == quote => return Ok(TagValue::Text(text)),
                Some('\\') => self.escape(&mut text)?,
                Some(c) => text.push(c),
            }
        }
    }

    fn escape(&mut self, text: &mut String) -> Result<(), LiteralError> {
        match self.chars.next() {
            None => Err(LiteralError::UnterminatedString),
            Some('n') => {
                text.push('\n');
                Ok(())
            }
            Some('t') => {
                text.push('\t');
                Ok(())
            }
            Some('r') => {
                text.push('\r');
                Ok(())
            }
            Some('x') => self.code_point(text, 2),
            Some('u') => self.code_point(text, 4),
            Some(c @ ('\\' | '\'' | '"')) => {
                text.push(c);
                Ok(())
            }
            // unknown escapes keep the backslash
            Some(c) => {
                text.push('\\');
                text.push(c);
                Ok(())
            }
        }
    }

    fn code_point(&mut self, text: &mut String, digits: usize) -> Result<(), LiteralError> {
        let hex: String = (0..digits).filter_map(|_| self.chars.next()).collect();
        let decoded = if hex.chars().count() == digits {
            u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
        } else {
            None
        };

        match decoded {
            Some(c) => {
                text.push(c);
                Ok(())
            }
            None => Err(LiteralError::InvalidToken(hex)),
        }
    }

    fn number(&mut self) -> Result<TagValue, LiteralError> {
        let mut token = String::new();
        while let Some(c) = self
            .chars
            .next_if(|c| !c.is_whitespace() && *c != ',' && *c != ']')
        {
            token.push(c);
        }

        if token.is_empty() {
            return match self.chars.peek() {
                Some(c) => Err(LiteralError::Unexpected(*c)),
                None => Err(LiteralError::Empty),
            };
        }

        if integer_pattern().is_match(&token)
            && let Ok(value) = token.parse::<i64>()
        {
            return Ok(TagValue::Integer(value));
        }
        if float_pattern().is_match(&token)
            && let Ok(value) = token.parse::<f64>()
        {
            return Ok(TagValue::Float(value));
        }
        Err(LiteralError::InvalidToken(token))
    }
}
