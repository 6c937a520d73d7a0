//! Tag values and the per-file tag store
//!
//! A tag store exposes the tags of one audio file as a flat
//! key → value mapping using common key names (`artist`, `album`,
//! `title`, ...) regardless of the container's native tag format.

pub mod literal;
pub mod lofty_store;
#[cfg(test)]
pub(crate) mod memory;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

pub use literal::{LiteralError, coerce_cell, parse_literal};
pub use lofty_store::LoftyTagStore;

/// Flat tag mapping of one file
pub type TagMap = BTreeMap<String, TagValue>;

/// A tag value: a scalar or a list of scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<TagValue>),
}

impl TagValue {
    /// Build a value from the raw strings stored under one key
    pub fn from_texts(mut texts: Vec<String>) -> Option<Self> {
        match texts.len() {
            0 => None,
            1 => texts.pop().map(TagValue::Text),
            _ => Some(TagValue::List(texts.into_iter().map(TagValue::Text).collect())),
        }
    }

    /// Textual values to store, one per list element
    pub fn texts(&self) -> Vec<String> {
        match self {
            TagValue::List(items) => items.iter().map(ToString::to_string).collect(),
            other => vec![other.to_string()],
        }
    }

    fn fmt_element(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(text) => write_quoted(f, text),
            other => write!(f, "{}", other),
        }
    }
}

impl From<&str> for TagValue {
    fn from(text: &str) -> Self {
        TagValue::Text(text.to_string())
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Integer(value)
    }
}

/// Renders the exchange-file literal form: plain text for strings, and
/// `['Rock', 'Pop']` for lists so the importer can read it back.
impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Integer(value) => write!(f, "{}", value),
            TagValue::Float(value) => write_float(f, *value),
            TagValue::Text(text) => f.write_str(text),
            TagValue::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_element(f)?;
                }
                f.write_str("]")
            }
        }
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        write!(f, "{:.1}", value)
    } else {
        write!(f, "{}", value)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    f.write_str(&out)
}

/// Reads and writes the tags of individual audio files
pub trait TagStore {
    /// Tags of `path`, or `None` when the file carries no usable tags
    fn read(&self, path: &Path) -> Result<Option<TagMap>>;

    /// Replace the given keys on `path` and persist the file
    fn write(&self, path: &Path, tags: &TagMap) -> Result<()>;

    /// Fail the same way `write` would for `path` and `tags`, without saving anything
    fn check(&self, path: &Path, tags: &TagMap) -> Result<()>;
}
