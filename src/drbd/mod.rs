//! Types and parsing for the kernel-exported DRBD replication status.
//!
//! A [`ResourceMap`] maps resource names to [`Resource`] records, which in
//! turn map attribute codes (see [`attrs`]) to typed [`AttrValue`]s. Both
//! maps are ordered by key so that everything derived from them is
//! deterministic across runs.

pub mod attrs;
mod error;
mod parser;

pub use error::ParseError;
pub use parser::parse;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A single parsed attribute value.
///
/// The status file does not distinguish counters from state tokens
/// syntactically, so the parser types each value by content: a token value
/// that is a valid base-10 integer becomes [`AttrValue::Integer`], anything
/// else stays [`AttrValue::Text`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Integer(i64),
    Text(String),
}

impl AttrValue {
    /// Returns the integer value, if this is an [`AttrValue::Integer`].
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(n) => Some(*n),
            AttrValue::Text(_) => None,
        }
    }

    /// Returns the text value, if this is an [`AttrValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Integer(_) => None,
            AttrValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Integer(n) => write!(f, "{n}"),
            AttrValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One resource record: attribute code to value.
pub type Resource = BTreeMap<String, AttrValue>;

/// All parsed resources, keyed and iterated by resource name.
pub type ResourceMap = BTreeMap<String, Resource>;
