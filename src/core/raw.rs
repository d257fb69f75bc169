//! Raw primitive values exchanged with the metadata access layer
//!
//! The access layer decodes file bytes into per-tag primitives: strings,
//! integers, byte sequences, rational pairs, and nested lists or mappings of
//! these. [`Raw`] is that boundary representation. Canonical value types
//! parse themselves from a `Raw` and serialize themselves back to one; they
//! never see file bytes.

use std::collections::BTreeMap;
use std::fmt;

/// One decoded tag value as delivered by (or handed back to) the access layer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Raw {
    /// Absent value (a tag that exists but carries nothing, or a hole in a
    /// positional list)
    Null,
    /// String value
    Text(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Raw byte sequence
    Bytes(Vec<u8>),
    /// Rational pair (numerator, denominator) as stored by Exif
    Ratio(i64, i64),
    /// Ordered sequence of values
    List(Vec<Raw>),
    /// Mapping from field name to value
    Map(BTreeMap<String, Raw>),
}

impl Raw {
    /// Get the value as a string, if it is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Raw::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer, if it is an integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Raw::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as bytes, if it is a byte sequence
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Raw::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Get the value as a list, if it is a list
    pub fn as_list(&self) -> Option<&[Raw]> {
        match self {
            Raw::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the value as a mapping, if it is a mapping
    pub fn as_map(&self) -> Option<&BTreeMap<String, Raw>> {
        match self {
            Raw::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Coerce to an integer: integers pass through, floats truncate, and
    /// decimal strings parse
    pub fn coerce_int(&self) -> Option<i64> {
        match self {
            Raw::Int(i) => Some(*i),
            Raw::Float(f) => Some(*f as i64),
            Raw::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Coerce to a float: numbers pass through, decimal strings parse
    pub fn coerce_float(&self) -> Option<f64> {
        match self {
            Raw::Int(i) => Some(*i as f64),
            Raw::Float(f) => Some(*f),
            Raw::Ratio(n, d) if *d != 0 => Some(*n as f64 / *d as f64),
            Raw::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// True when the value carries nothing: null, empty text, empty bytes,
    /// or an empty (or all-empty) list or mapping
    ///
    /// Numbers are never empty; a zero is a value.
    pub fn is_empty(&self) -> bool {
        match self {
            Raw::Null => true,
            Raw::Text(s) => s.trim().is_empty(),
            Raw::Bytes(b) => b.is_empty(),
            Raw::List(items) => items.iter().all(Raw::is_empty),
            Raw::Map(map) => map.values().all(Raw::is_empty),
            Raw::Int(_) | Raw::Float(_) | Raw::Ratio(_, _) => false,
        }
    }
}

impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Raw::Null => Ok(()),
            Raw::Text(s) => write!(f, "{}", s),
            Raw::Int(i) => write!(f, "{}", i),
            Raw::Float(x) => write!(f, "{}", x),
            Raw::Bytes(b) => write!(f, "[{} bytes]", b.len()),
            Raw::Ratio(n, d) => write!(f, "{}/{}", n, d),
            Raw::List(_) => write!(f, "[List]"),
            Raw::Map(_) => write!(f, "[Map]"),
        }
    }
}

impl From<String> for Raw {
    fn from(s: String) -> Self {
        Raw::Text(s)
    }
}

impl From<&str> for Raw {
    fn from(s: &str) -> Self {
        Raw::Text(s.to_string())
    }
}

impl From<i64> for Raw {
    fn from(i: i64) -> Self {
        Raw::Int(i)
    }
}

impl From<f64> for Raw {
    fn from(f: f64) -> Self {
        Raw::Float(f)
    }
}

impl From<Vec<Raw>> for Raw {
    fn from(items: Vec<Raw>) -> Self {
        Raw::List(items)
    }
}

impl<T: Into<Raw>> From<Option<T>> for Raw {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Raw::Null,
        }
    }
}
