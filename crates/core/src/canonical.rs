//! The canonical value tree.
//!
//! Every runtime value is lowered into this JSON-like shape before it is
//! persisted or compared. Non-primitive types live inside the tree as tagged
//! wrappers (see [`crate::tags`]), which are ordinary mappings with exactly
//! two reserved keys.

use std::fmt;

use crate::mapping::Mapping;

/// A node of the canonical tree. No other shape is legal.
#[derive(Debug, Clone, PartialEq)]
pub enum Canonical {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Canonical>),
    Map(Mapping<Canonical>),
}

impl Canonical {
    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Canonical::Null => "null",
            Canonical::Bool(_) => "bool",
            Canonical::Int(_) => "int",
            Canonical::Float(_) => "float",
            Canonical::Str(_) => "str",
            Canonical::List(_) => "list",
            Canonical::Map(_) => "mapping",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Canonical::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Canonical::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view accepting both integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Canonical::Int(i) => Some(*i as f64),
            Canonical::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Canonical]> {
        match self {
            Canonical::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Mapping<Canonical>> {
        match self {
            Canonical::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Mapping<Canonical>> {
        match self {
            Canonical::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Canonical>> {
        match self {
            Canonical::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Canonical {
    /// Compact JSON rendering of the wire form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = crate::json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<bool> for Canonical {
    fn from(v: bool) -> Self {
        Canonical::Bool(v)
    }
}

impl From<i64> for Canonical {
    fn from(v: i64) -> Self {
        Canonical::Int(v)
    }
}

impl From<i32> for Canonical {
    fn from(v: i32) -> Self {
        Canonical::Int(v.into())
    }
}

impl From<f64> for Canonical {
    fn from(v: f64) -> Self {
        Canonical::Float(v)
    }
}

impl From<&str> for Canonical {
    fn from(v: &str) -> Self {
        Canonical::Str(v.to_string())
    }
}

impl From<String> for Canonical {
    fn from(v: String) -> Self {
        Canonical::Str(v)
    }
}

impl<T: Into<Canonical>> From<Vec<T>> for Canonical {
    fn from(v: Vec<T>) -> Self {
        Canonical::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Mapping<Canonical>> for Canonical {
    fn from(v: Mapping<Canonical>) -> Self {
        Canonical::Map(v)
    }
}

impl<T: Into<Canonical>> From<Option<T>> for Canonical {
    fn from(v: Option<T>) -> Self {
        v.map_or(Canonical::Null, Into::into)
    }
}
