//! Attribute values carried by operations.

use std::fmt;

/// An attribute value attached to an operation under a string key.
///
/// The set of shapes is closed and deliberately small: it covers exactly what
/// the transform builders emit (flags, sizes, choice names, symbol references,
/// size lists and permutation lists).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr {
    Bool(bool),
    Int(i64),
    Str(String),
    /// Reference to a symbol defined elsewhere (`@name`).
    SymbolRef(String),
    IntArray(Vec<i64>),
    /// Array of integer arrays, e.g. per-operand permutation vectors.
    IntArrayArray(Vec<Vec<i64>>),
}

impl Attr {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn symbol(value: impl Into<String>) -> Self {
        Self::SymbolRef(value.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::SymbolRef(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i64]> {
        match self {
            Self::IntArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_array_array(&self) -> Option<&[Vec<i64>]> {
        match self {
            Self::IntArrayArray(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Attr {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Attr {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for Attr {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<Vec<i64>> for Attr {
    fn from(v: Vec<i64>) -> Self {
        Self::IntArray(v)
    }
}

impl From<Vec<Vec<i64>>> for Attr {
    fn from(v: Vec<Vec<i64>>) -> Self {
        Self::IntArrayArray(v)
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "\"{}\"", v.escape_default()),
            Self::SymbolRef(v) => write!(f, "@{v}"),
            Self::IntArray(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Self::IntArrayArray(rows) => {
                write!(f, "[")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", Attr::IntArray(row.clone()))?;
                }
                write!(f, "]")
            }
        }
    }
}
