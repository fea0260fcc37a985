//! Typed, defaulted, validated configuration variables.
//!
//! Each transform kind declares a static schema: a table of
//! (name, validator kind, default) triples. Caller overrides are resolved
//! against the schema by [`bind`]: an override naming no declared variable
//! fails with [`Error::UnknownVariable`], a value rejected by its kind fails
//! with [`Error::InvalidValue`], and unspecified variables take their
//! defaults. Bound values are consumed once into typed fields on the
//! transform struct and are immutable afterwards.

use crate::error::{Error, InvalidValueSnafu, Result, UnknownVariableSnafu};

/// A configuration value supplied by the caller or taken from a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarValue {
    Int(i64),
    Bool(bool),
    Str(String),
    IntList(Vec<i64>),
    IntListList(Vec<Vec<i64>>),
}

impl VarValue {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Bool(_) => "boolean",
            Self::Str(_) => "string",
            Self::IntList(_) => "integer list",
            Self::IntListList(_) => "list of integer lists",
        }
    }
}

impl From<i64> for VarValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for VarValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for VarValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<Vec<i64>> for VarValue {
    fn from(v: Vec<i64>) -> Self {
        Self::IntList(v)
    }
}

impl From<Vec<Vec<i64>>> for VarValue {
    fn from(v: Vec<Vec<i64>>) -> Self {
        Self::IntListList(v)
    }
}

/// Validation rule attached to a declared variable.
///
/// A closed enumeration: every transform variable is one of these shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Any integer.
    Int,
    /// A concrete true/false value; defaults are never absent.
    Bool,
    /// Membership in a closed option set.
    Choice(&'static [&'static str]),
    /// Ordered list of non-negative sizes; defaults to the empty list.
    SizeList,
    /// Ordered list of non-negative indices; defaults to the empty list.
    IndexList,
    /// List of permutation vectors; each entry must permute `0..len`.
    PermutationList,
}

impl VarKind {
    /// Check `value` against this rule.
    pub fn validate(&self, name: &str, value: &VarValue) -> Result<()> {
        match (self, value) {
            (Self::Int, VarValue::Int(_)) => Ok(()),
            (Self::Bool, VarValue::Bool(_)) => Ok(()),
            (Self::Choice(options), VarValue::Str(s)) => {
                if options.contains(&s.as_str()) {
                    Ok(())
                } else {
                    InvalidValueSnafu {
                        name,
                        reason: format!("`{s}` is not one of {}", options.join(", ")),
                    }
                    .fail()
                }
            }
            (Self::SizeList | Self::IndexList, VarValue::IntList(values)) => {
                match values.iter().find(|v| **v < 0) {
                    None => Ok(()),
                    Some(v) => {
                        InvalidValueSnafu { name, reason: format!("negative entry {v}") }.fail()
                    }
                }
            }
            (Self::PermutationList, VarValue::IntListList(rows)) => {
                for row in rows {
                    let mut seen = row.clone();
                    seen.sort_unstable();
                    let expected: Vec<i64> = (0..row.len() as i64).collect();
                    if seen != expected {
                        return InvalidValueSnafu {
                            name,
                            reason: format!("{row:?} is not a permutation of 0..{}", row.len()),
                        }
                        .fail();
                    }
                }
                Ok(())
            }
            (_, value) => InvalidValueSnafu {
                name,
                reason: format!("expected {}, got {}", self.expected_name(), value.kind_name()),
            }
            .fail(),
        }
    }

    fn expected_name(&self) -> &'static str {
        match self {
            Self::Int => "integer",
            Self::Bool => "boolean",
            Self::Choice(_) => "string",
            Self::SizeList | Self::IndexList => "integer list",
            Self::PermutationList => "list of integer lists",
        }
    }
}

/// A declared variable: name, validation rule and default value.
#[derive(Debug, Clone)]
pub struct VarSpec {
    pub name: &'static str,
    pub kind: VarKind,
    pub default: VarValue,
}

impl VarSpec {
    pub fn new(name: &'static str, kind: VarKind, default: impl Into<VarValue>) -> Self {
        Self { name, kind, default: default.into() }
    }
}

/// Caller-supplied overrides, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    entries: Vec<(String, VarValue)>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override. Chains for readability at call sites.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<VarValue>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Variables resolved against a schema: every declared name is present,
/// either overridden and validated or defaulted.
#[derive(Debug, Clone)]
pub struct BoundVars {
    values: Vec<(&'static str, VarValue)>,
}

impl BoundVars {
    fn get(&self, name: &'static str) -> Result<&VarValue> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| Error::InvalidValue {
                name: name.to_owned(),
                reason: "variable is not declared in the schema".to_owned(),
            })
    }

    pub fn int(&self, name: &'static str) -> Result<i64> {
        match self.get(name)? {
            VarValue::Int(v) => Ok(*v),
            other => InvalidValueSnafu { name, reason: format!("declared kind mismatch: {other:?}") }.fail(),
        }
    }

    pub fn boolean(&self, name: &'static str) -> Result<bool> {
        match self.get(name)? {
            VarValue::Bool(v) => Ok(*v),
            other => InvalidValueSnafu { name, reason: format!("declared kind mismatch: {other:?}") }.fail(),
        }
    }

    pub fn choice(&self, name: &'static str) -> Result<String> {
        match self.get(name)? {
            VarValue::Str(v) => Ok(v.clone()),
            other => InvalidValueSnafu { name, reason: format!("declared kind mismatch: {other:?}") }.fail(),
        }
    }

    pub fn int_list(&self, name: &'static str) -> Result<Vec<i64>> {
        match self.get(name)? {
            VarValue::IntList(v) => Ok(v.clone()),
            other => InvalidValueSnafu { name, reason: format!("declared kind mismatch: {other:?}") }.fail(),
        }
    }

    pub fn int_list_list(&self, name: &'static str) -> Result<Vec<Vec<i64>>> {
        match self.get(name)? {
            VarValue::IntListList(v) => Ok(v.clone()),
            other => InvalidValueSnafu { name, reason: format!("declared kind mismatch: {other:?}") }.fail(),
        }
    }
}

/// Resolve overrides against a transform's declared schema.
///
/// Validation is uniform and strict: every transform kind goes through this
/// routine, and no override is ever silently ignored.
pub fn bind(transform: &'static str, specs: &[VarSpec], overrides: Overrides) -> Result<BoundVars> {
    let mut values: Vec<(&'static str, VarValue)> = Vec::with_capacity(specs.len());
    for (name, value) in overrides.entries {
        let spec = specs
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| UnknownVariableSnafu { transform, name: name.clone() }.build())?;
        spec.kind.validate(spec.name, &value)?;
        // Last write wins if the caller sets the same name twice.
        values.retain(|(n, _)| *n != spec.name);
        values.push((spec.name, value));
    }
    for spec in specs {
        if !values.iter().any(|(n, _)| *n == spec.name) {
            values.push((spec.name, spec.default.clone()));
        }
    }
    Ok(BoundVars { values })
}
