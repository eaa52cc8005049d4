//! Runtime values and their coercion rules.

use serde::{Serialize, Serializer};
use std::fmt;

/// A dynamically-typed runtime value.
///
/// Numeric promotion follows the usual integer→real rule: `/` always
/// yields a real, mixed-operand arithmetic widens to real.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// Truthiness: zero, the empty string and `fals` are falsy,
    /// everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Real(r) => *r != 0.0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Widen to a float when the value is numeric.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            Value::Bool(_) | Value::Str(_) => None,
        }
    }

    /// Romanian type name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "întreg",
            Value::Real(_) => "real",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "șir",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            // Whole reals keep a ".0" so the trace distinguishes 7.0
            // (result of a division) from the integer 7.
            Value::Real(r) if r.is_finite() && r.fract() == 0.0 && r.abs() < 1e15 => {
                write!(f, "{r:.1}")
            }
            Value::Real(r) => write!(f, "{r}"),
            Value::Bool(true) => f.write_str("adevarat"),
            Value::Bool(false) => f.write_str("fals"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Real(r) => serializer.serialize_f64(*r),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Str(s) => serializer.serialize_str(s),
        }
    }
}
