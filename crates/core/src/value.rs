//! Field values
//!
//! A row field holds one [`Value`], shaped after JSON so rows cross the
//! remote boundary unchanged. Serialization is untagged: `Value::Int(1)` is
//! the JSON number `1`, `Value::String("1")` is the JSON string `"1"`.
//!
//! Equality never coerces between kinds. `Int(1)`, `Float(1.0)` and
//! `String("1")` are three different values; floats compare by IEEE-754
//! rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One field of a row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON `null`
    Null,
    /// JSON boolean
    Bool(bool),
    /// Integral JSON number
    Int(i64),
    /// Any other JSON number
    Float(f64),
    /// JSON string
    String(String),
    /// JSON array
    Array(Vec<Value>),
    /// JSON object, keys sorted
    Object(BTreeMap<String, Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(l), Bool(r)) => l == r,
            (Int(l), Int(r)) => l == r,
            (Float(l), Float(r)) => l == r,
            (String(l), String(r)) => l == r,
            (Array(l), Array(r)) => l == r,
            (Object(l), Object(r)) => l == r,
            _ => false,
        }
    }
}

impl Value {
    /// The boolean, if this is `Bool`
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// The integer, if this is `Int`
    ///
    /// Floats are not truncated: `Float(2.0).as_int()` is `None`.
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Int(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// The text, if this is `String`
    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

macro_rules! value_from {
    ($($source:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from($v: $source) -> Self {
                    $body
                }
            }
        )*
    };
}

value_from! {
    bool => |b| Value::Bool(b),
    i32 => |n| Value::Int(i64::from(n)),
    i64 => |n| Value::Int(n),
    f64 => |x| Value::Float(x),
    &str => |s| Value::String(s.to_owned()),
    String => |s| Value::String(s),
}
