// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed attribute values and their coercion from JSON.

use std::fmt;

use serde_json::Value;

/// Column type of a declared feature property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    Int,
    Double,
    String,
}

impl ValueType {
    /// Human-readable type name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Int => "integer",
            ValueType::Double => "double",
            ValueType::String => "string",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed attribute value. The variant of a declared default fixes the
/// type of its column.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeValue {
    Int(i64),
    Double(f64),
    String(String),
}

impl AttributeValue {
    #[inline]
    pub fn value_type(&self) -> ValueType {
        match self {
            AttributeValue::Int(_) => ValueType::Int,
            AttributeValue::Double(_) => ValueType::Double,
            AttributeValue::String(_) => ValueType::String,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Read a JSON value as `ty`.
    ///
    /// Only lossless conversions succeed: integral floats become integers,
    /// any number becomes a double, numbers and booleans become their JSON
    /// text in string columns. Everything else returns `None`.
    pub fn coerce(value: &Value, ty: ValueType) -> Option<AttributeValue> {
        match ty {
            ValueType::Int => {
                if let Some(v) = value.as_i64() {
                    return Some(AttributeValue::Int(v));
                }
                let f = value.as_f64()?;
                // i64::MAX as f64 rounds up to 2^63, hence the strict bound
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Some(AttributeValue::Int(f as i64))
                } else {
                    None
                }
            }
            ValueType::Double => value.as_f64().map(AttributeValue::Double),
            ValueType::String => match value {
                Value::String(s) => Some(AttributeValue::String(s.clone())),
                Value::Number(n) => Some(AttributeValue::String(n.to_string())),
                Value::Bool(b) => Some(AttributeValue::String(b.to_string())),
                _ => None,
            },
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::Double(v) => write!(f, "{}", v),
            AttributeValue::String(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Double(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_column_accepts_integral_float() {
        assert_eq!(
            AttributeValue::coerce(&json!(12.0), ValueType::Int),
            Some(AttributeValue::Int(12))
        );
        assert_eq!(AttributeValue::coerce(&json!(12.5), ValueType::Int), None);
        assert_eq!(AttributeValue::coerce(&json!("12"), ValueType::Int), None);
        assert_eq!(AttributeValue::coerce(&json!(1e300), ValueType::Int), None);
    }

    #[test]
    fn test_double_column_accepts_any_number() {
        assert_eq!(
            AttributeValue::coerce(&json!(12), ValueType::Double),
            Some(AttributeValue::Double(12.0))
        );
        assert_eq!(AttributeValue::coerce(&json!(true), ValueType::Double), None);
    }

    #[test]
    fn test_string_column_renders_scalars() {
        assert_eq!(
            AttributeValue::coerce(&json!(3), ValueType::String),
            Some(AttributeValue::String("3".into()))
        );
        assert_eq!(
            AttributeValue::coerce(&json!(false), ValueType::String),
            Some(AttributeValue::String("false".into()))
        );
        assert_eq!(AttributeValue::coerce(&json!([1, 2]), ValueType::String), None);
        assert_eq!(AttributeValue::coerce(&json!({"a": 1}), ValueType::String), None);
    }

    #[test]
    fn test_value_type_follows_variant() {
        assert_eq!(AttributeValue::from(1i64).value_type(), ValueType::Int);
        assert_eq!(AttributeValue::from(1.0).value_type(), ValueType::Double);
        assert_eq!(AttributeValue::from("x").value_type(), ValueType::String);
    }
}
