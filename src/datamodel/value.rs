// SPDX-License-Identifier: MIT

//! Static types of data model fields and best-effort value conversion

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Kind of value stored at a data model path
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Integer,
    #[serde(alias = "number")]
    Float,
    Boolean,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub const ALL: [ValueKind; 6] = [
        ValueKind::Integer,
        ValueKind::Float,
        ValueKind::Boolean,
        ValueKind::String,
        ValueKind::Array,
        ValueKind::Object,
    ];

    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Integer | ValueKind::Float)
    }

    /// Kind of a live JSON value; `null` has no kind
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(ValueKind::Integer),
            Value::Number(_) => Some(ValueKind::Float),
            Value::String(_) => Some(ValueKind::String),
            Value::Array(_) => Some(ValueKind::Array),
            Value::Object(_) => Some(ValueKind::Object),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Array => write!(f, "array"),
            ValueKind::Object => write!(f, "object"),
        }
    }
}

/// The static type resolved at a data model path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub kind: ValueKind,
    pub nullable: bool,
}

impl TypeDescriptor {
    pub const fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }

    /// Numbers and booleans that can never be absent
    pub fn is_value_type(&self) -> bool {
        !self.nullable
            && matches!(
                self.kind,
                ValueKind::Integer | ValueKind::Float | ValueKind::Boolean
            )
    }

    pub fn accepts_absence(&self) -> bool {
        !self.is_value_type()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    /// Default instance for value types, `None` for everything that accepts absence
    pub fn default_value(&self) -> Option<Value> {
        if !self.is_value_type() {
            return None;
        }
        match self.kind {
            ValueKind::Integer => Some(Value::from(0)),
            ValueKind::Float => Some(Value::from(0.0)),
            ValueKind::Boolean => Some(Value::Bool(false)),
            _ => None,
        }
    }

    /// Whether a value of `other` may be converted to this type
    pub fn is_castable_from(&self, other: &TypeDescriptor) -> bool {
        self.kind == other.kind || (self.is_numeric() && other.is_numeric())
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// Best-effort conversion of `value` to `kind`.
///
/// Returns `None` when no sensible conversion exists. `null` never converts.
pub fn convert(value: &Value, kind: ValueKind) -> Option<Value> {
    if ValueKind::of(value)? == kind {
        return Some(value.clone());
    }

    match kind {
        ValueKind::Integer => to_integer(value),
        ValueKind::Float => to_float(value),
        ValueKind::Boolean => match value {
            Value::String(s) => s
                .trim()
                .to_ascii_lowercase()
                .parse::<bool>()
                .ok()
                .map(Value::Bool),
            Value::Number(n) => n.as_f64().map(|f| Value::Bool(f != 0.0)),
            _ => None,
        },
        ValueKind::String => match value {
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        ValueKind::Array | ValueKind::Object => None,
    }
}

fn to_integer(value: &Value) -> Option<Value> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(Value::from(i));
            }
            s.parse::<f64>().ok()?
        }
        Value::Bool(b) => return Some(Value::from(i64::from(*b))),
        _ => return None,
    };

    let rounded = f.round();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(Value::from(rounded as i64))
    } else {
        None
    }
}

fn to_float(value: &Value) -> Option<Value> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };
    Number::from_f64(f).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_of_values() {
        assert_eq!(ValueKind::of(&json!(42)), Some(ValueKind::Integer));
        assert_eq!(ValueKind::of(&json!(4.2)), Some(ValueKind::Float));
        assert_eq!(ValueKind::of(&json!("x")), Some(ValueKind::String));
        assert_eq!(ValueKind::of(&json!(true)), Some(ValueKind::Boolean));
        assert_eq!(ValueKind::of(&json!([1])), Some(ValueKind::Array));
        assert_eq!(ValueKind::of(&json!({})), Some(ValueKind::Object));
        assert_eq!(ValueKind::of(&Value::Null), None);
    }

    #[test]
    fn test_value_types_and_defaults() {
        let int = TypeDescriptor::new(ValueKind::Integer);
        assert!(int.is_value_type());
        assert_eq!(int.default_value(), Some(json!(0)));

        let maybe_int = TypeDescriptor::nullable(ValueKind::Integer);
        assert!(maybe_int.accepts_absence());
        assert_eq!(maybe_int.default_value(), None);

        let text = TypeDescriptor::new(ValueKind::String);
        assert!(text.accepts_absence());
        assert_eq!(text.default_value(), None);
    }

    #[test]
    fn test_castability() {
        let int = TypeDescriptor::new(ValueKind::Integer);
        let float = TypeDescriptor::new(ValueKind::Float);
        let text = TypeDescriptor::new(ValueKind::String);

        assert!(int.is_castable_from(&float));
        assert!(float.is_castable_from(&int));
        assert!(!int.is_castable_from(&text));
        assert!(text.is_castable_from(&TypeDescriptor::nullable(ValueKind::String)));
    }

    #[test]
    fn test_convert_strings_to_numbers() {
        assert_eq!(convert(&json!("42"), ValueKind::Integer), Some(json!(42)));
        assert_eq!(convert(&json!(" 2.5 "), ValueKind::Float), Some(json!(2.5)));
        assert_eq!(convert(&json!("2.6"), ValueKind::Integer), Some(json!(3)));
        assert_eq!(convert(&json!("warm"), ValueKind::Integer), None);
    }

    #[test]
    fn test_convert_out_of_range_float_to_integer() {
        assert_eq!(convert(&json!(9.223372036854775807e18), ValueKind::Integer), None);
        assert_eq!(convert(&json!(1e300), ValueKind::Integer), None);
        assert_eq!(
            convert(&json!(-9.223372036854775808e18), ValueKind::Integer),
            Some(json!(i64::MIN))
        );
        assert_eq!(
            convert(&json!(9.2233720368547748e18), ValueKind::Integer),
            Some(json!(9_223_372_036_854_774_784_i64))
        );
    }

    #[test]
    fn test_convert_between_scalars() {
        assert_eq!(convert(&json!(7.0), ValueKind::Integer), Some(json!(7)));
        assert_eq!(convert(&json!(7), ValueKind::Float), Some(json!(7.0)));
        assert_eq!(convert(&json!(true), ValueKind::Integer), Some(json!(1)));
        assert_eq!(convert(&json!(0), ValueKind::Boolean), Some(json!(false)));
        assert_eq!(convert(&json!("TRUE"), ValueKind::Boolean), Some(json!(true)));
        assert_eq!(convert(&json!(12), ValueKind::String), Some(json!("12")));
    }

    #[test]
    fn test_convert_rejects_structures_and_null() {
        assert_eq!(convert(&json!([1, 2]), ValueKind::String), None);
        assert_eq!(convert(&json!({"a": 1}), ValueKind::Integer), None);
        assert_eq!(convert(&Value::Null, ValueKind::String), None);
        assert_eq!(convert(&json!([1]), ValueKind::Array), Some(json!([1])));
    }

    #[test]
    fn test_kind_deserialize_aliases() {
        let kind: ValueKind = serde_yaml::from_str("number").unwrap();
        assert_eq!(kind, ValueKind::Float);
        let kind: ValueKind = serde_yaml::from_str("integer").unwrap();
        assert_eq!(kind, ValueKind::Integer);
    }
}
