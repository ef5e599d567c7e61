// SPDX-License-Identifier: MIT

//! Built-in comparison operators

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::{Accessor, BoolExpr, EvalScope, Operator};
use crate::datamodel::value::{TypeDescriptor, ValueKind};
use crate::error::PredicateError;

/// Plugin id the built-in operators are registered under
pub const BUILTIN_PLUGIN_ID: Uuid = Uuid::from_u128(0x5c1f_9a7e_0b3d_4e2a_8f61_c0d2_7b94_a318);

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// ==
    Eq,
    /// !=
    NotEq,
    /// >
    Gt,
    /// >=
    Gte,
    /// <
    Lt,
    /// <=
    Lte,
    /// contains (substring)
    Contains,
    /// does not contain (strings)
    NotContains,
    /// starts with (strings)
    StartsWith,
    /// ends with (strings)
    EndsWith,
}

impl CompareOp {
    pub const ALL: [CompareOp; 10] = [
        CompareOp::Eq,
        CompareOp::NotEq,
        CompareOp::Gt,
        CompareOp::Gte,
        CompareOp::Lt,
        CompareOp::Lte,
        CompareOp::Contains,
        CompareOp::NotContains,
        CompareOp::StartsWith,
        CompareOp::EndsWith,
    ];

    /// Kind name used to register and persist the operator
    pub fn kind_name(self) -> &'static str {
        match self {
            CompareOp::Eq => "Equals",
            CompareOp::NotEq => "NotEquals",
            CompareOp::Gt => "GreaterThan",
            CompareOp::Gte => "GreaterThanOrEqual",
            CompareOp::Lt => "LessThan",
            CompareOp::Lte => "LessThanOrEqual",
            CompareOp::Contains => "Contains",
            CompareOp::NotContains => "NotContains",
            CompareOp::StartsWith => "StartsWith",
            CompareOp::EndsWith => "EndsWith",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CompareOp::Eq => "Equal to",
            CompareOp::NotEq => "Not equal to",
            CompareOp::Gt => "Is greater than",
            CompareOp::Gte => "Is greater than or equal to",
            CompareOp::Lt => "Is less than",
            CompareOp::Lte => "Is less than or equal to",
            CompareOp::Contains => "Contains",
            CompareOp::NotContains => "Does not contain",
            CompareOp::StartsWith => "Starts with",
            CompareOp::EndsWith => "Ends with",
        }
    }

    pub fn supports(self, ty: &TypeDescriptor) -> bool {
        match self {
            CompareOp::Eq | CompareOp::NotEq => true,
            CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte => ty.is_numeric(),
            CompareOp::Contains
            | CompareOp::NotContains
            | CompareOp::StartsWith
            | CompareOp::EndsWith => ty.kind == ValueKind::String,
        }
    }

    /// Check the operand pairing a test would be built for
    fn check_operands(self, left: &TypeDescriptor, right: &TypeDescriptor) -> Result<(), String> {
        if !self.supports(left) {
            return Err(format!("left operand type {} is not supported", left));
        }

        let ok = match self {
            CompareOp::Eq | CompareOp::NotEq => left.is_castable_from(right),
            CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte => right.is_numeric(),
            _ => right.kind == ValueKind::String,
        };

        if ok {
            Ok(())
        } else {
            Err(format!("cannot compare {} with {}", left, right))
        }
    }

    /// Apply the comparison to two (possibly absent) values
    pub fn apply(self, left: Option<&Value>, right: Option<&Value>) -> bool {
        match self {
            CompareOp::Eq => values_equal(left, right),
            CompareOp::NotEq => !values_equal(left, right),
            CompareOp::Gt => compare_numbers(left, right, |o| o.is_gt()),
            CompareOp::Gte => compare_numbers(left, right, |o| o.is_ge()),
            CompareOp::Lt => compare_numbers(left, right, |o| o.is_lt()),
            CompareOp::Lte => compare_numbers(left, right, |o| o.is_le()),
            CompareOp::Contains => match (left, right) {
                (Some(Value::String(s)), Some(Value::String(sub))) => s.contains(sub.as_str()),
                _ => false,
            },
            CompareOp::NotContains => match (left, right) {
                (Some(Value::String(s)), Some(Value::String(sub))) => !s.contains(sub.as_str()),
                _ => false,
            },
            CompareOp::StartsWith => match (left, right) {
                (Some(Value::String(s)), Some(Value::String(p))) => s.starts_with(p.as_str()),
                _ => false,
            },
            CompareOp::EndsWith => match (left, right) {
                (Some(Value::String(s)), Some(Value::String(p))) => s.ends_with(p.as_str()),
                _ => false,
            },
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
            CompareOp::Contains => write!(f, "contains"),
            CompareOp::NotContains => write!(f, "not contains"),
            CompareOp::StartsWith => write!(f, "starts with"),
            CompareOp::EndsWith => write!(f, "ends with"),
        }
    }
}

fn values_equal(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (None, _) | (_, None) => false,
        (Some(Value::Number(a)), Some(Value::Number(b))) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
                _ => false,
            },
        },
        (Some(a), Some(b)) => a == b,
    }
}

fn compare_numbers<F>(left: Option<&Value>, right: Option<&Value>, cmp: F) -> bool
where
    F: Fn(std::cmp::Ordering) -> bool,
{
    let (Some(Value::Number(a)), Some(Value::Number(b))) = (left, right) else {
        return false;
    };
    let ordering = match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => a.as_f64().zip(b.as_f64()).and_then(|(x, y)| x.partial_cmp(&y)),
    };
    ordering.map(cmp).unwrap_or(false)
}


/// One of the built-in comparisons exposed through the `Operator` trait
#[derive(Debug, Clone, Copy)]
pub struct BuiltinOperator {
    op: CompareOp,
}

impl BuiltinOperator {
    pub fn new(op: CompareOp) -> Self {
        Self { op }
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }
}

impl Operator for BuiltinOperator {
    fn plugin_id(&self) -> Uuid {
        BUILTIN_PLUGIN_ID
    }

    fn kind(&self) -> &str {
        self.op.kind_name()
    }

    fn description(&self) -> &str {
        self.op.description()
    }

    fn supports(&self, ty: &TypeDescriptor) -> bool {
        self.op.supports(ty)
    }

    fn build_test(&self, left: Accessor, right: Accessor) -> Result<BoolExpr, PredicateError> {
        let op = self.op;
        op.check_operands(&left.ty(), &right.ty())
            .map_err(|message| PredicateError::expression_build(op.kind_name(), message))?;

        Ok(Box::new(move |scope: &EvalScope<'_>| {
            let l = left.read(scope);
            let r = right.read(scope);
            op.apply(l.as_ref(), r.as_ref())
        }))
    }
}

/// Every built-in operator, ready to register
pub fn builtin_operators() -> Vec<Arc<dyn Operator>> {
    CompareOp::ALL
        .iter()
        .map(|op| Arc::new(BuiltinOperator::new(*op)) as Arc<dyn Operator>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::schema::ModelSchema;
    use crate::datamodel::store::JsonDataModel;
    use crate::operator::Side;
    use serde_json::json;

    fn int() -> TypeDescriptor {
        TypeDescriptor::new(ValueKind::Integer)
    }

    fn text() -> TypeDescriptor {
        TypeDescriptor::new(ValueKind::String)
    }

    #[test]
    fn test_compare_op_display() {
        assert_eq!(format!("{}", CompareOp::Eq), "==");
        assert_eq!(format!("{}", CompareOp::NotEq), "!=");
        assert_eq!(format!("{}", CompareOp::Gt), ">");
        assert_eq!(format!("{}", CompareOp::Gte), ">=");
        assert_eq!(format!("{}", CompareOp::Lt), "<");
        assert_eq!(format!("{}", CompareOp::Lte), "<=");
        assert_eq!(format!("{}", CompareOp::Contains), "contains");
    }

    #[test]
    fn test_supported_types() {
        assert!(CompareOp::Eq.supports(&text()));
        assert!(CompareOp::Gt.supports(&int()));
        assert!(CompareOp::Gt.supports(&TypeDescriptor::nullable(ValueKind::Float)));
        assert!(!CompareOp::Gt.supports(&text()));
        assert!(CompareOp::Contains.supports(&text()));
        assert!(!CompareOp::Contains.supports(&TypeDescriptor::new(ValueKind::Array)));
        assert!(!CompareOp::Contains.supports(&int()));
        assert!(!CompareOp::StartsWith.supports(&TypeDescriptor::new(ValueKind::Array)));
    }

    #[test]
    fn test_equality() {
        assert!(CompareOp::Eq.apply(Some(&json!("search")), Some(&json!("search"))));
        assert!(!CompareOp::Eq.apply(Some(&json!("search")), Some(&json!("code"))));
        assert!(CompareOp::Eq.apply(Some(&json!(2)), Some(&json!(2.0))));
        assert!(CompareOp::Eq.apply(None, None));
        assert!(!CompareOp::Eq.apply(Some(&json!(0)), None));
        assert!(CompareOp::NotEq.apply(Some(&json!(true)), Some(&json!(false))));
    }

    #[test]
    fn test_number_comparison() {
        let score = json!(7.5);
        assert!(CompareOp::Gt.apply(Some(&score), Some(&json!(5))));
        assert!(!CompareOp::Gt.apply(Some(&score), Some(&json!(10))));
        assert!(CompareOp::Gte.apply(Some(&score), Some(&json!(7.5))));
        assert!(CompareOp::Lt.apply(Some(&score), Some(&json!(10))));
        assert!(CompareOp::Lte.apply(Some(&score), Some(&json!(7.5))));
        assert!(!CompareOp::Lte.apply(Some(&score), Some(&json!(7))));
        assert!(CompareOp::Gt.apply(Some(&json!(i64::MAX)), Some(&json!(i64::MAX - 1))));
    }

    #[test]
    fn test_ordering_on_absent_is_false() {
        assert!(!CompareOp::Gt.apply(None, Some(&json!(1))));
        assert!(!CompareOp::Lt.apply(Some(&json!(1)), None));
        assert!(!CompareOp::Gt.apply(Some(&json!("9")), Some(&json!(1))));
    }

    #[test]
    fn test_string_operators() {
        let message = json!("hello world");
        assert!(CompareOp::Contains.apply(Some(&message), Some(&json!("world"))));
        assert!(!CompareOp::Contains.apply(Some(&message), Some(&json!("foo"))));
        assert!(CompareOp::NotContains.apply(Some(&message), Some(&json!("foo"))));
        assert!(!CompareOp::NotContains.apply(None, Some(&json!("foo"))));
        assert!(CompareOp::StartsWith.apply(Some(&message), Some(&json!("hello"))));
        assert!(CompareOp::EndsWith.apply(Some(&message), Some(&json!("world"))));
        assert!(!CompareOp::EndsWith.apply(Some(&message), Some(&json!("hello"))));
    }

    #[test]
    fn test_contains_is_substring_only() {
        let tags = json!(["bug", "urgent"]);
        assert!(!CompareOp::Contains.apply(Some(&tags), Some(&json!("bug"))));
        assert!(!CompareOp::NotContains.apply(Some(&tags), Some(&json!("bug"))));
        assert!(!CompareOp::Contains.apply(Some(&json!("bug")), Some(&tags)));
    }

    #[test]
    fn test_build_test_reads_accessors() {
        let schema: ModelSchema = serde_yaml::from_str("Score: { type: integer }").unwrap();
        let model = JsonDataModel::with_values(Uuid::new_v4(), "M", schema, json!({"Score": 42}));
        let op = BuiltinOperator::new(CompareOp::Gt);

        let test = op
            .build_test(
                Accessor::field(Side::Left, "Score", int()),
                Accessor::constant(Some(json!(30)), int()),
            )
            .unwrap();

        assert!(test(&EvalScope::new(&model, None)));
        model.set("Score", json!(10));
        assert!(!test(&EvalScope::new(&model, None)));
    }

    #[test]
    fn test_build_test_rejects_mismatched_operands() {
        let op = BuiltinOperator::new(CompareOp::Gt);
        let result = op.build_test(
            Accessor::field(Side::Left, "Score", int()),
            Accessor::constant(Some(json!("x")), text()),
        );
        assert!(matches!(
            result,
            Err(PredicateError::ExpressionBuild { .. })
        ));

        let op = BuiltinOperator::new(CompareOp::StartsWith);
        let result = op.build_test(
            Accessor::field(Side::Left, "Score", int()),
            Accessor::constant(Some(json!(1)), int()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_builtin_operators_are_unique() {
        let ops = builtin_operators();
        assert_eq!(ops.len(), CompareOp::ALL.len());

        let mut kinds: Vec<&str> = ops.iter().map(|o| o.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), ops.len());
        assert!(ops.iter().all(|o| o.plugin_id() == BUILTIN_PLUGIN_ID));
    }
}
