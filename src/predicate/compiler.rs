// SPDX-License-Identifier: MIT

//! Predicate compiler
//!
//! Turns a complete, type-consistent binding into a `CompiledTest`. An
//! incomplete binding compiles to nothing; the predicate then evaluates to
//! false.

use serde_json::Value;
use std::fmt;

use super::binding::{DynamicOperand, OperandBinding, PredicateKind};
use crate::datamodel::DataModel;
use crate::error::PredicateError;
use crate::operator::{Accessor, EvalScope, Operator, Side};

type StaticTest = Box<dyn Fn(&dyn DataModel) -> bool + Send + Sync>;
type DynamicTest = Box<dyn Fn(&dyn DataModel, &dyn DataModel) -> bool + Send + Sync>;

/// Executable test, shaped by the predicate kind it was compiled for
pub enum CompiledTest {
    /// Reads the left model and compares against a literal
    Static(StaticTest),
    /// Reads both the left and right model
    Dynamic(DynamicTest),
}

impl CompiledTest {
    pub fn kind(&self) -> PredicateKind {
        match self {
            CompiledTest::Static(_) => PredicateKind::Static,
            CompiledTest::Dynamic(_) => PredicateKind::Dynamic,
        }
    }
}

impl fmt::Debug for CompiledTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompiledTest::Static(_) => write!(f, "CompiledTest::Static"),
            CompiledTest::Dynamic(_) => write!(f, "CompiledTest::Dynamic"),
        }
    }
}

/// Compile `binding`, returning `None` when it is incomplete
pub fn compile(binding: &OperandBinding) -> Result<Option<CompiledTest>, PredicateError> {
    let (Some(left), Some(operator)) = (binding.left(), binding.operator()) else {
        return Ok(None);
    };
    if !operator.supports(&left.ty()) {
        return Ok(None);
    }

    let compiled = match binding.kind() {
        PredicateKind::Dynamic => {
            compile_dynamic(left, binding.right_dynamic(), operator.as_ref())?
        }
        PredicateKind::Static => compile_static(left, binding.right_literal(), operator.as_ref())?,
    };

    if compiled.is_some() {
        log::debug!(
            "Compiled {:?} test '{}' {} on '{}'",
            binding.kind(),
            left.path(),
            operator.kind(),
            left.model_id()
        );
    }
    Ok(compiled)
}

fn compile_dynamic(
    left: &DynamicOperand,
    right: Option<&DynamicOperand>,
    operator: &dyn Operator,
) -> Result<Option<CompiledTest>, PredicateError> {
    let Some(right) = right else {
        return Ok(None);
    };

    let left_accessor = Accessor::field(Side::Left, left.path(), left.ty());
    let mut right_accessor = Accessor::field(Side::Right, right.path(), right.ty());

    // Types differ: convert the right side to the left type
    if right.ty() != left.ty() {
        if !left.ty().is_castable_from(&right.ty()) {
            return Err(PredicateError::expression_build(
                operator.kind(),
                format!("{} is not convertible to {}", right.ty(), left.ty()),
            ));
        }
        right_accessor = right_accessor.converted(left.ty());
    }

    let test = operator.build_test(left_accessor, right_accessor)?;
    Ok(Some(CompiledTest::Dynamic(Box::new(
        move |left_model: &dyn DataModel, right_model: &dyn DataModel| {
            test(&EvalScope::new(left_model, Some(right_model)))
        },
    ))))
}

fn compile_static(
    left: &DynamicOperand,
    literal: Option<&Value>,
    operator: &dyn Operator,
) -> Result<Option<CompiledTest>, PredicateError> {
    let left_ty = left.ty();

    // A value type can't be compared against nothing
    if left_ty.is_value_type() && literal.is_none() {
        return Ok(None);
    }

    // The binding has already coerced the literal to the left type
    let test = operator.build_test(
        Accessor::field(Side::Left, left.path(), left_ty),
        Accessor::constant(literal.cloned(), left_ty),
    )?;
    Ok(Some(CompiledTest::Static(Box::new(
        move |left_model: &dyn DataModel| test(&EvalScope::new(left_model, None)),
    ))))
}
