// SPDX-License-Identifier: MIT

//! Predicates: one left-operator-right comparison over live data models
//!
//! A `Predicate` owns an `OperandBinding` and the `CompiledTest` built from
//! it. Every mutation re-validates the binding and rebuilds the test, so
//! `evaluate` only ever runs a test that matches the current operands.
//! An incomplete predicate is inert and evaluates to false.

pub mod binding;
pub mod compiler;
pub mod path;
pub mod record;

pub use binding::{BoundOperator, DynamicOperand, OperandBinding, OperandRef, PredicateKind};
pub use compiler::{compile, CompiledTest};
pub use record::{decode_literal, encode_literal, PersistedPredicate};

use serde_json::Value;
use std::sync::Arc;

use crate::datamodel::DataModel;
use crate::error::PredicateError;
use crate::operator::Operator;

/// Configuration progress of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateState {
    /// Nothing bound
    Empty,
    /// Something bound, but no test could be compiled
    PartiallyBound,
    /// A compiled test is present
    Bound,
}

/// A single comparison between a data model path and a literal or another path
#[derive(Debug, Default)]
pub struct Predicate {
    binding: OperandBinding,
    compiled: Option<CompiledTest>,
}

impl Predicate {
    /// Create an empty, static predicate
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binding(&self) -> &OperandBinding {
        &self.binding
    }

    pub fn kind(&self) -> PredicateKind {
        self.binding.kind()
    }

    pub fn left(&self) -> Option<&DynamicOperand> {
        self.binding.left()
    }

    pub fn right(&self) -> Option<&OperandRef> {
        self.binding.right()
    }

    pub fn operator(&self) -> Option<Arc<dyn Operator>> {
        self.binding.operator()
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn state(&self) -> PredicateState {
        if self.compiled.is_some() {
            PredicateState::Bound
        } else if self.binding.is_empty() {
            PredicateState::Empty
        } else {
            PredicateState::PartiallyBound
        }
    }

    /// Set or clear the left operand; `model` and `path` go together
    pub fn set_left(
        &mut self,
        model: Option<&Arc<dyn DataModel>>,
        path: Option<&str>,
    ) -> Result<(), PredicateError> {
        self.binding.set_left(model, path)?;
        self.recompile()
    }

    /// Compare against another live path.
    ///
    /// Returns `Ok(false)` if the operand was dropped because its type does not
    /// convert to the left type.
    pub fn set_right_dynamic(
        &mut self,
        model: Option<&Arc<dyn DataModel>>,
        path: Option<&str>,
    ) -> Result<bool, PredicateError> {
        let kept = self.binding.set_right_dynamic(model, path)?;
        self.recompile()?;
        Ok(kept)
    }

    /// Compare against a literal
    pub fn set_right_static(&mut self, literal: Option<Value>) -> Result<(), PredicateError> {
        self.binding.set_right_static(literal);
        self.recompile()
    }

    /// Select or clear the operator.
    ///
    /// Returns `Ok(false)` if the operator does not support the left type and
    /// was not bound.
    pub fn set_operator(
        &mut self,
        operator: Option<&Arc<dyn Operator>>,
    ) -> Result<bool, PredicateError> {
        let bound = self.binding.set_operator(operator);
        self.recompile()?;
        Ok(bound)
    }

    fn recompile(&mut self) -> Result<(), PredicateError> {
        self.compiled = None;
        self.compiled = compile(&self.binding)?;
        Ok(())
    }

    /// Run the compiled test against the current model values.
    ///
    /// Returns false when the predicate is incomplete or when a model or the
    /// operator it was compiled against is no longer registered.
    pub fn evaluate(&self) -> bool {
        let Some(compiled) = &self.compiled else {
            return false;
        };
        if self.binding.operator().is_none() {
            return false;
        }
        let Some(left) = self.binding.left().and_then(DynamicOperand::model) else {
            return false;
        };

        match compiled {
            CompiledTest::Dynamic(test) => {
                match self.binding.right_dynamic().and_then(DynamicOperand::model) {
                    Some(right) => test(left.as_ref(), right.as_ref()),
                    None => false,
                }
            }
            CompiledTest::Static(test) => test(left.as_ref()),
        }
    }
}
