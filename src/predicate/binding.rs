// SPDX-License-Identifier: MIT

//! Operand binding
//!
//! Holds the left operand, right operand and operator of a predicate and
//! keeps them consistent with each other. Changing the left side cascades:
//! the operator is re-checked against the new left type, then the right
//! operand is re-checked or re-coerced.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Weak};
use uuid::Uuid;

use super::path;
use crate::datamodel::value::{convert, TypeDescriptor, ValueKind};
use crate::datamodel::DataModel;
use crate::error::PredicateError;
use crate::operator::Operator;

/// Whether the right operand is a literal or a live path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum PredicateKind {
    #[default]
    Static,
    Dynamic,
}

/// A path into a data model that is owned elsewhere
#[derive(Debug, Clone)]
pub struct DynamicOperand {
    model: Weak<dyn DataModel>,
    model_id: Uuid,
    path: String,
    ty: TypeDescriptor,
}

impl DynamicOperand {
    /// Resolve `path` on `model`, failing if the schema has no such path
    pub fn bind(model: &Arc<dyn DataModel>, path: &str) -> Result<Self, PredicateError> {
        let ty = path::resolve(model.as_ref(), path)?;
        Ok(Self {
            model: Arc::downgrade(model),
            model_id: model.id(),
            path: path.to_string(),
            ty,
        })
    }

    /// The model, if it is still registered somewhere
    pub fn model(&self) -> Option<Arc<dyn DataModel>> {
        self.model.upgrade()
    }

    pub fn model_id(&self) -> Uuid {
        self.model_id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn ty(&self) -> TypeDescriptor {
        self.ty
    }
}

/// Right-hand side of a predicate
#[derive(Debug, Clone)]
pub enum OperandRef {
    Dynamic(DynamicOperand),
    Static(Value),
}

/// Non-owning reference to the selected operator
#[derive(Debug, Clone)]
pub struct BoundOperator {
    operator: Weak<dyn Operator>,
    plugin_id: Uuid,
    kind: String,
}

impl BoundOperator {
    fn new(operator: &Arc<dyn Operator>) -> Self {
        Self {
            operator: Arc::downgrade(operator),
            plugin_id: operator.plugin_id(),
            kind: operator.kind().to_string(),
        }
    }

    pub fn get(&self) -> Option<Arc<dyn Operator>> {
        self.operator.upgrade()
    }

    pub fn plugin_id(&self) -> Uuid {
        self.plugin_id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// Left operand, right operand and operator of one predicate
#[derive(Debug, Clone, Default)]
pub struct OperandBinding {
    kind: PredicateKind,
    left: Option<DynamicOperand>,
    right: Option<OperandRef>,
    operator: Option<BoundOperator>,
}

impl OperandBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> PredicateKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: PredicateKind) {
        self.kind = kind;
    }

    pub fn left(&self) -> Option<&DynamicOperand> {
        self.left.as_ref()
    }

    pub fn left_type(&self) -> Option<TypeDescriptor> {
        self.left.as_ref().map(DynamicOperand::ty)
    }

    pub fn right(&self) -> Option<&OperandRef> {
        self.right.as_ref()
    }

    /// The right operand when it is a live path
    pub fn right_dynamic(&self) -> Option<&DynamicOperand> {
        match &self.right {
            Some(OperandRef::Dynamic(operand)) => Some(operand),
            _ => None,
        }
    }

    /// The right operand when it is a literal
    pub fn right_literal(&self) -> Option<&Value> {
        match &self.right {
            Some(OperandRef::Static(value)) => Some(value),
            _ => None,
        }
    }

    pub fn bound_operator(&self) -> Option<&BoundOperator> {
        self.operator.as_ref()
    }

    /// The operator, if one is bound and still registered
    pub fn operator(&self) -> Option<Arc<dyn Operator>> {
        self.operator.as_ref().and_then(BoundOperator::get)
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.operator.is_none()
    }

    /// Set or clear the left operand.
    ///
    /// `model` and `path` must both be present or both absent.
    pub fn set_left(
        &mut self,
        model: Option<&Arc<dyn DataModel>>,
        path: Option<&str>,
    ) -> Result<(), PredicateError> {
        self.left = bind_operand(model, path)?;

        self.validate_operator();
        self.validate_right();
        Ok(())
    }

    /// Compare against a live path. Returns false if the new operand had to be
    /// dropped because its type cannot be converted to the left type.
    pub fn set_right_dynamic(
        &mut self,
        model: Option<&Arc<dyn DataModel>>,
        path: Option<&str>,
    ) -> Result<bool, PredicateError> {
        let operand = bind_operand(model, path)?;
        let requested = operand.is_some();

        self.kind = PredicateKind::Dynamic;
        self.right = operand.map(OperandRef::Dynamic);
        self.validate_right();

        Ok(!requested || self.right.is_some())
    }

    /// Compare against a literal, coercing it to the left type when one is known
    pub fn set_right_static(&mut self, literal: Option<Value>) {
        self.kind = PredicateKind::Static;
        self.right = coerce_literal(literal, self.left_type().as_ref()).map(OperandRef::Static);
    }

    /// Select or clear the operator. Returns false if the operator does not
    /// support the left type, in which case no operator stays bound.
    pub fn set_operator(&mut self, operator: Option<&Arc<dyn Operator>>) -> bool {
        let Some(operator) = operator else {
            self.operator = None;
            return true;
        };

        match self.left_type() {
            Some(ty) if !operator.supports(&ty) => {
                log::debug!(
                    "Operator '{}' does not support {}, clearing it",
                    operator.kind(),
                    ty
                );
                self.operator = None;
                false
            }
            _ => {
                self.operator = Some(BoundOperator::new(operator));
                true
            }
        }
    }

    fn validate_operator(&mut self) {
        let (Some(ty), Some(bound)) = (self.left_type(), &self.operator) else {
            return;
        };

        let supported = bound.get().is_some_and(|op| op.supports(&ty));
        if !supported {
            log::debug!("Operator '{}' no longer supports {}, clearing it", bound.kind, ty);
            self.operator = None;
        }
    }

    fn validate_right(&mut self) {
        let Some(left_ty) = self.left_type() else {
            return;
        };

        match self.kind {
            PredicateKind::Dynamic => {
                let Some(right) = self.right_dynamic() else {
                    return;
                };
                if !left_ty.is_castable_from(&right.ty) {
                    log::debug!(
                        "Right operand '{}' ({}) is not convertible to {}, clearing it",
                        right.path,
                        right.ty,
                        left_ty
                    );
                    self.right = None;
                }
            }
            PredicateKind::Static => {
                let literal = match self.right.take() {
                    Some(OperandRef::Static(value)) => Some(value),
                    _ => None,
                };
                self.right = coerce_literal(literal, Some(&left_ty)).map(OperandRef::Static);
            }
        }
    }
}

fn bind_operand(
    model: Option<&Arc<dyn DataModel>>,
    path: Option<&str>,
) -> Result<Option<DynamicOperand>, PredicateError> {
    match (model, path) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(PredicateError::invalid_operand(
            "If a data model is provided, a path is also required",
        )),
        (None, Some(_)) => Err(PredicateError::invalid_operand(
            "If a path is provided, a data model is also required",
        )),
        (Some(model), Some(path)) => DynamicOperand::bind(model, path).map(Some),
    }
}

/// Fit a literal to the left type.
///
/// With no left type the literal is kept as-is. Otherwise a matching literal
/// is kept, a mismatched one is converted, and anything absent or
/// unconvertible becomes the type's default (or absence, for types that
/// accept it).
pub fn coerce_literal(literal: Option<Value>, left: Option<&TypeDescriptor>) -> Option<Value> {
    let literal = literal.filter(|v| !v.is_null());
    let Some(ty) = left else {
        return literal;
    };

    match literal {
        Some(value) if ValueKind::of(&value) == Some(ty.kind) => Some(value),
        Some(value) => convert(&value, ty.kind).or_else(|| {
            log::debug!("Literal {} is not convertible to {}, using default", value, ty);
            ty.default_value()
        }),
        None => ty.default_value(),
    }
}
