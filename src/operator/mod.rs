// SPDX-License-Identifier: MIT

//! Comparison operators and the accessors they are built from
//!
//! An operator never sees data models directly. The predicate compiler hands
//! it two `Accessor`s describing where each operand comes from, and the
//! operator returns a `BoolExpr` that reads both through an `EvalScope`.

pub mod builtin;
pub mod registry;

pub use builtin::{builtin_operators, BuiltinOperator, CompareOp, BUILTIN_PLUGIN_ID};
pub use registry::OperatorRegistry;

use serde_json::Value;
use uuid::Uuid;

use crate::datamodel::value::{convert, TypeDescriptor};
use crate::datamodel::DataModel;
use crate::error::PredicateError;

/// Which model of the scope an accessor reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// The live models a compiled test is evaluated against
#[derive(Clone, Copy)]
pub struct EvalScope<'a> {
    left: &'a dyn DataModel,
    right: Option<&'a dyn DataModel>,
}

impl<'a> EvalScope<'a> {
    pub fn new(left: &'a dyn DataModel, right: Option<&'a dyn DataModel>) -> Self {
        Self { left, right }
    }

    pub fn model(&self, side: Side) -> Option<&'a dyn DataModel> {
        match side {
            Side::Left => Some(self.left),
            Side::Right => self.right,
        }
    }
}

/// Typed description of how to obtain one operand
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    /// Live value at a path of the left or right model
    Field {
        side: Side,
        path: String,
        ty: TypeDescriptor,
    },
    /// Another accessor's value converted to `ty`
    Converted {
        inner: Box<Accessor>,
        ty: TypeDescriptor,
    },
    /// A fixed literal; `None` is an explicitly typed absent value
    Constant {
        value: Option<Value>,
        ty: TypeDescriptor,
    },
}

impl Accessor {
    pub fn field(side: Side, path: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::Field {
            side,
            path: path.into(),
            ty,
        }
    }

    pub fn constant(value: Option<Value>, ty: TypeDescriptor) -> Self {
        Self::Constant { value, ty }
    }

    pub fn converted(self, ty: TypeDescriptor) -> Self {
        Self::Converted {
            inner: Box::new(self),
            ty,
        }
    }

    /// Static type of the value this accessor yields
    pub fn ty(&self) -> TypeDescriptor {
        match self {
            Accessor::Field { ty, .. }
            | Accessor::Converted { ty, .. }
            | Accessor::Constant { ty, .. } => *ty,
        }
    }

    /// Read the current value; a missing model, path or failed conversion is absent
    pub fn read(&self, scope: &EvalScope<'_>) -> Option<Value> {
        match self {
            Accessor::Field { side, path, .. } => scope.model(*side)?.get(path),
            Accessor::Converted { inner, ty } => convert(&inner.read(scope)?, ty.kind),
            Accessor::Constant { value, .. } => value.clone(),
        }
    }
}

/// An executable boolean test produced by an operator
pub type BoolExpr = Box<dyn Fn(&EvalScope<'_>) -> bool + Send + Sync>;

/// A pluggable comparison.
///
/// Operators are identified by the plugin that provides them plus their
/// kind name, which is also how persisted predicates refer to them.
pub trait Operator: Send + Sync {
    /// Id of the plugin providing this operator
    fn plugin_id(&self) -> Uuid;

    /// Operator kind name, unique within its plugin (e.g. `GreaterThan`)
    fn kind(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Whether the operator can compare a left operand of type `ty`
    fn supports(&self, ty: &TypeDescriptor) -> bool;

    /// Build the boolean test comparing `left` with `right`
    fn build_test(&self, left: Accessor, right: Accessor) -> Result<BoolExpr, PredicateError>;
}
