// SPDX-License-Identifier: MIT

//! Typed predicates over live, runtime-registered data models
//!
//! A [`Predicate`] compares a path in one data model against either a
//! literal or a path in another model, using an [`Operator`] looked up from
//! an [`OperatorRegistry`]. Operands are validated and the comparison is
//! compiled when the predicate is edited; evaluating it only reads the
//! current values.

pub mod datamodel;
pub mod error;
pub mod operator;
pub mod predicate;

pub use datamodel::{DataModel, JsonDataModel, ModelRegistry, TypeDescriptor, ValueKind};
pub use error::{EngineError, PredicateError};
pub use operator::{Operator, OperatorRegistry};
pub use predicate::{PersistedPredicate, Predicate, PredicateKind, PredicateState};
