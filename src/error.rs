// SPDX-License-Identifier: MIT

//! Typed error handling for predicate-engine
//!
//! `PredicateError` covers the hard failures of the predicate mutation API.
//! Everything a predicate can recover from on its own (unsupported
//! operators, incompatible operands, bad persisted literals) is absorbed and
//! never shows up here.

use thiserror::Error;

/// Errors raised by predicate mutations and compilation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredicateError {
    /// A data model was supplied without a path, or a path without a model
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    /// The path does not exist on the model's schema
    #[error("Data model '{model}' does not contain a property at path '{path}'")]
    UnknownPath { model: String, path: String },

    /// An operator claimed support for a pairing but could not build a test
    #[error("Failed to build test for operator '{operator}': {message}")]
    ExpressionBuild { operator: String, message: String },
}

impl PredicateError {
    /// Create an invalid operand error
    pub fn invalid_operand(message: impl Into<String>) -> Self {
        Self::InvalidOperand(message.into())
    }

    /// Create an unknown path error
    pub fn unknown_path(model: impl Into<String>, path: impl Into<String>) -> Self {
        Self::UnknownPath {
            model: model.into(),
            path: path.into(),
        }
    }

    /// Create an expression build error
    pub fn expression_build(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExpressionBuild {
            operator: operator.into(),
            message: message.into(),
        }
    }
}

/// Errors from reading model files and predicate records
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid model files (duplicate ids and the like)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed predicate records
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl EngineError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
