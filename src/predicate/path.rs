// SPDX-License-Identifier: MIT

//! Path resolution against data model schemas and live values
//!
//! Paths are dot-separated field names (`Player.Stats.Health`). An empty path
//! or a path with an empty segment never resolves.

use serde_json::Value;
use std::collections::HashMap;

use crate::datamodel::schema::FieldDef;
use crate::datamodel::value::TypeDescriptor;
use crate::datamodel::DataModel;
use crate::error::PredicateError;

/// Split a path into its segments, `None` if any segment is empty
pub fn split(path: &str) -> Option<Vec<&str>> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

/// Walk schema fields down to the definition at `path`
pub fn walk_schema<'a>(
    fields: &'a HashMap<String, FieldDef>,
    path: &str,
) -> Option<&'a FieldDef> {
    let parts = split(path)?;
    let mut current = fields.get(parts[0])?;
    for part in &parts[1..] {
        current = current.fields.get(*part)?;
    }
    Some(current)
}

/// Walk a live value down to the value at `path`
pub fn walk_value<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let parts = split(path)?;
    let mut current = root;
    for part in parts {
        current = current.get(part)?;
    }
    Some(current)
}

/// Confirm `path` exists on the model and return its static type
pub fn resolve(model: &dyn DataModel, path: &str) -> Result<TypeDescriptor, PredicateError> {
    model
        .type_at_path(path)
        .ok_or_else(|| PredicateError::unknown_path(model.name(), path))
}
