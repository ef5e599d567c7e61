// SPDX-License-Identifier: MIT

//! Data model schema definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::value::{TypeDescriptor, ValueKind};
use crate::predicate::path;

/// Schema describing the fields a data model exposes
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct ModelSchema {
    /// Top-level field definitions
    #[serde(flatten)]
    pub fields: HashMap<String, FieldDef>,
}

/// Definition of a single field
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FieldDef {
    /// Type of the field
    #[serde(rename = "type")]
    pub field_type: ValueKind,
    /// Whether the field may be absent
    #[serde(default)]
    pub nullable: bool,
    /// Nested fields of an object
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, FieldDef>,
    /// Default value
    pub default: Option<Value>,
}

impl FieldDef {
    pub fn new(field_type: ValueKind) -> Self {
        Self {
            field_type,
            nullable: false,
            fields: HashMap::new(),
            default: None,
        }
    }

    pub fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor {
            kind: self.field_type,
            nullable: self.nullable,
        }
    }
}

impl ModelSchema {
    /// Look up the field definition at a dot-separated path
    pub fn field_at(&self, field_path: &str) -> Option<&FieldDef> {
        path::walk_schema(&self.fields, field_path)
    }

    pub fn type_at(&self, field_path: &str) -> Option<TypeDescriptor> {
        self.field_at(field_path).map(FieldDef::descriptor)
    }

    /// Every reachable path with its type, sorted by path
    pub fn paths(&self) -> Vec<(String, TypeDescriptor)> {
        let mut out = Vec::new();
        collect_paths(&self.fields, "", &mut out);
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Build an object holding every declared default, nested objects included
    pub fn defaults(&self) -> Value {
        defaults_of(&self.fields)
    }
}

fn collect_paths(
    fields: &HashMap<String, FieldDef>,
    prefix: &str,
    out: &mut Vec<(String, TypeDescriptor)>,
) {
    for (name, def) in fields {
        let full = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        out.push((full.clone(), def.descriptor()));
        collect_paths(&def.fields, &full, out);
    }
}

fn defaults_of(fields: &HashMap<String, FieldDef>) -> Value {
    let mut obj = Map::new();
    for (name, def) in fields {
        if let Some(default) = &def.default {
            obj.insert(name.clone(), default.clone());
        } else if def.field_type == ValueKind::Object && !def.fields.is_empty() {
            obj.insert(name.clone(), defaults_of(&def.fields));
        }
    }
    Value::Object(obj)
}
