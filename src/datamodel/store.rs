// SPDX-License-Identifier: MIT

//! In-memory data model backed by a JSON value

use serde_json::{Map, Value};
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use super::schema::ModelSchema;
use super::value::TypeDescriptor;
use super::DataModel;
use crate::predicate::path;

/// Live data model whose values can be changed between evaluations
#[derive(Debug)]
pub struct JsonDataModel {
    id: Uuid,
    name: String,
    schema: ModelSchema,
    values: RwLock<Value>,
}

impl JsonDataModel {
    /// Create a model seeded with the schema's defaults
    pub fn new(id: Uuid, name: impl Into<String>, schema: ModelSchema) -> Self {
        let values = schema.defaults();
        Self {
            id,
            name: name.into(),
            schema,
            values: RwLock::new(values),
        }
    }

    /// Create a model and overlay `values` on top of the schema's defaults
    pub fn with_values(
        id: Uuid,
        name: impl Into<String>,
        schema: ModelSchema,
        values: Value,
    ) -> Self {
        let model = Self::new(id, name, schema);
        if let Value::Object(obj) = values {
            for (key, value) in obj {
                model.set(&key, value);
            }
        }
        model
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// Set the value at `path`, creating intermediate objects as needed.
    ///
    /// Returns false if the path is malformed or runs through a non-object value.
    pub fn set(&self, field_path: &str, value: Value) -> bool {
        let Some(parts) = path::split(field_path) else {
            return false;
        };
        let mut root = self.values.write().unwrap_or_else(PoisonError::into_inner);

        let mut current = &mut *root;
        for part in &parts[..parts.len() - 1] {
            let Value::Object(obj) = current else {
                return false;
            };
            current = obj
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        match current {
            Value::Object(obj) => {
                obj.insert(parts[parts.len() - 1].to_string(), value);
                true
            }
            _ => false,
        }
    }

    /// Snapshot of every value
    pub fn to_json(&self) -> Value {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DataModel for JsonDataModel {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn type_at_path(&self, field_path: &str) -> Option<TypeDescriptor> {
        self.schema.type_at(field_path)
    }

    fn get(&self, field_path: &str) -> Option<Value> {
        let root = self.values.read().unwrap_or_else(PoisonError::into_inner);
        match path::walk_value(&root, field_path)? {
            Value::Null => None,
            value => Some(value.clone()),
        }
    }
}
