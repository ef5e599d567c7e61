// SPDX-License-Identifier: MIT

//! Data model loader - YAML file loading and parsing
//!
//! A model file lists models with their schema and initial values:
//!
//! ```yaml
//! models:
//!   - id: 6f1c5f3e-4b7a-4c1e-9d7e-0d1f2a3b4c5d
//!     name: Weather
//!     schema:
//!       Temperature: { type: integer }
//!     values:
//!       Temperature: 42
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use super::registry::ModelRegistry;
use super::schema::ModelSchema;
use super::store::JsonDataModel;
use crate::error::EngineError;

/// Top-level model file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelFile {
    pub models: Vec<ModelDefinition>,
}

/// A single data model definition
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelDefinition {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub schema: ModelSchema,
    /// Initial values, overlaid on the schema defaults
    pub values: Option<Value>,
}

impl ModelDefinition {
    pub fn build(self) -> JsonDataModel {
        match self.values {
            Some(values) => JsonDataModel::with_values(self.id, self.name, self.schema, values),
            None => JsonDataModel::new(self.id, self.name, self.schema),
        }
    }
}

/// Loads data model definitions from YAML files
pub struct ModelLoader;

impl ModelLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load every model in a YAML file
    pub fn load_models<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<Arc<JsonDataModel>>, EngineError> {
        let content = fs::read_to_string(path)?;
        let defs = Self::parse_yaml(&content)?;
        Ok(defs.into_iter().map(|d| Arc::new(d.build())).collect())
    }

    /// Load every model in a YAML file into `registry`, returning how many were registered
    pub fn register_models<P: AsRef<Path>>(
        &self,
        path: P,
        registry: &ModelRegistry,
    ) -> Result<usize, EngineError> {
        let models = self.load_models(path)?;
        let count = models.len();
        for model in models {
            registry.register(model);
        }
        Ok(count)
    }

    /// Parse model definitions from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Vec<ModelDefinition>, EngineError> {
        let file: ModelFile = serde_yaml::from_str(content)?;

        let mut seen = HashSet::new();
        for def in &file.models {
            if !seen.insert(def.id) {
                return Err(EngineError::config(format!(
                    "Duplicate data model id {} ({})",
                    def.id, def.name
                )));
            }
        }

        Ok(file.models)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::value::ValueKind;
    use crate::datamodel::DataModel;
    use serde_json::json;

    #[test]
    fn test_parse_models() {
        let yaml = r#"
models:
  - id: 6f1c5f3e-4b7a-4c1e-9d7e-0d1f2a3b4c5d
    name: Weather
    schema:
      Temperature: { type: integer, default: 20 }
      Sky: { type: string }
    values:
      Sky: "clear"
  - id: 0b6a4f9e-1111-4c1e-9d7e-0d1f2a3b4c5d
    name: Empty
"#;
        let defs = ModelLoader::parse_yaml(yaml).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "Weather");
        assert_eq!(
            defs[0].schema.fields["Temperature"].field_type,
            ValueKind::Integer
        );
        assert!(defs[1].schema.fields.is_empty());
        assert!(defs[1].values.is_none());

        let model = defs[0].clone().build();
        assert_eq!(model.get("Temperature"), Some(json!(20)));
        assert_eq!(model.get("Sky"), Some(json!("clear")));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = r#"
models:
  - id: 6f1c5f3e-4b7a-4c1e-9d7e-0d1f2a3b4c5d
    name: A
  - id: 6f1c5f3e-4b7a-4c1e-9d7e-0d1f2a3b4c5d
    name: B
"#;
        let result = ModelLoader::parse_yaml(yaml);
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_invalid_yaml_returns_error() {
        let yaml = r#"
models:
  - id: not-a-uuid
    name: Broken
"#;
        let result = ModelLoader::parse_yaml(yaml);
        assert!(matches!(result, Err(EngineError::Yaml(_))));
    }

    #[test]
    fn test_missing_file_returns_io_error() {
        let result = ModelLoader::new().load_models("/nonexistent/models.yaml");
        assert!(matches!(result, Err(EngineError::Io(_))));
    }
}
