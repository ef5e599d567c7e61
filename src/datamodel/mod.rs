// SPDX-License-Identifier: MIT

//! Data models that predicates read from
//!
//! This module provides:
//! - `DataModel` - the schema capability every model exposes to predicates
//! - `ModelSchema` - the declared shape and types of a model
//! - `JsonDataModel` - an in-memory model backed by a JSON value
//! - `ModelRegistry` / `ModelLoader` - lookup by id and loading from YAML

pub mod loader;
pub mod registry;
pub mod schema;
pub mod store;
pub mod value;

pub use loader::ModelLoader;
pub use registry::ModelRegistry;
pub use schema::{FieldDef, ModelSchema};
pub use store::JsonDataModel;
pub use value::{TypeDescriptor, ValueKind};

use serde_json::Value;
use uuid::Uuid;

/// A structured value tree with a path-based schema.
///
/// Implementations are owned by whoever registers them; predicates only hold
/// weak references and re-read values through `get` on every evaluation.
pub trait DataModel: Send + Sync {
    /// Stable identity of the model (the id of the plugin that owns it)
    fn id(&self) -> Uuid;

    /// Human-readable model name
    fn name(&self) -> &str;

    /// Static type at `path`, `None` if the schema has no such path
    fn type_at_path(&self, path: &str) -> Option<TypeDescriptor>;

    fn contains_path(&self, path: &str) -> bool {
        self.type_at_path(path).is_some()
    }

    /// Current value at `path`; JSON `null` reads as absent
    fn get(&self, path: &str) -> Option<Value>;
}
