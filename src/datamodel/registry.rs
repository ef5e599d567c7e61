// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use super::DataModel;

/// Live data models keyed by their owning plugin id
#[derive(Clone)]
pub struct ModelRegistry {
    models: Arc<RwLock<HashMap<Uuid, Arc<dyn DataModel>>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            models: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn register(&self, model: Arc<dyn DataModel>) {
        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        log::debug!("Registered data model '{}' ({})", model.name(), model.id());
        models.insert(model.id(), model);
    }

    /// Drop the registry's handle; predicates bound to the model go inert
    pub fn unregister(&self, id: &Uuid) -> Option<Arc<dyn DataModel>> {
        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        models.remove(id)
    }

    pub fn resolve(&self, id: &Uuid) -> Option<Arc<dyn DataModel>> {
        let models = self.models.read().unwrap_or_else(PoisonError::into_inner);
        models.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        let models = self.models.read().unwrap_or_else(PoisonError::into_inner);
        models.keys().copied().collect()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
