// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use super::builtin::builtin_operators;
use super::Operator;

type OperatorKey = (Uuid, String);

/// Operators keyed by providing plugin and kind name
#[derive(Clone)]
pub struct OperatorRegistry {
    operators: Arc<RwLock<HashMap<OperatorKey, Arc<dyn Operator>>>>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self {
            operators: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registry pre-populated with the built-in operators
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for op in builtin_operators() {
            registry.register(op);
        }
        registry
    }

    pub fn register(&self, operator: Arc<dyn Operator>) {
        let mut operators = self
            .operators
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        operators.insert(
            (operator.plugin_id(), operator.kind().to_string()),
            operator,
        );
    }

    pub fn unregister(&self, plugin_id: &Uuid, kind: &str) -> Option<Arc<dyn Operator>> {
        let mut operators = self
            .operators
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        operators.remove(&(*plugin_id, kind.to_string()))
    }

    pub fn resolve(&self, plugin_id: &Uuid, kind: &str) -> Option<Arc<dyn Operator>> {
        let operators = self
            .operators
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        operators.get(&(*plugin_id, kind.to_string())).cloned()
    }

    /// Every registered operator, sorted by plugin and kind
    pub fn all(&self) -> Vec<Arc<dyn Operator>> {
        let operators = self
            .operators
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<Arc<dyn Operator>> = operators.values().cloned().collect();
        all.sort_by(|a, b| {
            (a.plugin_id(), a.kind()).cmp(&(b.plugin_id(), b.kind()))
        });
        all
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::builtin::{CompareOp, BUILTIN_PLUGIN_ID};

    #[test]
    fn test_with_builtins_resolves_by_kind() {
        let registry = OperatorRegistry::with_builtins();

        let op = registry.resolve(&BUILTIN_PLUGIN_ID, "GreaterThan");
        assert!(op.is_some());
        assert_eq!(op.unwrap().kind(), "GreaterThan");
        assert_eq!(registry.all().len(), CompareOp::ALL.len());
    }

    #[test]
    fn test_resolve_unknown_operator() {
        let registry = OperatorRegistry::with_builtins();

        assert!(registry.resolve(&BUILTIN_PLUGIN_ID, "Between").is_none());
        assert!(registry.resolve(&Uuid::new_v4(), "Equals").is_none());
    }

    #[test]
    fn test_unregister_operator() {
        let registry = OperatorRegistry::with_builtins();

        assert!(registry.unregister(&BUILTIN_PLUGIN_ID, "Equals").is_some());
        assert!(registry.resolve(&BUILTIN_PLUGIN_ID, "Equals").is_none());
    }

    #[test]
    fn test_registry_is_clone() {
        let registry = OperatorRegistry::new();
        let cloned = registry.clone();

        cloned.register(builtin_operators().remove(0));
        assert_eq!(registry.all().len(), 1);
    }
}
