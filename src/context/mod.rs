//! Execution contexts.
//!
//! A root [`Context`] is built once at startup and never mutated afterwards.
//! Every dispatched call works on its own [`Context::fork`], which shares the
//! root's type registry and starts from a copy of its variable scope.

mod registry;

pub use registry::{
    Attribute, ObjectType, TypeRegistry, BUILTIN_TYPES, DEFINITION_TYPE, HASH_TAG,
    RESERVED_TYPE_NAMES, TYPED_NAME_TYPE, TYPE_SET_TYPE, TYPE_TAG,
};

use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-call evaluation state.
#[derive(Debug, Clone)]
pub struct Context {
    types: Arc<TypeRegistry>,
    scope: HashMap<String, Value>,
}

impl Context {
    pub fn new(types: TypeRegistry) -> Self {
        Self {
            types: Arc::new(types),
            scope: HashMap::new(),
        }
    }

    /// Independent copy: shares the type registry, copies the scope.
    pub fn fork(&self) -> Context {
        Context {
            types: Arc::clone(&self.types),
            scope: self.scope.clone(),
        }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scope.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.scope.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.scope.remove(name)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(TypeRegistry::default())
    }
}
