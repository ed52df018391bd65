//! Type registry consulted when decoding typed wire data.

use std::collections::HashMap;

use crate::types::{Error, Result};

/// Type names that are always resolvable as [`TypeRef`](crate::value::TypeRef) targets.
pub const BUILTIN_TYPES: &[&str] = &[
    "Any", "Undef", "Boolean", "Integer", "Float", "String", "Binary", "Array", "Hash", "Object",
    "Type",
];

/// Wire tag of encoded type references.
pub const TYPE_TAG: &str = "Type";
/// Wire tag of escaped hashes.
pub const HASH_TAG: &str = "Hash";
/// Names the codec reserves as tags; no object type may use them.
pub const RESERVED_TYPE_NAMES: &[&str] = &[TYPE_TAG, HASH_TAG];

/// Type name of [`TypedName`](crate::service::TypedName) objects.
pub const TYPED_NAME_TYPE: &str = "TypedName";
/// Type name of [`Definition`](crate::service::Definition) objects.
pub const DEFINITION_TYPE: &str = "Service::Definition";
/// Type name of [`TypeSet`](crate::service::TypeSet) objects.
pub const TYPE_SET_TYPE: &str = "Pcore::TypeSet";

/// Attribute declaration of an [`ObjectType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub required: bool,
}

impl Attribute {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

/// Named object type with a fixed attribute list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectType {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn required_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| a.required)
    }
}

/// Registry of object types, keyed by name.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    objects: HashMap<String, ObjectType>,
}

impl TypeRegistry {
    /// Registry holding only the service-level object types.
    pub fn new() -> Self {
        let mut registry = Self {
            objects: HashMap::new(),
        };
        registry.insert(ObjectType::new(
            TYPED_NAME_TYPE,
            vec![Attribute::required("namespace"), Attribute::required("name")],
        ));
        registry.insert(ObjectType::new(
            DEFINITION_TYPE,
            vec![
                Attribute::required("identifier"),
                Attribute::required("service_id"),
                Attribute::optional("properties"),
            ],
        ));
        registry.insert(ObjectType::new(
            TYPE_SET_TYPE,
            vec![
                Attribute::required("name"),
                Attribute::required("version"),
                Attribute::optional("types"),
            ],
        ));
        registry
    }

    /// Register (or replace) an object type.
    ///
    /// Fails for [`RESERVED_TYPE_NAMES`], which could never be decoded as objects.
    pub fn register(&mut self, object_type: ObjectType) -> Result<()> {
        if RESERVED_TYPE_NAMES.contains(&object_type.name.as_str()) {
            return Err(Error::config(format!(
                "type name '{}' is reserved",
                object_type.name
            )));
        }
        self.insert(object_type);
        Ok(())
    }

    fn insert(&mut self, object_type: ObjectType) {
        self.objects.insert(object_type.name.clone(), object_type);
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        self.objects.get(name)
    }

    /// True if `name` denotes a builtin or registered type.
    pub fn resolves(&self, name: &str) -> bool {
        BUILTIN_TYPES.contains(&name) || self.objects.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_types_preregistered() {
        let registry = TypeRegistry::new();
        assert!(registry.object_type(TYPED_NAME_TYPE).is_some());
        assert!(registry.object_type(DEFINITION_TYPE).is_some());
        assert!(registry.object_type(TYPE_SET_TYPE).is_some());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_resolves_builtin_and_registered() {
        let mut registry = TypeRegistry::new();
        assert!(registry.resolves("String"));
        assert!(!registry.resolves("Acme::Widget"));

        registry
            .register(ObjectType::new("Acme::Widget", vec![Attribute::required("id")]))
            .unwrap();
        assert!(registry.resolves("Acme::Widget"));
    }

    #[test]
    fn test_reserved_names_rejected() {
        let mut registry = TypeRegistry::new();
        for name in RESERVED_TYPE_NAMES {
            let err = registry
                .register(ObjectType::new(*name, vec![Attribute::required("id")]))
                .unwrap_err();
            assert!(matches!(err, Error::Config(msg) if msg.contains("reserved")));
            assert!(registry.object_type(name).is_none());
        }
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_required_attributes() {
        let registry = TypeRegistry::new();
        let def = registry.object_type(DEFINITION_TYPE).unwrap();
        let required: Vec<_> = def.required_attributes().map(|a| a.name.as_str()).collect();
        assert_eq!(required, vec!["identifier", "service_id"]);
    }
}
