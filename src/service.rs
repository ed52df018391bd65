//! The wrapped service capability and its metadata types.
//!
//! Implementations receive the per-call [`Context`] explicitly. Classified
//! failures are returned as [`Error`](crate::Error) values, typically
//! [`Error::Issue`](crate::Error::Issue); a panic is treated as a fault and is
//! never turned into a structured error.

use async_trait::async_trait;
use std::fmt;

use crate::context::{
    Attribute, Context, ObjectType, DEFINITION_TYPE, TYPED_NAME_TYPE, TYPE_SET_TYPE,
};
use crate::types::Result;
use crate::value::{Object, OrderedMap, Value};

/// Service exposed to the host process.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Identifier of this service.
    async fn identifier(&self, ctx: &mut Context) -> Result<TypedName>;

    /// Call `method` on the definition named `identifier` with positional arguments.
    async fn invoke(
        &self,
        ctx: &mut Context,
        identifier: &str,
        method: &str,
        arguments: Vec<Value>,
    ) -> Result<Value>;

    /// Types and definitions published by this service.
    async fn metadata(&self, ctx: &mut Context) -> Result<(TypeSet, Vec<Definition>)>;

    /// Produce the state of the definition named `identifier` from `input`.
    async fn state(&self, ctx: &mut Context, identifier: &str, input: OrderedMap) -> Result<Value>;
}

// =============================================================================
// TypedName
// =============================================================================

/// Name qualified by a namespace, e.g. `service:echo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedName {
    pub namespace: String,
    pub name: String,
}

impl TypedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

impl From<TypedName> for Value {
    fn from(tn: TypedName) -> Self {
        let attributes: OrderedMap = [("namespace", tn.namespace), ("name", tn.name)]
            .into_iter()
            .collect();
        Value::Object(Object::new(TYPED_NAME_TYPE, attributes))
    }
}

impl TryFrom<&Value> for TypedName {
    type Error = crate::Error;

    fn try_from(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .filter(|o| o.type_name == TYPED_NAME_TYPE)
            .ok_or_else(|| {
                crate::Error::invalid_argument_shape("TypedName", TYPED_NAME_TYPE, value.type_label())
            })?;
        let field = |name: &str| {
            obj.get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| crate::Error::invalid_argument_shape("TypedName", "String", "Undef"))
        };
        Ok(TypedName::new(field("namespace")?, field("name")?))
    }
}

// =============================================================================
// Definition
// =============================================================================

/// Definition published by a service: what it is, who serves it, and how.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub identifier: TypedName,
    pub service_id: TypedName,
    pub properties: OrderedMap,
}

impl Definition {
    pub fn new(identifier: TypedName, service_id: TypedName, properties: OrderedMap) -> Self {
        Self {
            identifier,
            service_id,
            properties,
        }
    }
}

impl From<Definition> for Value {
    fn from(def: Definition) -> Self {
        let mut attributes = OrderedMap::with_capacity(3);
        attributes.insert("identifier", def.identifier);
        attributes.insert("service_id", def.service_id);
        attributes.insert("properties", def.properties);
        Value::Object(Object::new(DEFINITION_TYPE, attributes))
    }
}

// =============================================================================
// TypeSet
// =============================================================================

/// Versioned set of object types a service publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSet {
    pub name: String,
    pub version: String,
    pub types: Vec<ObjectType>,
}

impl TypeSet {
    pub fn new(name: impl Into<String>, version: impl Into<String>, types: Vec<ObjectType>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            types,
        }
    }
}

impl From<TypeSet> for Value {
    fn from(ts: TypeSet) -> Self {
        let types: OrderedMap = ts
            .types
            .into_iter()
            .map(|t| (t.name.clone(), Value::Hash(attributes_value(&t.attributes))))
            .collect();

        let mut attributes = OrderedMap::with_capacity(3);
        attributes.insert("name", ts.name);
        attributes.insert("version", ts.version);
        attributes.insert("types", types);
        Value::Object(Object::new(TYPE_SET_TYPE, attributes))
    }
}

fn attributes_value(attributes: &[Attribute]) -> OrderedMap {
    attributes
        .iter()
        .map(|a| (a.name.clone(), Value::Boolean(a.required)))
        .collect()
}
