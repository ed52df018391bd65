//! Generic tagged values exchanged with wrapped services.
//!
//! A [`Value`] is what services produce and consume. Typed objects and type
//! references only carry type *names*; resolving a name to an
//! [`ObjectType`](crate::context::ObjectType) is the job of the
//! [`Context`](crate::context::Context) used when decoding wire data.

mod ordered_map;

pub use ordered_map::OrderedMap;

use std::fmt;

/// Generic evaluator-level value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Undef,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    Hash(OrderedMap),
    /// Instance of a named object type.
    Object(Object),
    /// Reference to a named type.
    Type(TypeRef),
}

impl Value {
    /// Short label of the variant, used in shape errors and logs.
    pub fn type_label(&self) -> &'static str {
        match self {
            Value::Undef => "Undef",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Binary(_) => "Binary",
            Value::Array(_) => "Array",
            Value::Hash(_) => "Hash",
            Value::Object(_) => "Object",
            Value::Type(_) => "Type",
        }
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, Value::Undef)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&OrderedMap> {
        match self {
            Value::Hash(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undef => write!(f, "undef"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "'{}'", s),
            Value::Binary(bytes) => write!(f, "Binary({} bytes)", bytes.len()),
            Value::Array(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Hash(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Object(obj) => write!(f, "{}({})", obj.type_name, Value::Hash(obj.attributes.clone())),
            Value::Type(t) => write!(f, "Type[{}]", t.name()),
        }
    }
}

// =============================================================================
// Typed objects
// =============================================================================

/// Instance of a named object type with ordered attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub type_name: String,
    pub attributes: OrderedMap,
}

impl Object {
    pub fn new(type_name: impl Into<String>, attributes: OrderedMap) -> Self {
        Self {
            type_name: type_name.into(),
            attributes,
        }
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get_str(attribute)
    }
}

/// Reference to a type by its fully qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<OrderedMap> for Value {
    fn from(map: OrderedMap) -> Self {
        Value::Hash(map)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<TypeRef> for Value {
    fn from(t: TypeRef) -> Self {
        Value::Type(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Undef)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_labels() {
        assert_eq!(Value::Undef.type_label(), "Undef");
        assert_eq!(Value::from(vec![Value::from(1)]).type_label(), "Array");
        assert_eq!(Value::from(OrderedMap::new()).type_label(), "Hash");
        assert_eq!(Value::from(TypeRef::new("String")).type_label(), "Type");
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Undef);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
    }

    #[test]
    fn test_display_nested() {
        let map: OrderedMap = [("a", Value::from(vec![Value::from(1), Value::from(true)]))]
            .into_iter()
            .collect();
        assert_eq!(Value::Hash(map).to_string(), "{'a' => [1, true]}");
    }

    #[test]
    fn test_object_attribute_lookup() {
        let obj = Object::new("TypedName", [("name", "echo")].into_iter().collect());
        assert_eq!(obj.get("name"), Some(&Value::from("echo")));
        assert!(obj.get("namespace").is_none());
    }
}
