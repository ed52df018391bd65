//! Value codec: generic [`Value`]s to and from `datapb.Data`.
//!
//! Plain values map one-to-one onto the wire variants. Values without a wire
//! variant of their own are carried as hashes tagged with a `__ptype` entry:
//!
//! ```text
//! Object    {"__ptype": "<type name>", attr1: v1, attr2: v2, ...}
//! Type      {"__ptype": "Type", "__pvalue": "<type name>"}
//! Hash with a "__ptype" key
//!           {"__ptype": "Hash", "__pvalue": [k1, v1, k2, v2, ...]}
//! ```
//!
//! Encoding is pure. Decoding resolves every tag against the type registry of
//! the supplied [`Context`] and fails on the first malformed node.

use thiserror::Error;

use crate::context::{Context, TypeRegistry, HASH_TAG, TYPE_TAG};
use crate::proto::datapb::{data::Kind, Data, DataArray, DataEntry, DataHash, NullValue};
use crate::value::{Object, OrderedMap, TypeRef, Value};

/// Key tagging a hash as an encoded non-hash value.
pub const PTYPE_KEY: &str = "__ptype";
/// Key holding the payload of `Type` and escaped `Hash` tags.
pub const PVALUE_KEY: &str = "__pvalue";


/// Malformed or unresolvable wire data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("data carries no value")]
    MissingKind,

    #[error("hash entry is missing its {0}")]
    IncompleteEntry(&'static str),

    #[error("__ptype must be a String, got {0}")]
    InvalidTypeTag(&'static str),

    #[error("unresolved type '{0}'")]
    UnresolvedType(String),

    #[error("attribute names of '{0}' must be strings")]
    NonStringAttribute(String),

    #[error("type '{type_name}' has no attribute '{attribute}'")]
    UnknownAttribute { type_name: String, attribute: String },

    #[error("type '{type_name}' requires attribute '{attribute}'")]
    MissingAttribute { type_name: String, attribute: String },

    #[error("malformed '{tag}' value: {reason}")]
    MalformedValue { tag: String, reason: &'static str },
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value as wire data.
pub fn encode(value: &Value) -> Data {
    Data {
        kind: Some(encode_kind(value)),
    }
}

fn encode_kind(value: &Value) -> Kind {
    match value {
        Value::Undef => Kind::UndefValue(NullValue::NullValue as i32),
        Value::Boolean(b) => Kind::BooleanValue(*b),
        Value::Integer(i) => Kind::IntegerValue(*i),
        Value::Float(x) => Kind::FloatValue(*x),
        Value::String(s) => Kind::StringValue(s.clone()),
        Value::Binary(bytes) => Kind::BinaryValue(bytes.clone()),
        Value::Array(values) => Kind::ArrayValue(DataArray {
            values: values.iter().map(encode).collect(),
        }),
        Value::Hash(map) if map.get_str(PTYPE_KEY).is_some() => {
            let flat = map
                .iter()
                .flat_map(|(k, v)| [encode(k), encode(v)])
                .collect();
            tagged(HASH_TAG, [entry(string_data(PVALUE_KEY), Data {
                kind: Some(Kind::ArrayValue(DataArray { values: flat })),
            })])
        }
        Value::Hash(map) => Kind::HashValue(DataHash {
            entries: map.iter().map(|(k, v)| entry(encode(k), encode(v))).collect(),
        }),
        Value::Object(obj) => tagged(
            &obj.type_name,
            obj.attributes
                .iter()
                .map(|(k, v)| entry(encode(k), encode(v))),
        ),
        Value::Type(t) => tagged(TYPE_TAG, [entry(string_data(PVALUE_KEY), string_data(t.name()))]),
    }
}

fn tagged(tag: &str, rest: impl IntoIterator<Item = DataEntry>) -> Kind {
    let mut entries = vec![entry(string_data(PTYPE_KEY), string_data(tag))];
    entries.extend(rest);
    Kind::HashValue(DataHash { entries })
}

fn entry(key: Data, value: Data) -> DataEntry {
    DataEntry {
        key: Some(key),
        value: Some(value),
    }
}

fn string_data(s: &str) -> Data {
    Data {
        kind: Some(Kind::StringValue(s.to_string())),
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode wire data, resolving type tags against `ctx`.
pub fn decode(ctx: &Context, data: &Data) -> Result<Value, DecodeError> {
    Decoder { types: ctx.types() }.decode(data)
}

/// Decode an optional message field; an absent field is `Undef`.
pub fn decode_opt(ctx: &Context, data: Option<&Data>) -> Result<Value, DecodeError> {
    match data {
        Some(data) => decode(ctx, data),
        None => Ok(Value::Undef),
    }
}

struct Decoder<'a> {
    types: &'a TypeRegistry,
}

impl Decoder<'_> {
    fn decode(&self, data: &Data) -> Result<Value, DecodeError> {
        let kind = data.kind.as_ref().ok_or(DecodeError::MissingKind)?;
        Ok(match kind {
            Kind::UndefValue(_) => Value::Undef,
            Kind::BooleanValue(b) => Value::Boolean(*b),
            Kind::IntegerValue(i) => Value::Integer(*i),
            Kind::FloatValue(x) => Value::Float(*x),
            Kind::StringValue(s) => Value::String(s.clone()),
            Kind::BinaryValue(bytes) => Value::Binary(bytes.clone()),
            Kind::ArrayValue(array) => Value::Array(
                array
                    .values
                    .iter()
                    .map(|d| self.decode(d))
                    .collect::<Result<_, _>>()?,
            ),
            Kind::HashValue(hash) => self.decode_hash(hash)?,
        })
    }

    fn decode_hash(&self, hash: &DataHash) -> Result<Value, DecodeError> {
        let mut map = OrderedMap::with_capacity(hash.entries.len());
        for e in &hash.entries {
            let key = e.key.as_ref().ok_or(DecodeError::IncompleteEntry("key"))?;
            let value = e.value.as_ref().ok_or(DecodeError::IncompleteEntry("value"))?;
            map.insert(self.decode(key)?, self.decode(value)?);
        }

        match map.get_str(PTYPE_KEY).cloned() {
            None => Ok(Value::Hash(map)),
            Some(Value::String(tag)) => self.decode_tagged(tag, map),
            Some(other) => Err(DecodeError::InvalidTypeTag(other.type_label())),
        }
    }

    fn decode_tagged(&self, tag: String, map: OrderedMap) -> Result<Value, DecodeError> {
        match tag.as_str() {
            HASH_TAG => {
                let Value::Array(flat) = take_pvalue(&tag, map)? else {
                    return Err(malformed(tag, "expected an array of keys and values"));
                };
                if flat.len() % 2 != 0 {
                    return Err(malformed(tag, "odd number of elements"));
                }
                let mut items = flat.into_iter();
                let mut unescaped = OrderedMap::with_capacity(items.len() / 2);
                while let (Some(k), Some(v)) = (items.next(), items.next()) {
                    unescaped.insert(k, v);
                }
                Ok(Value::Hash(unescaped))
            }
            TYPE_TAG => {
                let Value::String(name) = take_pvalue(&tag, map)? else {
                    return Err(malformed(tag, "expected a type name"));
                };
                if !self.types.resolves(&name) {
                    return Err(DecodeError::UnresolvedType(name));
                }
                Ok(Value::Type(TypeRef::new(name)))
            }
            _ => self.decode_object(tag, map),
        }
    }

    fn decode_object(&self, type_name: String, map: OrderedMap) -> Result<Value, DecodeError> {
        let object_type = self
            .types
            .object_type(&type_name)
            .ok_or_else(|| DecodeError::UnresolvedType(type_name.clone()))?;

        let mut attributes = OrderedMap::with_capacity(map.len().saturating_sub(1));
        for (key, value) in map {
            let Value::String(name) = key else {
                return Err(DecodeError::NonStringAttribute(type_name));
            };
            if name == PTYPE_KEY {
                continue;
            }
            if object_type.attribute(&name).is_none() {
                return Err(DecodeError::UnknownAttribute {
                    type_name,
                    attribute: name,
                });
            }
            attributes.insert(name, value);
        }

        if let Some(missing) = object_type
            .required_attributes()
            .find(|a| attributes.get_str(&a.name).is_none())
        {
            return Err(DecodeError::MissingAttribute {
                attribute: missing.name.clone(),
                type_name,
            });
        }

        Ok(Value::Object(Object::new(type_name, attributes)))
    }
}

/// The `__pvalue` of a `Type` or escaped `Hash` tag, which must be its only other entry.
fn take_pvalue(tag: &str, map: OrderedMap) -> Result<Value, DecodeError> {
    if map.len() != 2 {
        return Err(malformed(tag.to_string(), "expected exactly __ptype and __pvalue"));
    }
    map.into_iter()
        .find(|(k, _)| k.as_str() == Some(PVALUE_KEY))
        .map(|(_, v)| v)
        .ok_or_else(|| malformed(tag.to_string(), "missing __pvalue"))
}

fn malformed(tag: String, reason: &'static str) -> DecodeError {
    DecodeError::MalformedValue { tag, reason }
}
