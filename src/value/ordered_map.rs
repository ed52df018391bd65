//! Insertion-ordered map keyed by [`Value`].

use indexmap::{Equivalent, IndexMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::Value;

/// Map that keeps entries in insertion order.
///
/// Keys are arbitrary values. Floats inside keys are compared by bit
/// pattern, so `0.0` and `-0.0` are distinct keys and a `NaN` key can be
/// found again. Inserting an existing key replaces its value without moving
/// the entry.
#[derive(Clone, Default)]
pub struct OrderedMap {
    entries: IndexMap<Key, Value>,
}

impl OrderedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert or replace. Returns the previous value for `key`, if any.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(Key(key.into()), value.into())
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(&ByValue(key))
    }

    /// Lookup by string key.
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.entries.get(&ByStr(key))
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.contains_key(&ByValue(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (&k.0, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.keys().map(|k| &k.0)
    }
}

/// Equal when both hold equal entries in the same order.
impl PartialEq for OrderedMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Debug for OrderedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = OrderedMap::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for OrderedMap {
    type Item = (Value, Value);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.entries.into_iter())
    }
}

/// Owning iterator over the entries of an [`OrderedMap`], in order.
#[derive(Debug)]
pub struct IntoIter(indexmap::map::IntoIter<Key, Value>);

impl Iterator for IntoIter {
    type Item = (Value, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k.0, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for IntoIter {}

// =============================================================================
// Keys
// =============================================================================

#[derive(Debug, Clone)]
struct Key(Value);

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(&self.0, state);
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        same_key(&self.0, &other.0)
    }
}

impl Eq for Key {}

/// Borrowed lookup by value.
struct ByValue<'a>(&'a Value);

impl Hash for ByValue<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(self.0, state);
    }
}

impl Equivalent<Key> for ByValue<'_> {
    fn equivalent(&self, key: &Key) -> bool {
        same_key(self.0, &key.0)
    }
}

/// Borrowed lookup by string, hashed like `Value::String`.
struct ByStr<'a>(&'a str);

impl Hash for ByStr<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_str(self.0, state);
    }
}

impl Equivalent<Key> for ByStr<'_> {
    fn equivalent(&self, key: &Key) -> bool {
        key.0.as_str() == Some(self.0)
    }
}

fn hash_str<H: Hasher>(s: &str, state: &mut H) {
    state.write_u8(4);
    s.hash(state);
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Undef => state.write_u8(0),
        Value::Boolean(b) => {
            state.write_u8(1);
            b.hash(state);
        }
        Value::Integer(i) => {
            state.write_u8(2);
            i.hash(state);
        }
        Value::Float(x) => {
            state.write_u8(3);
            x.to_bits().hash(state);
        }
        Value::String(s) => hash_str(s, state),
        Value::Binary(bytes) => {
            state.write_u8(5);
            bytes.hash(state);
        }
        Value::Array(values) => {
            state.write_u8(6);
            state.write_usize(values.len());
            for v in values {
                hash_value(v, state);
            }
        }
        Value::Hash(map) => {
            state.write_u8(7);
            hash_entries(map, state);
        }
        Value::Object(obj) => {
            state.write_u8(8);
            obj.type_name.hash(state);
            hash_entries(&obj.attributes, state);
        }
        Value::Type(t) => {
            state.write_u8(9);
            t.name().hash(state);
        }
    }
}

fn hash_entries<H: Hasher>(map: &OrderedMap, state: &mut H) {
    state.write_usize(map.len());
    for (k, v) in &map.entries {
        k.hash(state);
        hash_value(v, state);
    }
}

/// Key equality: structural, with floats compared by bit pattern.
fn same_key(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_key(x, y))
        }
        (Value::Hash(x), Value::Hash(y)) => same_entries(x, y),
        (Value::Object(x), Value::Object(y)) => {
            x.type_name == y.type_name && same_entries(&x.attributes, &y.attributes)
        }
        _ => a == b,
    }
}

fn same_entries(a: &OrderedMap, b: &OrderedMap) -> bool {
    a.len() == b.len()
        && a
            .entries
            .iter()
            .zip(&b.entries)
            .all(|((ka, va), (kb, vb))| ka == kb && same_key(va, vb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order() {
        let map: OrderedMap = [("b", 1), ("a", 2), ("c", 3)].into_iter().collect();
        let keys: Vec<_> = map.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_insert_existing_key_replaces_in_place() {
        let mut map = OrderedMap::new();
        map.insert("x", 1);
        map.insert("y", 2);

        let previous = map.insert("x", 10);
        assert_eq!(previous, Some(Value::Integer(1)));
        assert_eq!(map.len(), 2);

        let first = map.iter().next().unwrap();
        assert_eq!(first, (&Value::from("x"), &Value::Integer(10)));
    }

    #[test]
    fn test_non_string_keys() {
        let mut map = OrderedMap::new();
        map.insert(Value::Integer(7), "seven");
        map.insert(Value::Boolean(true), "yes");

        assert_eq!(map.get(&Value::Integer(7)), Some(&Value::from("seven")));
        assert!(map.get_str("7").is_none());
        assert!(map.contains_key(&Value::Boolean(true)));
    }

    #[test]
    fn test_float_keys_compare_by_bits() {
        let mut map = OrderedMap::new();
        map.insert(0.0, "positive");
        map.insert(-0.0, "negative");
        map.insert(f64::NAN, "nan");

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&Value::Float(-0.0)), Some(&Value::from("negative")));
        assert_eq!(map.get(&Value::Float(f64::NAN)), Some(&Value::from("nan")));
    }

    #[test]
    fn test_composite_keys() {
        let key = Value::from(vec![Value::from(1), Value::from("a")]);
        let mut map = OrderedMap::new();
        map.insert(key.clone(), true);
        map.insert(Value::from(vec![Value::from(1), Value::from("b")]), false);

        assert_eq!(map.get(&key), Some(&Value::Boolean(true)));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let ab: OrderedMap = [("a", 1), ("b", 2)].into_iter().collect();
        let ba: OrderedMap = [("b", 2), ("a", 1)].into_iter().collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn test_into_iter_keeps_order() {
        let map: OrderedMap = [("z", 1), ("y", 2)].into_iter().collect();
        let entries: Vec<_> = map.into_iter().collect();
        assert_eq!(
            entries,
            vec![
                (Value::from("z"), Value::Integer(1)),
                (Value::from("y"), Value::Integer(2)),
            ]
        );
    }
}
