//! Schema-free document tree: the wire-side half of every conversion.
//!
//! The types are shaped like the protobuf well-known `Struct` family:
//!
//! - [`Struct`] — a string-keyed object of [`Value`]s (the top-level container)
//! - [`Value`] — a single node holding exactly one [`Kind`]
//! - [`ListValue`] — an ordered list of [`Value`]s
//!
//! A `Value` carries its variant as `Option<Kind>`, mirroring the protobuf
//! oneof. `None` is the malformed "nothing populated" state; it can be built
//! (via `Value::default()`) but the decoder refuses it.
//!
//! # JSON mapping
//!
//! All three types implement `Serialize`/`Deserialize` using the canonical
//! protobuf JSON mapping: a `Struct` is a JSON object, a `ListValue` a JSON
//! array, and each `Value` the matching JSON scalar.
//!
//! ```
//! use structpb_enc::document::{Struct, Value};
//!
//! let doc = Struct::from_json(r#"{"name":"Alice","tags":["a","b"]}"#).unwrap();
//! assert_eq!(doc.get("name"), Some(&Value::string("Alice")));
//! assert_eq!(doc.to_json().unwrap(), r#"{"name":"Alice","tags":["a","b"]}"#);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, Serialize, Serializer};

/// A Document Object: a mapping from string key to [`Value`].
///
/// An empty `Struct` is the "absent/empty" object; the decoder treats it the
/// same as no object at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Struct {
    pub fields: BTreeMap<String, Value>,
}

/// A Document Value: one node of the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Value {
    pub kind: Option<Kind>,
}

/// The six variants a [`Value`] can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    Null,
    Number(f64),
    String(String),
    Bool(bool),
    Struct(Struct),
    List(ListValue),
}

/// An ordered sequence of [`Value`]s. Order is significant; may be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListValue {
    pub values: Vec<Value>,
}

impl Struct {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Insert a field, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Parse a JSON object into a `Struct`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Render as compact JSON. Fails if any nested `Value` has no kind set.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl FromIterator<(String, Value)> for Struct {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Struct {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Value {
    pub fn null() -> Self {
        Kind::Null.into()
    }

    pub fn number(n: f64) -> Self {
        Kind::Number(n).into()
    }

    pub fn string(s: impl Into<String>) -> Self {
        Kind::String(s.into()).into()
    }

    pub fn bool(b: bool) -> Self {
        Kind::Bool(b).into()
    }

    pub fn structure(s: Struct) -> Self {
        Kind::Struct(s).into()
    }

    pub fn list(values: Vec<Value>) -> Self {
        Kind::List(ListValue { values }).into()
    }

    pub fn kind(&self) -> Option<&Kind> {
        self.kind.as_ref()
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, Some(Kind::Null))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.kind {
            Some(Kind::Number(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            Some(Kind::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            Some(Kind::Bool(b)) => Some(b),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match &self.kind {
            Some(Kind::Struct(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match &self.kind {
            Some(Kind::List(l)) => Some(l),
            _ => None,
        }
    }
}

impl From<Kind> for Value {
    fn from(kind: Kind) -> Self {
        Value { kind: Some(kind) }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Struct> for Value {
    fn from(s: Struct) -> Self {
        Value::structure(s)
    }
}

impl From<ListValue> for Value {
    fn from(l: ListValue) -> Self {
        Kind::List(l).into()
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::list(values)
    }
}

impl From<Vec<Value>> for ListValue {
    fn from(values: Vec<Value>) -> Self {
        ListValue { values }
    }
}

// ============================================================================
// JSON mapping
// ============================================================================

impl Serialize for Struct {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl Serialize for ListValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.kind {
            Some(Kind::Null) => serializer.serialize_unit(),
            Some(Kind::Number(n)) => serializer.serialize_f64(*n),
            Some(Kind::String(s)) => serializer.serialize_str(s),
            Some(Kind::Bool(b)) => serializer.serialize_bool(*b),
            Some(Kind::Struct(s)) => s.serialize(serializer),
            Some(Kind::List(l)) => l.serialize(serializer),
            None => Err(ser::Error::custom("cannot serialize a Value with no kind set")),
        }
    }
}

impl<'de> Deserialize<'de> for Struct {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::deserialize(deserializer).map(|fields| Struct { fields })
    }
}

impl<'de> Deserialize<'de> for ListValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::deserialize(deserializer).map(|values| ListValue { values })
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Maps every self-describing input onto one of the six kinds. All numbers
/// collapse to `f64`.
struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("null, a number, a string, a boolean, an object or a list")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::null())
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::null())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
        Ok(Value::number(n as f64))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
        Ok(Value::number(n as f64))
    }

    fn visit_f64<E: de::Error>(self, n: f64) -> Result<Value, E> {
        Ok(Value::number(n))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::string(s))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::string(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element()? {
            values.push(value);
        }
        Ok(Value::list(values))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut fields = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            fields.insert(key, value);
        }
        Ok(Value::structure(Struct { fields }))
    }
}
