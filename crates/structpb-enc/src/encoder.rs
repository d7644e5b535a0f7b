//! Encoder — converts native Rust values into a document tree.
//!
//! Rust has no runtime reflection, so type introspection goes through
//! `serde::Serialize`: the value describes itself to an encoder-owned
//! [`Serializer`], and each callback lands on exactly one rule below.
//!
//! | native kind                                   | document result                 |
//! |-----------------------------------------------|---------------------------------|
//! | `()`, `None`                                  | `Null`                          |
//! | `Some(v)`, `&T`, `Box<T>`, newtype struct     | the encoded pointee             |
//! | any integer width, `f32`, `f64`               | `Number` (widened to `f64`)     |
//! | `str`, `String`, `char`                       | `String`                        |
//! | `bool`                                        | `Bool`                          |
//! | string-keyed map                              | `Struct`                        |
//! | struct, unit struct                           | `Struct` of its visible fields  |
//! | `Vec`, slice, array, tuple, bytes             | `List`                          |
//! | unit enum variant                             | `String` holding the variant    |
//! | newtype/tuple/struct enum variant             | `Struct` `{variant: payload}`   |
//!
//! A struct field is visible when the type's `Serialize` impl emits it, so
//! `#[serde(skip)]` is how a field is kept out of the document. Fields are
//! written under the names the impl reports, in declaration order. The
//! encoder does no remapping of its own, but serde attributes are part of
//! that impl: `#[serde(rename = "...")]` changes the written key, and
//! `#[serde(flatten)]` inlines the inner fields.
//!
//! Integers outside the exact-integer range of an `f64` lose precision; that
//! is accepted rather than guarded. Recursion follows the shape of the input,
//! so self-referential values (e.g. through `Rc` cycles) never terminate.
//!
//! # Example
//! ```
//! use std::collections::HashMap;
//! use serde::Serialize;
//! use structpb_enc::document::{Struct, Value};
//! use structpb_enc::{encode, encode_from_struct};
//!
//! let mut src = HashMap::new();
//! src.insert("int", 1);
//! let mut doc = Struct::new();
//! encode(&src, &mut doc).unwrap();
//! assert_eq!(doc.get("int"), Some(&Value::number(1.0)));
//!
//! #[derive(Serialize)]
//! struct Event {
//!     title: String,
//!     #[serde(skip)]
//!     etag: String,
//! }
//! let mut doc = Struct::new();
//! let event = Event { title: "standup".into(), etag: "abc".into() };
//! encode_from_struct(&event, &mut doc).unwrap();
//! assert_eq!(doc.len(), 1);
//! assert_eq!(doc.get("title").and_then(Value::as_str), Some("standup"));
//! ```

use std::collections::BTreeMap;

use serde::ser::{
    Impossible, Serialize, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
    SerializeTuple, SerializeTupleStruct, SerializeTupleVariant, Serializer,
};

use crate::document::{Struct, Value};
use crate::error::{EncodeError, Result};

/// Encode a string-keyed mapping, inserting one field per entry into `out`.
///
/// Accepts anything that iterates as `(key, value)` pairs: `&HashMap`,
/// `&BTreeMap`, a `Vec` of tuples. Existing fields in `out` are kept unless
/// a key collides; clearing the destination is the caller's job. On error,
/// fields encoded before the failing entry stay in `out`.
pub fn encode<I, K, V>(native: I, out: &mut Struct) -> Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Serialize,
{
    let mut count = 0usize;
    for (key, value) in native {
        let key = key.as_ref();
        let encoded = encode_value(&value).inspect_err(|err| {
            tracing::debug!(key, error = %err, "failed to encode mapping entry");
        })?;
        out.fields.insert(key.to_string(), encoded);
        count += 1;
    }
    tracing::trace!(fields = count, "encoded mapping");
    Ok(())
}

/// Encode a struct's visible fields into `out`, as if the struct were a
/// mapping from field name to field value.
///
/// `native` may also be a reference, `Box`, `Some` or newtype around a
/// struct. Structs with `#[serde(flatten)]` fields serialize as string-keyed
/// maps, so a map is accepted here too and its keys are checked like any
/// other mapping. Anything else fails with [`EncodeError::NotAStruct`].
pub fn encode_from_struct<T>(native: &T, out: &mut Struct) -> Result<()>
where
    T: Serialize + ?Sized,
{
    tracing::trace!(type_name = std::any::type_name::<T>(), "encoding struct");
    native
        .serialize(RecordSerializer { out })
        .inspect_err(|err| {
            tracing::debug!(
                type_name = std::any::type_name::<T>(),
                error = %err,
                "failed to encode struct"
            );
        })
}

/// Encode a single native value into a document value.
pub fn encode_value<T>(native: &T) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    native.serialize(ValueSerializer)
}

/// Field walking shared by nested structs and [`encode_from_struct`].
fn write_field<T>(fields: &mut BTreeMap<String, Value>, name: &'static str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    fields.insert(name.to_string(), value.serialize(ValueSerializer)?);
    Ok(())
}

/// Wraps `payload` as `{variant: payload}`.
fn tagged(variant: &'static str, payload: Value) -> Value {
    let mut wrapper = Struct::new();
    wrapper.insert(variant, payload);
    Value::structure(wrapper)
}

// ============================================================================
// Single-value dispatch
// ============================================================================

struct ValueSerializer;

macro_rules! widen {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<Value> {
                Ok(Value::number(v as f64))
            }
        )*
    };
}

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = EncodeError;

    type SerializeSeq = SerializeList;
    type SerializeTuple = SerializeList;
    type SerializeTupleStruct = SerializeList;
    type SerializeTupleVariant = SerializeTaggedList;
    type SerializeMap = SerializeObject;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = SerializeTaggedRecord;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::bool(v))
    }

    widen! {
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_f32: f32,
        serialize_f64: f64,
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::string(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::string(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        let values: Vec<Value> = v.iter().map(|b| Value::number(f64::from(*b))).collect();
        Ok(Value::list(values))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::null())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::null())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::structure(Struct::new()))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::string(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        Ok(tagged(variant, value.serialize(ValueSerializer)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeList> {
        Ok(SerializeList {
            values: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeList> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeList> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTaggedList> {
        Ok(SerializeTaggedList {
            variant,
            values: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeObject> {
        Ok(SerializeObject {
            fields: BTreeMap::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord {
            fields: BTreeMap::new(),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeTaggedRecord> {
        Ok(SerializeTaggedRecord {
            variant,
            fields: BTreeMap::new(),
        })
    }
}

// ============================================================================
// Sequences
// ============================================================================

struct SerializeList {
    values: Vec<Value>,
}

impl SerializeList {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.values.push(value.serialize(ValueSerializer)?);
        Ok(())
    }
}

impl SerializeSeq for SerializeList {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::list(self.values))
    }
}

impl SerializeTuple for SerializeList {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::list(self.values))
    }
}

impl SerializeTupleStruct for SerializeList {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::list(self.values))
    }
}

struct SerializeTaggedList {
    variant: &'static str,
    values: Vec<Value>,
}

impl SerializeTupleVariant for SerializeTaggedList {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.values.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(tagged(self.variant, Value::list(self.values)))
    }
}

// ============================================================================
// Mappings
// ============================================================================

struct SerializeObject {
    fields: BTreeMap<String, Value>,
    next_key: Option<String>,
}

impl SerializeMap for SerializeObject {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.next_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| EncodeError::Custom("map value serialized before its key".into()))?;
        self.fields.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::structure(Struct {
            fields: self.fields,
        }))
    }
}

/// Accepts string-like keys only.
struct MapKeySerializer;

fn unsupported_key(kind: &'static str) -> EncodeError {
    EncodeError::UnsupportedMapKey { kind }
}

macro_rules! reject {
    ($err:ident; $($method:ident: $ty:ty => $kind:literal),* $(,)?) => {
        $(
            fn $method(self, _v: $ty) -> Result<Self::Ok> {
                Err($err($kind))
            }
        )*
    };
}

impl Serializer for MapKeySerializer {
    type Ok = String;
    type Error = EncodeError;

    type SerializeSeq = Impossible<String, EncodeError>;
    type SerializeTuple = Impossible<String, EncodeError>;
    type SerializeTupleStruct = Impossible<String, EncodeError>;
    type SerializeTupleVariant = Impossible<String, EncodeError>;
    type SerializeMap = Impossible<String, EncodeError>;
    type SerializeStruct = Impossible<String, EncodeError>;
    type SerializeStructVariant = Impossible<String, EncodeError>;

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String> {
        value.serialize(self)
    }

    reject! {
        unsupported_key;
        serialize_bool: bool => "bool",
        serialize_i8: i8 => "i8",
        serialize_i16: i16 => "i16",
        serialize_i32: i32 => "i32",
        serialize_i64: i64 => "i64",
        serialize_i128: i128 => "i128",
        serialize_u8: u8 => "u8",
        serialize_u16: u16 => "u16",
        serialize_u32: u32 => "u32",
        serialize_u64: u64 => "u64",
        serialize_u128: u128 => "u128",
        serialize_f32: f32 => "f32",
        serialize_f64: f64 => "f64",
        serialize_bytes: &[u8] => "bytes",
    }

    fn serialize_none(self) -> Result<String> {
        Err(unsupported_key("option"))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<String> {
        Err(unsupported_key("option"))
    }

    fn serialize_unit(self) -> Result<String> {
        Err(unsupported_key("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(unsupported_key("unit struct"))
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String> {
        Err(unsupported_key("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(unsupported_key("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(unsupported_key("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(unsupported_key("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(unsupported_key("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(unsupported_key("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(unsupported_key("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(unsupported_key("struct variant"))
    }
}

// ============================================================================
// Records
// ============================================================================

struct SerializeRecord {
    fields: BTreeMap<String, Value>,
}

impl SerializeStruct for SerializeRecord {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        write_field(&mut self.fields, key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::structure(Struct {
            fields: self.fields,
        }))
    }
}

struct SerializeTaggedRecord {
    variant: &'static str,
    fields: BTreeMap<String, Value>,
}

impl SerializeStructVariant for SerializeTaggedRecord {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        write_field(&mut self.fields, key, value)
    }

    fn end(self) -> Result<Value> {
        let record = Value::structure(Struct {
            fields: self.fields,
        });
        Ok(tagged(self.variant, record))
    }
}

/// Top-level entry for [`encode_from_struct`]: accepts a record (through any
/// number of pointer-like wrappers) and writes its fields straight into the
/// caller's container.
struct RecordSerializer<'a> {
    out: &'a mut Struct,
}

/// Writes visible fields into a borrowed container.
struct FieldWriter<'a> {
    out: &'a mut Struct,
}

impl SerializeStruct for FieldWriter<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        write_field(&mut self.out.fields, key, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Writes string-keyed entries into a borrowed container. Reached by records
/// whose `Serialize` impl goes through the map path.
struct EntryWriter<'a> {
    out: &'a mut Struct,
    next_key: Option<String>,
}

impl SerializeMap for EntryWriter<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.next_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| EncodeError::Custom("map value serialized before its key".into()))?;
        self.out.fields.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

fn not_a_struct(kind: &'static str) -> EncodeError {
    EncodeError::NotAStruct { kind }
}

impl<'a> Serializer for RecordSerializer<'a> {
    type Ok = ();
    type Error = EncodeError;

    type SerializeSeq = Impossible<(), EncodeError>;
    type SerializeTuple = Impossible<(), EncodeError>;
    type SerializeTupleStruct = Impossible<(), EncodeError>;
    type SerializeTupleVariant = Impossible<(), EncodeError>;
    type SerializeMap = EntryWriter<'a>;
    type SerializeStruct = FieldWriter<'a>;
    type SerializeStructVariant = Impossible<(), EncodeError>;

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<FieldWriter<'a>> {
        Ok(FieldWriter { out: self.out })
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    reject! {
        not_a_struct;
        serialize_bool: bool => "bool",
        serialize_i8: i8 => "i8",
        serialize_i16: i16 => "i16",
        serialize_i32: i32 => "i32",
        serialize_i64: i64 => "i64",
        serialize_i128: i128 => "i128",
        serialize_u8: u8 => "u8",
        serialize_u16: u16 => "u16",
        serialize_u32: u32 => "u32",
        serialize_u64: u64 => "u64",
        serialize_u128: u128 => "u128",
        serialize_f32: f32 => "f32",
        serialize_f64: f64 => "f64",
        serialize_char: char => "char",
        serialize_str: &str => "string",
        serialize_bytes: &[u8] => "bytes",
    }

    fn serialize_none(self) -> Result<()> {
        Err(not_a_struct("nil"))
    }

    fn serialize_unit(self) -> Result<()> {
        Err(not_a_struct("unit"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<()> {
        Err(not_a_struct("unit variant"))
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()> {
        Err(not_a_struct("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(not_a_struct("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(not_a_struct("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(not_a_struct("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(not_a_struct("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<EntryWriter<'a>> {
        Ok(EntryWriter {
            out: self.out,
            next_key: None,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(not_a_struct("struct variant"))
    }
}
