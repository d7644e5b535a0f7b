//! Decoder — converts a document tree into native values.
//!
//! Numbers always come back as [`Native::Float`]; callers that need integers
//! convert explicitly. Objects come back as [`Native::Map`] and lists as
//! [`Native::List`], recursively.
//!
//! # Empty objects
//!
//! An absent or empty [`Struct`] decodes to `None`, not to an empty map. The
//! same rule applies to nested objects: an empty `Struct` inside a parent
//! decodes to [`Native::Null`]. The encoder does not mirror this (an empty
//! mapping encodes to an empty, non-null object), so the two directions are
//! deliberately asymmetric.
//!
//! # Example
//! ```
//! use structpb_enc::document::{Struct, Value};
//! use structpb_enc::{decode_object, Native};
//!
//! let mut doc = Struct::new();
//! doc.insert("n", 10.0);
//! doc.insert("tags", vec![Value::from("one"), Value::from("two")]);
//!
//! let native = decode_object(Some(&doc)).unwrap();
//! assert_eq!(native["n"], Native::Float(10.0));
//! assert_eq!(native["tags"].as_list().unwrap().len(), 2);
//!
//! assert!(decode_object(Some(&Struct::new())).is_none());
//! ```

use crate::document::{Kind, Struct, Value};
use crate::native::{Native, NativeMap};

/// Decode a document object into a native mapping.
///
/// Returns `None` when `doc` is absent or has no fields.
///
/// # Panics
///
/// Panics if any nested [`Value`] has no kind set; see [`decode_value`].
pub fn decode_object(doc: Option<&Struct>) -> Option<NativeMap> {
    let doc = doc.filter(|s| !s.is_empty())?;
    tracing::trace!(fields = doc.len(), "decoding object");
    Some(decode_fields(doc))
}

/// Decode a single document value.
///
/// # Panics
///
/// Panics if `doc` (or anything beneath it) has no kind set. Such a value
/// breaks the one-variant-per-node invariant of the document model, and
/// guessing a default would silently corrupt the decoded data.
pub fn decode_value(doc: &Value) -> Native {
    match &doc.kind {
        Some(Kind::Null) => Native::Null,
        Some(Kind::Number(n)) => Native::Float(*n),
        Some(Kind::String(s)) => Native::String(s.clone()),
        Some(Kind::Bool(b)) => Native::Bool(*b),
        Some(Kind::Struct(s)) if s.is_empty() => Native::Null,
        Some(Kind::Struct(s)) => Native::Map(decode_fields(s)),
        Some(Kind::List(l)) => Native::List(l.values.iter().map(decode_value).collect()),
        None => panic!("structpb: failed to decode Value: no kind set ({doc:?})"),
    }
}

fn decode_fields(doc: &Struct) -> NativeMap {
    doc.fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}
