//! # structpb-enc
//!
//! Converts between native Rust values and a schema-free document tree of
//! six node kinds: null, number, string, bool, object and list. It is the
//! layer you reach for when a wire format carries free-form JSON-like
//! payloads (protobuf `Struct`, config blobs) and the program wants plain
//! maps, vectors and structs on its side.
//!
//! ## Quick start
//!
//! ```rust
//! use std::collections::HashMap;
//! use structpb_enc::document::Struct;
//! use structpb_enc::{decode_object, encode, Native};
//!
//! let mut src: HashMap<&str, Native> = HashMap::new();
//! src.insert("name", "Alice".into());
//! src.insert("age", 30.into());
//!
//! // native → document
//! let mut doc = Struct::new();
//! encode(&src, &mut doc).unwrap();
//! assert_eq!(doc.to_json().unwrap(), r#"{"age":30.0,"name":"Alice"}"#);
//!
//! // document → native; numbers come back as f64
//! let back = decode_object(Some(&doc)).unwrap();
//! assert_eq!(back["age"], Native::Float(30.0));
//! ```
//!
//! ## Modules
//!
//! - [`encoder`] — native value (any `Serialize`) → document tree
//! - [`decoder`] — document tree → [`Native`]
//! - [`document`] — the `Struct` / `Value` / `ListValue` tree and its JSON mapping
//! - [`native`] — the dynamic [`Native`] value
//! - [`error`] — error type for encoding failures
//!
//! Both directions are pure and allocate a fresh tree per call, so they can
//! run concurrently on independent inputs without coordination.

pub mod decoder;
pub mod document;
pub mod encoder;
pub mod error;
pub mod native;

pub use decoder::{decode_object, decode_value};
pub use document::{Kind, ListValue, Struct, Value};
pub use encoder::{encode, encode_from_struct, encode_value};
pub use error::EncodeError;
pub use native::{Native, NativeMap};
