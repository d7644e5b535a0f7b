//! Error types for encoding native values into document trees.
//!
//! Decoding has no error type: a [`Value`](crate::document::Value) with no kind
//! set is a broken invariant from whoever produced it, and the decoder panics.

use std::fmt::Display;

use thiserror::Error;

/// Errors that can occur while encoding a native value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// A mapping whose keys are not strings. Only string-keyed mappings
    /// have a document representation.
    #[error("unsupported map key kind: {kind}")]
    UnsupportedMapKey { kind: &'static str },

    /// `encode_from_struct` was handed something other than a record.
    #[error("expected a struct, found {kind}")]
    NotAStruct { kind: &'static str },

    /// A `Serialize` impl reported its own failure.
    #[error("{0}")]
    Custom(String),
}

impl serde::ser::Error for EncodeError {
    fn custom<T: Display>(msg: T) -> Self {
        EncodeError::Custom(msg.to_string())
    }
}

/// Convenience alias used throughout structpb-enc.
pub type Result<T> = std::result::Result<T, EncodeError>;
