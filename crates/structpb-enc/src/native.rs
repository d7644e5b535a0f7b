//! Dynamic native values: the program-side half of every conversion.
//!
//! [`Native`] is what the decoder hands back, and it is also a valid input
//! to the encoder for callers that build payloads at runtime instead of
//! from concrete Rust types.
//!
//! The decoder only ever produces `Null`, `Float`, `String`, `Bool`, `Map`
//! and `List`. The integer variants exist for dynamic encode input.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A string-keyed native mapping. Unordered.
pub type NativeMap = HashMap<String, Native>;

/// An untyped native value.
#[derive(Debug, Clone, PartialEq)]
pub enum Native {
    Null,
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bool(bool),
    Map(NativeMap),
    List(Vec<Native>),
}

impl Native {
    pub fn is_null(&self) -> bool {
        matches!(self, Native::Null)
    }

    /// Numeric value widened to `f64`, whichever numeric variant holds it.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Native::Int(n) => Some(n as f64),
            Native::Uint(n) => Some(n as f64),
            Native::Float(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Native::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Native::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&NativeMap> {
        match self {
            Native::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Native]> {
        match self {
            Native::List(l) => Some(l),
            _ => None,
        }
    }
}

impl Serialize for Native {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Native::Null => serializer.serialize_none(),
            Native::Int(n) => serializer.serialize_i64(*n),
            Native::Uint(n) => serializer.serialize_u64(*n),
            Native::Float(n) => serializer.serialize_f64(*n),
            Native::String(s) => serializer.serialize_str(s),
            Native::Bool(b) => serializer.serialize_bool(*b),
            Native::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Native::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for v in l {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
        }
    }
}

macro_rules! native_from {
    ($($ty:ty => $variant:ident as $conv:ty),* $(,)?) => {
        $(
            impl From<$ty> for Native {
                fn from(v: $ty) -> Self {
                    Native::$variant(v as $conv)
                }
            }
        )*
    };
}

native_from! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => Uint as u64,
    u16 => Uint as u64,
    u32 => Uint as u64,
    u64 => Uint as u64,
    f32 => Float as f64,
    f64 => Float as f64,
}

impl From<bool> for Native {
    fn from(b: bool) -> Self {
        Native::Bool(b)
    }
}

impl From<&str> for Native {
    fn from(s: &str) -> Self {
        Native::String(s.to_string())
    }
}

impl From<String> for Native {
    fn from(s: String) -> Self {
        Native::String(s)
    }
}

impl From<NativeMap> for Native {
    fn from(m: NativeMap) -> Self {
        Native::Map(m)
    }
}

impl From<Vec<Native>> for Native {
    fn from(l: Vec<Native>) -> Self {
        Native::List(l)
    }
}

impl<T: Into<Native>> From<Option<T>> for Native {
    fn from(v: Option<T>) -> Self {
        v.map_or(Native::Null, Into::into)
    }
}
