use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;
use structpb_enc::document::{Struct, Value};
use structpb_enc::{encode, encode_from_struct, encode_value, EncodeError, Native, NativeMap};

/// Helper: build a `Struct` from literal pairs.
fn object(pairs: Vec<(&str, Value)>) -> Struct {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Helper: encode a mapping into a fresh `Struct`.
fn encode_fresh<I, K, V>(native: I) -> Struct
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Serialize,
{
    let mut out = Struct::new();
    encode(native, &mut out).expect("encode failed");
    out
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn encode_signed_integers_widen_to_number() {
    assert_eq!(encode_value(&1i8).unwrap(), Value::number(1.0));
    assert_eq!(encode_value(&16i16).unwrap(), Value::number(16.0));
    assert_eq!(encode_value(&32i32).unwrap(), Value::number(32.0));
    assert_eq!(encode_value(&-64i64).unwrap(), Value::number(-64.0));
    assert_eq!(encode_value(&128i128).unwrap(), Value::number(128.0));
    assert_eq!(encode_value(&7isize).unwrap(), Value::number(7.0));
}

#[test]
fn encode_unsigned_integers_widen_to_number() {
    assert_eq!(encode_value(&8u8).unwrap(), Value::number(8.0));
    assert_eq!(encode_value(&16u16).unwrap(), Value::number(16.0));
    assert_eq!(encode_value(&32u32).unwrap(), Value::number(32.0));
    assert_eq!(encode_value(&64u64).unwrap(), Value::number(64.0));
    assert_eq!(encode_value(&1usize).unwrap(), Value::number(1.0));
}

#[test]
fn encode_floats() {
    assert_eq!(encode_value(&32f32).unwrap(), Value::number(32.0));
    assert_eq!(encode_value(&64.64f64).unwrap(), Value::number(64.64));
}

#[test]
fn encode_f32_widens_exactly() {
    let v = 0.1f32;
    assert_eq!(encode_value(&v).unwrap(), Value::number(f64::from(v)));
}

#[test]
fn encode_u64_max_loses_precision_without_error() {
    let v = encode_value(&u64::MAX).unwrap();
    assert_eq!(v.as_number(), Some(u64::MAX as f64));
}

#[test]
fn encode_string_and_str() {
    assert_eq!(encode_value("str").unwrap(), Value::string("str"));
    assert_eq!(
        encode_value(&String::from("owned")).unwrap(),
        Value::string("owned")
    );
}

#[test]
fn encode_char_as_string() {
    assert_eq!(encode_value(&'x').unwrap(), Value::string("x"));
}

#[test]
fn encode_bool() {
    assert_eq!(encode_value(&true).unwrap(), Value::bool(true));
    assert_eq!(encode_value(&false).unwrap(), Value::bool(false));
}

#[test]
fn encode_unit_is_null() {
    assert_eq!(encode_value(&()).unwrap(), Value::null());
}

// ============================================================================
// Pointers
// ============================================================================

#[test]
fn encode_pointer_matches_pointee() {
    let ten = 10i32;
    let direct = encode_value(&ten).unwrap();
    assert_eq!(encode_value(&&ten).unwrap(), direct);
    assert_eq!(encode_value(&Box::new(ten)).unwrap(), direct);
    assert_eq!(encode_value(&Rc::new(ten)).unwrap(), direct);
    assert_eq!(encode_value(&Arc::new(ten)).unwrap(), direct);
    assert_eq!(encode_value(&Some(ten)).unwrap(), direct);
    assert_eq!(encode_value(&Some(Box::new(ten))).unwrap(), direct);
}

#[test]
fn encode_nil_pointer_is_null() {
    assert_eq!(encode_value(&None::<i32>).unwrap(), Value::null());
    assert_eq!(encode_value(&None::<Box<String>>).unwrap(), Value::null());
    assert_eq!(encode_value(&Some(None::<bool>)).unwrap(), Value::null());
}

#[test]
fn encode_newtype_struct_is_transparent() {
    #[derive(Serialize)]
    struct Meters(f64);

    assert_eq!(encode_value(&Meters(3.5)).unwrap(), Value::number(3.5));
}

// ============================================================================
// Mappings
// ============================================================================

#[test]
fn encode_empty_mapping_leaves_out_empty() {
    let src: HashMap<String, Native> = HashMap::new();
    assert_eq!(encode_fresh(&src), Struct::new());
}

#[test]
fn encode_nested_mapping() {
    let mut nested = NativeMap::new();
    nested.insert("nested_mapf".into(), "nested_mapf".into());
    let mut inner = NativeMap::new();
    inner.insert("mapf".into(), "mapf".into());
    inner.insert("nested_map".into(), Native::Map(nested));
    let mut src = NativeMap::new();
    src.insert("map".into(), Native::Map(inner));

    let got = encode_fresh(&src);
    let want = object(vec![(
        "map",
        Value::structure(object(vec![
            ("mapf", Value::string("mapf")),
            (
                "nested_map",
                Value::structure(object(vec![("nested_mapf", Value::string("nested_mapf"))])),
            ),
        ])),
    )]);
    assert_eq!(got, want);
}

#[test]
fn encode_nested_empty_mapping_is_empty_object() {
    let mut src = HashMap::new();
    src.insert("empty_map", HashMap::<String, i32>::new());

    let got = encode_fresh(&src);
    assert_eq!(got, object(vec![("empty_map", Value::structure(Struct::new()))]));
}

#[test]
fn encode_accepts_btreemap_and_pairs() {
    let mut tree = BTreeMap::new();
    tree.insert("a".to_string(), 1u8);
    assert_eq!(encode_fresh(&tree), object(vec![("a", Value::number(1.0))]));

    let pairs = vec![("x", true), ("y", false)];
    assert_eq!(
        encode_fresh(pairs),
        object(vec![("x", Value::bool(true)), ("y", Value::bool(false))])
    );
}

#[test]
fn encode_keeps_existing_fields_in_out() {
    let mut out = Struct::new();
    out.insert("kept", "yes");
    out.insert("replaced", "old");

    let mut src = HashMap::new();
    src.insert("replaced", "new");
    encode(&src, &mut out).unwrap();

    assert_eq!(out.get("kept"), Some(&Value::string("yes")));
    assert_eq!(out.get("replaced"), Some(&Value::string("new")));
}

#[test]
fn encode_char_and_newtype_map_keys() {
    #[derive(Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
    struct Key(String);

    let mut by_char = BTreeMap::new();
    by_char.insert('k', 1);
    let v = encode_value(&by_char).unwrap();
    assert_eq!(v.as_struct().unwrap().get("k"), Some(&Value::number(1.0)));

    let mut by_newtype = BTreeMap::new();
    by_newtype.insert(Key("id".into()), 2);
    let v = encode_value(&by_newtype).unwrap();
    assert_eq!(v.as_struct().unwrap().get("id"), Some(&Value::number(2.0)));
}

#[test]
fn encode_non_string_map_key_is_unsupported() {
    let mut bad = HashMap::new();
    bad.insert(1i32, "one");

    let err = encode_value(&bad).unwrap_err();
    assert_eq!(err, EncodeError::UnsupportedMapKey { kind: "i32" });
    assert_eq!(err.to_string(), "unsupported map key kind: i32");
}

#[test]
fn encode_unsupported_nested_value_fails_whole_call() {
    let mut bad = HashMap::new();
    bad.insert((1, 2), "tuple key");

    let mut src: HashMap<&str, Native> = HashMap::new();
    src.insert("ok", Native::Bool(true));
    let mut out = Struct::new();
    encode(&src, &mut out).unwrap();

    let mut nested = HashMap::new();
    nested.insert("bad", bad);
    let err = encode(&nested, &mut out).unwrap_err();
    assert_eq!(err, EncodeError::UnsupportedMapKey { kind: "tuple" });
    assert!(out.get("bad").is_none());
}

// ============================================================================
// Structs
// ============================================================================

#[derive(Serialize)]
#[allow(non_snake_case)]
struct NestedStruct {
    NestedField: String,
}

#[derive(Serialize)]
#[allow(non_snake_case)]
struct Exported {
    ExportedField: String,
    #[serde(skip)]
    #[allow(dead_code)]
    notExportedField: String,
    NestedStruct: NestedStruct,
}

#[test]
fn encode_struct_keeps_only_visible_fields() {
    let src = Exported {
        ExportedField: "exported".into(),
        notExportedField: "not_exported".into(),
        NestedStruct: NestedStruct {
            NestedField: "nested_field".into(),
        },
    };

    let got = encode_value(&src).unwrap();
    let want = Value::structure(object(vec![
        ("ExportedField", Value::string("exported")),
        (
            "NestedStruct",
            Value::structure(object(vec![("NestedField", Value::string("nested_field"))])),
        ),
    ]));
    assert_eq!(got, want);
}

#[test]
fn encode_empty_struct_is_empty_object() {
    #[derive(Serialize)]
    struct Empty {}
    #[derive(Serialize)]
    struct Unit;

    assert_eq!(encode_value(&Empty {}).unwrap(), Value::structure(Struct::new()));
    assert_eq!(encode_value(&Unit).unwrap(), Value::structure(Struct::new()));
}

#[test]
fn encode_skip_serializing_if_field_is_not_visible() {
    #[derive(Serialize)]
    struct Sparse {
        always: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        maybe: Option<u8>,
    }

    let got = encode_value(&Sparse {
        always: 1,
        maybe: None,
    })
    .unwrap();
    let fields = got.as_struct().unwrap();
    assert_eq!(fields.len(), 1);
    assert!(fields.get("maybe").is_none());
}

#[test]
fn encode_from_struct_writes_visible_fields() {
    #[derive(Serialize)]
    #[allow(non_snake_case)]
    struct Src {
        StrField: String,
        IntField: i32,
        #[serde(skip)]
        #[allow(dead_code)]
        unexported: String,
    }

    let mut out = Struct::new();
    encode_from_struct(
        &Src {
            StrField: "str".into(),
            IntField: 10,
            unexported: "unexported".into(),
        },
        &mut out,
    )
    .unwrap();

    assert_eq!(out.get("StrField").and_then(Value::as_str), Some("str"));
    assert_eq!(out.get("IntField").and_then(Value::as_number), Some(10.0));
    assert!(out.get("unexported").is_none());
    assert_eq!(out.len(), 2);
}

#[test]
fn encode_from_struct_single_visible_field() {
    #[derive(Serialize)]
    #[allow(non_snake_case)]
    struct Src {
        A: &'static str,
        #[serde(skip)]
        #[allow(dead_code)]
        hidden: &'static str,
    }

    let mut out = Struct::new();
    encode_from_struct(&Src { A: "x", hidden: "y" }, &mut out).unwrap();
    assert_eq!(out, object(vec![("A", Value::string("x"))]));
}

#[test]
fn encode_from_empty_struct() {
    #[derive(Serialize)]
    struct Empty {}

    let mut out = Struct::new();
    encode_from_struct(&Empty {}, &mut out).unwrap();
    assert_eq!(out, Struct::new());
}

#[test]
fn encode_from_struct_through_pointers() {
    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    let want = object(vec![("x", Value::number(1.0)), ("y", Value::number(2.0))]);

    let mut out = Struct::new();
    encode_from_struct(&Box::new(Point { x: 1, y: 2 }), &mut out).unwrap();
    assert_eq!(out, want);

    let mut out = Struct::new();
    encode_from_struct(&Some(Point { x: 1, y: 2 }), &mut out).unwrap();
    assert_eq!(out, want);
}

#[test]
fn encode_from_struct_with_flattened_fields() {
    #[derive(Serialize)]
    struct Inner {
        b: i32,
    }

    #[derive(Serialize)]
    struct Outer {
        a: i32,
        #[serde(flatten)]
        inner: Inner,
    }

    let src = Outer {
        a: 1,
        inner: Inner { b: 2 },
    };
    let want = object(vec![("a", Value::number(1.0)), ("b", Value::number(2.0))]);

    let mut out = Struct::new();
    encode_from_struct(&src, &mut out).unwrap();
    assert_eq!(out, want);
    assert_eq!(encode_value(&src).unwrap(), Value::structure(want));
}

#[test]
fn encode_from_struct_accepts_string_keyed_map() {
    let mut map = BTreeMap::new();
    map.insert("k", "v");

    let mut out = Struct::new();
    encode_from_struct(&map, &mut out).unwrap();
    assert_eq!(out, object(vec![("k", Value::string("v"))]));

    let mut bad = BTreeMap::new();
    bad.insert(1u8, "one");
    let err = encode_from_struct(&bad, &mut Struct::new()).unwrap_err();
    assert_eq!(err, EncodeError::UnsupportedMapKey { kind: "u8" });
}

#[test]
fn encode_struct_uses_serde_renamed_key() {
    #[derive(Serialize)]
    struct Renamed {
        #[serde(rename = "other")]
        declared: bool,
    }

    let mut out = Struct::new();
    encode_from_struct(&Renamed { declared: true }, &mut out).unwrap();
    assert_eq!(out, object(vec![("other", Value::bool(true))]));
}

#[test]
fn encode_from_struct_rejects_non_records() {
    let mut out = Struct::new();

    let err = encode_from_struct(&42, &mut out).unwrap_err();
    assert_eq!(err, EncodeError::NotAStruct { kind: "i32" });

    let err = encode_from_struct(&vec![1, 2], &mut out).unwrap_err();
    assert_eq!(err, EncodeError::NotAStruct { kind: "sequence" });

    let err = encode_from_struct(&None::<i32>, &mut out).unwrap_err();
    assert_eq!(err, EncodeError::NotAStruct { kind: "nil" });
    assert_eq!(err.to_string(), "expected a struct, found nil");

    assert!(out.is_empty());
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn encode_array_and_vec() {
    let want = Value::list(vec![Value::string("one"), Value::string("two")]);
    assert_eq!(encode_value(&["one", "two"]).unwrap(), want);
    assert_eq!(encode_value(&vec!["one", "two"]).unwrap(), want);
    assert_eq!(encode_value(&["one", "two"][..]).unwrap(), want);
}

#[test]
fn encode_empty_sequences_are_empty_lists() {
    let empty_arr: [String; 0] = [];
    let empty_vec: Vec<String> = Vec::new();
    assert_eq!(encode_value(&empty_arr).unwrap(), Value::list(vec![]));
    assert_eq!(encode_value(&empty_vec).unwrap(), Value::list(vec![]));
}

#[test]
fn encode_tuple_is_list() {
    let got = encode_value(&(1, "two", false)).unwrap();
    assert_eq!(
        got,
        Value::list(vec![Value::number(1.0), Value::string("two"), Value::bool(false)])
    );
}

#[test]
fn encode_bytes_are_a_list_of_numbers() {
    struct Raw(&'static [u8]);
    impl Serialize for Raw {
        fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_bytes(self.0)
        }
    }

    let got = encode_value(&Raw(&[1, 2, 255])).unwrap();
    assert_eq!(
        got,
        Value::list(vec![
            Value::number(1.0),
            Value::number(2.0),
            Value::number(255.0)
        ])
    );
}

// ============================================================================
// Enums
// ============================================================================

#[derive(Serialize)]
enum Shape {
    Empty,
    Circle(f64),
    Segment(i32, i32),
    Rect { w: u32, h: u32 },
}

#[test]
fn encode_unit_variant_as_string() {
    assert_eq!(encode_value(&Shape::Empty).unwrap(), Value::string("Empty"));
}

#[test]
fn encode_data_variants_are_externally_tagged() {
    assert_eq!(
        encode_value(&Shape::Circle(2.0)).unwrap(),
        Value::structure(object(vec![("Circle", Value::number(2.0))]))
    );
    assert_eq!(
        encode_value(&Shape::Segment(1, 2)).unwrap(),
        Value::structure(object(vec![(
            "Segment",
            Value::list(vec![Value::number(1.0), Value::number(2.0)])
        )]))
    );
    assert_eq!(
        encode_value(&Shape::Rect { w: 3, h: 4 }).unwrap(),
        Value::structure(object(vec![(
            "Rect",
            Value::structure(object(vec![
                ("h", Value::number(4.0)),
                ("w", Value::number(3.0))
            ]))
        )]))
    );
}

// ============================================================================
// Custom Serialize errors
// ============================================================================

#[test]
fn encode_propagates_custom_serialize_error() {
    struct Refuses;
    impl Serialize for Refuses {
        fn serialize<S: serde::Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refused"))
        }
    }

    let mut src: HashMap<&str, Refuses> = HashMap::new();
    src.insert("r", Refuses);
    let mut out = Struct::new();
    let err = encode(&src, &mut out).unwrap_err();
    assert_eq!(err, EncodeError::Custom("refused".into()));
}

// ============================================================================
// Full kind table
// ============================================================================

#[test]
fn encode_every_supported_kind() {
    let mut src: NativeMap = NativeMap::new();
    src.insert("nil".into(), Native::Null);
    src.insert("int".into(), Native::Int(1));
    src.insert("uint".into(), Native::Uint(64));
    src.insert("float".into(), Native::Float(64.64));
    src.insert("str".into(), "str".into());
    src.insert("bool".into(), true.into());
    src.insert(
        "slice".into(),
        Native::List(vec!["three".into(), "four".into()]),
    );

    let got = encode_fresh(&src);
    let want = object(vec![
        ("nil", Value::null()),
        ("int", Value::number(1.0)),
        ("uint", Value::number(64.0)),
        ("float", Value::number(64.64)),
        ("str", Value::string("str")),
        ("bool", Value::bool(true)),
        (
            "slice",
            Value::list(vec![Value::string("three"), Value::string("four")]),
        ),
    ]);
    assert_eq!(got, want);
}
