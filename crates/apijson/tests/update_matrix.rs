mod common;

use apijson::types::{Attribute, Bool, Dynamic, Int64, Str, Tri};
use apijson::{marshal_for_update, Field};
use common::*;

fn check<T: Field + std::fmt::Debug>(old: T, new: T, expected: &str) {
    let patch = marshal_for_update(&new, &old).expect("marshal for update");
    assert_eq!(
        String::from_utf8(patch).unwrap(),
        expected,
        "patch from {old:?} to {new:?}"
    );
}

fn dynamic_int(value: Int64) -> Dynamic {
    Dynamic::Value(Attribute::Int64(value))
}

#[test]
fn plain_values_are_always_sent() {
    check(true, true, "true");
    check(Bool::Value(true), Bool::Value(true), "true");
}

#[test]
fn scalar_attribute_matrix() {
    check(Bool::Null, Bool::Value(true), "true");
    check(Bool::Value(false), Bool::Value(true), "true");
    check(Bool::Value(false), Bool::Null, "null");
    check(Bool::Null, Bool::Null, "");

    check(Str::Null, Str::Value("two".into()), r#""two""#);
    check(Str::Value("one".into()), Str::Value("two".into()), r#""two""#);
    check(Str::Value("hey".into()), Str::Null, "null");
    check(Str::Null, Str::Null, "");

    check(Int64::Null, Int64::Value(42), "42");
    check(Int64::Value(42), Int64::Value(43), "43");
    check(Int64::Value(42), Int64::Null, "null");
    check(Int64::Null, Int64::Null, "");
}

#[test]
fn unknown_is_never_sent() {
    check(Int64::Value(1), Int64::Unknown, "");
    check(Int64::Null, Int64::Unknown, "");
    check(Int64::Unknown, Int64::Null, "null");
}

#[test]
fn dynamic_matrix() {
    check(Dynamic::Null, Dynamic::Null, "");
    check(dynamic_int(Tri::Null), Dynamic::Null, "");
    check(Dynamic::Null, dynamic_int(Tri::Null), "");
    check(Dynamic::Unknown, Dynamic::Unknown, "");
    check(dynamic_int(Tri::Unknown), Dynamic::Unknown, "");
    check(Dynamic::Unknown, dynamic_int(Tri::Unknown), "");
    check(Dynamic::int64(4), Dynamic::Null, "null");
    check(Dynamic::Null, Dynamic::int64(5), "5");
    check(Dynamic::int64(4), Dynamic::int64(5), "5");
}

#[test]
fn set_struct_fields() {
    check(
        AttributeStructs::default(),
        attribute_structs(),
        ATTRIBUTE_STRUCTS_JSON,
    );
}

#[test]
fn update_some_struct_fields() {
    check(
        AttributeStructs {
            bool_value: Bool::Value(true),
            string_value: Str::Value("string_value".into()),
            float_value: Tri::Value(3.25),
            ..AttributeStructs::default()
        },
        AttributeStructs {
            bool_value: Bool::Value(false),
            string_value: Str::Value("another_string".into()),
            float_value: Tri::Value(1.25),
            ..AttributeStructs::default()
        },
        r#"{"bool_value":false,"float_value":1.25,"string_value":"another_string"}"#,
    );
}

#[test]
fn unset_nested_struct_fields() {
    check(
        AttributeStructs {
            optional_array: Some(vec![Str::Value("hi".into()), Str::Value("there".into())]),
            data: Some(NestedAttributes {
                embedded_int: Int64::Value(17),
                ..NestedAttributes::default()
            }),
            ..AttributeStructs::default()
        },
        AttributeStructs {
            optional_array: Some(vec![Str::Value("hi".into())]),
            data: Some(NestedAttributes {
                embedded_int: Int64::Null,
                ..NestedAttributes::default()
            }),
            ..AttributeStructs::default()
        },
        r#"{"data":{"embedded_int":null},"optional_array":["hi"]}"#,
    );
}

#[test]
fn unchanged_nested_struct_is_omitted() {
    let nested = Some(NestedAttributes {
        embedded_string: Str::Null,
        embedded_int: Int64::Null,
    });
    check(
        AttributeStructs {
            data: nested.clone(),
            ..AttributeStructs::default()
        },
        AttributeStructs {
            data: nested,
            ..AttributeStructs::default()
        },
        "",
    );
}

#[test]
fn unset_struct_fields() {
    check(
        attribute_structs(),
        AttributeStructs::default(),
        r#"{"bool_value":null,"data":null,"float_value":null,"optional_array":null,"string_value":null}"#,
    );
}

#[test]
fn set_empty_array() {
    check(
        AttributeStructs {
            float_value: Tri::Value(3.25),
            optional_array: Some(vec![Str::Value("hi".into()), Str::Value("there".into())]),
            ..AttributeStructs::default()
        },
        AttributeStructs {
            float_value: Tri::Value(3.25),
            optional_array: Some(Vec::new()),
            ..AttributeStructs::default()
        },
        r#"{"float_value":3.25,"optional_array":[]}"#,
    );
}

#[test]
fn computed_fields_are_skipped() {
    let old = ResultEnvelope::default();
    let new = ResultEnvelope {
        result: RecordsModel {
            a: Str::Value("a".into()),
            c: Str::Value("server-assigned".into()),
            ..RecordsModel::default()
        },
    };
    check(old.clone(), new, r#"{"result":{"a":"a"}}"#);

    let only_computed = ResultEnvelope {
        result: RecordsModel {
            c: Str::Value("server-assigned".into()),
            ..RecordsModel::default()
        },
    };
    check(old, only_computed, "");
}

#[test]
fn inline_records_patch_their_inner_value() {
    let old = InlineArray::default();
    let new = InlineArray {
        inline_field: vec!["a".into()],
    };
    check(old, new, r#"["a"]"#);
}

#[test]
fn unknown_elements_of_sent_lists_become_null() {
    check(
        AttributeStructs::default(),
        AttributeStructs {
            optional_array: Some(vec![Str::Value("hi".into()), Str::Unknown]),
            ..AttributeStructs::default()
        },
        r#"{"optional_array":["hi",null]}"#,
    );
    check(
        Dynamic::Null,
        Dynamic::Value(Attribute::List(vec![Dynamic::int64(1), Dynamic::Unknown])),
        "[1,null]",
    );
}
