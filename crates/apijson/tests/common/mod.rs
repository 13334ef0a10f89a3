#![allow(dead_code)]

use std::collections::BTreeMap;

use apijson::types::{Bool, Float64, Int64, Normalized, Str};
use apijson::{
    record_field, Codec, Format, PlanBuilder, Record, Union, UnionMember, UnionRegistry, Variant,
};
use serde_json::Value;
use time::{Date, Month, OffsetDateTime, UtcOffset};

#[derive(Debug, Default, PartialEq)]
pub struct Primitives {
    pub a: bool,
    pub b: i64,
    pub c: u64,
    pub d: f64,
    pub e: f32,
    pub f: Vec<i64>,
}

impl Record for Primitives {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("a", |r| &r.a, |r| &mut r.a)
            .field("b", |r| &r.b, |r| &mut r.b)
            .field("c", |r| &r.c, |r| &mut r.c)
            .field("d", |r| &r.d, |r| &mut r.d)
            .field("e", |r| &r.e, |r| &mut r.e)
            .field("f", |r| &r.f, |r| &mut r.f);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct PrimitivePointers {
    pub a: Option<bool>,
    pub b: Option<i64>,
    pub c: Option<u64>,
    pub d: Option<f64>,
    pub e: Option<f32>,
    pub f: Option<Vec<i64>>,
}

impl Record for PrimitivePointers {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("a", |r| &r.a, |r| &mut r.a)
            .field("b", |r| &r.b, |r| &mut r.b)
            .field("c", |r| &r.c, |r| &mut r.c)
            .field("d", |r| &r.d, |r| &mut r.d)
            .field("e", |r| &r.e, |r| &mut r.e)
            .field("f", |r| &r.f, |r| &mut r.f);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Slices {
    pub slice: Vec<Primitives>,
}

impl Record for Slices {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("slices", |r| &r.slice, |r| &mut r.slice);
    }
}

#[derive(Debug, PartialEq)]
pub struct DateTime {
    pub date: OffsetDateTime,
    pub date_time: OffsetDateTime,
}

impl Default for DateTime {
    fn default() -> Self {
        Self {
            date: OffsetDateTime::UNIX_EPOCH,
            date_time: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

impl Record for DateTime {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.formatted("date", Format::Date, |r| &r.date, |r| &mut r.date)
            .formatted(
                "date-time",
                Format::DateTime,
                |r| &r.date_time,
                |r| &mut r.date_time,
            );
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct DateTimeAttributes {
    pub date: apijson::types::Rfc3339,
    pub date_time: apijson::types::Rfc3339,
}

impl Record for DateTimeAttributes {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.formatted("date", Format::Date, |r| &r.date, |r| &mut r.date)
            .formatted(
                "date-time",
                Format::DateTime,
                |r| &r.date_time,
                |r| &mut r.date_time,
            );
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct AdditionalProperties {
    pub a: bool,
    pub extras: BTreeMap<String, Value>,
}

impl Record for AdditionalProperties {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("a", |r| &r.a, |r| &mut r.a)
            .field("-,extras", |r| &r.extras, |r| &mut r.extras);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct TypedAdditionalProperties {
    pub a: bool,
    pub extras: BTreeMap<String, i64>,
}

impl Record for TypedAdditionalProperties {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("a", |r| &r.a, |r| &mut r.a)
            .field("-,extras", |r| &r.extras, |r| &mut r.extras);
    }
}

/// Embeds [`AdditionalProperties`]; its own extras bucket shadows the
/// embedded one.
#[derive(Debug, Default, PartialEq)]
pub struct EmbeddedStructs {
    pub base: AdditionalProperties,
    pub number2: Option<i64>,
    pub extras: BTreeMap<String, Value>,
}

impl Record for EmbeddedStructs {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.embed(|r| &r.base, |r| &mut r.base)
            .field("number2", |r| &r.number2, |r| &mut r.number2)
            .field("-,extras", |r| &r.extras, |r| &mut r.extras);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Recursive {
    pub name: String,
    pub child: Option<Box<Recursive>>,
}

impl Record for Recursive {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("name", |r| &r.name, |r| &mut r.name)
            .field("child", |r| &r.child, |r| &mut r.child);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct UnknownStruct {
    pub unknown: Value,
}

impl Record for UnknownStruct {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("unknown", |r| &r.unknown, |r| &mut r.unknown);
    }
}

/// Capability of the values a [`UnionStruct`] can hold.
pub trait UnionValue: UnionMember {}

impl UnionValue for OffsetDateTime {}
impl UnionValue for i64 {}
impl UnionValue for UnionStructA {}
impl UnionValue for UnionStructB {}

fn union_value<V: UnionValue>(v: V) -> Box<dyn UnionValue> {
    Box::new(v)
}

#[derive(Debug, Default, PartialEq)]
pub struct UnionStructA {
    pub kind: String,
    pub a: String,
    pub b: String,
}

impl Record for UnionStructA {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("type", |r| &r.kind, |r| &mut r.kind)
            .field("a", |r| &r.a, |r| &mut r.a)
            .field("b", |r| &r.b, |r| &mut r.b);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct UnionStructB {
    pub kind: String,
    pub a: String,
}

impl Record for UnionStructB {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("type", |r| &r.kind, |r| &mut r.kind)
            .field("a", |r| &r.a, |r| &mut r.a);
    }
}

#[derive(Debug, Default)]
pub struct UnionStruct {
    pub union: Union<dyn UnionValue>,
}

impl Record for UnionStruct {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.formatted("union", Format::Date, |r| &r.union, |r| &mut r.union);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Inline {
    pub inline_field: Primitives,
}

impl Record for Inline {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("-,inline", |r| &r.inline_field, |r| &mut r.inline_field);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct InlineArray {
    pub inline_field: Vec<String>,
}

impl Record for InlineArray {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("-,inline", |r| &r.inline_field, |r| &mut r.inline_field);
    }
}

#[derive(Debug, Default, PartialEq, Clone)]
pub struct AttributeStructs {
    pub bool_value: Bool,
    pub string_value: Str,
    pub data: Option<NestedAttributes>,
    pub float_value: Float64,
    pub optional_array: Option<Vec<Str>>,
}

impl Record for AttributeStructs {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("bool_value", |r| &r.bool_value, |r| &mut r.bool_value)
            .field("string_value", |r| &r.string_value, |r| &mut r.string_value)
            .field("data", |r| &r.data, |r| &mut r.data)
            .field("float_value", |r| &r.float_value, |r| &mut r.float_value)
            .field(
                "optional_array",
                |r| &r.optional_array,
                |r| &mut r.optional_array,
            );
    }
}

#[derive(Debug, Default, PartialEq, Clone)]
pub struct NestedAttributes {
    pub embedded_string: Str,
    pub embedded_int: Int64,
}

impl Record for NestedAttributes {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field(
            "embedded_string",
            |r| &r.embedded_string,
            |r| &mut r.embedded_string,
        )
        .field("embedded_int", |r| &r.embedded_int, |r| &mut r.embedded_int);
    }
}

#[derive(Debug, Default, PartialEq, Clone)]
pub struct ResultEnvelope {
    pub result: RecordsModel,
}

impl Record for ResultEnvelope {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("result", |r| &r.result, |r| &mut r.result);
    }
}

#[derive(Debug, Default, PartialEq, Clone)]
pub struct RecordsModel {
    pub a: Str,
    pub b: Str,
    pub c: Str,
}

impl Record for RecordsModel {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("a", |r| &r.a, |r| &mut r.a)
            .field("b", |r| &r.b, |r| &mut r.b)
            .field("c,computed", |r| &r.c, |r| &mut r.c);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct JsonModel {
    pub arr: Normalized,
    pub bol: Normalized,
    pub map: Normalized,
    pub nil: Normalized,
    pub num: Normalized,
    pub str: Normalized,
    pub arr2: Option<Vec<Normalized>>,
    pub map2: Option<BTreeMap<String, Normalized>>,
}

impl Record for JsonModel {
    fn describe(plan: &mut PlanBuilder<Self>) {
        plan.field("arr", |r| &r.arr, |r| &mut r.arr)
            .field("bol", |r| &r.bol, |r| &mut r.bol)
            .field("map", |r| &r.map, |r| &mut r.map)
            .field("nil", |r| &r.nil, |r| &mut r.nil)
            .field("num", |r| &r.num, |r| &mut r.num)
            .field("str", |r| &r.str, |r| &mut r.str)
            .field("arr2", |r| &r.arr2, |r| &mut r.arr2)
            .field("map2", |r| &r.map2, |r| &mut r.map2);
    }
}

record_field!(
    Primitives,
    PrimitivePointers,
    Slices,
    DateTime,
    DateTimeAttributes,
    AdditionalProperties,
    TypedAdditionalProperties,
    EmbeddedStructs,
    Recursive,
    UnknownStruct,
    UnionStructA,
    UnionStructB,
    UnionStruct,
    Inline,
    InlineArray,
    AttributeStructs,
    NestedAttributes,
    ResultEnvelope,
    RecordsModel,
    JsonModel,
);

/// Codec with the [`UnionValue`] union registered under the `type`
/// discriminator.
pub fn codec() -> Codec {
    let registry = UnionRegistry::builder()
        .register::<dyn UnionValue>(
            "type",
            vec![
                Variant::string(union_value::<OffsetDateTime>),
                Variant::number(union_value::<i64>),
                Variant::object("typeA", union_value::<UnionStructA>),
                Variant::object("typeB", union_value::<UnionStructB>),
            ],
        )
        .expect("union registration")
        .build();
    Codec::new(registry)
}

pub fn utc(y: i32, m: Month, d: u8, hh: u8, mm: u8, ss: u8, nanos: u32) -> OffsetDateTime {
    Date::from_calendar_date(y, m, d)
        .unwrap()
        .with_hms_nano(hh, mm, ss, nanos)
        .unwrap()
        .assume_utc()
}

pub fn at_offset(value: OffsetDateTime, hours: i8) -> OffsetDateTime {
    value.replace_offset(UtcOffset::from_hms(hours, 0, 0).unwrap())
}

pub fn primitives() -> Primitives {
    Primitives {
        a: false,
        b: 237628372683,
        c: 654,
        d: 9999.43,
        e: 43.76,
        f: vec![1, 2, 3, 4],
    }
}

pub fn attribute_structs() -> AttributeStructs {
    AttributeStructs {
        bool_value: Bool::Value(true),
        string_value: Str::Value("string_value".into()),
        data: Some(NestedAttributes {
            embedded_string: Str::Value("embedded_string_value".into()),
            embedded_int: Int64::Value(17),
        }),
        float_value: Float64::Value(3.25),
        optional_array: Some(vec![Str::Value("hi".into()), Str::Value("there".into())]),
    }
}

pub const ATTRIBUTE_STRUCTS_JSON: &str = r#"{"bool_value":true,"data":{"embedded_int":17,"embedded_string":"embedded_string_value"},"float_value":3.25,"optional_array":["hi","there"],"string_value":"string_value"}"#;

pub fn marshal_str<T: apijson::Field>(codec: &Codec, value: &T) -> String {
    String::from_utf8(codec.marshal(value).expect("marshal")).expect("utf-8")
}

pub fn unmarshal_new<T: apijson::Field>(codec: &Codec, text: &str) -> T {
    let mut value = T::zero();
    codec
        .unmarshal(text.as_bytes(), &mut value)
        .unwrap_or_else(|e| panic!("unmarshal {text}: {e}"));
    value
}
