//! The `Field` trait and its implementations for native and attribute types.
//!
//! Every type that can sit behind a binding implements [`Field`]. Scalars
//! coerce through [`crate::coerce`]; containers recurse per element; records
//! go through their cached plan (see [`crate::record_field!`]).

use std::collections::{BTreeMap, HashMap};

use apijson_types::{Attribute, Dynamic, RawJson, Tri};
use serde_json::Value;
use time::OffsetDateTime;

use crate::coerce;
use crate::decode::DecodeContext;
use crate::diff;
use crate::encode::{EncodeContext, Encoded};
use crate::error::{DecodeError, DecodeErrorKind, EncodeError, EncodeErrorKind};
use crate::scan::{Node, NodeValue};

/// Declared shape of a field type, used when validating bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Bool,
    Integer,
    Float,
    String,
    Time,
    Open,
    Raw,
    Sequence,
    Mapping,
    Record,
    Union,
    Dynamic,
}

impl Shape {
    pub fn name(self) -> &'static str {
        match self {
            Shape::Bool => "boolean",
            Shape::Integer => "integer",
            Shape::Float => "float",
            Shape::String => "string",
            Shape::Time => "time",
            Shape::Open => "open value",
            Shape::Raw => "JSON text",
            Shape::Sequence => "sequence",
            Shape::Mapping => "mapping",
            Shape::Record => "record",
            Shape::Union => "union",
            Shape::Dynamic => "dynamic",
        }
    }
}

/// Null / unknown / value state as seen by the differencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Null,
    Unknown,
    Value,
}

pub trait Field: Sized + 'static {
    fn shape() -> Shape;

    /// Value a fresh destination starts from before decoding into it.
    fn zero() -> Self;

    /// Overwrites `self` from `node`.
    fn decode(&mut self, node: &Node<'_>, cx: DecodeContext<'_>) -> Result<(), DecodeError>;

    /// `None` means the value is in its null state and has no encoding of
    /// its own; record encoders leave such fields out.
    fn encode(&self, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError>;

    fn presence(&self) -> Presence {
        Presence::Value
    }

    /// Puts `self` into its null state. Returns `false` for types without one.
    fn set_null(&mut self) -> bool {
        false
    }

    /// Update-patch encoding against the previous value at the same position.
    /// `None` omits the position.
    fn encode_update(
        &self,
        old: Option<&Self>,
        cx: EncodeContext,
    ) -> Result<Option<Encoded>, EncodeError> {
        diff::leaf(self, old, cx)
    }

    /// Decodes one member of an enclosing object that no declared binding
    /// claimed. Only mappings accept these.
    fn decode_member(
        &mut self,
        _key: &str,
        node: &Node<'_>,
        _cx: DecodeContext<'_>,
    ) -> Result<(), DecodeError> {
        Err(DecodeError::mismatch("mapping", node))
    }

    /// Entries to merge into the enclosing object.
    fn encode_members(&self, _cx: EncodeContext) -> Result<Vec<(String, Encoded)>, EncodeError> {
        Ok(Vec::new())
    }
}

/// Decodes `node` into a fresh `T`.
pub fn decode_new<T: Field>(node: &Node<'_>, cx: DecodeContext<'_>) -> Result<T, DecodeError> {
    let mut value = T::zero();
    value.decode(node, cx)?;
    Ok(value)
}

fn or_null(encoded: Option<Encoded>) -> Encoded {
    encoded.unwrap_or_else(Encoded::null)
}

impl Field for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn zero() -> Self {
        false
    }

    fn decode(&mut self, node: &Node<'_>, _cx: DecodeContext<'_>) -> Result<(), DecodeError> {
        *self = if node.is_null() {
            false
        } else {
            coerce::to_bool(node)?
        };
        Ok(())
    }

    fn encode(&self, _cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        Ok(Some(Encoded::Text(self.to_string())))
    }
}

macro_rules! integer_field {
    ($($ty:ty),+) => {$(
        impl Field for $ty {
            fn shape() -> Shape {
                Shape::Integer
            }

            fn zero() -> Self {
                0
            }

            fn decode(&mut self, node: &Node<'_>, _cx: DecodeContext<'_>) -> Result<(), DecodeError> {
                if node.is_null() {
                    *self = 0;
                    return Ok(());
                }
                let wide = coerce::to_integer(node, stringify!($ty))?;
                *self = coerce::narrow(wide, node, stringify!($ty))?;
                Ok(())
            }

            fn encode(&self, _cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
                Ok(Some(Encoded::Text(self.to_string())))
            }
        }
    )+};
}

integer_field!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

macro_rules! float_field {
    ($($ty:ty),+) => {$(
        impl Field for $ty {
            fn shape() -> Shape {
                Shape::Float
            }

            fn zero() -> Self {
                0.0
            }

            fn decode(&mut self, node: &Node<'_>, _cx: DecodeContext<'_>) -> Result<(), DecodeError> {
                if node.is_null() {
                    *self = 0.0;
                    return Ok(());
                }
                let literal = coerce::number_literal(node, stringify!($ty))?;
                let value: $ty = literal.parse().map_err(|_| DecodeErrorKind::InvalidLiteral {
                    target: stringify!($ty),
                    literal: literal.to_owned(),
                })?;
                if !value.is_finite() {
                    return Err(DecodeErrorKind::OutOfRange {
                        target: stringify!($ty),
                        literal: literal.to_owned(),
                    }
                    .into());
                }
                *self = value;
                Ok(())
            }

            fn encode(&self, _cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
                Ok(Some(Encoded::Text(coerce::float_text(*self)?)))
            }
        }
    )+};
}

float_field!(f32, f64);

impl Field for String {
    fn shape() -> Shape {
        Shape::String
    }

    fn zero() -> Self {
        String::new()
    }

    fn decode(&mut self, node: &Node<'_>, _cx: DecodeContext<'_>) -> Result<(), DecodeError> {
        *self = if node.is_null() {
            String::new()
        } else {
            coerce::to_string(node)?
        };
        Ok(())
    }

    fn encode(&self, _cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        Ok(Some(Encoded::string(self)))
    }
}

impl Field for OffsetDateTime {
    fn shape() -> Shape {
        Shape::Time
    }

    fn zero() -> Self {
        OffsetDateTime::UNIX_EPOCH
    }

    /// `null` leaves the timestamp untouched.
    fn decode(&mut self, node: &Node<'_>, cx: DecodeContext<'_>) -> Result<(), DecodeError> {
        if !node.is_null() {
            *self = coerce::to_time(node, cx.format())?;
        }
        Ok(())
    }

    fn encode(&self, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        Ok(Some(coerce::from_time(self, cx.format())?))
    }
}

impl Field for Value {
    fn shape() -> Shape {
        Shape::Open
    }

    fn zero() -> Self {
        Value::Null
    }

    fn decode(&mut self, node: &Node<'_>, _cx: DecodeContext<'_>) -> Result<(), DecodeError> {
        *self = coerce::to_open(node)?;
        Ok(())
    }

    fn encode(&self, _cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        Ok(coerce::from_open(self)?)
    }

    fn presence(&self) -> Presence {
        if self.is_null() {
            Presence::Null
        } else {
            Presence::Value
        }
    }

    fn set_null(&mut self) -> bool {
        *self = Value::Null;
        true
    }
}

impl Field for RawJson {
    fn shape() -> Shape {
        Shape::Raw
    }

    fn zero() -> Self {
        RawJson::default()
    }

    fn decode(&mut self, node: &Node<'_>, _cx: DecodeContext<'_>) -> Result<(), DecodeError> {
        *self = RawJson::new(node.raw());
        Ok(())
    }

    fn encode(&self, _cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        if self.is_empty() {
            return Ok(None);
        }
        Ok(Some(Encoded::Text(self.as_str().to_owned())))
    }

    fn presence(&self) -> Presence {
        if self.is_empty() {
            Presence::Null
        } else {
            Presence::Value
        }
    }

    fn set_null(&mut self) -> bool {
        *self = RawJson::default();
        true
    }
}

impl<T: Field> Field for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence
    }

    fn zero() -> Self {
        Vec::new()
    }

    fn decode(&mut self, node: &Node<'_>, cx: DecodeContext<'_>) -> Result<(), DecodeError> {
        let items = match node.value() {
            NodeValue::Null => {
                self.clear();
                return Ok(());
            }
            NodeValue::Array(items) => items,
            _ => return Err(DecodeError::mismatch("array", node)),
        };
        *self = items
            .iter()
            .enumerate()
            .map(|(i, item)| decode_new(item, cx).map_err(|e| e.at_index(i)))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn encode(&self, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        let items = self
            .iter()
            .enumerate()
            .map(|(i, item)| item.encode(cx).map(or_null).map_err(|e| e.at_index(i)))
            .collect::<Result<_, _>>()?;
        Ok(Some(Encoded::Array(items)))
    }
}

macro_rules! mapping_field {
    ($($map:ident),+) => {$(
        impl<T: Field> Field for $map<String, T> {
            fn shape() -> Shape {
                Shape::Mapping
            }

            fn zero() -> Self {
                $map::new()
            }

            fn decode(&mut self, node: &Node<'_>, cx: DecodeContext<'_>) -> Result<(), DecodeError> {
                let members = match node.value() {
                    NodeValue::Null => {
                        self.clear();
                        return Ok(());
                    }
                    NodeValue::Object(members) => members,
                    _ => return Err(DecodeError::mismatch("object", node)),
                };
                let mut out = $map::new();
                for (key, value) in members {
                    let item = decode_new(value, cx).map_err(|e| e.at_key(key))?;
                    out.insert(key.to_string(), item);
                }
                *self = out;
                Ok(())
            }

            fn encode(&self, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
                Ok(Some(Encoded::Object(self.encode_members(cx)?.into_iter().collect())))
            }

            fn decode_member(
                &mut self,
                key: &str,
                node: &Node<'_>,
                cx: DecodeContext<'_>,
            ) -> Result<(), DecodeError> {
                self.insert(key.to_owned(), decode_new(node, cx)?);
                Ok(())
            }

            fn encode_members(&self, cx: EncodeContext) -> Result<Vec<(String, Encoded)>, EncodeError> {
                self.iter()
                    .map(|(key, item)| {
                        let encoded = item.encode(cx).map_err(|e| e.at_key(key))?;
                        Ok((key.clone(), or_null(encoded)))
                    })
                    .collect()
            }
        }
    )+};
}

mapping_field!(BTreeMap, HashMap);

/// Optional reference: `None` is the null state. JSON text targets keep a
/// literal `null` as their value.
impl<T: Field> Field for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn zero() -> Self {
        None
    }

    fn decode(&mut self, node: &Node<'_>, cx: DecodeContext<'_>) -> Result<(), DecodeError> {
        if node.is_null() && T::shape() != Shape::Raw {
            *self = None;
            return Ok(());
        }
        match self {
            Some(inner) => inner.decode(node, cx),
            None => {
                *self = Some(decode_new(node, cx)?);
                Ok(())
            }
        }
    }

    fn encode(&self, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        match self {
            Some(inner) => inner.encode(cx),
            None => Ok(None),
        }
    }

    fn presence(&self) -> Presence {
        self.as_ref().map_or(Presence::Null, Field::presence)
    }

    fn set_null(&mut self) -> bool {
        *self = None;
        true
    }

    fn encode_update(
        &self,
        old: Option<&Self>,
        cx: EncodeContext,
    ) -> Result<Option<Encoded>, EncodeError> {
        match self {
            Some(inner) if inner.presence() == Presence::Value => {
                inner.encode_update(old.and_then(Option::as_ref), cx)
            }
            _ => diff::leaf(self, old, cx),
        }
    }

    fn decode_member(
        &mut self,
        key: &str,
        node: &Node<'_>,
        cx: DecodeContext<'_>,
    ) -> Result<(), DecodeError> {
        self.get_or_insert_with(T::zero).decode_member(key, node, cx)
    }

    fn encode_members(&self, cx: EncodeContext) -> Result<Vec<(String, Encoded)>, EncodeError> {
        match self {
            Some(inner) => inner.encode_members(cx),
            None => Ok(Vec::new()),
        }
    }
}

impl<T: Field> Field for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn zero() -> Self {
        Box::new(T::zero())
    }

    fn decode(&mut self, node: &Node<'_>, cx: DecodeContext<'_>) -> Result<(), DecodeError> {
        T::decode(self, node, cx)
    }

    fn encode(&self, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        T::encode(self, cx)
    }

    fn presence(&self) -> Presence {
        T::presence(self)
    }

    fn set_null(&mut self) -> bool {
        T::set_null(self)
    }

    fn encode_update(
        &self,
        old: Option<&Self>,
        cx: EncodeContext,
    ) -> Result<Option<Encoded>, EncodeError> {
        T::encode_update(self, old.map(|b| &**b), cx)
    }

    fn decode_member(
        &mut self,
        key: &str,
        node: &Node<'_>,
        cx: DecodeContext<'_>,
    ) -> Result<(), DecodeError> {
        T::decode_member(self, key, node, cx)
    }

    fn encode_members(&self, cx: EncodeContext) -> Result<Vec<(String, Encoded)>, EncodeError> {
        T::encode_members(self, cx)
    }
}

impl<T: Field> Field for Tri<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn zero() -> Self {
        Tri::Null
    }

    fn decode(&mut self, node: &Node<'_>, cx: DecodeContext<'_>) -> Result<(), DecodeError> {
        if node.is_null() && T::shape() != Shape::Raw {
            *self = Tri::Null;
            return Ok(());
        }
        match self {
            Tri::Value(inner) => inner.decode(node, cx),
            Tri::Null | Tri::Unknown => {
                *self = Tri::Value(decode_new(node, cx)?);
                Ok(())
            }
        }
    }

    fn encode(&self, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        match self {
            Tri::Null => Ok(None),
            Tri::Unknown if cx.mode().resolves_unknown() => Ok(None),
            Tri::Unknown => Err(EncodeErrorKind::Unknown.into()),
            Tri::Value(inner) => inner.encode(cx),
        }
    }

    fn presence(&self) -> Presence {
        match self {
            Tri::Null => Presence::Null,
            Tri::Unknown => Presence::Unknown,
            Tri::Value(inner) => inner.presence(),
        }
    }

    fn set_null(&mut self) -> bool {
        *self = Tri::Null;
        true
    }

    fn encode_update(
        &self,
        old: Option<&Self>,
        cx: EncodeContext,
    ) -> Result<Option<Encoded>, EncodeError> {
        match self {
            Tri::Value(inner) if inner.presence() == Presence::Value => {
                inner.encode_update(old.and_then(Tri::as_option), cx)
            }
            _ => diff::leaf(self, old, cx),
        }
    }
}

impl Field for Dynamic {
    fn shape() -> Shape {
        Shape::Dynamic
    }

    fn zero() -> Self {
        Dynamic::Null
    }

    fn decode(&mut self, node: &Node<'_>, _cx: DecodeContext<'_>) -> Result<(), DecodeError> {
        *self = dynamic_of(node)?;
        Ok(())
    }

    fn encode(&self, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        match self {
            Dynamic::Null => Ok(None),
            Dynamic::Unknown if cx.mode().resolves_unknown() => Ok(None),
            Dynamic::Unknown => Err(EncodeErrorKind::Unknown.into()),
            Dynamic::Value(attribute) => encode_attribute(attribute, cx),
        }
    }

    fn presence(&self) -> Presence {
        use apijson_types::TriState;

        if self.is_unknown() {
            Presence::Unknown
        } else if self.is_null() {
            Presence::Null
        } else {
            Presence::Value
        }
    }

    fn set_null(&mut self) -> bool {
        *self = Dynamic::Null;
        true
    }
}

fn dynamic_of(node: &Node<'_>) -> Result<Dynamic, DecodeError> {
    let attribute = match node.value() {
        NodeValue::Null => return Ok(Dynamic::Null),
        NodeValue::Bool(b) => Attribute::Bool(Tri::Value(*b)),
        NodeValue::Number(literal) => match literal.parse::<i64>() {
            Ok(i) => Attribute::Int64(Tri::Value(i)),
            Err(_) => {
                let float = literal.parse::<f64>().map_err(|_| DecodeErrorKind::InvalidLiteral {
                    target: "number",
                    literal: (*literal).to_owned(),
                })?;
                Attribute::Float64(Tri::Value(float))
            }
        },
        NodeValue::String(text) => Attribute::Str(Tri::Value(text.to_string())),
        NodeValue::Array(items) => Attribute::List(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| dynamic_of(item).map_err(|e| e.at_index(i)))
                .collect::<Result<_, _>>()?,
        ),
        NodeValue::Object(members) => {
            let mut out = BTreeMap::new();
            for (key, value) in members {
                out.insert(key.to_string(), dynamic_of(value).map_err(|e| e.at_key(key))?);
            }
            Attribute::Object(out)
        }
    };
    Ok(Dynamic::Value(attribute))
}

fn encode_attribute(
    attribute: &Attribute,
    cx: EncodeContext,
) -> Result<Option<Encoded>, EncodeError> {
    match attribute {
        Attribute::Bool(v) => v.encode(cx),
        Attribute::Int64(v) => v.encode(cx),
        Attribute::Float64(v) => v.encode(cx),
        Attribute::Str(v) => v.encode(cx),
        Attribute::List(items) => items.encode(cx),
        Attribute::Object(members) => members.encode(cx),
    }
}
