//! Dynamically-typed attribute.
//!
//! A [`Dynamic`] wraps an [`Attribute`] whose own scalar may again be null or
//! unknown. The wrapper reports the underlying state, so
//! `Dynamic::Value(Attribute::Int64(Tri::Null))` is null for every consumer.

use std::collections::BTreeMap;

use crate::{Bool, Float64, Int64, Str, Tri, TriState};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Dynamic {
    #[default]
    Null,
    Unknown,
    Value(Attribute),
}

/// Concrete attribute carried by a [`Dynamic`].
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Bool(Bool),
    Int64(Int64),
    Float64(Float64),
    Str(Str),
    List(Vec<Dynamic>),
    Object(BTreeMap<String, Dynamic>),
}

impl Attribute {
    pub fn is_null(&self) -> bool {
        match self {
            Attribute::Bool(v) => v.is_null(),
            Attribute::Int64(v) => v.is_null(),
            Attribute::Float64(v) => v.is_null(),
            Attribute::Str(v) => v.is_null(),
            Attribute::List(_) | Attribute::Object(_) => false,
        }
    }

    pub fn is_unknown(&self) -> bool {
        match self {
            Attribute::Bool(v) => v.is_unknown(),
            Attribute::Int64(v) => v.is_unknown(),
            Attribute::Float64(v) => v.is_unknown(),
            Attribute::Str(v) => v.is_unknown(),
            Attribute::List(_) | Attribute::Object(_) => false,
        }
    }
}

impl Dynamic {
    pub fn bool(v: bool) -> Self {
        Dynamic::Value(Attribute::Bool(Tri::Value(v)))
    }

    pub fn int64(v: i64) -> Self {
        Dynamic::Value(Attribute::Int64(Tri::Value(v)))
    }

    pub fn float64(v: f64) -> Self {
        Dynamic::Value(Attribute::Float64(Tri::Value(v)))
    }

    pub fn string(v: impl Into<String>) -> Self {
        Dynamic::Value(Attribute::Str(Tri::Value(v.into())))
    }
}

impl TriState for Dynamic {
    type Value = Attribute;

    fn null() -> Self {
        Dynamic::Null
    }

    fn unknown() -> Self {
        Dynamic::Unknown
    }

    fn from_value(value: Attribute) -> Self {
        Dynamic::Value(value)
    }

    fn is_null(&self) -> bool {
        match self {
            Dynamic::Null => true,
            Dynamic::Unknown => false,
            Dynamic::Value(attr) => attr.is_null(),
        }
    }

    fn is_unknown(&self) -> bool {
        match self {
            Dynamic::Null => false,
            Dynamic::Unknown => true,
            Dynamic::Value(attr) => attr.is_unknown(),
        }
    }

    fn value(&self) -> Option<&Attribute> {
        match self {
            Dynamic::Value(attr) => Some(attr),
            Dynamic::Null | Dynamic::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underlying_state_propagates() {
        let null_int = Dynamic::Value(Attribute::Int64(Tri::Null));
        assert!(null_int.is_null());
        assert!(!null_int.is_unknown());

        let unknown_int = Dynamic::Value(Attribute::Int64(Tri::Unknown));
        assert!(unknown_int.is_unknown());
        assert!(!unknown_int.is_null());

        assert!(!Dynamic::int64(5).is_null());
    }

    #[test]
    fn containers_are_never_null() {
        let list = Dynamic::Value(Attribute::List(Vec::new()));
        assert!(!list.is_null() && !list.is_unknown());
    }
}
