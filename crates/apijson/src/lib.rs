//! Annotation-driven JSON codec for typed resource records.
//!
//! Records declare their wire bindings once ([`Record::describe`]); the
//! resulting field plan drives decoding ([`Codec::unmarshal`]), canonical
//! key-ordered encoding ([`Codec::marshal`]) and update patches
//! ([`Codec::marshal_for_update`]). Fields whose type is a capability trait
//! are resolved through a [`UnionRegistry`].

mod codec;
mod coerce;
mod decode;
mod encode;
mod error;
mod field;
mod plan;
mod scan;
mod tag;
mod union;

pub mod diff;
#[doc(hidden)]
pub mod record;

use std::sync::LazyLock;

pub use codec::{Codec, CodecOptions};
pub use decode::DecodeContext;
pub use encode::{EncodeContext, EncodeMode, Encoded};
pub use error::{
    DecodeError, DecodeErrorKind, EncodeError, EncodeErrorKind, FieldPath, PlanError,
    RegistryError, Segment, SyntaxError,
};
pub use field::{decode_new, Field, Presence, Shape};
pub use plan::{plan_of, Binding, FieldPlan, PlanBuilder, Record};
pub use scan::{Node, NodeValue};
pub use tag::{Format, Role, Tag, UNNAMED};
pub use union::{JsonKind, Union, UnionMember, UnionRegistry, UnionRegistryBuilder, Variant};

pub use apijson_types as types;

static DEFAULT_CODEC: LazyLock<Codec> = LazyLock::new(Codec::default);

/// [`Codec::marshal`] with no unions registered.
pub fn marshal<T: Field>(value: &T) -> Result<Vec<u8>, EncodeError> {
    DEFAULT_CODEC.marshal(value)
}

/// [`Codec::unmarshal`] with no unions registered.
pub fn unmarshal<T: Field>(bytes: &[u8], dest: &mut T) -> Result<(), DecodeError> {
    DEFAULT_CODEC.unmarshal(bytes, dest)
}

/// [`Codec::marshal_for_update`] with no unions registered.
pub fn marshal_for_update<T: Field>(new: &T, old: &T) -> Result<Vec<u8>, EncodeError> {
    DEFAULT_CODEC.marshal_for_update(new, old)
}
