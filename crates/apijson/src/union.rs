//! Discriminated unions over a capability trait.
//!
//! A capability is an ordinary trait with [`UnionMember`] as a supertrait.
//! Its registration lists the variants a JSON value may decode into: strings
//! and numbers select by kind, objects by the string found at the
//! registration's discriminator key. Variants are tried in registration
//! order and the first match wins.
//!
//! ```ignore
//! trait Shape: UnionMember {}
//! impl Shape for StructA {}
//! impl Shape for StructB {}
//!
//! fn shape<V: Shape>(v: V) -> Box<dyn Shape> {
//!     Box::new(v)
//! }
//!
//! let registry = UnionRegistry::builder()
//!     .register::<dyn Shape>("type", vec![
//!         Variant::object("typeA", shape::<StructA>),
//!         Variant::object("typeB", shape::<StructB>),
//!     ])?
//!     .build();
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::decode::DecodeContext;
use crate::encode::{EncodeContext, Encoded};
use crate::error::{DecodeError, DecodeErrorKind, EncodeError, RegistryError};
use crate::field::{decode_new, Field, Presence, Shape};
use crate::scan::{Node, NodeValue};

/// JSON kinds a variant can be selected by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    String,
    Number,
    Object,
}

/// Object-safe view of a decoded union value.
pub trait UnionMember: Any {
    fn encode_member(&self, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError>;
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Field> UnionMember for T {
    fn encode_member(&self, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        self.encode(cx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

trait BuildVariant<U: ?Sized>: Send + Sync {
    fn build(&self, node: &Node<'_>, cx: DecodeContext<'_>) -> Result<Box<U>, DecodeError>;
}

struct Builder<V, U: ?Sized> {
    wrap: fn(V) -> Box<U>,
}

impl<V: Field, U: ?Sized + 'static> BuildVariant<U> for Builder<V, U> {
    fn build(&self, node: &Node<'_>, cx: DecodeContext<'_>) -> Result<Box<U>, DecodeError> {
        Ok((self.wrap)(decode_new::<V>(node, cx)?))
    }
}

/// One way a union value can be decoded.
pub struct Variant<U: ?Sized> {
    kind: JsonKind,
    discriminator: Option<String>,
    target: &'static str,
    builder: Box<dyn BuildVariant<U>>,
}

impl<U: ?Sized + 'static> Variant<U> {
    fn new<V: Field>(kind: JsonKind, discriminator: Option<String>, wrap: fn(V) -> Box<U>) -> Self {
        Self {
            kind,
            discriminator,
            target: type_name::<V>(),
            builder: Box::new(Builder { wrap }),
        }
    }

    /// Selected by JSON strings.
    pub fn string<V: Field>(wrap: fn(V) -> Box<U>) -> Self {
        Self::new(JsonKind::String, None, wrap)
    }

    /// Selected by JSON numbers.
    pub fn number<V: Field>(wrap: fn(V) -> Box<U>) -> Self {
        Self::new(JsonKind::Number, None, wrap)
    }

    /// Selected by objects whose discriminator member equals `discriminator`.
    pub fn object<V: Field>(discriminator: impl Into<String>, wrap: fn(V) -> Box<U>) -> Self {
        Self::new(JsonKind::Object, Some(discriminator.into()), wrap)
    }

    /// Selected by any object.
    pub fn any_object<V: Field>(wrap: fn(V) -> Box<U>) -> Self {
        Self::new(JsonKind::Object, None, wrap)
    }

    pub fn kind(&self) -> JsonKind {
        self.kind
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    fn matches(&self, kind: JsonKind, discriminator: Option<&str>) -> bool {
        self.kind == kind
            && match &self.discriminator {
                Some(expected) => discriminator == Some(expected.as_str()),
                None => true,
            }
    }
}

impl<U: ?Sized> fmt::Debug for Variant<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("kind", &self.kind)
            .field("discriminator", &self.discriminator)
            .field("target", &self.target)
            .finish()
    }
}

struct Registration {
    name: &'static str,
    discriminator: String,
    /// `Vec<Variant<U>>` for the registered capability `U`.
    variants: Box<dyn Any + Send + Sync>,
}

/// Registered unions, immutable once built.
#[derive(Default)]
pub struct UnionRegistry {
    unions: HashMap<TypeId, Registration>,
}

impl UnionRegistry {
    pub fn builder() -> UnionRegistryBuilder {
        UnionRegistryBuilder::default()
    }

    /// A registry without unions. Decoding into any union fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains<U: ?Sized + 'static>(&self) -> bool {
        self.unions.contains_key(&TypeId::of::<U>())
    }

    pub fn len(&self) -> usize {
        self.unions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unions.is_empty()
    }

    pub(crate) fn resolve<U: ?Sized + 'static>(
        &self,
        node: &Node<'_>,
        cx: DecodeContext<'_>,
    ) -> Result<Box<U>, DecodeError> {
        let union = type_name::<U>();
        let (registration, variants) = self
            .unions
            .get(&TypeId::of::<U>())
            .and_then(|r| Some((r, r.variants.downcast_ref::<Vec<Variant<U>>>()?)))
            .ok_or(DecodeErrorKind::Unregistered(union))?;

        let (kind, discriminator) = match node.value() {
            NodeValue::String(_) => (JsonKind::String, None),
            NodeValue::Number(_) => (JsonKind::Number, None),
            NodeValue::Object(_) => (
                JsonKind::Object,
                node.member(&registration.discriminator)
                    .and_then(Node::as_str),
            ),
            _ => {
                return Err(DecodeErrorKind::UnresolvedUnion {
                    union,
                    observed: node.kind().to_owned(),
                }
                .into())
            }
        };
        let Some(variant) = variants.iter().find(|v| v.matches(kind, discriminator)) else {
            let observed = match (kind, discriminator) {
                (JsonKind::Object, Some(value)) => {
                    format!("object with {} {value:?}", registration.discriminator)
                }
                (JsonKind::Object, None) => {
                    format!("object without {}", registration.discriminator)
                }
                _ => node.kind().to_owned(),
            };
            return Err(DecodeErrorKind::UnresolvedUnion { union, observed }.into());
        };
        variant.builder.build(node, cx)
    }
}

impl fmt::Debug for UnionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.unions.values().map(|r| r.name))
            .finish()
    }
}

#[derive(Default)]
pub struct UnionRegistryBuilder {
    unions: HashMap<TypeId, Registration>,
}

impl UnionRegistryBuilder {
    /// Registers the variants of capability `U`, selecting object variants
    /// by the member at `discriminator`.
    pub fn register<U: ?Sized + 'static>(
        mut self,
        discriminator: &str,
        variants: Vec<Variant<U>>,
    ) -> Result<Self, RegistryError> {
        let name = type_name::<U>();
        if variants.is_empty() {
            return Err(RegistryError::NoVariants(name));
        }
        let id = TypeId::of::<U>();
        if self.unions.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        debug!(union = name, discriminator, variants = variants.len(), "registered union");
        self.unions.insert(
            id,
            Registration {
                name,
                discriminator: discriminator.to_owned(),
                variants: Box::new(variants),
            },
        );
        Ok(self)
    }

    pub fn build(self) -> UnionRegistry {
        UnionRegistry {
            unions: self.unions,
        }
    }
}

/// A field holding a value of capability `U`, or nothing (the null state).
pub struct Union<U: ?Sized>(Option<Box<U>>);

impl<U: ?Sized + UnionMember> Union<U> {
    pub fn new(value: Box<U>) -> Self {
        Self(Some(value))
    }

    pub fn empty() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<&U> {
        self.0.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// The stored value, if it is a `V`.
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.0.as_deref()?.as_any().downcast_ref()
    }
}

impl<U: ?Sized> Default for Union<U> {
    fn default() -> Self {
        Self(None)
    }
}

impl<U: ?Sized + UnionMember> fmt::Debug for Union<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => write!(f, "Union({})", U::type_name(value)),
            None => f.write_str("Union(null)"),
        }
    }
}

impl<U: ?Sized + UnionMember> Field for Union<U> {
    fn shape() -> Shape {
        Shape::Union
    }

    fn zero() -> Self {
        Self(None)
    }

    fn decode(&mut self, node: &Node<'_>, cx: DecodeContext<'_>) -> Result<(), DecodeError> {
        self.0 = if node.is_null() {
            None
        } else {
            Some(cx.registry().resolve::<U>(node, cx)?)
        };
        Ok(())
    }

    fn encode(&self, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        match &self.0 {
            Some(value) => U::encode_member(value, cx),
            None => Ok(None),
        }
    }

    fn presence(&self) -> Presence {
        if self.0.is_some() {
            Presence::Value
        } else {
            Presence::Null
        }
    }

    fn set_null(&mut self) -> bool {
        self.0 = None;
        true
    }
}
