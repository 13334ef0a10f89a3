//! Generic tri-state wrapper.

/// Capability surface of a null / unknown / value attribute.
///
/// Implementors must make `Default::default()` equal to [`TriState::null`].
pub trait TriState: Default {
    type Value;

    fn null() -> Self;
    fn unknown() -> Self;
    fn from_value(value: Self::Value) -> Self;

    fn is_null(&self) -> bool;
    fn is_unknown(&self) -> bool;
    fn value(&self) -> Option<&Self::Value>;
}

/// An attribute that is null, unknown, or holds a `T`.
#[derive(Debug, Clone, PartialEq)]
pub enum Tri<T> {
    Null,
    Unknown,
    Value(T),
}

impl<T> Default for Tri<T> {
    fn default() -> Self {
        Tri::Null
    }
}

impl<T> Tri<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Tri::Value(v) => Some(v),
            Tri::Null | Tri::Unknown => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Tri::Value(v) => Some(v),
            Tri::Null | Tri::Unknown => None,
        }
    }
}

impl<T> From<Option<T>> for Tri<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Tri::Null, Tri::Value)
    }
}

impl<T> TriState for Tri<T> {
    type Value = T;

    fn null() -> Self {
        Tri::Null
    }

    fn unknown() -> Self {
        Tri::Unknown
    }

    fn from_value(value: T) -> Self {
        Tri::Value(value)
    }

    fn is_null(&self) -> bool {
        matches!(self, Tri::Null)
    }

    fn is_unknown(&self) -> bool {
        matches!(self, Tri::Unknown)
    }

    fn value(&self) -> Option<&T> {
        self.as_option()
    }
}
