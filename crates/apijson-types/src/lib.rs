//! Attribute scalars shared between resource models and the
//! apijson codec.
//!
//! Every attribute in a resource model is in exactly one of three states:
//! null, unknown (not yet known during planning), or a concrete value. The
//! codec never looks inside these types; it only relies on the [`TriState`]
//! capability surface and on the fact that `Default` is the null state.

mod dynamic;
mod raw;
mod tri;

pub use dynamic::{Attribute, Dynamic};
pub use raw::RawJson;
pub use tri::{TriState, Tri};

use time::OffsetDateTime;

/// Tri-state boolean attribute.
pub type Bool = Tri<bool>;
/// Tri-state 64-bit integer attribute.
pub type Int64 = Tri<i64>;
/// Tri-state 64-bit float attribute.
pub type Float64 = Tri<f64>;
/// Tri-state string attribute.
pub type Str = Tri<String>;
/// Tri-state timestamp attribute.
pub type Rfc3339 = Tri<OffsetDateTime>;
/// Tri-state JSON-text attribute that keeps the verbatim text it was read from.
pub type Normalized = Tri<RawJson>;
