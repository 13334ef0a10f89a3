//! Update-patch computation.
//!
//! At every position the new value is compared against the old one:
//!
//! - unknown: the position is omitted;
//! - null: omitted when the old value was also null or absent, otherwise an
//!   explicit `null` is sent;
//! - a record: its bindings are diffed recursively and the position is
//!   omitted when none of them produced anything;
//! - anything else: the full current encoding is sent, unchanged or not.
//!
//! Computed bindings never take part.

use std::any::type_name;
use std::collections::BTreeMap;

use crate::encode::{EncodeContext, Encoded};
use crate::error::EncodeError;
use crate::field::{Field, Presence};
use crate::plan::{plan_of, Record};
use crate::record::merge_extras;
use crate::tag::Role;

/// Decision for a value that is not diffed structurally.
pub fn leaf<F: Field>(
    new: &F,
    old: Option<&F>,
    cx: EncodeContext,
) -> Result<Option<Encoded>, EncodeError> {
    match new.presence() {
        Presence::Unknown => Ok(None),
        Presence::Null => match old.map(Field::presence) {
            None | Some(Presence::Null) => Ok(None),
            Some(Presence::Value | Presence::Unknown) => Ok(Some(Encoded::null())),
        },
        Presence::Value => Ok(Some(new.encode(cx)?.unwrap_or_else(Encoded::null))),
    }
}

/// Structural diff of a record. An absent `old` behaves as a record whose
/// fields are all null.
pub fn record<T: Record>(
    new: &T,
    old: Option<&T>,
    cx: EncodeContext,
) -> Result<Option<Encoded>, EncodeError> {
    let plan = plan_of::<T>()?;
    if let Some(inline) = plan.inline() {
        return inline.access().update(new, old, cx.with_format(inline.format()));
    }

    let mut members = BTreeMap::new();
    for binding in plan.bindings() {
        if binding.is_computed() || binding.role() != Role::Normal {
            continue;
        }
        let patch = binding
            .access()
            .update(new, old, cx.with_format(binding.format()))
            .map_err(|e| e.at_key(binding.key()))?;
        if let Some(patch) = patch {
            members.insert(binding.key().to_owned(), patch);
        }
    }
    if let Some(extras) = plan.extras().filter(|b| !b.is_computed()) {
        let entries = extras.access().encode_members(new, cx)?;
        merge_extras(type_name::<T>(), &plan, &mut members, entries);
    }

    if members.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Encoded::Object(members)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::EncodeMode;
    use apijson_types::Tri;

    fn cx() -> EncodeContext {
        EncodeContext::new(EncodeMode::Update)
    }

    #[test]
    fn unknown_is_always_omitted() {
        let new: Tri<i64> = Tri::Unknown;
        assert_eq!(leaf(&new, Some(&Tri::Value(1)), cx()).unwrap(), None);
        assert_eq!(leaf(&new, None, cx()).unwrap(), None);
    }

    #[test]
    fn null_is_sent_only_when_clearing() {
        let new: Tri<i64> = Tri::Null;
        assert_eq!(leaf(&new, None, cx()).unwrap(), None);
        assert_eq!(leaf(&new, Some(&Tri::Null), cx()).unwrap(), None);
        assert_eq!(
            leaf(&new, Some(&Tri::Value(3)), cx()).unwrap(),
            Some(Encoded::null())
        );
        assert_eq!(
            leaf(&new, Some(&Tri::Unknown), cx()).unwrap(),
            Some(Encoded::null())
        );
    }

    #[test]
    fn values_are_sent_even_when_unchanged() {
        let new = Tri::Value(String::from("same"));
        assert_eq!(
            leaf(&new, Some(&new.clone()), cx()).unwrap(),
            Some(Encoded::string("same"))
        );
    }
}
