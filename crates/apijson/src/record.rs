//! Decoding and encoding of records through their field plans.

use std::any::type_name;
use std::collections::BTreeMap;

use tracing::warn;

use crate::decode::DecodeContext;
use crate::encode::{EncodeContext, Encoded};
use crate::error::{DecodeError, EncodeError};
use crate::plan::{plan_of, FieldPlan, Record};
use crate::scan::{Node, NodeValue};
use crate::tag::Role;

/// Implements [`Field`](crate::Field) for types implementing [`Record`].
///
/// ```ignore
/// record_field!(Server, ServerList);
/// ```
#[macro_export]
macro_rules! record_field {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Field for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::Record
            }

            fn zero() -> Self {
                <$ty as ::std::default::Default>::default()
            }

            fn decode(
                &mut self,
                node: &$crate::Node<'_>,
                cx: $crate::DecodeContext<'_>,
            ) -> ::std::result::Result<(), $crate::DecodeError> {
                $crate::record::decode(self, node, cx)
            }

            fn encode(
                &self,
                cx: $crate::EncodeContext,
            ) -> ::std::result::Result<::std::option::Option<$crate::Encoded>, $crate::EncodeError> {
                $crate::record::encode(self, cx)
            }

            fn encode_update(
                &self,
                old: ::std::option::Option<&Self>,
                cx: $crate::EncodeContext,
            ) -> ::std::result::Result<::std::option::Option<$crate::Encoded>, $crate::EncodeError> {
                $crate::diff::record(self, old, cx)
            }
        }
    )+};
}

/// Decodes an object into `target`, member by member.
///
/// Members are visited in source order, so a repeated key ends up holding its
/// last value. Bindings with no matching member keep their current value.
pub fn decode<T: Record>(
    target: &mut T,
    node: &Node<'_>,
    cx: DecodeContext<'_>,
) -> Result<(), DecodeError> {
    let plan = plan_of::<T>()?;
    if let Some(inline) = plan.inline() {
        return inline
            .access()
            .decode(target, node, cx.with_format(inline.format()));
    }

    let members = match node.value() {
        NodeValue::Null => {
            *target = T::default();
            return Ok(());
        }
        NodeValue::Object(members) => members,
        _ => return Err(DecodeError::mismatch("object", node)),
    };
    for (key, value) in members {
        let result = match (plan.binding(key), plan.extras()) {
            (Some(binding), _) => {
                binding
                    .access()
                    .decode(target, value, cx.with_format(binding.format()))
            }
            (None, Some(extras)) => extras.access().decode_member(target, key, value, cx),
            (None, None) => Ok(()),
        };
        result.map_err(|e| e.at_key(key))?;
    }
    Ok(())
}

/// Encodes `source` as an object with members in key order. Null fields are
/// left out; in request mode computed fields are too.
pub fn encode<T: Record>(source: &T, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
    let plan = plan_of::<T>()?;
    if let Some(inline) = plan.inline() {
        return inline
            .access()
            .encode(source, cx.with_format(inline.format()));
    }

    let skip_computed = cx.mode().skips_computed();
    let mut members = BTreeMap::new();
    for binding in plan.bindings() {
        if binding.role() != Role::Normal || (skip_computed && binding.is_computed()) {
            continue;
        }
        let encoded = binding
            .access()
            .encode(source, cx.with_format(binding.format()))
            .map_err(|e| e.at_key(binding.key()))?;
        if let Some(encoded) = encoded {
            members.insert(binding.key().to_owned(), encoded);
        }
    }
    if let Some(extras) = plan.extras() {
        if !(skip_computed && extras.is_computed()) {
            let entries = extras.access().encode_members(source, cx)?;
            merge_extras(type_name::<T>(), &plan, &mut members, entries);
        }
    }
    Ok(Some(Encoded::Object(members)))
}

/// Adds extras entries as siblings of the declared members. An entry whose
/// key belongs to a declared binding is dropped.
pub(crate) fn merge_extras<T>(
    record: &'static str,
    plan: &FieldPlan<T>,
    members: &mut BTreeMap<String, Encoded>,
    entries: Vec<(String, Encoded)>,
) {
    for (key, value) in entries {
        if plan.binding(&key).is_some() {
            warn!(record, key = %key, "extras entry shadowed by a declared field");
            continue;
        }
        members.insert(key, value);
    }
}
