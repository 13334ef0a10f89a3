//! Entry points: marshal, unmarshal and update-patch encoding.

use std::any::type_name;
use std::sync::Arc;

use tracing::trace;

use crate::decode::DecodeContext;
use crate::encode::{EncodeContext, EncodeMode};
use crate::error::{DecodeError, DecodeErrorKind, EncodeError, SyntaxError};
use crate::field::Field;
use crate::scan;
use crate::union::UnionRegistry;

/// Tuning knobs for a [`Codec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Deepest array/object nesting accepted on input.
    pub max_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self { max_depth: 128 }
    }
}

/// A union registry plus options. Cheap to clone and safe to share between
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    registry: Arc<UnionRegistry>,
    options: CodecOptions,
}

impl Codec {
    pub fn new(registry: UnionRegistry) -> Self {
        Self::with_options(registry, CodecOptions::default())
    }

    pub fn with_options(registry: UnionRegistry, options: CodecOptions) -> Self {
        Self {
            registry: Arc::new(registry),
            options,
        }
    }

    pub fn registry(&self) -> &UnionRegistry {
        &self.registry
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Decodes `bytes` into `dest`.
    ///
    /// Empty (or all-whitespace) input means "no value": `dest` is put into
    /// its null state, and types without one report
    /// [`DecodeErrorKind::EmptyInput`]. On error `dest` may be partially
    /// written.
    pub fn unmarshal<T: Field>(&self, bytes: &[u8], dest: &mut T) -> Result<(), DecodeError> {
        trace!(target_type = type_name::<T>(), len = bytes.len(), "unmarshal");
        let text = std::str::from_utf8(bytes).map_err(|e| SyntaxError {
            offset: e.valid_up_to(),
            reason: "invalid UTF-8",
        })?;
        match scan::parse(text, self.options.max_depth)? {
            Some(node) => dest.decode(&node, DecodeContext::new(&self.registry)),
            None if dest.set_null() => Ok(()),
            None => Err(DecodeErrorKind::EmptyInput(type_name::<T>()).into()),
        }
    }

    /// Encodes every binding, computed ones included. A value in its null
    /// state encodes as `null`.
    pub fn marshal<T: Field>(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
        self.encode(value, EncodeMode::Full)
    }

    /// Encodes a request body: like [`Codec::marshal`] without computed
    /// bindings.
    pub fn marshal_request<T: Field>(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
        self.encode(value, EncodeMode::Request)
    }

    fn encode<T: Field>(&self, value: &T, mode: EncodeMode) -> Result<Vec<u8>, EncodeError> {
        let out = match value.encode(EncodeContext::new(mode))? {
            Some(encoded) => encoded.to_bytes(),
            None => b"null".to_vec(),
        };
        trace!(source_type = type_name::<T>(), ?mode, len = out.len(), "marshal");
        Ok(out)
    }

    /// Minimal patch turning `old` into `new`. Empty output means there is
    /// nothing to send. Unknown values never fail a patch: at a field they
    /// are omitted, inside a sent list or mapping they are written as `null`.
    pub fn marshal_for_update<T: Field>(&self, new: &T, old: &T) -> Result<Vec<u8>, EncodeError> {
        let out = new
            .encode_update(Some(old), EncodeContext::new(EncodeMode::Update))?
            .map(|patch| patch.to_bytes())
            .unwrap_or_default();
        trace!(source_type = type_name::<T>(), len = out.len(), "marshal for update");
        Ok(out)
    }
}
