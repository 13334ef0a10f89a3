//! State threaded through a decode.

use crate::tag::Format;
use crate::union::UnionRegistry;

/// Carries the union registry and the format hint of the binding being
/// decoded. Cheap to copy; every nested call gets its own.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    registry: &'a UnionRegistry,
    format: Format,
}

impl<'a> DecodeContext<'a> {
    pub fn new(registry: &'a UnionRegistry) -> Self {
        Self {
            registry,
            format: Format::None,
        }
    }

    pub fn registry(&self) -> &'a UnionRegistry {
        self.registry
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn with_format(self, format: Format) -> Self {
        Self { format, ..self }
    }
}
