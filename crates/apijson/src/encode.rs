//! Encoded output tree and its canonical writer.
//!
//! Object members live in a `BTreeMap`, so the writer always emits them in
//! ascending byte order of their keys, whatever order fields were declared or
//! mappings were iterated in.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::tag::Format;

/// Which bindings take part in an encode and how unknown values are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EncodeMode {
    /// Every binding, computed ones included.
    #[default]
    Full,
    /// Request bodies: computed bindings are server-assigned and left out.
    Request,
    /// Update patches: like `Request`, and unknown values nested in a leaf
    /// container are written as `null` instead of failing the patch.
    Update,
}

impl EncodeMode {
    pub fn skips_computed(self) -> bool {
        matches!(self, EncodeMode::Request | EncodeMode::Update)
    }

    pub fn resolves_unknown(self) -> bool {
        self == EncodeMode::Update
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeContext {
    format: Format,
    mode: EncodeMode,
}

impl EncodeContext {
    pub fn new(mode: EncodeMode) -> Self {
        Self {
            format: Format::None,
            mode,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn mode(&self) -> EncodeMode {
        self.mode
    }

    pub fn with_format(self, format: Format) -> Self {
        Self { format, ..self }
    }
}

/// JSON ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    /// A complete JSON text for a scalar (already quoted and escaped).
    Text(String),
    Array(Vec<Encoded>),
    Object(BTreeMap<String, Encoded>),
}

impl Encoded {
    pub fn null() -> Self {
        Encoded::Text("null".to_owned())
    }

    pub fn string(value: &str) -> Self {
        let mut out = String::with_capacity(value.len() + 2);
        write_str(&mut out, value);
        Encoded::Text(out)
    }

    pub fn write_to(&self, out: &mut String) {
        match self {
            Encoded::Text(text) => out.push_str(text),
            Encoded::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_to(out);
                }
                out.push(']');
            }
            Encoded::Object(members) => {
                out.push('{');
                for (i, (key, value)) in members.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_str(out, key);
                    out.push(':');
                    value.write_to(out);
                }
                out.push('}');
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        self.write_to(&mut out);
        out.into_bytes()
    }
}

fn write_str(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c < ' ' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
