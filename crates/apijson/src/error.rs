//! Error types for plan construction, registration, decoding and encoding.

use std::fmt;

use thiserror::Error;

use crate::scan::Node;

/// Malformed JSON input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid JSON at byte {offset}: {reason}")]
pub struct SyntaxError {
    pub offset: usize,
    pub reason: &'static str,
}

/// A record's field annotations cannot be turned into a plan.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("malformed tag `{tag}` on {record}: {reason}")]
    MalformedTag {
        record: &'static str,
        tag: String,
        reason: &'static str,
    },
    #[error("extras binding on {record} must be a string-keyed mapping, found {shape}")]
    ExtrasNotMapping {
        record: &'static str,
        shape: &'static str,
    },
    #[error("{record} declares more than one {role} binding")]
    DuplicateRole {
        record: &'static str,
        role: &'static str,
    },
    #[error("{record} binds wire key `{key}` more than once")]
    DuplicateKey { record: &'static str, key: String },
    #[error("{record} combines an inline binding with other fields")]
    InlineWithSiblings { record: &'static str },
    #[error("plan cache entry for {record} holds another type")]
    CacheMismatch { record: &'static str },
}

/// Union registration rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("union {0} is already registered")]
    AlreadyRegistered(&'static str),
    #[error("union {0} registered without variants")]
    NoVariants(&'static str),
}

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a failure inside the value being decoded or encoded.
///
/// Segments are collected while the error unwinds, so they are stored
/// innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.0.iter().rev()
    }

    fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{key}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeErrorKind {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("empty input cannot populate {0}, which has no null state")]
    EmptyInput(&'static str),
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid {target} literal `{literal}`")]
    InvalidLiteral {
        target: &'static str,
        literal: String,
    },
    #[error("`{literal}` is out of range for {target}")]
    OutOfRange {
        target: &'static str,
        literal: String,
    },
    #[error("invalid {format} `{text}`")]
    InvalidTime { format: &'static str, text: String },
    #[error("no variant of {union} matches {observed}")]
    UnresolvedUnion {
        union: &'static str,
        observed: String,
    },
    #[error("union {0} has no registration")]
    Unregistered(&'static str),
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Decoding failure with the path of the offending field.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    path: FieldPath,
    kind: DecodeErrorKind,
}

impl DecodeError {
    pub fn new(kind: DecodeErrorKind) -> Self {
        Self {
            path: FieldPath::default(),
            kind,
        }
    }

    pub(crate) fn mismatch(expected: &'static str, node: &Node<'_>) -> Self {
        Self::new(DecodeErrorKind::Mismatch {
            expected,
            found: node.kind(),
        })
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub(crate) fn at_key(mut self, key: &str) -> Self {
        self.path.push(Segment::Key(key.to_owned()));
        self
    }

    pub(crate) fn at_index(mut self, index: usize) -> Self {
        self.path.push(Segment::Index(index));
        self
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<DecodeErrorKind> for DecodeError {
    fn from(kind: DecodeErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<SyntaxError> for DecodeError {
    fn from(err: SyntaxError) -> Self {
        Self::new(err.into())
    }
}

impl From<PlanError> for DecodeError {
    fn from(err: PlanError) -> Self {
        Self::new(err.into())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeErrorKind {
    #[error("unknown value cannot be encoded")]
    Unknown,
    #[error("non-finite number {0} cannot be encoded")]
    NonFinite(String),
    #[error("time cannot be formatted: {0}")]
    Time(String),
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Encoding failure with the path of the offending field.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeError {
    path: FieldPath,
    kind: EncodeErrorKind,
}

impl EncodeError {
    pub fn new(kind: EncodeErrorKind) -> Self {
        Self {
            path: FieldPath::default(),
            kind,
        }
    }

    pub fn kind(&self) -> &EncodeErrorKind {
        &self.kind
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub(crate) fn at_key(mut self, key: &str) -> Self {
        self.path.push(Segment::Key(key.to_owned()));
        self
    }

    pub(crate) fn at_index(mut self, index: usize) -> Self {
        self.path.push(Segment::Index(index));
        self
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<EncodeErrorKind> for EncodeError {
    fn from(kind: EncodeErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<PlanError> for EncodeError {
    fn from(err: PlanError) -> Self {
        Self::new(err.into())
    }
}
